//! `Construct`: a named symbol aggregated from the components that
//! contribute to it across one compile object's sources (spec §3).

use std::collections::HashSet;

use zen_core::hash;
use zen_parse::Component;

/// A named symbol (class, function, free variable). Content accumulates as
/// the owning `ConstructGraph` walks each source's component tree; dependency
/// resolution happens at query time against the graph (spec §9: "graph
/// ownership and cycles" — no back-reference is stored here).
pub struct Construct<'c> {
    name: String,
    content: Vec<&'c Component>,
}

impl<'c> Construct<'c> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[&'c Component] {
        &self.content
    }

    pub fn push_content(&mut self, component: &'c Component) {
        self.content.push(component);
    }

    pub fn extend_content(&mut self, components: impl IntoIterator<Item = &'c Component>) {
        self.content.extend(components);
    }

    /// Folds the `content_hash` of each contributing component's chunk, in
    /// the order content was recorded (spec §4.E).
    pub fn content_hash(&self) -> i64 {
        self.content
            .iter()
            .fold(1i64, |acc, component| hash::combine(acc, component.chunk().content_hash()))
    }

    /// Names this construct references, restricted to `available` (the
    /// containing graph's known names) and excluding its own name. Gathered
    /// from every contributing component's own tokens *and* its nested
    /// sub-components' tokens, so a reference buried in a nested control
    /// block or statement still counts (spec §3: `dependencies` = "set of
    /// other Constructs referenced by any of its content components").
    pub fn dependency_names(&self, available: &HashSet<String>) -> HashSet<String> {
        let mut names = HashSet::new();
        for component in &self.content {
            names.extend(component.used_construct_names(available));
            for nested in component.recursive_components() {
                names.extend(nested.used_construct_names(available));
            }
        }
        names.remove(&self.name);
        names
    }

    /// Operator overloads (`operator+`, `operator==`, ...) are always
    /// considered used: a plain word-character tokenizer can't reliably find
    /// their call sites (`a + b` never mentions `operator+`), so the change
    /// engine treats any edit to one as dependent-affecting regardless of
    /// detected references (spec §9).
    pub fn is_operator(&self) -> bool {
        self.name.starts_with("operator")
    }
}
