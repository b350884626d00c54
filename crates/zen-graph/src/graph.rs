//! `ConstructGraph`: `name -> Construct` map, populated by walking component
//! trees, with dependency resolution performed at query time (spec §3
//! "ConstructGraph", §9 "graph ownership and cycles").

use std::collections::{HashMap, HashSet};

use zen_parse::Component;

use crate::construct::Construct;

/// Named-construct dependency graph for one compile object. Holds no
/// back-references from `Construct` to the graph; dependency and recursive-
/// dependency queries resolve names against `self` at call time, so mutually
/// recursive C++ references are handled by a visited set rather than by
/// reference cycles in memory.
#[derive(Default)]
pub struct ConstructGraph<'c> {
    constructs: HashMap<String, Construct<'c>>,
}

impl<'c> ConstructGraph<'c> {
    pub fn new() -> Self {
        Self { constructs: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.constructs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructs.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Construct<'c>> {
        self.constructs.get(name)
    }

    pub fn names(&self) -> HashSet<String> {
        self.constructs.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Construct<'c>)> {
        self.constructs.iter()
    }

    /// Lookup with create-on-miss, per spec's "Lookup with optional
    /// create-on-miss" contract.
    pub fn get_or_create(&mut self, name: &str) -> &mut Construct<'c> {
        self.constructs.entry(name.to_string()).or_insert_with(|| Construct::new(name))
    }

    /// Merges one component's `construct_content` into the graph, creating
    /// entries for names not yet seen.
    pub fn add_component(&mut self, component: &'c Component) {
        for (name, contributions) in component.construct_content() {
            self.get_or_create(&name).extend_content(contributions);
        }
    }

    /// Builds a graph from every top-level component of a parsed file (and,
    /// transitively, their container descendants via `construct_content`).
    pub fn from_components(components: impl IntoIterator<Item = &'c Component>) -> Self {
        let mut graph = Self::new();
        for component in components {
            graph.add_component(component);
        }
        graph
    }

    /// Direct dependencies of `name`: other graph-known constructs its
    /// content references.
    pub fn dependencies(&self, name: &str) -> HashSet<String> {
        match self.get(name) {
            Some(construct) => construct.dependency_names(&self.names()),
            None => HashSet::new(),
        }
    }

    /// Transitive closure of [`Self::dependencies`], deduplicated via a
    /// visited set, `name` itself excluded (spec §3 `recursive_dependencies`).
    pub fn recursive_dependencies(&self, name: &str) -> HashSet<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = self.dependencies(name).into_iter().collect();
        while let Some(next) = stack.pop() {
            if next == name || !visited.insert(next.clone()) {
                continue;
            }
            for dep in self.dependencies(&next) {
                if dep != name && !visited.contains(&dep) {
                    stack.push(dep);
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use zen_core::{Chunk, SourceContent, SourceForm};
    use zen_parse::parse_file;

    fn parse(raw: &str) -> zen_parse::Block {
        let content: Arc<SourceContent> = SourceContent::new(raw);
        let whole = Chunk::whole(content, SourceForm::Stripped);
        parse_file(whole).unwrap()
    }

    #[test]
    fn recursive_dependencies_follow_chain_and_exclude_self() {
        let file = parse("void a() { b(); }\nvoid b() { c(); }\nvoid c() { a(); }\n");
        let graph = ConstructGraph::from_components(file.children.iter());
        let deps = graph.recursive_dependencies("a");
        assert!(deps.contains("b"));
        assert!(deps.contains("c"));
        assert!(!deps.contains("a"));
    }

    #[test]
    fn unknown_construct_has_no_dependencies() {
        let file = parse("void a() { b(); }\n");
        let graph = ConstructGraph::from_components(file.children.iter());
        assert!(graph.recursive_dependencies("nonexistent").is_empty());
    }
}
