//! `ScopeType`: disambiguates syntax for the component factory (spec §4.C, §4.D).

/// Context the component factory parses in. Disambiguates, e.g., whether a
/// `{...}` block following `()` is a free function or a class member, and
/// whether a `;`-terminated line inside a block is a declaration or just a
/// statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    Global,
    Class,
    /// Per spec §9's preserved quirk: control-block bodies are parsed in
    /// `Class` scope, not `Func` — almost certainly unintended upstream, but
    /// kept as an explicit, binding behavior rather than silently "fixed".
    Func,
}
