//! Scope-aware C++ lexical decomposition: turns a whole-file `Chunk` into a
//! tree of [`Component`]s (spec §4.B-§4.E).

pub mod block;
pub mod component;
pub mod error;
pub mod factory;
pub mod scope;
pub mod util;

pub use component::{
    Block, ClassDefinition, ClassForwardDecl, Component, ControlBlock, FunctionDeclaration, FunctionDefinition,
    Label, MemberFunctionDeclaration, MemberFunctionDefinition, MiscStatement, Namespace, Preprocessor, Using,
};
pub use error::{ParseError, Result};
pub use scope::ScopeType;

use zen_core::Chunk;

/// Parses a whole file's worth of source into the top-level `Block`
/// component (spec §4.D: the file's own top-level children, in `Global`
/// scope). A genuine structural `ParsingError` anywhere in the file
/// propagates rather than truncating the tree, so a malformed translation
/// unit is reported rather than silently analyzed as if it ended early.
pub fn parse_file(chunk: Chunk) -> Result<Block> {
    let children = block::parse_children(&chunk, ScopeType::Global)?;
    Ok(Block {
        chunk,
        scope: ScopeType::Global,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use zen_core::{SourceContent, SourceForm};

    #[test]
    fn parse_file_collects_top_level_declarations() {
        let content: Arc<SourceContent> = SourceContent::new(
            "#include <vector>\n\nclass Foo {\npublic:\n  void bar();\n};\n\nvoid Foo::bar() { }\n",
        );
        let whole = Chunk::whole(content, SourceForm::Stripped);
        let file = parse_file(whole).unwrap();
        assert!(file.children.iter().any(|c| c.kind_name() == "Preprocessor"));
        assert!(file.children.iter().any(|c| c.kind_name() == "ClassDefinition"));
        assert!(file.children.iter().any(|c| c.kind_name() == "FunctionDefinition"));
    }
}
