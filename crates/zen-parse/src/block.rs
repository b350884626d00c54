//! Block nesting: repeatedly invokes the component factory over a chunk,
//! stopping at the first `ComponentCreationError` (spec §4.D).

use zen_core::Chunk;

use crate::component::Component;
use crate::error::{ParseError, Result};
use crate::scope::ScopeType;

/// Parses the children of a block: skips one leading `{` and one trailing
/// `}` if present, then repeatedly creates components from what remains, in
/// source order. Iteration halts cleanly on the `ComponentCreationError`
/// sentinel (spec §4.D) — the expected way to discover "no more components
/// in this chunk" — but a genuine `ParsingError` (missing `;` after a class
/// body, function-within-function, unterminated macro) propagates instead of
/// being swallowed, so the change engine's conservative CHANGED fallback
/// (spec §4.F step 5, §7) actually gets to see it.
pub fn parse_children(chunk: &Chunk, scope: ScopeType) -> Result<Vec<Component>> {
    let mut start = chunk.start().clone();
    if let Ok(c) = chunk.get(0) {
        if c == '{' {
            start = start.checked_add(1).unwrap_or(start);
        }
    }
    let mut end = chunk.end().clone();
    if !chunk.is_empty() {
        if let Ok(c) = chunk.get(-1) {
            if c == '}' {
                end = end.checked_sub(1).unwrap_or(end);
            }
        }
    }

    let mut inner = match chunk.slice(Some(start), Some(end)) {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    let mut children = Vec::new();
    loop {
        if inner.start() == inner.end() {
            break;
        }
        match crate::factory::create(&inner, scope) {
            Ok(component) => {
                let next_start = component.chunk().end().clone();
                children.push(component);
                match inner.slice(Some(next_start), None) {
                    Ok(rest) => inner = rest,
                    Err(_) => break,
                }
            }
            Err(ParseError::ComponentCreation) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(children)
}
