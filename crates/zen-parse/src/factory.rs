//! The component factory: given a chunk and a scope, scans character by
//! character and emits exactly one `Component` from its start (spec §4.C).

use zen_core::{Chunk, SourcePos};

use crate::block::parse_children;
use crate::component::*;
use crate::error::{ParseError, Result};
use crate::scope::ScopeType;
use crate::util::{identifier_after, last_identifier, name_before_paren};

const CONTROL_KEYWORDS: [&str; 4] = ["if", "for", "while", "do"];

/// Creates one `Component` starting at `chunk.start()`. The factory strips
/// surrounding whitespace from the chosen chunk before constructing the
/// component (callers pass the whole remaining region; leading/trailing
/// whitespace inside an individual statement chunk is trimmed here via
/// `Chunk::strip` at the call sites that slice out a final component chunk).
pub fn create(chunk: &Chunk, scope: ScopeType) -> Result<Component> {
    let mut s = String::new();
    let mut pos = chunk.start().clone();

    while pos != *chunk.end() {
        let c = chunk.get_pos(&pos)?;

        if pos.col_i() == 0 && c == '#' {
            return create_preprocessor(chunk, &pos);
        }

        if c == ':' {
            if peek(chunk, &pos) == Some(':') {
                s.push_str("::");
                pos = pos.checked_add(2)?;
                continue;
            }
            if !s.contains("class") && !s.contains("()") {
                let component_chunk = stripped_slice(chunk, None, Some(pos.checked_add(1)?))?;
                let name = crate::util::first_identifier(&s);
                return Ok(Component::Label(Label {
                    name,
                    chunk: component_chunk,
                }));
            }
            s.push(':');
            pos = pos.checked_add(1)?;
            continue;
        }

        if c == ';' {
            let component_chunk = stripped_slice(chunk, None, Some(pos.checked_add(1)?))?;
            return Ok(classify_statement(scope, &s, component_chunk));
        }

        if c.is_whitespace() {
            pos = pos.checked_add(1)?;
            continue;
        }

        if c == '<' && scope != ScopeType::Func {
            match chunk.find_pair(&pos, false) {
                Ok(end) => {
                    s.push_str("<>");
                    pos = end.checked_add(1)?;
                    continue;
                }
                Err(_) => {
                    s.push('<');
                    pos = pos.checked_add(1)?;
                    continue;
                }
            }
        }

        if c == '(' || c == '[' {
            let end = chunk.find_pair(&pos, true)?;
            s.push_str(if c == '(' { "()" } else { "[]" });
            pos = end.checked_add(1)?;
            continue;
        }

        if c == '{' {
            let brace_pos = pos.clone();
            let end = chunk.find_pair(&pos, true)?;
            if s.contains("namespace") {
                return finish_namespace(chunk, &brace_pos, &end);
            }
            if s.contains("class") {
                return finish_class_definition(chunk, &brace_pos, &end);
            }
            if s.ends_with("()") {
                if control_keyword(&s).is_some() {
                    return finish_control_block(chunk, &brace_pos, &end);
                }
                if scope == ScopeType::Func {
                    if s.contains("[]") {
                        // A lambda body inside a larger statement; not a
                        // component of its own — keep scanning for the
                        // statement's terminating ';'.
                        s.push_str("{}");
                        pos = end.checked_add(1)?;
                        continue;
                    }
                    return Err(ParseError::Parsing(format!(
                        "function definition found within another function at {pos:?}"
                    )));
                }
                return finish_function_definition(chunk, &brace_pos, &end, scope == ScopeType::Class);
            }
            // Other occurrences of curly brackets are ignored.
            pos = end.checked_add(1)?;
            continue;
        }

        s.push(c);
        pos = pos.checked_add(1)?;
    }
    Err(ParseError::ComponentCreation)
}

fn peek(chunk: &Chunk, pos: &SourcePos) -> Option<char> {
    pos.checked_add(1).ok().and_then(|p| chunk.get_pos(&p).ok())
}

fn control_keyword(s: &str) -> Option<&'static str> {
    CONTROL_KEYWORDS.iter().copied().find(|kw| s.ends_with(&format!("{kw}()")))
}

/// Slices `chunk[start, end)` and trims surrounding whitespace, per the
/// factory's "strips surrounding whitespace" contract.
fn stripped_slice(chunk: &Chunk, start: Option<SourcePos>, end: Option<SourcePos>) -> Result<Chunk> {
    Ok(chunk.slice(start, end)?.strip()?)
}

fn classify_statement(scope: ScopeType, s: &str, chunk: Chunk) -> Component {
    if scope == ScopeType::Func {
        return Component::MiscStatement(MiscStatement { chunk });
    }
    if s.contains("class") {
        let name = last_identifier(&chunk.to_string());
        return Component::ClassForwardDecl(ClassForwardDecl { chunk, name });
    }
    if s.contains("using") {
        return Component::Using(Using { chunk });
    }
    if s.contains("()") {
        let name = name_before_paren(&chunk.to_string());
        return if scope == ScopeType::Class {
            Component::MemberFunctionDeclaration(MemberFunctionDeclaration { chunk, name })
        } else {
            Component::FunctionDeclaration(FunctionDeclaration { chunk, name })
        };
    }
    Component::MiscStatement(MiscStatement { chunk })
}

fn create_preprocessor(chunk: &Chunk, start: &SourcePos) -> Result<Component> {
    let content = chunk.content_ref();
    let mut line_i = start.line_i();
    loop {
        let line_str = content.line(line_i).form(chunk.form());
        let trimmed = line_str.strip_suffix('\n').unwrap_or(line_str.as_ref());
        if !trimmed.ends_with('\\') {
            break;
        }
        if line_i + 1 >= content.len_lines() {
            return Err(ParseError::Parsing(format!("no end to macro starting at {start:?}")));
        }
        line_i += 1;
    }
    let end_pos = chunk.pos(line_i, zen_core::Col::End)?;
    let directive_chunk = chunk.slice(Some(start.clone()), Some(end_pos))?;
    Ok(Component::Preprocessor(Preprocessor { chunk: directive_chunk }))
}

fn finish_namespace(chunk: &Chunk, brace_pos: &SourcePos, end: &SourcePos) -> Result<Component> {
    let prefix = stripped_slice(chunk, None, Some(brace_pos.clone()))?;
    let name = identifier_after(&prefix.to_string(), "namespace");
    let full = chunk.slice(None, Some(end.checked_add(1)?))?;
    let body_chunk = chunk.slice(Some(brace_pos.clone()), Some(end.checked_add(1)?))?;
    let children = parse_children(&body_chunk, ScopeType::Global)?;
    Ok(Component::Namespace(Namespace {
        chunk: full,
        prefix,
        name,
        children,
    }))
}

fn finish_class_definition(chunk: &Chunk, brace_pos: &SourcePos, end: &SourcePos) -> Result<Component> {
    let mut trail = end.checked_add(1)?;
    let semicolon_pos;
    loop {
        if trail == *chunk.end() {
            return Err(ParseError::Parsing(format!(
                "no semicolon found after class definition ending at {end:?}"
            )));
        }
        let c = chunk.get_pos(&trail)?;
        if c == ';' {
            semicolon_pos = trail.clone();
            break;
        }
        if !c.is_whitespace() {
            return Err(ParseError::Parsing(format!(
                "class definition seems to be missing a semicolon; found {c:?} after closing brace"
            )));
        }
        trail = trail.checked_add(1)?;
    }
    let prefix = stripped_slice(chunk, None, Some(brace_pos.clone()))?;
    let name = identifier_after(&prefix.to_string(), "class");
    let full = chunk.slice(None, Some(semicolon_pos.checked_add(1)?))?;
    let body_chunk = chunk.slice(Some(brace_pos.clone()), Some(end.checked_add(1)?))?;
    let members = parse_children(&body_chunk, ScopeType::Class)?;
    Ok(Component::ClassDefinition(ClassDefinition {
        chunk: full,
        prefix,
        name,
        members,
    }))
}

fn finish_control_block(chunk: &Chunk, brace_pos: &SourcePos, end: &SourcePos) -> Result<Component> {
    let prefix = stripped_slice(chunk, None, Some(brace_pos.clone()))?;
    let full = chunk.slice(None, Some(end.checked_add(1)?))?;
    let body_chunk = chunk.slice(Some(brace_pos.clone()), Some(end.checked_add(1)?))?;
    // Preserved quirk (spec §9): control-block bodies parse in CLASS scope.
    let body = parse_children(&body_chunk, ScopeType::Class)?;
    Ok(Component::ControlBlock(ControlBlock { chunk: full, prefix, body }))
}

fn finish_function_definition(chunk: &Chunk, brace_pos: &SourcePos, end: &SourcePos, member: bool) -> Result<Component> {
    let prefix = stripped_slice(chunk, None, Some(brace_pos.clone()))?;
    let full = chunk.slice(None, Some(end.checked_add(1)?))?;
    let body_chunk = chunk.slice(Some(brace_pos.clone()), Some(end.checked_add(1)?))?;
    let body = parse_children(&body_chunk, ScopeType::Func)?;
    let name = name_before_paren(&prefix.to_string());
    let signature = Box::new(Component::MiscStatement(MiscStatement { chunk: prefix.clone() }));
    if member {
        Ok(Component::MemberFunctionDefinition(MemberFunctionDefinition {
            chunk: full,
            prefix,
            name,
            signature,
            body,
        }))
    } else {
        Ok(Component::FunctionDefinition(FunctionDefinition {
            chunk: full,
            prefix,
            name,
            signature,
            body,
        }))
    }
}
