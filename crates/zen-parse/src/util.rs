//! Small text helpers the factory uses to pull a construct's name out of its
//! signature text once the bracket-matching scan has located it.

use std::sync::OnceLock;

use regex::Regex;

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("static regex"))
}

/// Name of a function/member-function: the token immediately before the
/// first top-level `(`, or the whole `operator...` token when the
/// signature contains one (spec §9: operator members are always treated as
/// used, never resolved via the plain word-character tokenizer alone).
pub fn name_before_paren(text: &str) -> String {
    let paren_idx = text.find('(').unwrap_or(text.len());
    let prefix = text[..paren_idx].trim();
    if let Some(op_idx) = prefix.find("operator") {
        return prefix[op_idx..].trim().to_string();
    }
    identifier_regex()
        .find_iter(prefix)
        .last()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| prefix.to_string())
}

/// First identifier following `keyword` in `text` (used for `class X` and
/// `namespace N` prefixes).
pub fn identifier_after(text: &str, keyword: &str) -> String {
    match text.find(keyword) {
        Some(idx) => {
            let after = &text[idx + keyword.len()..];
            identifier_regex().find(after).map(|m| m.as_str().to_string()).unwrap_or_default()
        }
        None => String::new(),
    }
}

/// Last identifier-like token in `text` (spec: `CppClassForwardDeclaration`'s
/// `name` is the last token).
pub fn last_identifier(text: &str) -> String {
    identifier_regex().find_iter(text).last().map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// First identifier-like token in `text` (spec: `Label`'s `name` is the
/// first token).
pub fn first_identifier(text: &str) -> String {
    identifier_regex().find(text).map(|m| m.as_str().to_string()).unwrap_or_default()
}
