//! `SourceContent`: the owning list of [`Line`]s for one source file (spec §3, §4.A).

use std::sync::{Arc, OnceLock};

use crate::hash::iter_hash;
use crate::line::{Line, SourceForm};
use crate::pos::SourcePos;

/// Owns the parsed lines of one source file and its comment-stripped state.
///
/// Comment stripping runs exactly once, eagerly, at construction time: the
/// spec's "populated exactly once per source" invariant for `uncommented`
/// holds trivially rather than needing a lazy/mutable flag, and every
/// `SourceContent` is `has_uncommented() == true` from the moment it exists.
pub struct SourceContent {
    lines: Vec<Line>,
    stripped_hash: OnceLock<i64>,
}

impl SourceContent {
    /// Builds a `SourceContent` from raw file text, splitting on line
    /// terminators (line-ending characters are kept on each line) and
    /// stripping comments immediately.
    pub fn new(raw: &str) -> Arc<Self> {
        let raw_lines = split_lines_keepends(raw);
        let uncommented = strip_comments(&raw_lines);
        let lines = raw_lines
            .into_iter()
            .zip(uncommented)
            .enumerate()
            .map(|(i, (raw, unc))| Line::new(i, raw, unc))
            .collect();
        Arc::new(Self {
            lines,
            stripped_hash: OnceLock::new(),
        })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, i: usize) -> &Line {
        &self.lines[i]
    }

    pub fn len_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn has_uncommented(&self) -> bool {
        true
    }

    /// Order-sensitive hash over `stripped` lines, excluding pure-whitespace
    /// ones. Identical across runs iff the file's non-comment,
    /// non-whitespace content is identical.
    pub fn stripped_hash(&self) -> i64 {
        *self.stripped_hash.get_or_init(|| {
            iter_hash(
                self.lines
                    .iter()
                    .map(Line::stripped)
                    .filter(|s| s != "\n")
                    .map(|s| s.trim().to_string()),
            )
        })
    }

    pub fn start_pos(self: &Arc<Self>, form: SourceForm) -> SourcePos {
        SourcePos::new(self.clone(), 0, 0, form).expect("start position is always valid")
    }

    pub fn end_pos(self: &Arc<Self>, form: SourceForm) -> SourcePos {
        let last = self.lines.len() as i64 - 1;
        let len = self.lines[self.lines.len() - 1].form(form).chars().count() as i64;
        SourcePos::new(self.clone(), last, len, form).expect("end position is always valid")
    }
}

/// Splits `raw` into lines, keeping the `'\n'` terminator on each line that
/// has one. Mirrors Python's `str.splitlines(True)` for the `'\n'`
/// terminator (the only one the rest of the pipeline treats specially;
/// stray `'\r'` bytes fall out naturally as whitespace when lines are
/// `stripped()`).
fn split_lines_keepends(raw: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0usize;
    for (i, b) in raw.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            lines.push(raw[start..=i].to_string());
            start = i + 1;
        }
    }
    if start < raw.len() {
        lines.push(raw[start..].to_string());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Replaces comments with spaces line-by-line while preserving line count
/// and trailing-newline geometry (spec §4.A).
fn strip_comments(raw_lines: &[String]) -> Vec<String> {
    let mut in_block = false;
    let mut result = Vec::with_capacity(raw_lines.len());
    for raw in raw_lines {
        let mut chunks: Vec<&str> = Vec::new();
        let mut i = 0usize;
        loop {
            if in_block {
                match raw[i..].find("*/") {
                    Some(off) => {
                        i += off + 2;
                        in_block = false;
                    }
                    None => break,
                }
            } else {
                match raw[i..].find("/*") {
                    Some(off) => {
                        chunks.push(&raw[i..i + off]);
                        i += off + 2;
                        in_block = true;
                    }
                    None => {
                        chunks.push(&raw[i..]);
                        break;
                    }
                }
            }
        }
        let unblocked = chunks.join(" ");
        let core = match unblocked.find("//") {
            Some(idx) => &unblocked[..idx],
            None => &unblocked[..],
        };
        let mut uncommented = core.to_string();
        if raw.ends_with('\n') {
            uncommented.push('\n');
        }
        result.push(uncommented);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comments_preserves_line_count() {
        let raw = "int a; // trailing\n/* block\nspanning */ int b;\nint c;\n";
        let content = SourceContent::new(raw);
        assert_eq!(content.len_lines(), raw.matches('\n').count());
    }

    #[test]
    fn line_comment_is_removed_but_newline_kept() {
        let content = SourceContent::new("int a; // comment\n");
        assert_eq!(content.line(0).uncommented(), "int a; \n");
    }

    #[test]
    fn block_comment_spanning_lines_becomes_whitespace() {
        let content = SourceContent::new("a /* start\nstill comment */ b;\n");
        assert_eq!(content.line(0).uncommented(), "a \n");
        assert_eq!(content.line(1).uncommented(), " b;\n");
    }

    #[test]
    fn stripped_hash_ignores_whitespace_only_lines() {
        let a = SourceContent::new("int a;\n\nint b;\n");
        let b = SourceContent::new("int a;\nint b;\n");
        assert_eq!(a.stripped_hash(), b.stripped_hash());
    }

    #[test]
    fn stripped_hash_changes_on_token_edit() {
        let a = SourceContent::new("int a;\n");
        let b = SourceContent::new("int b;\n");
        assert_ne!(a.stripped_hash(), b.stripped_hash());
    }

    #[test]
    fn stripped_hash_ignores_comment_edits() {
        let a = SourceContent::new("int a; // hello\n");
        let b = SourceContent::new("int a; // goodbye world\n");
        assert_eq!(a.stripped_hash(), b.stripped_hash());
    }
}
