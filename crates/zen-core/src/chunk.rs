//! `Chunk`: a bounded, form-typed view into a source file, plus the scope
//! walker (bracket/quote pairing, in-scope search, scope-local tokenization)
//! (spec §3, §4.B, §4.E).

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::content::SourceContent;
use crate::error::{CoreError, Result};
use crate::hash;
use crate::line::{Line, SourceForm};
use crate::pos::SourcePos;

/// Column argument accepted by [`Chunk::pos`]: either a literal (possibly
/// negative) index, or the keyword "end" meaning one-past-the-last-char.
#[derive(Clone, Copy)]
pub enum Col {
    Index(i64),
    End,
}

fn bracket_close(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '{' => Some('}'),
        '[' => Some(']'),
        '<' => Some('>'),
        _ => None,
    }
}

fn is_bracket_open(c: char) -> bool {
    matches!(c, '(' | '{' | '[' | '<')
}

fn default_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w0-9]+").expect("static regex"))
}

impl Clone for Chunk {
    /// Clones the addressed range; lazily-computed caches (materialized
    /// text, index map) are recomputed on next access rather than copied.
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            form: self.form,
            text: OnceLock::new(),
            index_map: OnceLock::new(),
        }
    }
}

/// `[start, end)` slice of a `SourceContent` in one `SourceForm`.
pub struct Chunk {
    content: Arc<SourceContent>,
    start: SourcePos,
    end: SourcePos,
    form: SourceForm,
    text: OnceLock<String>,
    /// `(char_index_of_line_start_within_chunk, file_line_index, col_offset)`
    /// for each physical line the chunk spans, in order.
    index_map: OnceLock<Vec<(usize, usize, usize)>>,
}

impl Chunk {
    /// A chunk spanning the whole content in the given form.
    pub fn whole(content: Arc<SourceContent>, form: SourceForm) -> Self {
        let start = content.start_pos(form);
        let end = content.end_pos(form);
        Chunk::new(content, start, end, form).expect("whole-content chunk is always valid")
    }

    pub fn new(content: Arc<SourceContent>, start: SourcePos, end: SourcePos, form: SourceForm) -> Result<Self> {
        if start.form() != form || end.form() != form {
            return Err(CoreError::Value("start/end form must match chunk form".into()));
        }
        if start.line_i() > end.line_i() {
            return Err(CoreError::Value(format!(
                "start line {} follows end line {}",
                start.line_i(),
                end.line_i()
            )));
        }
        if start.line_i() == end.line_i() && start.col_i() > end.col_i() {
            return Err(CoreError::Value(format!(
                "start column {} follows end column {} on the same line",
                start.col_i(),
                end.col_i()
            )));
        }
        Ok(Self {
            content,
            start,
            end,
            form,
            text: OnceLock::new(),
            index_map: OnceLock::new(),
        })
    }

    pub fn content_ref(&self) -> &Arc<SourceContent> {
        &self.content
    }

    pub fn start(&self) -> &SourcePos {
        &self.start
    }

    pub fn end(&self) -> &SourcePos {
        &self.end
    }

    pub fn form(&self) -> SourceForm {
        self.form
    }

    pub fn first_line(&self) -> &Line {
        self.content.line(self.start.line_i())
    }

    pub fn last_line(&self) -> &Line {
        self.content.line(self.end.line_i())
    }

    /// Spanned file lines, in order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        (self.start.line_i()..=self.end.line_i()).map(move |i| self.content.line(i))
    }

    fn index_map(&self) -> &[(usize, usize, usize)] {
        self.index_map.get_or_init(|| {
            let mut map = Vec::new();
            let mut idx = 0usize;
            for file_line in self.start.line_i()..=self.end.line_i() {
                let line_len = self.content.line(file_line).form(self.form).chars().count();
                let col_base = if file_line == self.start.line_i() { self.start.col_i() } else { 0 };
                let col_end = if file_line == self.end.line_i() { self.end.col_i() } else { line_len };
                map.push((idx, file_line, col_base));
                idx += col_end.saturating_sub(col_base);
            }
            map
        })
    }

    fn text(&self) -> &str {
        self.text.get_or_init(|| {
            let mut s = String::new();
            for file_line in self.start.line_i()..=self.end.line_i() {
                let line_str = self.content.line(file_line).form(self.form);
                let line_len = line_str.chars().count();
                let col_base = if file_line == self.start.line_i() { self.start.col_i() } else { 0 };
                let col_end = if file_line == self.end.line_i() { self.end.col_i() } else { line_len };
                let slice: String = line_str.chars().skip(col_base).take(col_end.saturating_sub(col_base)).collect();
                s.push_str(&slice);
            }
            s
        })
    }

    pub fn len(&self) -> usize {
        self.text().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.text().chars()
    }

    /// Character at a (possibly negative) flat index into the chunk.
    pub fn get(&self, i: i64) -> Result<char> {
        let len = self.len() as i64;
        let idx = if i < 0 { i + len } else { i };
        if idx < 0 || idx >= len {
            return Err(CoreError::Value(format!("index {i} outside chunk of length {len}")));
        }
        self.char_at_index(idx as usize)
    }

    pub fn get_pos(&self, pos: &SourcePos) -> Result<char> {
        let i = self.index_at_pos(pos)?;
        self.char_at_index(i)
    }

    fn char_at_index(&self, i: usize) -> Result<char> {
        self.text()
            .chars()
            .nth(i)
            .ok_or_else(|| CoreError::Value(format!("index {i} outside chunk")))
    }

    fn pos_at_index(&self, i: usize) -> Result<SourcePos> {
        let map = self.index_map();
        let j = match map.binary_search_by_key(&i, |e| e.0) {
            Ok(j) => j,
            Err(0) => 0,
            Err(j) => j - 1,
        };
        let (start_idx, file_line, col_base) = map[j];
        let col = col_base + (i - start_idx);
        SourcePos::new(self.content.clone(), file_line as i64, col as i64, self.form)
    }

    fn index_at_pos(&self, pos: &SourcePos) -> Result<usize> {
        if pos.line_i() < self.start.line_i() || pos.line_i() > self.end.line_i() {
            return Err(CoreError::Value(format!(
                "line {} outside chunk lines {}..{}",
                pos.line_i(),
                self.start.line_i(),
                self.end.line_i()
            )));
        }
        let (start_idx, _, col_base) = self
            .index_map()
            .iter()
            .copied()
            .find(|(_, line, _)| *line == pos.line_i())
            .expect("chunk spans this line");
        if pos.col_i() < col_base {
            return Err(CoreError::Value(format!(
                "column {} precedes chunk start column {col_base}",
                pos.col_i()
            )));
        }
        Ok(start_idx + (pos.col_i() - col_base))
    }

    /// Builds a position via `pos(line, col)`, where `col` may be an index or
    /// the `Col::End` keyword meaning the line's length in this form.
    pub fn pos(&self, line_i: usize, col: Col) -> Result<SourcePos> {
        let col_i = match col {
            Col::Index(i) => i,
            Col::End => self.content.line(line_i).form(self.form).chars().count() as i64,
        };
        SourcePos::new(self.content.clone(), line_i as i64, col_i, self.form)
    }

    pub fn line(&self, pos: &SourcePos) -> &Line {
        self.content.line(pos.line_i())
    }

    /// Sub-chunk `[start, end)`; `None` endpoints default to this chunk's
    /// bounds. Step-based slicing is intentionally unsupported.
    pub fn slice(&self, start: Option<SourcePos>, end: Option<SourcePos>) -> Result<Chunk> {
        let start = start.unwrap_or_else(|| self.start.clone());
        let end = end.unwrap_or_else(|| self.end.clone());
        Chunk::new(self.content.clone(), start, end, self.form)
    }

    /// All regex matches in the chunk (default `[\w0-9]+`), ignoring bracket
    /// structure.
    pub fn tokenize(&self, regex: Option<&Regex>) -> HashSet<String> {
        let re = regex.unwrap_or_else(|| default_token_regex());
        re.find_iter(self.text()).map(|m| m.as_str().to_string()).collect()
    }

    /// Like [`Chunk::tokenize`], but characters inside matched bracket pairs
    /// or string/char literals are masked out first, so only top-level
    /// tokens are returned.
    pub fn scope_tokens(&self, regex: Option<&Regex>) -> HashSet<String> {
        let masked = self.masked_top_level_text();
        let re = regex.unwrap_or_else(|| default_token_regex());
        re.find_iter(&masked).map(|m| m.as_str().to_string()).collect()
    }

    fn masked_top_level_text(&self) -> String {
        let mut chars: Vec<char> = self.chars().collect();
        let mut i = 0usize;
        while i < chars.len() {
            let c = chars[i];
            if is_bracket_open(c) {
                if let Ok(pos) = self.pos_at_index(i) {
                    if let Ok(end_pos) = self.find_pair(&pos, true) {
                        let end_i = self.index_at_pos(&end_pos).unwrap_or(i);
                        for slot in chars.iter_mut().take(end_i).skip(i + 1) {
                            *slot = ' ';
                        }
                        i = end_i + 1;
                        continue;
                    }
                }
            } else if c == '\'' || c == '"' {
                if let Ok(pos) = self.pos_at_index(i) {
                    if let Ok(end_pos) = self.find_quote_end(&pos) {
                        let end_i = self.index_at_pos(&end_pos).unwrap_or(i);
                        for slot in chars.iter_mut().take(end_i).skip(i + 1) {
                            *slot = ' ';
                        }
                        i = end_i + 1;
                        continue;
                    }
                }
            }
            i += 1;
        }
        chars.into_iter().collect()
    }

    /// Finds the closing bracket matching the open bracket at `start`,
    /// skipping over string/char literal interiors. When `allow_semicolon`
    /// is false, a bare `;` before the matching close is treated as a
    /// failure (used to tentatively parse `<` as a template bracket: on
    /// failure the caller falls back to treating `<` as an operator).
    pub fn find_pair(&self, start: &SourcePos, allow_semicolon: bool) -> Result<SourcePos> {
        let open_char = self.get_pos(start)?;
        let close_char = bracket_close(open_char)
            .ok_or_else(|| CoreError::Value(format!("{open_char:?} is not a bracket")))?;
        let mut depth: i64 = 0;
        let mut idx = self.index_at_pos(start)?;
        let len = self.len();
        while idx < len {
            let c = self.char_at_index(idx)?;
            if c == '\'' || c == '"' {
                let pos = self.pos_at_index(idx)?;
                let end = self.find_quote_end(&pos)?;
                idx = self.index_at_pos(&end)? + 1;
                continue;
            }
            if !allow_semicolon && c == ';' {
                return Err(CoreError::NotFound(format!(
                    "';' encountered before matching bracket for {open_char:?}"
                )));
            }
            if c == open_char {
                depth += 1;
            } else if c == close_char {
                depth -= 1;
                if depth == 0 {
                    return self.pos_at_index(idx);
                }
            }
            idx += 1;
        }
        Err(CoreError::NotFound(format!(
            "no closing {close_char:?} found for {open_char:?} starting at {start:?}"
        )))
    }

    /// Finds the closing quote of the literal starting at `start`, honoring
    /// `\` escapes. Refuses to cross a newline (unterminated literal).
    pub fn find_quote_end(&self, start: &SourcePos) -> Result<SourcePos> {
        let quote = self.get_pos(start)?;
        if quote != '\'' && quote != '"' {
            return Err(CoreError::Value(format!("{quote:?} is not a quote character")));
        }
        let mut idx = self.index_at_pos(start)? + 1;
        let len = self.len();
        loop {
            if idx >= len {
                return Err(CoreError::NotFound(format!("unterminated literal starting at {start:?}")));
            }
            let c = self.char_at_index(idx)?;
            if c == '\n' {
                return Err(CoreError::Parsing(format!("literal starting at {start:?} crosses a newline")));
            }
            if c == '\\' {
                idx += 2;
                continue;
            }
            if c == quote {
                return self.pos_at_index(idx);
            }
            idx += 1;
        }
    }

    /// Scans the top level of the chunk for `substr`, descending into
    /// matched bracket/quote pairs but skipping their interiors.
    pub fn find_in_scope(&self, substr: &str) -> Result<SourcePos> {
        if substr.is_empty() {
            return Err(CoreError::Value("substr must not be empty".into()));
        }
        let text = self.text();
        let target: Vec<char> = substr.chars().collect();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0usize;
        while i < chars.len() {
            if i + target.len() <= chars.len() && chars[i..i + target.len()] == target[..] {
                return self.pos_at_index(i);
            }
            let c = chars[i];
            if is_bracket_open(c) {
                if let Ok(pos) = self.pos_at_index(i) {
                    if let Ok(end_pos) = self.find_pair(&pos, true) {
                        i = self.index_at_pos(&end_pos)? + 1;
                        continue;
                    }
                }
            } else if c == '\'' || c == '"' {
                if let Ok(pos) = self.pos_at_index(i) {
                    if let Ok(end_pos) = self.find_quote_end(&pos) {
                        i = self.index_at_pos(&end_pos)? + 1;
                        continue;
                    }
                }
            }
            i += 1;
        }
        Err(CoreError::NotFound(format!("{substr:?} not found in scope")))
    }

    /// Trims leading/trailing whitespace, returning a narrower chunk.
    pub fn strip(&self) -> Result<Chunk> {
        let chars: Vec<char> = self.chars().collect();
        let mut first = 0usize;
        while first < chars.len() && chars[first].is_whitespace() {
            first += 1;
        }
        let mut last = chars.len();
        while last > first && chars[last - 1].is_whitespace() {
            last -= 1;
        }
        let start_pos = self.pos_at_index(first)?;
        let end_pos = self.pos_at_index(last)?;
        Chunk::new(self.content.clone(), start_pos, end_pos, self.form)
    }

    /// Whitespace-insensitive hash: the chunk's spanned physical lines
    /// (already collapsed to single spaces when `form` is `Stripped`),
    /// combined via [`hash::combine`].
    pub fn content_hash(&self) -> i64 {
        let mut acc = 1i64;
        for line_s in self.line_strings() {
            acc = hash::combine(acc, hash::line_digest(&line_s));
        }
        acc
    }

    fn line_strings(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = String::new();
        for c in self.chars() {
            cur.push(c);
            if c == '\n' {
                cur.pop();
                out.push(std::mem::take(&mut cur));
            }
        }
        if !cur.is_empty() {
            out.push(cur);
        }
        out
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chunk[{:?}]", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(raw: &str) -> (Arc<SourceContent>, Chunk) {
        let content = SourceContent::new(raw);
        let whole = Chunk::whole(content.clone(), SourceForm::Stripped);
        (content, whole)
    }

    #[test]
    fn find_pair_matches_parens() {
        let (_c, chunk) = chunk("foo(bar(1), 2);\n");
        let start = chunk.pos(0, Col::Index(3)).unwrap();
        assert_eq!(chunk.get_pos(&start).unwrap(), '(');
        let end = chunk.find_pair(&start, true).unwrap();
        assert_eq!(chunk.get_pos(&end).unwrap(), ')');
        // every bracket between them balances
        let inner = chunk.pos(0, Col::Index(7)).unwrap();
        assert_eq!(chunk.get_pos(&inner).unwrap(), '(');
    }

    #[test]
    fn find_pair_skips_quoted_brackets() {
        let (_c, chunk) = chunk("foo(\"(\", 1);\n");
        let start = chunk.pos(0, Col::Index(3)).unwrap();
        let end = chunk.find_pair(&start, true).unwrap();
        assert_eq!(chunk.get_pos(&end).unwrap(), ')');
    }

    #[test]
    fn find_quote_end_honors_escapes() {
        let (_c, chunk) = chunk("\"a\\\"b\" rest\n");
        let start = chunk.pos(0, Col::Index(0)).unwrap();
        let end = chunk.find_quote_end(&start).unwrap();
        assert_eq!(chunk.get_pos(&end).unwrap(), '"');
        assert_eq!(chunk.index_at_pos(&end).unwrap(), 5);
    }

    #[test]
    fn content_hash_ignores_whitespace_collapse() {
        let (_c1, a) = chunk("int   foo ( ) ;\n");
        let (_c2, b) = chunk("int foo();\n");
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_differs_on_token_change() {
        let (_c1, a) = chunk("int foo();\n");
        let (_c2, b) = chunk("int bar();\n");
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn find_in_scope_skips_nested_brackets() {
        let (_c, chunk) = chunk("outer(inner) target\n");
        let pos = chunk.find_in_scope("target").unwrap();
        assert_eq!(chunk.index_at_pos(&pos).unwrap(), 13);
    }

    #[test]
    fn scope_tokens_excludes_bracket_interior() {
        let (_c, chunk) = chunk("foo(hidden) bar\n");
        let tokens = chunk.scope_tokens(None);
        assert!(tokens.contains("foo"));
        assert!(tokens.contains("bar"));
        assert!(!tokens.contains("hidden"));
    }
}
