//! `SourcePos`: an immutable, form-typed position within a `SourceContent` (spec §3).

use std::sync::Arc;

use crate::content::SourceContent;
use crate::error::{CoreError, Result};
use crate::line::SourceForm;

/// A position within a [`SourceContent`], addressed in one particular
/// [`SourceForm`]. Positions in different forms are never compared or mixed;
/// arithmetic only operates within the same form.
#[derive(Clone)]
pub struct SourcePos {
    content: Arc<SourceContent>,
    line_i: usize,
    col_i: usize,
    form: SourceForm,
}

impl SourcePos {
    /// Builds a position, normalizing negative line/column indices the way
    /// Python's negative-index slicing does, and folding an end-of-line
    /// position into column 0 of the next line when one exists (spec §3:
    /// "positions at end-of-line and start-of-next-line are one and the
    /// same").
    pub fn new(content: Arc<SourceContent>, line_i: i64, col_i: i64, form: SourceForm) -> Result<Self> {
        let line_i = normalize_line_i(&content, line_i)?;
        let col_i = normalize_col_i(&content, line_i, col_i, form)?;
        let line_len = content.line(line_i).form(form).chars().count();
        let (line_i, col_i) = if col_i == line_len && line_i + 1 < content.len_lines() {
            (line_i + 1, 0)
        } else {
            (line_i, col_i)
        };
        Ok(Self {
            content,
            line_i,
            col_i,
            form,
        })
    }

    pub fn content(&self) -> &Arc<SourceContent> {
        &self.content
    }

    pub fn line_i(&self) -> usize {
        self.line_i
    }

    pub fn col_i(&self) -> usize {
        self.col_i
    }

    pub fn form(&self) -> SourceForm {
        self.form
    }

    /// Advances by `n` characters across line boundaries in this position's
    /// form. A negative `n` retreats instead (mirrors `pos - n`).
    pub fn checked_add(&self, n: i64) -> Result<Self> {
        if n < 0 {
            return self.checked_sub(-n);
        }
        let mut n = n as usize;
        let line = self.content.line(self.line_i);
        let remaining = line.form(self.form).chars().count() - self.col_i;
        if n < remaining {
            return Self::new(self.content.clone(), self.line_i as i64, (self.col_i + n) as i64, self.form);
        }
        n -= remaining;
        for idx in (self.line_i + 1)..self.content.len_lines() {
            let line_chars = self.content.line(idx).form(self.form).chars().count();
            if n < line_chars {
                return Self::new(self.content.clone(), idx as i64, n as i64, self.form);
            }
            n -= line_chars;
        }
        Err(CoreError::Value(format!(
            "cannot advance {n} characters past end of content from {self:?}"
        )))
    }

    /// Retreats by `n` characters across line boundaries. A negative `n`
    /// advances instead (mirrors `pos + n`).
    pub fn checked_sub(&self, n: i64) -> Result<Self> {
        if n < 0 {
            return self.checked_add(-n);
        }
        let mut n = n as usize;
        if n <= self.col_i {
            return Self::new(self.content.clone(), self.line_i as i64, (self.col_i - n) as i64, self.form);
        }
        n -= self.col_i;
        for idx in (0..self.line_i).rev() {
            let line_chars = self.content.line(idx).form(self.form).chars().count();
            if n <= line_chars {
                return Self::new(self.content.clone(), idx as i64, (line_chars - n) as i64, self.form);
            }
            n -= line_chars;
        }
        Err(CoreError::Value(format!(
            "cannot retreat {n} characters before start of content from {self:?}"
        )))
    }
}

impl PartialEq for SourcePos {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.content, &other.content)
            && self.line_i == other.line_i
            && self.col_i == other.col_i
            && self.form == other.form
    }
}
impl Eq for SourcePos {}

impl std::hash::Hash for SourcePos {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.content) as usize).hash(state);
        self.line_i.hash(state);
        self.col_i.hash(state);
        self.form.hash(state);
    }
}

impl std::fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SourcePos[line: {}, col: {}]", self.line_i, self.col_i)
    }
}

fn normalize_line_i(content: &SourceContent, i: i64) -> Result<usize> {
    let len = content.len_lines() as i64;
    let adjusted = if i < 0 { i + len } else { i };
    if adjusted < 0 || adjusted >= len {
        return Err(CoreError::Value(format!(
            "line index {i} invalid; {len} lines exist"
        )));
    }
    Ok(adjusted as usize)
}

fn normalize_col_i(content: &SourceContent, line_i: usize, i: i64, form: SourceForm) -> Result<usize> {
    let line_len = content.line(line_i).form(form).chars().count() as i64;
    let adjusted = if i < 0 { i + line_len } else { i };
    if adjusted < 0 || adjusted > line_len {
        return Err(CoreError::Value(format!(
            "column index {i} invalid; line {line_i} is {line_len} chars long"
        )));
    }
    Ok(adjusted as usize)
}
