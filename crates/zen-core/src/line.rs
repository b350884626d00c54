//! Line storage: raw/uncommented/stripped forms (spec §3, §4.A).

use std::borrow::Cow;

/// Which textual form a position, chunk, or line is addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceForm {
    Raw,
    Uncommented,
    Stripped,
}

/// A single physical line of a source file.
///
/// `uncommented` is populated once, at construction, by
/// [`crate::content::strip_comments`]; `stripped` is derived on demand from it.
#[derive(Debug, Clone)]
pub struct Line {
    index: usize,
    raw: String,
    uncommented: String,
}

impl Line {
    pub fn new(index: usize, raw: String, uncommented: String) -> Self {
        Self {
            index,
            raw,
            uncommented,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn uncommented(&self) -> &str {
        &self.uncommented
    }

    /// Whitespace runs collapsed to a single space; trailing newline kept if
    /// the uncommented form had one. A pure-whitespace line stripped down to
    /// just the newline is the spec's "empty" line, excluded from
    /// `stripped_hash`.
    pub fn stripped(&self) -> String {
        let collapsed = self.uncommented.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.uncommented.ends_with('\n') {
            format!("{collapsed}\n")
        } else {
            collapsed
        }
    }

    /// Line text in the requested form.
    pub fn form(&self, form: SourceForm) -> Cow<'_, str> {
        match form {
            SourceForm::Raw => Cow::Borrowed(&self.raw),
            SourceForm::Uncommented => Cow::Borrowed(&self.uncommented),
            SourceForm::Stripped => Cow::Owned(self.stripped()),
        }
    }
}
