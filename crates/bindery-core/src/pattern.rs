//! Link scanner for locating fragment references in a root document.
//!
//! The scanner recognizes inline links of the form `[Title](path)` where the
//! path matches a configured [`LinkPattern`] template. Matching is done by
//! hand over the raw bytes; anything that does not fully match is simply not
//! reported, and scanning resumes after the failed opening bracket.

use crate::FragmentId;
use eyre::{Result, bail};
use facet::Facet;

/// Byte span in the root document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct SourceSpan {
    /// Byte offset from start of the document
    pub offset: usize,
    /// Byte length
    pub length: usize,
}

impl SourceSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }
}

/// A fragment link occurrence found in the root document.
///
/// References are produced in left-to-right scan order and are not
/// deduplicated; the same title may appear any number of times.
#[derive(Debug, Clone, Facet)]
pub struct Reference {
    /// The link title, exactly as written (e.g. "Getting Started")
    pub title: String,
    /// The link target path (e.g. "chapters/chapter-1/ch1-section-1.1.md")
    pub target_path: String,
    /// The exact substring that matched, used for substitution later
    pub raw_match: String,
    /// Byte span of the match in the root document
    pub span: SourceSpan,
}

/// Template for the default fragment naming convention.
pub const DEFAULT_TEMPLATE: &str = "chapters/chapter-*/ch*-section-*.*.md";

/// The link shape the scanner recognizes: a bracketed title followed by a
/// parenthesized path matching a validated path template.
///
/// In the template, each `*` matches one or more ASCII digits and every
/// other character matches itself, so the default template accepts exactly
/// the `chapters/chapter-<N>/ch<N>-section-<X>.<Y>.md` shape.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct LinkPattern {
    template: String,
}

impl LinkPattern {
    /// Create a pattern from a path template, validating it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is empty, contains whitespace or
    /// bracket/parenthesis characters, has no literal characters, or places
    /// a digit (or another `*`) directly after a `*` (which would make
    /// matching ambiguous).
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.is_empty() {
            bail!("link pattern template must not be empty");
        }
        if template.chars().any(char::is_whitespace) {
            bail!("link pattern template must not contain whitespace: {template:?}");
        }
        if template
            .chars()
            .any(|c| matches!(c, '(' | ')' | '[' | ']'))
        {
            bail!("link pattern template must not contain brackets or parentheses: {template:?}");
        }
        if !template.chars().any(|c| c != '*') {
            bail!("link pattern template needs at least one literal character: {template:?}");
        }
        let bytes = template.as_bytes();
        for window in bytes.windows(2) {
            if window[0] == b'*' && (window[1] == b'*' || window[1].is_ascii_digit()) {
                bail!(
                    "link pattern template must not follow `*` with a digit or another `*`: {template:?}"
                );
            }
        }
        Ok(Self { template })
    }

    /// The path template this pattern was built from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether a link target matches this pattern's path template.
    pub fn matches_path(&self, path: &str) -> bool {
        matches_template(path, &self.template)
    }

    /// Scan a document for fragment links, left to right, non-overlapping.
    ///
    /// The returned iterator is lazy and borrows both the pattern and the
    /// text; call `scan` again to restart from the beginning. Scanning never
    /// touches the filesystem.
    pub fn scan<'p, 't>(&'p self, text: &'t str) -> Scan<'p, 't> {
        Scan {
            pattern: self,
            text,
            pos: 0,
        }
    }

    /// Collect all references in scan order.
    pub fn scan_all(&self, text: &str) -> Vec<Reference> {
        self.scan(text).collect()
    }
}

impl Default for LinkPattern {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Match a path against a template where `*` matches one or more ASCII
/// digits. Validation guarantees no digit or `*` follows a `*`, so a
/// maximal digit run never needs backtracking.
fn matches_template(path: &str, template: &str) -> bool {
    let mut p = path.as_bytes();
    for &tc in template.as_bytes() {
        if tc == b'*' {
            let run = p.iter().take_while(|b| b.is_ascii_digit()).count();
            if run == 0 {
                return false;
            }
            p = &p[run..];
        } else {
            match p.split_first() {
                Some((&pc, rest)) if pc == tc => p = rest,
                _ => return false,
            }
        }
    }
    p.is_empty()
}

/// Lazy iterator over fragment links in a document.
pub struct Scan<'p, 't> {
    pattern: &'p LinkPattern,
    text: &'t str,
    pos: usize,
}

impl Iterator for Scan<'_, '_> {
    type Item = Reference;

    fn next(&mut self) -> Option<Reference> {
        let bytes = self.text.as_bytes();
        let mut i = self.pos;
        while i < bytes.len() {
            if bytes[i] != b'[' {
                i += 1;
                continue;
            }
            if let Some(reference) = match_link(self.pattern, self.text, i) {
                self.pos = reference.span.offset + reference.span.length;
                return Some(reference);
            }
            i += 1;
        }
        self.pos = i;
        None
    }
}

/// Try to match `[Title](path)` starting at `start`, which points at a `[`.
fn match_link(pattern: &LinkPattern, text: &str, start: usize) -> Option<Reference> {
    let bytes = text.as_bytes();

    // Title runs to the next `]`; a nested `[` or a newline aborts the match
    let mut i = start + 1;
    loop {
        match *bytes.get(i)? {
            b']' => break,
            b'[' | b'\n' => return None,
            _ => i += 1,
        }
    }
    let title = &text[start + 1..i];

    // The path must follow immediately in parentheses
    if bytes.get(i + 1) != Some(&b'(') {
        return None;
    }
    let path_start = i + 2;
    let mut j = path_start;
    loop {
        match *bytes.get(j)? {
            b')' => break,
            b'(' | b'\n' | b' ' => return None,
            _ => j += 1,
        }
    }
    let path = &text[path_start..j];

    if !pattern.matches_path(path) {
        return None;
    }
    // The title must normalize to a usable fragment id
    FragmentId::derive(title)?;

    let end = j + 1;
    Some(Reference {
        title: title.to_string(),
        target_path: path.to_string(),
        raw_match: text[start..end].to_string(),
        span: SourceSpan::new(start, end - start),
    })
}
