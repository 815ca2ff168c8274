use facet::Facet;
use std::fmt::{Display, Formatter};

/// Normalized fragment identifier derived from a link title.
///
/// Derivation is a pure function of the title text: it never looks at the
/// link target or whether the fragment loaded. Two titles that differ only
/// in case or whitespace map to the same id, which is what makes repeated
/// links collapse to a single rendered section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct FragmentId(String);

impl FragmentId {
    /// Derive an id from a link title: lowercased, whitespace runs collapsed
    /// to a single `-`. Returns `None` when nothing is left after
    /// normalization (empty or whitespace-only titles).
    pub fn derive(title: &str) -> Option<Self> {
        let mut id = String::with_capacity(title.len());
        for word in title.split_whitespace() {
            if !id.is_empty() {
                id.push('-');
            }
            for ch in word.chars() {
                id.extend(ch.to_lowercase());
            }
        }
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FragmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FragmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for FragmentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<FragmentId> for &str {
    fn eq(&self, other: &FragmentId) -> bool {
        *self == other.0
    }
}
