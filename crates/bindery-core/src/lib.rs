//! bindery-core - Core library for document assembly
//!
//! This crate provides the building blocks for:
//! - Locating fragment links in a root document ([`LinkPattern::scan`])
//! - Deriving stable fragment identifiers from link titles ([`FragmentId`])
//! - Loading each fragment at most once and assembling the final document
//!   ([`Assembler`])
//!
//! # Assembling a document
//!
//! The scanner finds `[Title](path)` links whose path matches a configured
//! template, and the assembler rewrites them into in-document anchors while
//! appending the deduplicated fragment bodies:
//!
//! ```
//! use bindery_core::{LinkPattern, MemoryReader, transclude};
//!
//! let root = "See [Intro](chapters/chapter-1/ch1-section-1.1.md) and again \
//!             [Intro](chapters/chapter-1/ch1-section-1.1.md).";
//! let reader = MemoryReader::new().add("chapters/chapter-1/ch1-section-1.1.md", "Hello.");
//!
//! let doc = transclude(root, &LinkPattern::default(), &reader);
//!
//! // Both occurrences collapse to the same anchor, rendered once
//! assert_eq!(doc.len(), 1);
//! assert!(doc.output.starts_with("See [Intro](#intro) and again [Intro](#intro)."));
//! assert!(doc.output.contains("## Intro {#intro}"));
//! ```
//!
//! # Missing fragments
//!
//! A fragment that cannot be read degrades to a placeholder section; the
//! run still succeeds:
//!
//! ```
//! use bindery_core::{LinkPattern, MemoryReader, transclude};
//!
//! let root = "See [Intro](chapters/chapter-1/ch1-section-1.1.md).";
//! let doc = transclude(root, &LinkPattern::default(), &MemoryReader::new());
//!
//! assert_eq!(doc.placeholder_count(), 1);
//! assert!(doc.output.contains("Missing fragment"));
//! ```
//!
//! # Custom link patterns
//!
//! The link shape is injected, not hard-coded; `*` in a template matches a
//! run of digits:
//!
//! ```
//! use bindery_core::LinkPattern;
//!
//! let pattern = LinkPattern::new("docs/section-*.md").unwrap();
//! assert!(pattern.matches_path("docs/section-12.md"));
//! assert!(!pattern.matches_path("docs/intro.md"));
//! ```

mod assemble;
mod fragment_id;
mod pattern;
mod sources;

pub use assemble::{AssembledDocument, Assembler, FragmentRecord, placeholder_body};
pub use fragment_id::FragmentId;
pub use pattern::{DEFAULT_TEMPLATE, LinkPattern, Reference, Scan, SourceSpan};
pub use sources::{FragmentReader, FsReader, FsWriter, MemoryReader, OutputWriter};

/// Scan `root_text` with `pattern` and assemble the result in one call.
pub fn transclude(
    root_text: &str,
    pattern: &LinkPattern,
    reader: &impl FragmentReader,
) -> AssembledDocument {
    Assembler::assemble(root_text, pattern.scan(root_text), reader)
}
