//! Fragment resolution and document assembly.
//!
//! This module consumes the references produced by the scanner, loads each
//! unique fragment at most once, rewrites the original links into
//! in-document anchors, and appends the rendered fragment bodies after the
//! rewritten text in first-discovery order.
//!
//! # Example
//!
//! ```
//! use bindery_core::{Assembler, LinkPattern, MemoryReader};
//!
//! let root = "See [Intro](chapters/chapter-1/ch1-section-1.1.md).";
//! let reader = MemoryReader::new().add("chapters/chapter-1/ch1-section-1.1.md", "Hello.");
//! let pattern = LinkPattern::default();
//!
//! let doc = Assembler::assemble(root, pattern.scan(root), &reader);
//! assert_eq!(doc.len(), 1);
//! assert!(doc.output.contains("[Intro](#intro)"));
//! assert!(doc.output.contains("## Intro {#intro}"));
//! ```

use crate::{FragmentId, FragmentReader, Reference};
use facet::Facet;
use std::collections::HashMap;
use std::path::Path;

/// Separator emitted between the rewritten body and each fragment block.
const SEPARATOR: &str = "\n\n---\n\n";

/// A resolved (or placeholder) fragment, cached once per id for the
/// duration of one assembly run and immutable afterwards apart from
/// collision bookkeeping.
#[derive(Debug, Clone, Facet)]
pub struct FragmentRecord {
    /// Identifier derived from the title, also used as the anchor name
    pub id: FragmentId,
    /// Title from the first reference that produced this id
    pub title: String,
    /// The target path that was loaded (or attempted)
    pub target_path: String,
    /// Loaded content, or the placeholder message when loading failed
    pub body: String,
    /// Whether the target could be read
    pub load_succeeded: bool,
    /// Target paths that shared this id but arrived after the first
    /// reference; they are never loaded (first write wins)
    pub shadowed_paths: Vec<String>,
}

/// Result of one assembly run.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    /// Fragments in first-discovery order
    pub fragments: Vec<FragmentRecord>,
    /// Rewritten root text followed by the rendered fragments
    pub output: String,
}

impl AssembledDocument {
    /// Number of unique fragments discovered
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether no fragment links were found
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of fragments that degraded to a placeholder
    pub fn placeholder_count(&self) -> usize {
        self.fragments.iter().filter(|f| !f.load_succeeded).count()
    }
}

/// Placeholder body emitted for a fragment that could not be loaded.
pub fn placeholder_body(path: &str) -> String {
    format!("> Missing fragment: could not load `{path}`.")
}

/// One-pass fragment resolver and assembler.
pub struct Assembler;

impl Assembler {
    /// Resolve `references` against `reader` and assemble the final
    /// document.
    ///
    /// Guarantees, for a fixed input set:
    /// - the reader is called exactly once per unique fragment id;
    /// - fragment blocks appear in first-discovery order;
    /// - every matched link substring is rewritten to its anchor form;
    /// - a fragment that fails to load degrades to a placeholder section
    ///   instead of aborting the run.
    pub fn assemble(
        root_text: &str,
        references: impl IntoIterator<Item = Reference>,
        reader: &impl FragmentReader,
    ) -> AssembledDocument {
        // Identity map plus an append-only discovery-order list; ordering is
        // never inferred from the map itself.
        let mut by_id: HashMap<FragmentId, usize> = HashMap::new();
        let mut fragments: Vec<FragmentRecord> = Vec::new();
        let mut body = root_text.to_string();

        for reference in references {
            let Some(id) = FragmentId::derive(&reference.title) else {
                continue;
            };

            match by_id.get(&id) {
                Some(&index) => {
                    let record = &mut fragments[index];
                    if record.target_path != reference.target_path
                        && !record.shadowed_paths.contains(&reference.target_path)
                    {
                        record.shadowed_paths.push(reference.target_path.clone());
                    }
                }
                None => {
                    let (fragment_body, load_succeeded) =
                        match reader.read_fragment(Path::new(&reference.target_path)) {
                            Ok(content) => (content, true),
                            Err(_) => (placeholder_body(&reference.target_path), false),
                        };
                    by_id.insert(id.clone(), fragments.len());
                    fragments.push(FragmentRecord {
                        id: id.clone(),
                        title: reference.title.clone(),
                        target_path: reference.target_path.clone(),
                        body: fragment_body,
                        load_succeeded,
                        shadowed_paths: Vec::new(),
                    });
                }
            }

            // Substitution is by the original matched text, not by offset:
            // repeated identical links are all replaced in one go, and
            // replacing again for a later duplicate is a no-op.
            let anchor = format!("[{}](#{})", reference.title, id);
            body = body.replace(&reference.raw_match, &anchor);
        }

        let output = render(&body, &fragments);
        AssembledDocument { fragments, output }
    }
}

/// Concatenate the rewritten body with the rendered fragment section.
///
/// A run with no fragments returns the body untouched, with no dangling
/// separator. When fragments follow, trailing newlines on the body are
/// normalized so block spacing is uniform.
fn render(body: &str, fragments: &[FragmentRecord]) -> String {
    if fragments.is_empty() {
        return body.to_string();
    }

    let mut output = String::with_capacity(body.len() + fragments.len() * 64);
    output.push_str(body.trim_end_matches('\n'));
    for record in fragments {
        output.push_str(SEPARATOR);
        output.push_str(&render_fragment(record));
    }
    output.push('\n');
    output
}

fn render_fragment(record: &FragmentRecord) -> String {
    format!(
        "## {} {{#{}}}\n\n{}",
        record.title,
        record.id,
        record.body.trim_end_matches('\n')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinkPattern, MemoryReader};
    use std::cell::RefCell;

    /// Reader that counts how often each path is requested.
    struct CountingReader {
        inner: MemoryReader,
        calls: RefCell<Vec<String>>,
    }

    impl CountingReader {
        fn new(inner: MemoryReader) -> Self {
            Self {
                inner,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls_for(&self, path: &str) -> usize {
            self.calls.borrow().iter().filter(|p| *p == path).count()
        }
    }

    impl FragmentReader for CountingReader {
        fn read_fragment(&self, path: &Path) -> eyre::Result<String> {
            self.calls
                .borrow_mut()
                .push(path.display().to_string());
            self.inner.read_fragment(path)
        }
    }

    fn assemble(root: &str, reader: &impl FragmentReader) -> AssembledDocument {
        let pattern = LinkPattern::default();
        Assembler::assemble(root, pattern.scan(root), reader)
    }

    #[test]
    fn repeated_links_collapse_to_one_section() {
        let root = "See [Intro](chapters/chapter-1/ch1-section-1.1.md) and again \
                    [Intro](chapters/chapter-1/ch1-section-1.1.md).";
        let reader =
            MemoryReader::new().add("chapters/chapter-1/ch1-section-1.1.md", "Hello.");

        let doc = assemble(root, &reader);

        assert_eq!(
            doc.output,
            "See [Intro](#intro) and again [Intro](#intro).\n\n---\n\n## Intro {#intro}\n\nHello.\n"
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn loader_is_invoked_once_per_unique_id() {
        let root = "[Intro](chapters/chapter-1/ch1-section-1.1.md) \
                    [Intro](chapters/chapter-1/ch1-section-1.1.md) \
                    [intro](chapters/chapter-1/ch1-section-1.1.md)";
        let reader = CountingReader::new(
            MemoryReader::new().add("chapters/chapter-1/ch1-section-1.1.md", "Hello."),
        );

        let doc = assemble(root, &reader);

        assert_eq!(doc.len(), 1);
        assert_eq!(reader.calls_for("chapters/chapter-1/ch1-section-1.1.md"), 1);
    }

    #[test]
    fn fragments_render_in_first_discovery_order() {
        let root = "[Second](chapters/chapter-2/ch2-section-2.1.md) \
                    [First](chapters/chapter-1/ch1-section-1.1.md) \
                    [Second](chapters/chapter-2/ch2-section-2.1.md)";
        let reader = MemoryReader::new()
            .add("chapters/chapter-1/ch1-section-1.1.md", "one")
            .add("chapters/chapter-2/ch2-section-2.1.md", "two");

        let doc = assemble(root, &reader);

        assert_eq!(doc.fragments.len(), 2);
        assert_eq!(doc.fragments[0].id, "second");
        assert_eq!(doc.fragments[1].id, "first");
        let second_pos = doc.output.find("## Second {#second}").unwrap();
        let first_pos = doc.output.find("## First {#first}").unwrap();
        assert!(second_pos < first_pos);
    }

    #[test]
    fn every_matched_link_is_rewritten() {
        let root = "[A](chapters/chapter-1/ch1-section-1.1.md) mid \
                    [B](chapters/chapter-1/ch1-section-1.2.md) end \
                    [A](chapters/chapter-1/ch1-section-1.1.md)";
        let reader = MemoryReader::new()
            .add("chapters/chapter-1/ch1-section-1.1.md", "a")
            .add("chapters/chapter-1/ch1-section-1.2.md", "b");

        let doc = assemble(root, &reader);

        assert!(!doc.output.contains("](chapters/"));
        assert!(doc.output.contains("[A](#a)"));
        assert!(doc.output.contains("[B](#b)"));
    }

    #[test]
    fn missing_fragment_degrades_to_placeholder() {
        let root = "See [Intro](chapters/chapter-1/ch1-section-1.1.md).";
        let reader = MemoryReader::new();

        let doc = assemble(root, &reader);

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.placeholder_count(), 1);
        assert!(!doc.fragments[0].load_succeeded);
        assert!(doc.output.contains("[Intro](#intro)"));
        assert!(doc.output.contains("## Intro {#intro}"));
        assert!(
            doc.output
                .contains("> Missing fragment: could not load `chapters/chapter-1/ch1-section-1.1.md`.")
        );
    }

    #[test]
    fn missing_fragment_does_not_affect_other_fragments() {
        let root = "[Gone](chapters/chapter-1/ch1-section-1.1.md) \
                    [Here](chapters/chapter-1/ch1-section-1.2.md)";
        let reader = MemoryReader::new().add("chapters/chapter-1/ch1-section-1.2.md", "present");

        let doc = assemble(root, &reader);

        assert_eq!(doc.placeholder_count(), 1);
        assert!(doc.output.contains("present"));
    }

    #[test]
    fn first_write_wins_on_title_collision() {
        let root = "[Intro](chapters/chapter-1/ch1-section-1.1.md) \
                    [Intro](chapters/chapter-2/ch2-section-2.1.md)";
        let reader = CountingReader::new(
            MemoryReader::new()
                .add("chapters/chapter-1/ch1-section-1.1.md", "first")
                .add("chapters/chapter-2/ch2-section-2.1.md", "second"),
        );

        let doc = assemble(root, &reader);

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.fragments[0].body, "first");
        assert_eq!(doc.fragments[0].target_path, "chapters/chapter-1/ch1-section-1.1.md");
        assert_eq!(
            doc.fragments[0].shadowed_paths,
            vec!["chapters/chapter-2/ch2-section-2.1.md".to_string()]
        );
        assert_eq!(reader.calls_for("chapters/chapter-2/ch2-section-2.1.md"), 0);
        // Both occurrences still point at the single section
        assert_eq!(doc.output.matches("[Intro](#intro)").count(), 2);
    }

    #[test]
    fn assembly_is_deterministic() {
        let root = "[A](chapters/chapter-1/ch1-section-1.1.md) \
                    [B](chapters/chapter-1/ch1-section-1.2.md)";
        let reader = MemoryReader::new()
            .add("chapters/chapter-1/ch1-section-1.1.md", "a")
            .add("chapters/chapter-1/ch1-section-1.2.md", "b");

        let first = assemble(root, &reader);
        let second = assemble(root, &reader);
        assert_eq!(first.output, second.output);
    }

    #[test]
    fn no_links_leaves_the_body_untouched() {
        let root = "Just text, no fragment links.\n";
        let reader = MemoryReader::new();

        let doc = assemble(root, &reader);

        assert!(doc.is_empty());
        assert_eq!(doc.output, root);
        assert!(!doc.output.contains("---"));
    }

    #[test]
    fn fragment_trailing_newlines_are_normalized() {
        let root = "[A](chapters/chapter-1/ch1-section-1.1.md)";
        let reader =
            MemoryReader::new().add("chapters/chapter-1/ch1-section-1.1.md", "body\n\n");

        let doc = assemble(root, &reader);
        assert!(doc.output.ends_with("## A {#a}\n\nbody\n"));
    }
}
