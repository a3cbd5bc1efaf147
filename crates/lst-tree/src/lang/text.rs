//! Plain text
//!
//! The fallback language: a file is one [`PlainText`] node holding its full
//! text. Search recipes may split the text into [`Snippet`]s so individual
//! spans can carry markers; when snippets are present they replace `text`
//! for printing.

use crate::error::PrintError;
use crate::id::TreeId;
use crate::markers::Markers;
use crate::parse::Parser;
use crate::print::{PrintOutput, Printer};
use crate::tree::{SourceFile, SourceMeta, Tree};
use std::path::Path;
use std::sync::Arc;

/// A whole file of unstructured text
#[derive(Debug, Clone, PartialEq)]
pub struct PlainText {
    pub id: TreeId,
    pub source: SourceMeta,
    pub markers: Markers,
    pub text: String,
    pub snippets: im::Vector<Arc<Snippet>>,
}

impl PlainText {
    #[must_use]
    pub fn new(source_path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: TreeId::random(),
            source: SourceMeta::new(source_path.as_ref()).with_checksum_of(&text),
            markers: Markers::empty(),
            text,
            snippets: im::Vector::new(),
        }
    }

    /// The text this node prints as, ignoring markers
    #[must_use]
    pub fn printed_text(&self) -> String {
        if self.snippets.is_empty() {
            self.text.clone()
        } else {
            self.snippets.iter().map(|s| s.text.as_str()).collect()
        }
    }
}

/// A span of a [`PlainText`]
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub id: TreeId,
    pub markers: Markers,
    pub text: String,
}

impl Snippet {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            markers: Markers::empty(),
            text: text.into(),
        }
    }
}

/// Prints [`PlainText`] and [`Snippet`] nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPrinter;

impl Printer for TextPrinter {
    fn print(&self, tree: &Tree, out: &mut PrintOutput) -> Result<(), PrintError> {
        match tree {
            Tree::PlainText(text) => {
                out.before_syntax(&text.markers);
                if text.snippets.is_empty() {
                    out.append(&text.text);
                } else {
                    for snippet in &text.snippets {
                        out.before_syntax(&snippet.markers);
                        out.append(&snippet.text);
                        out.after_syntax(&snippet.markers);
                    }
                }
                out.after_syntax(&text.markers);
                Ok(())
            }
            Tree::Snippet(snippet) => {
                out.before_syntax(&snippet.markers);
                out.append(&snippet.text);
                out.after_syntax(&snippet.markers);
                Ok(())
            }
            other => Err(PrintError::UnsupportedKind {
                printer: "TextPrinter",
                kind: other.kind(),
            }),
        }
    }
}

/// Parses any file as a single [`PlainText`]; never fails
#[derive(Debug, Clone)]
pub struct PlainTextParser {
    extensions: Vec<&'static str>,
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PlainTextParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extensions: vec!["txt"],
        }
    }

    /// Claim additional extensions
    #[must_use]
    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = &'static str>) -> Self {
        self.extensions.extend(extensions);
        self
    }
}

impl Parser for PlainTextParser {
    fn name(&self) -> &'static str {
        "PlainTextParser"
    }

    fn extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn parse(&self, source_path: &Path, text: &str) -> SourceFile {
        SourceFile::from(PlainText::new(source_path, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::MarkerPrinter;

    fn print(tree: &Tree) -> String {
        let mut out = PrintOutput::new(MarkerPrinter::Default);
        TextPrinter.print(tree, &mut out).unwrap();
        out.into_string()
    }

    #[test]
    fn prints_text_verbatim() {
        let tree = Tree::from(PlainText::new("a.txt", "hello\nworld\n"));
        assert_eq!(print(&tree), "hello\nworld\n");
    }

    #[test]
    fn snippets_replace_text() {
        let mut text = PlainText::new("a.txt", "ignored");
        text.snippets = im::vector![Arc::new(Snippet::new("he")), Arc::new(Snippet::new("llo"))];
        assert_eq!(text.printed_text(), "hello");
        assert_eq!(print(&Tree::from(text)), "hello");
    }

    #[test]
    fn search_result_prints_before_snippet() {
        let mut hit = Snippet::new("llo");
        hit.markers = hit.markers.search_result(None);
        let mut text = PlainText::new("a.txt", "hello");
        text.snippets = im::vector![Arc::new(Snippet::new("he")), Arc::new(hit)];
        assert_eq!(print(&Tree::from(text)), "he~~>llo");
    }

    #[test]
    fn parser_claims_txt_only_by_default() {
        let parser = PlainTextParser::new();
        assert!(parser.can_parse(Path::new("notes.TXT")));
        assert!(!parser.can_parse(Path::new("app.properties")));
        assert!(parser.clone().with_extensions(["md"]).can_parse(Path::new("README.md")));
    }

    #[test]
    fn parse_records_checksum() {
        let source = PlainTextParser::new().parse(Path::new("a.txt"), "abc");
        let meta = source.source_meta();
        assert!(meta.checksum.unwrap().matches("abc"));
        assert_eq!(meta.source_path, Path::new("a.txt"));
    }
}
