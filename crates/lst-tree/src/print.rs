//! Printing trees back to source text
//!
//! Each language contributes a [`Printer`]; [`PrinterRegistry`] maps every
//! [`TreeKind`] to the printer that handles it. How markers show up in the
//! output is decided by the [`MarkerPrinter`] mode of the [`PrintOutput`].

use crate::error::PrintError;
use crate::lang::properties::PropertiesPrinter;
use crate::lang::text::TextPrinter;
use crate::markers::{Marker, Markers};
use crate::parse_error::ParseErrorPrinter;
use crate::tree::{SourceFile, Tree, TreeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How search results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPrinter {
    /// `~~>` before a hit, `~~(description)~~>` when it has one
    #[default]
    Default,
    /// `{{id}}` on both sides of a hit
    Fenced,
    /// Markers are not printed at all
    Sanitized,
}

/// Print buffer
#[derive(Debug, Clone)]
pub struct PrintOutput {
    out: String,
    marker_printer: MarkerPrinter,
}

impl PrintOutput {
    #[must_use]
    pub fn new(marker_printer: MarkerPrinter) -> Self {
        Self {
            out: String::new(),
            marker_printer,
        }
    }

    #[inline]
    pub fn append(&mut self, text: &str) {
        self.out.push_str(text);
    }

    #[inline]
    pub fn push(&mut self, c: char) {
        self.out.push(c);
    }

    /// Render markers that precede a node's syntax
    pub fn before_syntax(&mut self, markers: &Markers) {
        for marker in markers.iter() {
            let Marker::SearchResult(hit) = marker else {
                continue;
            };
            match (self.marker_printer, &hit.description) {
                (MarkerPrinter::Default, None) => self.out.push_str("~~>"),
                (MarkerPrinter::Default, Some(description)) => {
                    self.out.push_str("~~(");
                    self.out.push_str(description);
                    self.out.push_str(")~~>");
                }
                (MarkerPrinter::Fenced, _) => self.fence(marker),
                (MarkerPrinter::Sanitized, _) => {}
            }
        }
    }

    /// Render markers that follow a node's syntax
    pub fn after_syntax(&mut self, markers: &Markers) {
        if self.marker_printer != MarkerPrinter::Fenced {
            return;
        }
        for marker in markers.iter().filter(|m| matches!(m, Marker::SearchResult(_))) {
            self.fence(marker);
        }
    }

    fn fence(&mut self, marker: &Marker) {
        self.out.push_str("{{");
        self.out.push_str(&marker.id().to_string());
        self.out.push_str("}}");
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }
}

/// Turns trees of the kinds it supports back into text
pub trait Printer: Send + Sync {
    /// Append the text of `tree` to `out`
    ///
    /// # Errors
    /// Returns error when `tree` is a kind this printer does not support
    fn print(&self, tree: &Tree, out: &mut PrintOutput) -> Result<(), PrintError>;
}

/// Printer lookup by tree kind
#[derive(Clone, Default)]
pub struct PrinterRegistry {
    printers: HashMap<TreeKind, Arc<dyn Printer>>,
}

impl fmt::Debug for PrinterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.printers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("PrinterRegistry").field("kinds", &kinds).finish()
    }
}

impl PrinterRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with printers for every built-in kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let text: Arc<dyn Printer> = Arc::new(TextPrinter);
        let properties: Arc<dyn Printer> = Arc::new(PropertiesPrinter);
        registry.register(TreeKind::PlainText, text.clone());
        registry.register(TreeKind::Snippet, text);
        for kind in [
            TreeKind::PropertiesFile,
            TreeKind::PropertiesEntry,
            TreeKind::PropertiesValue,
            TreeKind::PropertiesComment,
        ] {
            registry.register(kind, properties.clone());
        }
        registry.register(TreeKind::ParseError, Arc::new(ParseErrorPrinter));
        registry
    }

    /// Register or replace the printer for `kind`
    pub fn register(&mut self, kind: TreeKind, printer: Arc<dyn Printer>) {
        self.printers.insert(kind, printer);
    }

    /// Printer for `kind`
    ///
    /// # Errors
    /// Returns [`PrintError::NoPrinter`] when nothing is registered
    pub fn printer_for(&self, kind: TreeKind) -> Result<&dyn Printer, PrintError> {
        self.printers
            .get(&kind)
            .map(|p| &**p)
            .ok_or(PrintError::NoPrinter(kind))
    }

    /// Print any tree
    ///
    /// # Errors
    /// Returns error when no printer handles the tree's kind
    pub fn print(&self, tree: &Tree, marker_printer: MarkerPrinter) -> Result<String, PrintError> {
        let mut out = PrintOutput::new(marker_printer);
        self.printer_for(tree.kind())?.print(tree, &mut out)?;
        Ok(out.into_string())
    }

    /// Print a source file with markers hidden
    ///
    /// # Errors
    /// Returns error when no printer handles the file's kind
    pub fn print_source(&self, source: &SourceFile) -> Result<String, PrintError> {
        self.print(source.tree(), MarkerPrinter::Sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::text::{PlainText, Snippet};

    fn marked_snippet(description: Option<&str>) -> Tree {
        let mut snippet = Snippet::new("x");
        snippet.markers = snippet.markers.search_result(description.map(String::from));
        Tree::from(snippet)
    }

    #[test]
    fn default_marker_printer() {
        let registry = PrinterRegistry::with_defaults();
        let plain = registry.print(&marked_snippet(None), MarkerPrinter::Default).unwrap();
        let described = registry
            .print(&marked_snippet(Some("why")), MarkerPrinter::Default)
            .unwrap();
        assert_eq!(plain, "~~>x");
        assert_eq!(described, "~~(why)~~>x");
    }

    #[test]
    fn sanitized_hides_markers() {
        let registry = PrinterRegistry::with_defaults();
        let printed = registry.print(&marked_snippet(Some("why")), MarkerPrinter::Sanitized).unwrap();
        assert_eq!(printed, "x");
    }

    #[test]
    fn fenced_wraps_both_sides() {
        let registry = PrinterRegistry::with_defaults();
        let tree = marked_snippet(None);
        let id = tree.markers().iter().next().unwrap().id();
        let printed = registry.print(&tree, MarkerPrinter::Fenced).unwrap();
        assert_eq!(printed, format!("{{{{{id}}}}}x{{{{{id}}}}}"));
    }

    #[test]
    fn every_kind_has_a_default_printer() {
        let registry = PrinterRegistry::with_defaults();
        for kind in TreeKind::ALL {
            assert!(registry.printer_for(kind).is_ok(), "{kind}");
        }
    }

    #[test]
    fn missing_printer_is_an_error() {
        let registry = PrinterRegistry::new();
        let tree = Tree::from(PlainText::new("a.txt", "x"));
        assert!(matches!(
            registry.print(&tree, MarkerPrinter::Default),
            Err(PrintError::NoPrinter(TreeKind::PlainText))
        ));
    }
}
