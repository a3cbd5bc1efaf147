//! Trees standing in for files a parser could not handle

use crate::error::PrintError;
use crate::id::TreeId;
use crate::markers::{Marker, MarkerKind, Markers, ParseExceptionResult};
use crate::print::{PrintOutput, Printer};
use crate::tree::{SourceMeta, Tree};
use std::path::Path;

/// A source file that failed to parse
///
/// Holds the original text so the file still prints unchanged. Recipes see
/// it like any other source file; it carries a [`ParseExceptionResult`]
/// marker describing the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub id: TreeId,
    pub source: SourceMeta,
    pub markers: Markers,
    pub text: String,
    /// The partial tree, when the parser got far enough to build one
    pub erroneous: Option<Tree>,
}

impl ParseError {
    /// Record a parser failure for `text`
    #[must_use]
    pub fn build(
        parser_type: &str,
        source_path: &Path,
        text: &str,
        exception_type: &str,
        message: impl Into<String>,
    ) -> Self {
        let exception = ParseExceptionResult::new(parser_type, exception_type, message);
        Self {
            id: TreeId::random(),
            source: SourceMeta::new(source_path).with_checksum_of(text),
            markers: Markers::build(vec![Marker::ParseExceptionResult(exception)]),
            text: text.to_string(),
            erroneous: None,
        }
    }

    #[must_use]
    pub fn with_erroneous(mut self, tree: Tree) -> Self {
        self.erroneous = Some(tree);
        self
    }

    #[must_use]
    pub fn exception(&self) -> Option<&ParseExceptionResult> {
        match self.markers.find(MarkerKind::ParseExceptionResult) {
            Some(Marker::ParseExceptionResult(e)) => Some(e),
            _ => None,
        }
    }
}

/// Prints the preserved text
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseErrorPrinter;

impl Printer for ParseErrorPrinter {
    fn print(&self, tree: &Tree, out: &mut PrintOutput) -> Result<(), PrintError> {
        let error = tree.as_parse_error().ok_or(PrintError::UnsupportedKind {
            printer: "ParseErrorPrinter",
            kind: tree.kind(),
        })?;
        out.before_syntax(&error.markers);
        out.append(&error.text);
        out.after_syntax(&error.markers);
        Ok(())
    }
}
