//! Parsers
//!
//! A [`Parser`] turns text into a [`SourceFile`] and never fails: input it
//! cannot handle comes back as a [`ParseError`] tree that still prints the
//! original text. [`ParserRegistry`] picks a parser by file extension and
//! falls back to plain text.

use crate::lang::properties_parser::PropertiesParser;
use crate::lang::text::PlainTextParser;
use crate::parse_error::ParseError;
use crate::print::{MarkerPrinter, PrintOutput, Printer};
use crate::tree::SourceFile;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Parser trait for converting file text into source files
///
/// Implement this trait to add support for new file formats.
pub trait Parser: Send + Sync {
    /// Name recorded on parse failures
    fn name(&self) -> &'static str;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Parse `text`, read from `source_path` relative to the project root
    fn parse(&self, source_path: &Path, text: &str) -> SourceFile;

    /// Check if this parser can handle the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Parser priority (higher = tried first when multiple parsers match)
    fn priority(&self) -> i32 {
        0
    }
}

/// Replace `source` with a [`ParseError`] unless it prints back to `text`
#[must_use]
pub fn require_print_idempotent(
    parser_type: &str,
    source: SourceFile,
    text: &str,
    printer: &dyn Printer,
) -> SourceFile {
    let mut out = PrintOutput::new(MarkerPrinter::Sanitized);
    let message = match printer.print(source.tree(), &mut out) {
        Ok(()) if out.as_str() == text => return source,
        Ok(()) => {
            let at = out
                .as_str()
                .bytes()
                .zip(text.bytes())
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| out.as_str().len().min(text.len()));
            format!("printed output differs from input at byte {at}")
        }
        Err(e) => e.to_string(),
    };
    let path = source.source_path().to_path_buf();
    tracing::warn!(path = %path.display(), parser = parser_type, %message, "parser is not idempotent");
    ParseError::build(parser_type, &path, text, "IdempotenceError", message)
        .with_erroneous(source.into_tree())
        .into()
}

/// Parser selection by path
pub struct ParserRegistry {
    parsers: Vec<Arc<dyn Parser>>,
    fallback: Arc<dyn Parser>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ParserRegistry {
    fn clone(&self) -> Self {
        Self {
            parsers: self.parsers.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parser_count", &self.parsers.len())
            .field("extensions", &self.all_extensions())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl ParserRegistry {
    /// Create a registry that only knows the plain-text fallback
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
            fallback: Arc::new(PlainTextParser::new()),
        }
    }

    /// Registry with the built-in parsers
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PropertiesParser);
        registry.register(PlainTextParser::new());
        registry
    }

    /// Register a parser
    pub fn register<P: Parser + 'static>(&mut self, parser: P) {
        self.parsers.push(Arc::new(parser));
        self.parsers.sort_by_key(|p| std::cmp::Reverse(p.priority()));
    }

    /// Find parser for path
    #[must_use]
    pub fn find_for_path(&self, path: &Path) -> Option<&dyn Parser> {
        self.parsers.iter().find(|p| p.can_parse(path)).map(|p| &**p)
    }

    /// Parse with the matching parser, or as plain text
    #[must_use]
    pub fn parse(&self, source_path: &Path, text: &str) -> SourceFile {
        let parser = self.find_for_path(source_path).unwrap_or(&*self.fallback);
        let source = parser.parse(source_path, text);
        tracing::debug!(
            path = %source_path.display(),
            parser = parser.name(),
            kind = %source.kind(),
            "parsed source"
        );
        source
    }

    /// Get all registered extensions
    #[must_use]
    pub fn all_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions())
            .copied()
            .collect()
    }
}
