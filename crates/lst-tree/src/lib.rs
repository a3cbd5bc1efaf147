//! LST tree model
//!
//! Lossless semantic trees: immutable, Arc-shared nodes that print back to
//! exactly the source they were parsed from.
//!
//! # Core Concepts
//!
//! - [`Tree`]: closed enum over every node kind, compared by identity
//! - [`Markers`]: side-channel annotations that never change printed source
//! - [`Cursor`]: the path from the root to the node being visited
//! - [`TreeVisitor`]: per-kind hooks with copy-on-write rebuilds
//! - [`Parser`] / [`Printer`]: text to tree and back, with registries
//!
//! # Example
//!
//! ```rust,ignore
//! use lst_tree::{Cursor, ExecutionContext, NoopVisitor, ParserRegistry, TreeVisitor};
//!
//! let source = ParserRegistry::with_defaults().parse(path, &text);
//! let ctx = ExecutionContext::new();
//! let after = NoopVisitor.visit(source.clone().into(), &ctx, &Cursor::root())?;
//! assert!(after.unwrap().ptr_eq(source.tree()));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod checksum;
mod context;
mod cursor;
mod draft;
mod error;
mod id;
pub mod lang;
mod markers;
mod messages;
mod parse;
mod parse_error;
mod print;
mod tree;
mod visitor;

pub use checksum::{Checksum, ChecksumError};
pub use context::ExecutionContext;
pub use cursor::{Cursor, CursorValue};
pub use draft::{produce, try_produce, Draft};
pub use error::{BoxError, PrintError, RecipeRunError, TreeError};
pub use id::TreeId;
pub use markers::{
    Marker, MarkerKind, Markers, Markup, MarkupLevel, NamedStyles, ParseExceptionResult,
    SearchResult, Style,
};
pub use messages::{Message, MessageMap};
pub use parse::{require_print_idempotent, Parser, ParserRegistry};
pub use parse_error::{ParseError, ParseErrorPrinter};
pub use print::{MarkerPrinter, PrintOutput, Printer, PrinterRegistry};
pub use tree::{FileAttributes, SourceFile, SourceMeta, Tree, TreeKind};
pub use visitor::{
    accept, walk_markers, walk_parse_error, walk_plain_text, walk_properties_comment,
    walk_properties_entry, walk_properties_file, walk_properties_value, walk_snippet,
    NoopVisitor, Traversal, TreeVisitor, VisitResult,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
