//! The tree model
//!
//! [`Tree`] is a closed enum with one variant per node kind. Every variant
//! holds its node behind an `Arc`, so cloning a tree never copies structure
//! and [`Tree::ptr_eq`] answers "is this the same object" in O(1). Change
//! detection throughout the engine relies on that identity, never on deep
//! equality.

use crate::checksum::Checksum;
use crate::error::TreeError;
use crate::id::TreeId;
use crate::lang::properties;
use crate::lang::text::{PlainText, Snippet};
use crate::markers::Markers;
use crate::parse_error::ParseError;
use crate::draft::produce;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Discriminant of [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TreeKind {
    PlainText,
    Snippet,
    PropertiesFile,
    PropertiesEntry,
    PropertiesValue,
    PropertiesComment,
    ParseError,
}

impl TreeKind {
    /// Every kind, in declaration order
    pub const ALL: [TreeKind; 7] = [
        Self::PlainText,
        Self::Snippet,
        Self::PropertiesFile,
        Self::PropertiesEntry,
        Self::PropertiesValue,
        Self::PropertiesComment,
        Self::ParseError,
    ];

    /// Stable kind string used on the wire and in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlainText => "text.PlainText",
            Self::Snippet => "text.Snippet",
            Self::PropertiesFile => "properties.File",
            Self::PropertiesEntry => "properties.Entry",
            Self::PropertiesValue => "properties.Value",
            Self::PropertiesComment => "properties.Comment",
            Self::ParseError => "ParseError",
        }
    }

    /// Whether nodes of this kind are whole source files
    #[must_use]
    pub const fn is_source_file(self) -> bool {
        matches!(self, Self::PlainText | Self::PropertiesFile | Self::ParseError)
    }
}

impl Display for TreeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TreeError::UnknownKind(s.to_string()))
    }
}

/// File attributes captured at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileAttributes {
    pub readable: bool,
    pub writable: bool,
    pub executable: bool,
}

/// Metadata every source file carries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Path relative to the project root
    pub source_path: PathBuf,
    #[serde(default)]
    pub charset: Option<String>,
    #[serde(default)]
    pub charset_bom_marked: bool,
    #[serde(default)]
    pub checksum: Option<Checksum>,
    #[serde(default)]
    pub file_attributes: Option<FileAttributes>,
}

impl SourceMeta {
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            charset: Some("UTF-8".to_string()),
            ..Self::default()
        }
    }

    /// Record the checksum of the text this file was parsed from
    #[must_use]
    pub fn with_checksum_of(mut self, text: &str) -> Self {
        self.checksum = Some(Checksum::of_text(text));
        self
    }
}

/// An immutable node of any supported kind
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    PlainText(Arc<PlainText>),
    Snippet(Arc<Snippet>),
    PropertiesFile(Arc<properties::File>),
    PropertiesEntry(Arc<properties::Entry>),
    PropertiesValue(Arc<properties::Value>),
    PropertiesComment(Arc<properties::Comment>),
    ParseError(Arc<ParseError>),
}

/// Applies `$body` to the node inside any variant, binding it as `$n`.
macro_rules! with_node {
    ($tree:expr, $n:ident => $body:expr) => {
        match $tree {
            Tree::PlainText($n) => $body,
            Tree::Snippet($n) => $body,
            Tree::PropertiesFile($n) => $body,
            Tree::PropertiesEntry($n) => $body,
            Tree::PropertiesValue($n) => $body,
            Tree::PropertiesComment($n) => $body,
            Tree::ParseError($n) => $body,
        }
    };
}

/// Same as [`with_node`], rebuilding the same variant from the body's result.
macro_rules! map_node {
    ($tree:expr, $n:ident => $body:expr) => {
        match $tree {
            Tree::PlainText($n) => Tree::PlainText($body),
            Tree::Snippet($n) => Tree::Snippet($body),
            Tree::PropertiesFile($n) => Tree::PropertiesFile($body),
            Tree::PropertiesEntry($n) => Tree::PropertiesEntry($body),
            Tree::PropertiesValue($n) => Tree::PropertiesValue($body),
            Tree::PropertiesComment($n) => Tree::PropertiesComment($body),
            Tree::ParseError($n) => Tree::ParseError($body),
        }
    };
}

macro_rules! variant_accessors {
    ($($variant:ident => $node:ty, $as_fn:ident, $into_fn:ident;)*) => {
        impl Tree {
            $(
                #[doc = concat!("Borrow the node if this is a `", stringify!($variant), "`")]
                #[must_use]
                pub fn $as_fn(&self) -> Option<&Arc<$node>> {
                    match self {
                        Tree::$variant(n) => Some(n),
                        _ => None,
                    }
                }

                #[doc = concat!("Take the node, failing unless this is a `", stringify!($variant), "`")]
                pub fn $into_fn(self) -> Result<Arc<$node>, TreeError> {
                    match self {
                        Tree::$variant(n) => Ok(n),
                        other => Err(TreeError::UnexpectedKind {
                            expected: TreeKind::$variant,
                            actual: other.kind(),
                        }),
                    }
                }
            )*
        }

        $(
            impl From<Arc<$node>> for Tree {
                fn from(node: Arc<$node>) -> Self {
                    Tree::$variant(node)
                }
            }

            impl From<$node> for Tree {
                fn from(node: $node) -> Self {
                    Tree::$variant(Arc::new(node))
                }
            }
        )*
    };
}

variant_accessors! {
    PlainText => PlainText, as_plain_text, into_plain_text;
    Snippet => Snippet, as_snippet, into_snippet;
    PropertiesFile => properties::File, as_properties_file, into_properties_file;
    PropertiesEntry => properties::Entry, as_properties_entry, into_properties_entry;
    PropertiesValue => properties::Value, as_properties_value, into_properties_value;
    PropertiesComment => properties::Comment, as_properties_comment, into_properties_comment;
    ParseError => ParseError, as_parse_error, into_parse_error;
}

impl Tree {
    #[must_use]
    pub fn kind(&self) -> TreeKind {
        match self {
            Self::PlainText(_) => TreeKind::PlainText,
            Self::Snippet(_) => TreeKind::Snippet,
            Self::PropertiesFile(_) => TreeKind::PropertiesFile,
            Self::PropertiesEntry(_) => TreeKind::PropertiesEntry,
            Self::PropertiesValue(_) => TreeKind::PropertiesValue,
            Self::PropertiesComment(_) => TreeKind::PropertiesComment,
            Self::ParseError(_) => TreeKind::ParseError,
        }
    }

    #[must_use]
    pub fn id(&self) -> TreeId {
        with_node!(self, n => n.id)
    }

    #[must_use]
    pub fn markers(&self) -> &Markers {
        with_node!(self, n => &n.markers)
    }

    /// Replace the markers; returns `self` unchanged when `markers` is the
    /// same container
    #[must_use]
    pub fn with_markers(&self, markers: Markers) -> Tree {
        if self.markers().ptr_eq(&markers) {
            return self.clone();
        }
        map_node!(self, n => produce(n, |d| d.markers = markers))
    }

    /// Reference identity
    #[must_use]
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        match (self, other) {
            (Self::PlainText(a), Self::PlainText(b)) => Arc::ptr_eq(a, b),
            (Self::Snippet(a), Self::Snippet(b)) => Arc::ptr_eq(a, b),
            (Self::PropertiesFile(a), Self::PropertiesFile(b)) => Arc::ptr_eq(a, b),
            (Self::PropertiesEntry(a), Self::PropertiesEntry(b)) => Arc::ptr_eq(a, b),
            (Self::PropertiesValue(a), Self::PropertiesValue(b)) => Arc::ptr_eq(a, b),
            (Self::PropertiesComment(a), Self::PropertiesComment(b)) => Arc::ptr_eq(a, b),
            (Self::ParseError(a), Self::ParseError(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_source_file(&self) -> bool {
        self.kind().is_source_file()
    }

    /// Source metadata, for source-file kinds
    #[must_use]
    pub fn source_meta(&self) -> Option<&SourceMeta> {
        match self {
            Self::PlainText(n) => Some(&n.source),
            Self::PropertiesFile(n) => Some(&n.source),
            Self::ParseError(n) => Some(&n.source),
            Self::Snippet(_)
            | Self::PropertiesEntry(_)
            | Self::PropertiesValue(_)
            | Self::PropertiesComment(_) => None,
        }
    }
}

/// A tree guaranteed to be a whole source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile(Tree);

impl TryFrom<Tree> for SourceFile {
    type Error = TreeError;

    fn try_from(tree: Tree) -> Result<Self, Self::Error> {
        if tree.is_source_file() {
            Ok(Self(tree))
        } else {
            Err(TreeError::NotASourceFile(tree.kind()))
        }
    }
}

impl From<SourceFile> for Tree {
    fn from(source: SourceFile) -> Self {
        source.0
    }
}

impl From<PlainText> for SourceFile {
    fn from(node: PlainText) -> Self {
        Self(Tree::from(node))
    }
}

impl From<properties::File> for SourceFile {
    fn from(node: properties::File) -> Self {
        Self(Tree::from(node))
    }
}

impl From<ParseError> for SourceFile {
    fn from(node: ParseError) -> Self {
        Self(Tree::from(node))
    }
}

impl SourceFile {
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.0
    }

    #[must_use]
    pub fn into_tree(self) -> Tree {
        self.0
    }

    #[must_use]
    pub fn id(&self) -> TreeId {
        self.0.id()
    }

    #[must_use]
    pub fn kind(&self) -> TreeKind {
        self.0.kind()
    }

    #[must_use]
    pub fn markers(&self) -> &Markers {
        self.0.markers()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &SourceFile) -> bool {
        self.0.ptr_eq(&other.0)
    }

    #[must_use]
    pub fn source_meta(&self) -> &SourceMeta {
        match &self.0 {
            Tree::PlainText(n) => &n.source,
            Tree::PropertiesFile(n) => &n.source,
            Tree::ParseError(n) => &n.source,
            other => unreachable!("SourceFile holds a {}", other.kind()),
        }
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_meta().source_path
    }

    #[must_use]
    pub fn with_markers(&self, markers: Markers) -> SourceFile {
        Self(self.0.with_markers(markers))
    }

    /// Move the file to another relative path
    #[must_use]
    pub fn with_source_path(&self, path: impl Into<PathBuf>) -> SourceFile {
        let path = path.into();
        if self.source_path() == path {
            return self.clone();
        }
        let tree = match &self.0 {
            Tree::PlainText(n) => Tree::PlainText(produce(n, |d| d.source.source_path = path)),
            Tree::PropertiesFile(n) => {
                Tree::PropertiesFile(produce(n, |d| d.source.source_path = path))
            }
            Tree::ParseError(n) => Tree::ParseError(produce(n, |d| d.source.source_path = path)),
            other => other.clone(),
        };
        Self(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{Marker, Markup};

    #[test]
    fn kind_strings_round_trip() {
        for kind in TreeKind::ALL {
            assert_eq!(kind.as_str().parse::<TreeKind>().unwrap(), kind);
        }
        assert!("java.ClassDeclaration".parse::<TreeKind>().is_err());
    }

    #[test]
    fn clone_is_reference_identical() {
        let tree = Tree::from(PlainText::new("a.txt", "hello"));
        let clone = tree.clone();
        assert!(tree.ptr_eq(&clone));
    }

    #[test]
    fn equal_content_is_not_identity() {
        let a = Tree::from(Snippet::new("x"));
        let b = Tree::from(Snippet { id: a.id(), ..Snippet::new("x") });
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn with_same_markers_returns_self() {
        let tree = Tree::from(PlainText::new("a.txt", "hello"));
        assert!(tree.with_markers(tree.markers().clone()).ptr_eq(&tree));

        let marked = tree.with_markers(tree.markers().add(Marker::Markup(Markup::warn("w", None))));
        assert!(!marked.ptr_eq(&tree));
        assert_eq!(marked.id(), tree.id());
    }

    #[test]
    fn source_file_rejects_inner_nodes() {
        let snippet = Tree::from(Snippet::new("x"));
        assert!(matches!(
            SourceFile::try_from(snippet),
            Err(TreeError::NotASourceFile(TreeKind::Snippet))
        ));
    }

    #[test]
    fn with_source_path_moves_file() {
        let source = SourceFile::from(PlainText::new("a.txt", "hello"));
        let moved = source.with_source_path("b.txt");
        assert_eq!(moved.source_path(), Path::new("b.txt"));
        assert_eq!(moved.id(), source.id());
        assert!(source.with_source_path("a.txt").ptr_eq(&source));
    }

    #[test]
    fn into_wrong_kind_fails() {
        let tree = Tree::from(PlainText::new("a.txt", "hello"));
        assert!(matches!(
            tree.into_snippet(),
            Err(TreeError::UnexpectedKind {
                expected: TreeKind::Snippet,
                actual: TreeKind::PlainText
            })
        ));
    }
}
