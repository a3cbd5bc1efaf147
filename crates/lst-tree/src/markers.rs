//! Side-channel markers
//!
//! Markers annotate tree nodes without changing what the tree prints as
//! source. [`Markers`] is an immutable, Arc-backed container: adding or
//! removing a marker builds a new container, and the shared
//! [`Markers::empty`] instance is reused by every node that has none.

use crate::id::TreeId;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// A single side-channel annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Marker {
    /// Highlights a node found by a search recipe
    SearchResult(SearchResult),
    /// Records why a parser could not produce a tree
    ParseExceptionResult(ParseExceptionResult),
    /// A named bundle of styles detected on or applied to a source file
    NamedStyles(NamedStyles),
    /// A diagnostic left by a recipe that could not finish a change
    Markup(Markup),
}

impl Marker {
    /// Marker id
    #[must_use]
    pub fn id(&self) -> TreeId {
        match self {
            Self::SearchResult(m) => m.id,
            Self::ParseExceptionResult(m) => m.id,
            Self::NamedStyles(m) => m.id,
            Self::Markup(m) => m.id,
        }
    }

    /// Marker kind tag
    #[must_use]
    pub fn kind(&self) -> MarkerKind {
        match self {
            Self::SearchResult(_) => MarkerKind::SearchResult,
            Self::ParseExceptionResult(_) => MarkerKind::ParseExceptionResult,
            Self::NamedStyles(_) => MarkerKind::NamedStyles,
            Self::Markup(_) => MarkerKind::Markup,
        }
    }
}

/// Discriminant of [`Marker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    SearchResult,
    ParseExceptionResult,
    NamedStyles,
    Markup,
}

impl MarkerKind {
    /// Stable wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchResult => "marker.SearchResult",
            Self::ParseExceptionResult => "marker.ParseExceptionResult",
            Self::NamedStyles => "marker.NamedStyles",
            Self::Markup => "marker.Markup",
        }
    }
}

impl Display for MarkerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search hit, optionally with a description shown next to the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: TreeId,
    pub description: Option<String>,
}

impl SearchResult {
    #[must_use]
    pub fn new(description: Option<String>) -> Self {
        Self {
            id: TreeId::random(),
            description,
        }
    }
}

/// Parser failure details attached to a [`ParseError`](crate::ParseError)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseExceptionResult {
    pub id: TreeId,
    /// Parser that failed
    pub parser_type: String,
    /// Category of the failure, e.g. `SyntaxError` or `IdempotenceError`
    pub exception_type: String,
    pub message: String,
    /// Tree kind being parsed when a nested parse failed
    pub tree_type: Option<String>,
}

impl ParseExceptionResult {
    #[must_use]
    pub fn new(
        parser_type: impl Into<String>,
        exception_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: TreeId::random(),
            parser_type: parser_type.into(),
            exception_type: exception_type.into(),
            message: message.into(),
            tree_type: None,
        }
    }

    #[must_use]
    pub fn with_tree_type(mut self, tree_type: impl Into<String>) -> Self {
        self.tree_type = Some(tree_type.into());
        self
    }
}

/// A named bundle of styles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStyles {
    pub id: TreeId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub styles: Vec<Style>,
}

impl NamedStyles {
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, styles: Vec<Style>) -> Self {
        Self {
            id: TreeId::random(),
            name: name.into(),
            display_name: display_name.into(),
            description: None,
            tags: Vec::new(),
            styles,
        }
    }

    /// Look up a style by name; later styles in the bundle win
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().rev().find(|s| s.name == name)
    }
}

/// One style: a name and its settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    #[serde(default)]
    pub settings: IndexMap<String, serde_json::Value>,
}

/// Severity of a [`Markup`] diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkupLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Diagnostic attached by a recipe to a node it could not fully transform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub id: TreeId,
    pub level: MarkupLevel,
    pub message: String,
    pub detail: Option<String>,
}

impl Markup {
    #[must_use]
    pub fn new(level: MarkupLevel, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            id: TreeId::random(),
            level,
            message: message.into(),
            detail,
        }
    }

    #[must_use]
    pub fn warn(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::new(MarkupLevel::Warning, message, detail)
    }

    #[must_use]
    pub fn error(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::new(MarkupLevel::Error, message, detail)
    }
}

static EMPTY: Lazy<Markers> = Lazy::new(|| Markers::new(TreeId::random(), Vec::new()));

/// Ordered, immutable marker container
///
/// Cloning is an Arc bump; two `Markers` values are the same object when
/// [`Markers::ptr_eq`] holds.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "MarkersRepr", into = "MarkersRepr")]
pub struct Markers(Arc<MarkersInner>);

#[derive(PartialEq)]
struct MarkersInner {
    id: TreeId,
    markers: im::Vector<Marker>,
}

#[derive(Clone, Serialize, Deserialize)]
struct MarkersRepr {
    id: TreeId,
    markers: Vec<Marker>,
}

impl From<MarkersRepr> for Markers {
    fn from(repr: MarkersRepr) -> Self {
        Self::new(repr.id, repr.markers)
    }
}

impl From<Markers> for MarkersRepr {
    fn from(markers: Markers) -> Self {
        Self {
            id: markers.id(),
            markers: markers.iter().cloned().collect(),
        }
    }
}

impl Markers {
    /// The shared empty container
    #[must_use]
    pub fn empty() -> Self {
        EMPTY.clone()
    }

    /// Build a container with an explicit id
    #[must_use]
    pub fn new(id: TreeId, markers: Vec<Marker>) -> Self {
        Self(Arc::new(MarkersInner {
            id,
            markers: markers.into_iter().collect(),
        }))
    }

    /// Build a container with a fresh id
    #[must_use]
    pub fn build(markers: Vec<Marker>) -> Self {
        Self::new(TreeId::random(), markers)
    }

    #[must_use]
    pub fn id(&self) -> TreeId {
        self.0.id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.0.markers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.markers.is_empty()
    }

    /// Same object, not merely equal contents
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared container, used as an identity key
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// First marker of the given kind
    #[must_use]
    pub fn find(&self, kind: MarkerKind) -> Option<&Marker> {
        self.iter().find(|m| m.kind() == kind)
    }

    /// All markers of the given kind, in order
    pub fn find_all(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.iter().filter(move |m| m.kind() == kind)
    }

    /// Replace the marker list, keeping this container's id
    #[must_use]
    pub fn with_markers(&self, markers: im::Vector<Marker>) -> Self {
        if markers == self.0.markers {
            return self.clone();
        }
        Self(Arc::new(MarkersInner {
            id: self.0.id,
            markers,
        }))
    }

    /// Append a marker
    #[must_use]
    pub fn add(&self, marker: Marker) -> Self {
        let mut markers = self.0.markers.clone();
        markers.push_back(marker);
        self.with_markers(markers)
    }

    /// Drop every marker of the given kind
    #[must_use]
    pub fn remove_by_kind(&self, kind: MarkerKind) -> Self {
        if self.find(kind).is_none() {
            return self.clone();
        }
        let markers = self.iter().filter(|m| m.kind() != kind).cloned().collect();
        self.with_markers(markers)
    }

    /// Replace the first marker of the same kind, or append
    #[must_use]
    pub fn set_by_kind(&self, marker: Marker) -> Self {
        let kind = marker.kind();
        match self.0.markers.iter().position(|m| m.kind() == kind) {
            Some(index) => {
                let mut markers = self.0.markers.clone();
                markers.set(index, marker);
                self.with_markers(markers)
            }
            None => self.add(marker),
        }
    }

    /// Mark as a search hit; an existing hit with the same description is kept
    #[must_use]
    pub fn search_result(&self, description: Option<String>) -> Self {
        let already = self.find_all(MarkerKind::SearchResult).any(|m| {
            matches!(m, Marker::SearchResult(s) if s.description == description)
        });
        if already {
            return self.clone();
        }
        self.add(Marker::SearchResult(SearchResult::new(description)))
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Markers {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Debug for Markers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markers")
            .field("id", &self.0.id)
            .field("markers", &self.0.markers)
            .finish()
    }
}
