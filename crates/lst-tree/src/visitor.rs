//! Tree visitors
//!
//! [`TreeVisitor`] has one hook per node kind. Each hook's default
//! implementation calls the matching `walk_*` function, which visits the
//! node's children through the [`Traversal`] and rebuilds the node only if
//! a child changed. A visitor overrides the hooks it cares about and calls
//! the `walk_*` function itself when it still wants the children visited.
//!
//! Returning `Ok(None)` from a hook deletes the node. That is allowed for
//! list children and is an error for required children.
//!
//! The [`Traversal`] owns the cursor and the after-visit queue of one
//! top-level visit. Visitors queued with [`Traversal::do_after_visit`] run
//! in FIFO order against the result, once the top-level visit returns.

use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::error::{BoxError, RecipeRunError, TreeError};
use crate::draft::produce;
use crate::lang::properties::{Comment, Entry, File, Value};
use crate::lang::text::{PlainText, Snippet};
use crate::markers::{Marker, Markers};
use crate::parse_error::ParseError;
use crate::tree::{Tree, TreeKind};
use std::collections::VecDeque;
use std::sync::Arc;

/// Result of visiting one node: the replacement, or `None` to delete it
pub type VisitResult = Result<Option<Tree>, BoxError>;

const STOP_AFTER_PRE_VISIT: &str = "lst.visitor.stopAfterPreVisit";

/// Visitor over [`Tree`]s
///
/// All hooks take nodes by value; cloning is an `Arc` bump. Return the node
/// you were given to leave it unchanged.
pub trait TreeVisitor: Send {
    /// Visit `tree` as a top-level call below `parent`
    ///
    /// Runs the after-visit queue before returning. Override to wrap or
    /// delegate to another visitor.
    ///
    /// # Errors
    /// Returns the first hook failure, with the cursor where it happened
    fn visit(
        &mut self,
        tree: Tree,
        ctx: &ExecutionContext,
        parent: &Cursor,
    ) -> Result<Option<Tree>, RecipeRunError> {
        let mut traversal = Traversal::new(ctx, parent.clone());
        traversal
            .visit(self, tree)
            .map_err(|e| RecipeRunError::from_boxed(parent, e))
    }

    /// Source files this visitor does not accept are returned untouched
    fn is_acceptable(&self, _source_file: &Tree, _ctx: &ExecutionContext) -> bool {
        true
    }

    /// Runs before the kind-specific hook
    fn pre_visit(&mut self, tree: Tree, _t: &mut Traversal<'_>) -> VisitResult {
        Ok(Some(tree))
    }

    /// Runs after the kind-specific hook
    fn post_visit(&mut self, tree: Tree, _t: &mut Traversal<'_>) -> VisitResult {
        Ok(Some(tree))
    }

    fn visit_markers(&mut self, markers: Markers, t: &mut Traversal<'_>) -> Result<Markers, BoxError> {
        walk_markers(self, markers, t)
    }

    fn visit_marker(&mut self, marker: Marker, _t: &mut Traversal<'_>) -> Result<Marker, BoxError> {
        Ok(marker)
    }

    fn visit_plain_text(&mut self, text: Arc<PlainText>, t: &mut Traversal<'_>) -> VisitResult {
        walk_plain_text(self, text, t)
    }

    fn visit_snippet(&mut self, snippet: Arc<Snippet>, t: &mut Traversal<'_>) -> VisitResult {
        walk_snippet(self, snippet, t)
    }

    fn visit_properties_file(&mut self, file: Arc<File>, t: &mut Traversal<'_>) -> VisitResult {
        walk_properties_file(self, file, t)
    }

    fn visit_properties_entry(&mut self, entry: Arc<Entry>, t: &mut Traversal<'_>) -> VisitResult {
        walk_properties_entry(self, entry, t)
    }

    fn visit_properties_value(&mut self, value: Arc<Value>, t: &mut Traversal<'_>) -> VisitResult {
        walk_properties_value(self, value, t)
    }

    fn visit_properties_comment(
        &mut self,
        comment: Arc<Comment>,
        t: &mut Traversal<'_>,
    ) -> VisitResult {
        walk_properties_comment(self, comment, t)
    }

    fn visit_parse_error(&mut self, error: Arc<ParseError>, t: &mut Traversal<'_>) -> VisitResult {
        walk_parse_error(self, error, t)
    }
}

/// State of one top-level visit
pub struct Traversal<'a> {
    ctx: &'a ExecutionContext,
    cursor: Cursor,
    depth: usize,
    after_visit: VecDeque<Box<dyn TreeVisitor>>,
}

impl<'a> Traversal<'a> {
    #[must_use]
    pub fn new(ctx: &'a ExecutionContext, parent: Cursor) -> Self {
        Self {
            ctx,
            cursor: parent,
            depth: 0,
            after_visit: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn ctx(&self) -> &'a ExecutionContext {
        self.ctx
    }

    /// Cursor at the node currently being visited
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Nesting depth of the node being visited; 1 at the top-level node
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Queue `visitor` to run on the top-level result
    pub fn do_after_visit(&mut self, visitor: Box<dyn TreeVisitor>) {
        self.after_visit.push_back(visitor);
    }

    /// Skip the kind hook and `post_visit` for the current node
    pub fn stop_after_pre_visit(&self) {
        self.cursor.put_message(STOP_AFTER_PRE_VISIT, true);
    }

    /// Visit `tree` below the current cursor
    ///
    /// # Errors
    /// Returns the first hook failure, wrapped once with the cursor at
    /// which it was raised
    pub fn visit<V: TreeVisitor + ?Sized>(&mut self, visitor: &mut V, tree: Tree) -> VisitResult {
        let top_level = self.depth == 0;
        let parent = self.cursor.clone();
        self.cursor = parent.push(tree.clone());
        self.depth += 1;

        let result = self
            .visit_frame(visitor, tree)
            .map_err(|e| RecipeRunError::wrap(&self.cursor, e));

        self.depth -= 1;
        self.cursor = parent;

        let visited = result?;
        if top_level {
            self.drain_after_visit(visited)
        } else {
            Ok(visited)
        }
    }

    fn visit_frame<V: TreeVisitor + ?Sized>(&mut self, visitor: &mut V, tree: Tree) -> VisitResult {
        if tree.is_source_file() && !visitor.is_acceptable(&tree, self.ctx) {
            return Ok(Some(tree));
        }
        let Some(tree) = visitor.pre_visit(tree, self)? else {
            return Ok(None);
        };
        if self.cursor.get_message::<bool>(STOP_AFTER_PRE_VISIT).is_some_and(|s| *s) {
            return Ok(Some(tree));
        }
        let Some(tree) = accept(visitor, tree, self)? else {
            return Ok(None);
        };
        visitor.post_visit(tree, self)
    }

    fn drain_after_visit(&mut self, mut visited: Option<Tree>) -> VisitResult {
        while let Some(mut after) = self.after_visit.pop_front() {
            let Some(tree) = visited else {
                self.after_visit.clear();
                return Ok(None);
            };
            visited = after.visit(tree, self.ctx, &self.cursor)?;
        }
        Ok(visited)
    }
}

/// Dispatch to the kind-specific hook
///
/// # Errors
/// Returns whatever the hook returns
pub fn accept<V: TreeVisitor + ?Sized>(visitor: &mut V, tree: Tree, t: &mut Traversal<'_>) -> VisitResult {
    match tree {
        Tree::PlainText(n) => visitor.visit_plain_text(n, t),
        Tree::Snippet(n) => visitor.visit_snippet(n, t),
        Tree::PropertiesFile(n) => visitor.visit_properties_file(n, t),
        Tree::PropertiesEntry(n) => visitor.visit_properties_entry(n, t),
        Tree::PropertiesValue(n) => visitor.visit_properties_value(n, t),
        Tree::PropertiesComment(n) => visitor.visit_properties_comment(n, t),
        Tree::ParseError(n) => visitor.visit_parse_error(n, t),
    }
}

/// Visit each marker; the container is rebuilt only if one changed
///
/// # Errors
/// Returns the first `visit_marker` failure
pub fn walk_markers<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    markers: Markers,
    t: &mut Traversal<'_>,
) -> Result<Markers, BoxError> {
    if markers.is_empty() {
        return Ok(markers);
    }
    let mut changed = false;
    let mut visited = im::Vector::new();
    for marker in markers.iter() {
        let after = visitor.visit_marker(marker.clone(), t)?;
        changed |= after != *marker;
        visited.push_back(after);
    }
    Ok(if changed {
        markers.with_markers(visited)
    } else {
        markers
    })
}

/// Visit every element of a child list
///
/// Returns `None` when every element came back identical. Deleted elements
/// are dropped from the rebuilt list.
fn walk_list<V, N>(
    visitor: &mut V,
    t: &mut Traversal<'_>,
    items: &im::Vector<N>,
    to_tree: impl Fn(&N) -> Tree,
    from_tree: impl Fn(Tree) -> Result<N, TreeError>,
) -> Result<Option<im::Vector<N>>, BoxError>
where
    V: TreeVisitor + ?Sized,
    N: Clone,
{
    let mut changed = false;
    let mut visited = im::Vector::new();
    for item in items {
        let before = to_tree(item);
        match t.visit(visitor, before.clone())? {
            Some(after) => {
                changed |= !after.ptr_eq(&before);
                visited.push_back(from_tree(after)?);
            }
            None => changed = true,
        }
    }
    Ok(changed.then_some(visited))
}

/// Visit a required child; deleting it is an error
fn walk_required<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    t: &mut Traversal<'_>,
    parent: TreeKind,
    child: Tree,
) -> Result<Tree, BoxError> {
    let kind = child.kind();
    t.visit(visitor, child)?
        .ok_or_else(|| TreeError::RequiredChildRemoved { parent, child: kind }.into())
}

pub fn walk_plain_text<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    text: Arc<PlainText>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(text.markers.clone(), t)?;
    let snippets = walk_list(
        visitor,
        t,
        &text.snippets,
        |s| Tree::Snippet(s.clone()),
        Tree::into_snippet,
    )?;
    let text = produce(&text, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
        if let Some(snippets) = snippets {
            d.snippets = snippets;
        }
    });
    Ok(Some(Tree::PlainText(text)))
}

pub fn walk_snippet<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    snippet: Arc<Snippet>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(snippet.markers.clone(), t)?;
    let snippet = produce(&snippet, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
    });
    Ok(Some(Tree::Snippet(snippet)))
}

pub fn walk_properties_file<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    file: Arc<File>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(file.markers.clone(), t)?;
    let content = walk_list(visitor, t, &file.content, Tree::clone, |tree| {
        match tree.kind() {
            TreeKind::PropertiesEntry | TreeKind::PropertiesComment => Ok(tree),
            actual => Err(TreeError::UnexpectedKind {
                expected: TreeKind::PropertiesEntry,
                actual,
            }),
        }
    })?;
    let file = produce(&file, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
        if let Some(content) = content {
            d.content = content;
        }
    });
    Ok(Some(Tree::PropertiesFile(file)))
}

pub fn walk_properties_entry<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    entry: Arc<Entry>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(entry.markers.clone(), t)?;
    let value = walk_required(
        visitor,
        t,
        TreeKind::PropertiesEntry,
        Tree::PropertiesValue(entry.value.clone()),
    )?
    .into_properties_value()?;
    let entry = produce(&entry, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
        if !Arc::ptr_eq(&value, &d.value) {
            d.value = value;
        }
    });
    Ok(Some(Tree::PropertiesEntry(entry)))
}

pub fn walk_properties_value<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    value: Arc<Value>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(value.markers.clone(), t)?;
    let value = produce(&value, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
    });
    Ok(Some(Tree::PropertiesValue(value)))
}

pub fn walk_properties_comment<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    comment: Arc<Comment>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(comment.markers.clone(), t)?;
    let comment = produce(&comment, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
    });
    Ok(Some(Tree::PropertiesComment(comment)))
}

pub fn walk_parse_error<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    error: Arc<ParseError>,
    t: &mut Traversal<'_>,
) -> VisitResult {
    let markers = visitor.visit_markers(error.markers.clone(), t)?;
    let error = produce(&error, |d| {
        if !markers.ptr_eq(&d.markers) {
            d.markers = markers;
        }
    });
    Ok(Some(Tree::ParseError(error)))
}

/// Visits everything and changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisitor;

impl TreeVisitor for NoopVisitor {}
