//! Cursor: the path from the root to the node being visited
//!
//! A [`Cursor`] is a persistent linked list of frames. Pushing a frame
//! allocates one node pointing at its parent, so a visitor can keep a
//! cursor after the traversal has moved on. Each frame carries its own
//! message map for passing data between hooks at different depths.

use crate::messages::{Message, MessageMap};
use crate::tree::Tree;
use std::any::Any;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// What a frame holds
#[derive(Debug, Clone)]
pub enum CursorValue {
    /// Sentinel at the top of every path
    Root,
    /// A tree node being visited
    Tree(Tree),
    /// A synthetic frame wrapping a node already on the path
    Padding(Tree),
}

struct Frame {
    parent: Option<Cursor>,
    value: CursorValue,
    messages: MessageMap,
}

/// Immutable path of frames with per-frame messages
#[derive(Clone)]
pub struct Cursor(Arc<Frame>);

impl Cursor {
    /// A fresh root frame
    #[must_use]
    pub fn root() -> Self {
        Self(Arc::new(Frame {
            parent: None,
            value: CursorValue::Root,
            messages: MessageMap::new(),
        }))
    }

    /// Push `tree` below this frame
    #[must_use]
    pub fn push(&self, tree: Tree) -> Self {
        self.push_value(CursorValue::Tree(tree))
    }

    /// Push a padding frame wrapping `tree`
    #[must_use]
    pub fn push_padding(&self, tree: Tree) -> Self {
        self.push_value(CursorValue::Padding(tree))
    }

    fn push_value(&self, value: CursorValue) -> Self {
        Self(Arc::new(Frame {
            parent: Some(self.clone()),
            value,
            messages: MessageMap::new(),
        }))
    }

    #[must_use]
    pub fn value(&self) -> &CursorValue {
        &self.0.value
    }

    /// Tree held by this frame, padding included
    #[must_use]
    pub fn tree(&self) -> Option<&Tree> {
        match &self.0.value {
            CursorValue::Tree(tree) | CursorValue::Padding(tree) => Some(tree),
            CursorValue::Root => None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Cursor> {
        self.0.parent.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// The root frame of this path
    #[must_use]
    pub fn root_cursor(&self) -> &Cursor {
        let mut cursor = self;
        while let Some(parent) = cursor.parent() {
            cursor = parent;
        }
        cursor
    }

    /// This frame followed by its ancestors, ending at the root
    pub fn path(&self) -> impl Iterator<Item = &Cursor> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    /// Number of frames below the root
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path().count() - 1
    }

    /// Nearest tree on the path, this frame included, matching `predicate`
    pub fn first_enclosing(&self, predicate: impl Fn(&Tree) -> bool) -> Option<&Tree> {
        self.path().filter_map(Cursor::tree).find(|t| predicate(t))
    }

    /// Nearest enclosing source file
    #[must_use]
    pub fn first_enclosing_source_file(&self) -> Option<&Tree> {
        self.first_enclosing(Tree::is_source_file)
    }

    /// Nearest strict ancestor frame that holds a tree, skipping padding
    #[must_use]
    pub fn parent_tree_cursor(&self) -> Option<&Cursor> {
        self.path()
            .skip(1)
            .find(|c| matches!(c.value(), CursorValue::Tree(_)))
    }

    /// The `n`th strict tree ancestor; `parent_tree(1)` is the parent
    #[must_use]
    pub fn parent_tree(&self, n: usize) -> Option<&Tree> {
        let mut cursor = self;
        for _ in 0..n {
            cursor = cursor.parent_tree_cursor()?;
        }
        cursor.tree()
    }

    pub fn put_message<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.0.messages.put(key, value);
    }

    pub fn put_message_arc(&self, key: impl Into<String>, value: Message) {
        self.0.messages.put_arc(key, value);
    }

    /// Message set on this frame only
    #[must_use]
    pub fn get_message<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.0.messages.get(key)
    }

    /// Message from the nearest frame on the path that has it
    #[must_use]
    pub fn get_nearest_message<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.path().find_map(|c| c.get_message(key))
    }

    pub fn compute_message_if_absent<T, F>(&self, key: &str, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.0.messages.compute_if_absent(key, init)
    }

    pub fn remove_message(&self, key: &str) -> bool {
        self.0.messages.remove(key)
    }

    /// Set a message on the nearest frame whose tree matches `predicate`
    ///
    /// Returns `false` when no frame on the path matches.
    pub fn put_message_on_first_enclosing<T: Any + Send + Sync>(
        &self,
        predicate: impl Fn(&Tree) -> bool,
        key: impl Into<String>,
        value: T,
    ) -> bool {
        let target = self
            .path()
            .find(|c| matches!(c.value(), CursorValue::Tree(t) if predicate(t)));
        match target {
            Some(cursor) => {
                cursor.put_message(key, value);
                true
            }
            None => false,
        }
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut frames: Vec<&Cursor> = self.path().collect();
        frames.reverse();
        for (i, frame) in frames.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            match frame.value() {
                CursorValue::Root => f.write_str("root")?,
                CursorValue::Tree(tree) => write!(f, "{}", tree.kind())?,
                CursorValue::Padding(tree) => write!(f, "({})", tree.kind())?,
            }
        }
        Ok(())
    }
}

impl Debug for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::properties::{Entry, File};
    use crate::tree::TreeKind;

    fn properties_path() -> (Tree, Tree, Cursor) {
        let file = Tree::from(File::new("a.properties"));
        let entry = Tree::from(Entry::new("k", "v"));
        let value = Tree::from(entry.as_properties_entry().unwrap().value.clone());
        let cursor = Cursor::root()
            .push(file.clone())
            .push(entry.clone())
            .push_padding(entry.clone())
            .push(value);
        (file, entry, cursor)
    }

    #[test]
    fn root_and_depth() {
        let (_, _, cursor) = properties_path();
        assert_eq!(cursor.depth(), 4);
        assert!(cursor.root_cursor().is_root());
        assert!(matches!(cursor.root_cursor().value(), CursorValue::Root));
    }

    #[test]
    fn parent_tree_skips_padding() {
        let (file, entry, cursor) = properties_path();
        assert!(cursor.parent_tree(1).unwrap().ptr_eq(&entry));
        assert!(cursor.parent_tree(2).unwrap().ptr_eq(&file));
        assert!(cursor.parent_tree(3).is_none());
        assert_eq!(cursor.parent_tree(0).unwrap().kind(), TreeKind::PropertiesValue);
    }

    #[test]
    fn first_enclosing_source_file() {
        let (file, _, cursor) = properties_path();
        assert!(cursor.first_enclosing_source_file().unwrap().ptr_eq(&file));
        assert!(Cursor::root().first_enclosing_source_file().is_none());
    }

    #[test]
    fn nearest_message_walks_up() {
        let (_, _, cursor) = properties_path();
        cursor.root_cursor().put_message("depth", 0_usize);
        assert_eq!(*cursor.get_nearest_message::<usize>("depth").unwrap(), 0);
        assert!(cursor.get_message::<usize>("depth").is_none());
    }

    #[test]
    fn put_message_on_first_enclosing_entry() {
        let (_, _, cursor) = properties_path();
        let placed = cursor.put_message_on_first_enclosing(
            |t| t.kind() == TreeKind::PropertiesEntry,
            "seen",
            true,
        );
        assert!(placed);
        let entry_frame = cursor.parent_tree_cursor().unwrap();
        assert!(*entry_frame.get_message::<bool>("seen").unwrap());
        assert!(!cursor.put_message_on_first_enclosing(|t| t.kind() == TreeKind::Snippet, "x", 1));
    }

    #[test]
    fn display_is_kind_path() {
        let (_, _, cursor) = properties_path();
        assert_eq!(
            cursor.to_string(),
            "root > properties.File > properties.Entry > (properties.Entry) > properties.Value"
        );
    }
}
