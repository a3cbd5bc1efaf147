//! Copy-on-write editing of shared nodes
//!
//! [`produce`] hands an edit closure a [`Draft`] of a node. Reading through
//! the draft costs nothing; the first mutable access clones the node. If the
//! closure never mutates, the original `Arc` comes back, so callers can use
//! [`Arc::ptr_eq`] to tell whether anything changed.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Lazily-cloned view of a node under edit
pub struct Draft<'a, T: Clone> {
    original: &'a Arc<T>,
    copy: Option<T>,
}

impl<'a, T: Clone> Draft<'a, T> {
    #[must_use]
    pub fn new(original: &'a Arc<T>) -> Self {
        Self {
            original,
            copy: None,
        }
    }

    /// Whether the draft has been written through
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.copy.is_some()
    }

    /// Finish the edit
    #[must_use]
    pub fn commit(self) -> Arc<T> {
        match self.copy {
            Some(copy) => Arc::new(copy),
            None => Arc::clone(self.original),
        }
    }
}

impl<T: Clone> Deref for Draft<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.copy.as_ref().unwrap_or(&**self.original)
    }
}

impl<T: Clone> DerefMut for Draft<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        let original = self.original;
        self.copy.get_or_insert_with(|| T::clone(&**original))
    }
}

/// Apply `edit` to a draft of `before`
///
/// Returns `before` itself when `edit` made no mutable access.
pub fn produce<T: Clone>(before: &Arc<T>, edit: impl FnOnce(&mut Draft<'_, T>)) -> Arc<T> {
    let mut draft = Draft::new(before);
    edit(&mut draft);
    draft.commit()
}

/// Fallible [`produce`]; on error the draft is discarded
///
/// # Errors
/// Returns whatever `edit` returns
pub fn try_produce<T: Clone, E>(
    before: &Arc<T>,
    edit: impl FnOnce(&mut Draft<'_, T>) -> Result<(), E>,
) -> Result<Arc<T>, E> {
    let mut draft = Draft::new(before);
    edit(&mut draft)?;
    Ok(draft.commit())
}
