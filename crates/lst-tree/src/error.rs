//! Error types for the tree model
//!
//! - [`TreeError`]: structural misuse, such as a visitor returning the wrong
//!   kind for a child slot
//! - [`PrintError`]: no printer for a kind
//! - [`RecipeRunError`]: any failure raised while visiting, paired with the
//!   cursor at which it happened

use crate::cursor::Cursor;
use crate::tree::TreeKind;

/// Boxed error returned from visitor hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structural errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Kind string not recognised
    #[error("unknown tree kind: {0}")]
    UnknownKind(String),

    /// A node of one kind was found where another was required
    #[error("expected {expected}, got {actual}")]
    UnexpectedKind { expected: TreeKind, actual: TreeKind },

    /// Only whole files can be source files
    #[error("{0} is not a source file")]
    NotASourceFile(TreeKind),

    /// A visitor deleted a child its parent cannot live without
    #[error("{child} is required in {parent} and cannot be deleted")]
    RequiredChildRemoved { parent: TreeKind, child: TreeKind },
}

/// Printing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrintError {
    #[error("no printer registered for {0}")]
    NoPrinter(TreeKind),

    #[error("{printer} cannot print {kind}")]
    UnsupportedKind { printer: &'static str, kind: TreeKind },

    #[error("{parent} cannot contain {kind}")]
    UnexpectedChild { parent: TreeKind, kind: TreeKind },
}

/// A failure during a visit, with the cursor where it was raised
#[derive(Debug, thiserror::Error)]
#[error("failed at {cursor}: {source}")]
pub struct RecipeRunError {
    cursor: Cursor,
    #[source]
    source: BoxError,
}

impl RecipeRunError {
    #[must_use]
    pub fn new(cursor: Cursor, source: BoxError) -> Self {
        Self { cursor, source }
    }

    /// Cursor at the node being visited when the failure was raised
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.source
    }

    /// Attach `cursor` to `error` unless it already carries one
    #[must_use]
    pub fn wrap(cursor: &Cursor, error: BoxError) -> BoxError {
        if error.is::<RecipeRunError>() {
            error
        } else {
            Box::new(Self::new(cursor.clone(), error))
        }
    }

    /// Recover a `RecipeRunError` from a boxed error, attaching `cursor`
    /// when the error never passed through a visit frame
    #[must_use]
    pub fn from_boxed(cursor: &Cursor, error: BoxError) -> Self {
        match error.downcast::<RecipeRunError>() {
            Ok(run_error) => *run_error,
            Err(other) => Self::new(cursor.clone(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_not_nested() {
        let cursor = Cursor::root();
        let once = RecipeRunError::wrap(&cursor, "boom".into());
        let twice = RecipeRunError::wrap(&cursor, once);
        let error = RecipeRunError::from_boxed(&cursor, twice);
        assert_eq!(error.cause().to_string(), "boom");
    }

    #[test]
    fn display_includes_cursor_path() {
        let error = RecipeRunError::new(Cursor::root(), "boom".into());
        assert_eq!(error.to_string(), "failed at root: boom");
    }
}
