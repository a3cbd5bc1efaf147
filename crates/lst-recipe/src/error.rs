//! Error types for recipes and runs
//!
//! Parse failures and localized recipe failures never show up here: they
//! are carried as trees and markers. What remains is fatal to a run.

use crate::validation::ValidationFailure;
use lst_tree::{BoxError, PrintError, RecipeRunError, TreeError};

/// Main run error type
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// Options failed validation; nothing was visited
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A visitor failed during scan or edit
    #[error(transparent)]
    Run(#[from] RecipeRunError),

    /// `generate` failed
    #[error("{recipe} failed to generate sources: {source}")]
    Generate {
        recipe: String,
        #[source]
        source: BoxError,
    },

    /// `on_complete` failed
    #[error("{recipe} failed to complete: {source}")]
    Complete {
        recipe: String,
        #[source]
        source: BoxError,
    },

    /// An editor produced something that is not a source file
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Printing a result failed
    #[error("print error: {0}")]
    Print(#[from] PrintError),

    /// Data table row could not be encoded
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker pool could not be started
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl RecipeError {
    /// Check if the run was rejected before any traversal
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Recipe configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// One or more options are invalid
    #[error("{recipe}: {}", join(.failures))]
    Invalid {
        recipe: String,
        failures: Vec<ValidationFailure>,
    },

    /// No recipe registered under this name
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    /// Options could not be decoded into the recipe's option type
    #[error("invalid options for {recipe}: {source}")]
    Options {
        recipe: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
