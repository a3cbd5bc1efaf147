//! Error types for the command line runner

use lst_recipe::{RecipeError, ValidationError};
use lst_tree::PrintError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `--option` not in `key=value` form
    #[error("invalid option `{0}`, expected key=value")]
    OptionSyntax(String),

    #[error("no recipe given; pass --recipe or list [[recipes]] in the config")]
    NoRecipe,

    #[error(transparent)]
    Recipe(#[from] ValidationError),

    #[error(transparent)]
    Run(#[from] RecipeError),

    #[error(transparent)]
    Print(#[from] PrintError),

    /// A result path that would resolve outside the project root
    #[error("refusing to write {path}: not inside the project")]
    OutsideRoot { path: PathBuf },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
