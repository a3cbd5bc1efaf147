//! LST command line runner
//!
//! Loads a directory of source files, runs recipes from the catalog over
//! them, and prints or applies the resulting diffs.
//!
//! # Core Concepts
//!
//! - [`CliConfig`]: `lst.toml` with a `[run]` table and `[[recipes]]` entries
//! - [`load_sources`] / [`apply`]: the filesystem edges of a run
//!
//! # Example
//!
//! ```rust,ignore
//! let config = CliConfig::load(Path::new("lst.toml"))?;
//! let recipe = config.recipe(&RecipeCatalog::with_defaults())?;
//! let sources = load_sources(dir, &ParserRegistry::with_defaults())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod project;

pub use config::{CliConfig, RecipeEntry, COMPOSITE_RECIPE};
pub use error::CliError;
pub use project::{apply, load_sources};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
