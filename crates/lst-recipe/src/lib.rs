//! LST Recipes
//!
//! Named, validated transformations over source files, and the scheduler
//! that runs them.
//!
//! # Core Concepts
//!
//! - [`Recipe`]: options, validation and an editor visitor, plus a recipe list
//! - [`ScanningRecipe`]: a recipe that scans all files into an accumulator
//!   before editing, wrapped in [`Scanning`] to run
//! - [`RecipeScheduler`]: scan, generate and edit phases over a batch of files
//! - [`DataTable`]: typed rows recorded into the [`lst_tree::ExecutionContext`]
//! - [`RecipeCatalog`]: recipes by name, built from JSON options
//!
//! # Example
//!
//! ```rust,ignore
//! use lst_recipe::{RecipeCatalog, RecipeScheduler, RunConfig};
//! use lst_tree::{ExecutionContext, PrinterRegistry};
//! use std::sync::Arc;
//!
//! let recipe = RecipeCatalog::with_defaults().create(
//!     "lst.properties.ChangePropertyValue",
//!     serde_json::json!({"propertyKey": "server.port", "newValue": "8081"}),
//! )?;
//! let scheduler = RecipeScheduler::new(Arc::new(PrinterRegistry::with_defaults()), RunConfig::new());
//! let run = scheduler.run(recipe, sources, &ExecutionContext::new())?;
//! for result in &run.changeset {
//!     println!("{}", result.diff(scheduler.printers())?);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod catalog;
mod config;
mod data_table;
mod error;
pub mod markup;
mod options;
mod recipe;
pub mod recipes;
mod result;
mod scanning;
mod scheduler;
mod validation;

pub use catalog::{NoOptions, RecipeCatalog};
pub use config::RunConfig;
pub use data_table::{
    ColumnDescriptor, DataTable, DataTableDescriptor, DataTableStore, ParseFailuresRow,
    SourcesFileResultsRow, PARSE_FAILURES, SOURCES_FILE_RESULTS,
};
pub use error::{RecipeError, ValidationError};
pub use options::{OptionDescriptor, RecipeDescriptor};
pub use recipe::{flatten, DeclarativeRecipe, Recipe, RecipeInfo};
pub use result::{RecipeResult, RecipeRun};
pub use scanning::{Accumulator, Scanning, ScanningRecipe};
pub use scheduler::RecipeScheduler;
pub use validation::{Validation, ValidationFailure};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
