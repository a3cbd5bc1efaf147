//! Run output

use indexmap::IndexMap;
use lst_tree::{MarkerPrinter, PrintError, PrinterRegistry, SourceFile};
use std::path::Path;

/// One changed, generated or deleted file
#[derive(Debug, Clone)]
pub struct RecipeResult {
    pub before: Option<SourceFile>,
    pub after: Option<SourceFile>,
    /// Names of the recipes in the chain that changed this file
    pub recipes_that_made_changes: Vec<String>,
}

impl RecipeResult {
    #[must_use]
    pub fn is_addition(&self) -> bool {
        self.before.is_none()
    }

    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.after.is_none()
    }

    /// Path after the change, or before it for a deletion
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .map(SourceFile::source_path)
    }

    /// Unified diff between the printed sides
    ///
    /// # Errors
    /// Returns error if a side has no printer
    pub fn diff(&self, printers: &PrinterRegistry) -> Result<String, PrintError> {
        self.diff_with(printers, MarkerPrinter::Default)
    }

    /// Unified diff, rendering markers with `marker_printer`
    ///
    /// # Errors
    /// Returns error if a side has no printer
    pub fn diff_with(&self, printers: &PrinterRegistry, marker_printer: MarkerPrinter) -> Result<String, PrintError> {
        let print = |side: &Option<SourceFile>| -> Result<String, PrintError> {
            match side {
                Some(source) => printers.print(source.tree(), marker_printer),
                None => Ok(String::new()),
            }
        };
        let header = |side: &Option<SourceFile>, prefix: &str| match side {
            Some(source) => format!("{prefix}{}", source.source_path().display()),
            None => "/dev/null".to_string(),
        };

        let patch = diffy::create_patch(&print(&self.before)?, &print(&self.after)?).to_string();
        let hunks = patch.splitn(3, '\n').nth(2).unwrap_or_default();
        Ok(format!(
            "--- {}\n+++ {}\n{hunks}",
            header(&self.before, "a/"),
            header(&self.after, "b/")
        ))
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Default)]
pub struct RecipeRun {
    /// Results in input order, generated files last
    pub changeset: Vec<RecipeResult>,
    /// Data table rows by table name
    pub data_tables: IndexMap<String, Vec<serde_json::Value>>,
}

impl RecipeRun {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changeset.is_empty()
    }

    /// Result for the file at `path` after the run
    #[must_use]
    pub fn find(&self, path: impl AsRef<Path>) -> Option<&RecipeResult> {
        self.changeset.iter().find(|r| r.path() == Some(path.as_ref()))
    }

    /// Rows of one data table
    #[must_use]
    pub fn rows(&self, table: &str) -> &[serde_json::Value] {
        self.data_tables.get(table).map_or(&[][..], Vec::as_slice)
    }
}
