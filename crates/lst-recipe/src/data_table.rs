//! Data tables
//!
//! Structured output rows written by recipes during a run. Rows land in a
//! [`DataTableStore`] kept in the run's [`ExecutionContext`], so concurrent
//! runs on different contexts never see each other's rows.

use indexmap::IndexMap;
use lst_tree::ExecutionContext;
use parking_lot::Mutex;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const STORE_KEY: &str = "lst.dataTableStore";

/// One column of a table, taken from the row type's schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Typed handle to one named table
pub struct DataTable<Row> {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    row: PhantomData<fn() -> Row>,
}

impl<Row> Clone for DataTable<Row> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Row> Copy for DataTable<Row> {}

impl<Row> std::fmt::Debug for DataTable<Row> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable").field("name", &self.name).finish()
    }
}

impl<Row> DataTable<Row>
where
    Row: Serialize + DeserializeOwned + JsonSchema,
{
    #[must_use]
    pub const fn new(
        name: &'static str,
        display_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            display_name,
            description,
            row: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append `row` if the run currently accepts rows
    ///
    /// Returns whether the row was stored.
    ///
    /// # Errors
    /// Returns error if the row cannot be serialized
    pub fn insert_row(&self, ctx: &ExecutionContext, row: &Row) -> Result<bool, serde_json::Error> {
        let store = DataTableStore::in_context(ctx);
        if !store.accepts() {
            return Ok(false);
        }
        store.insert(self.name, serde_json::to_value(row)?);
        Ok(true)
    }

    /// Rows stored so far in this run, in insertion order
    ///
    /// # Errors
    /// Returns error if a stored row does not decode as `Row`
    pub fn rows(&self, ctx: &ExecutionContext) -> Result<Vec<Row>, serde_json::Error> {
        DataTableStore::in_context(ctx)
            .rows(self.name)
            .into_iter()
            .map(serde_json::from_value)
            .collect()
    }

    /// Descriptor with one column per field of `Row`
    #[must_use]
    pub fn descriptor(&self) -> DataTableDescriptor {
        let root = schemars::schema_for!(Row);
        let columns = root
            .schema
            .object
            .as_ref()
            .map(|object| {
                object
                    .properties
                    .iter()
                    .map(|(name, schema)| ColumnDescriptor {
                        name: name.clone(),
                        description: match schema {
                            Schema::Object(o) => o.metadata.as_ref().and_then(|m| m.description.clone()),
                            Schema::Bool(_) => None,
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();
        DataTableDescriptor {
            name: self.name.to_string(),
            display_name: self.display_name.to_string(),
            description: self.description.to_string(),
            columns,
        }
    }
}

/// Per-run row storage
///
/// Tables keep first-insert order; rows keep insertion order.
#[derive(Debug)]
pub struct DataTableStore {
    accept: AtomicBool,
    tables: Mutex<IndexMap<String, Vec<serde_json::Value>>>,
}

impl Default for DataTableStore {
    fn default() -> Self {
        Self {
            accept: AtomicBool::new(true),
            tables: Mutex::new(IndexMap::new()),
        }
    }
}

impl DataTableStore {
    /// The store of `ctx`, created on first use
    #[must_use]
    pub fn in_context(ctx: &ExecutionContext) -> Arc<Self> {
        ctx.compute_message_if_absent(STORE_KEY, Self::default)
    }

    /// Gate further inserts
    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    #[must_use]
    pub fn accepts(&self) -> bool {
        self.accept.load(Ordering::SeqCst)
    }

    fn insert(&self, table: &str, row: serde_json::Value) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<serde_json::Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    /// Current row count of every table
    #[must_use]
    pub fn marks(&self) -> IndexMap<String, usize> {
        self.tables
            .lock()
            .iter()
            .map(|(name, rows)| (name.clone(), rows.len()))
            .collect()
    }

    /// Rows added after `marks` was taken, leaving out tables that got none
    #[must_use]
    pub fn rows_since(&self, marks: &IndexMap<String, usize>) -> IndexMap<String, Vec<serde_json::Value>> {
        self.tables
            .lock()
            .iter()
            .filter_map(|(name, rows)| {
                let start = marks.get(name).copied().unwrap_or(0);
                let new = rows.get(start..).unwrap_or_default();
                (!new.is_empty()).then(|| (name.clone(), new.to_vec()))
            })
            .collect()
    }

    /// All tables as one JSON object, table name to row array
    #[must_use]
    pub fn export(&self) -> serde_json::Value {
        let tables = self.tables.lock();
        serde_json::Value::Object(
            tables
                .iter()
                .map(|(name, rows)| (name.clone(), serde_json::Value::Array(rows.clone())))
                .collect(),
        )
    }
}

/// One row per file changed by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourcesFileResultsRow {
    /// Path before the run; empty for generated files
    pub source_path_before: String,
    /// Path after the run; empty for deleted files
    pub source_path_after: String,
    /// The recipe the run was started with
    pub parent_recipe: String,
    /// Recipes in the chain that changed this file
    pub recipes: Vec<String>,
}

pub const SOURCES_FILE_RESULTS: DataTable<SourcesFileResultsRow> = DataTable::new(
    "lst.table.SourcesFileResults",
    "Source files that had results",
    "Source files that were modified by the recipe run.",
);

/// One row per file that failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailuresRow {
    /// Parser that failed
    pub parser: String,
    pub source_path: String,
    /// Exception type reported by the parser
    pub exception_type: String,
    /// Tree type the failure happened in, if narrower than the file
    pub tree_type: Option<String>,
    pub message: String,
}

pub const PARSE_FAILURES: DataTable<ParseFailuresRow> = DataTable::new(
    "lst.table.ParseFailures",
    "Parser failures",
    "A list of files that failed to parse along with stack traces of their failures.",
);
