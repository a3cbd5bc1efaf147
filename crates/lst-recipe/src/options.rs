//! Recipe descriptors
//!
//! The serializable view of a recipe handed to external tooling.

use crate::data_table::DataTableDescriptor;
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};

/// One declared option and its configured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Configured value, `null` when unset
    #[serde(default)]
    pub value: serde_json::Value,
}

impl OptionDescriptor {
    /// Required option with no value yet
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            example: None,
            required: true,
            value: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.value = value.into();
        self
    }
}

/// Full recipe metadata, including its sub-recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDescriptor {
    pub name: String,
    pub display_name: String,
    pub instance_name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Seconds of manual work one change saves
    pub estimated_effort_per_occurrence: u64,
    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
    #[serde(default)]
    pub data_tables: Vec<DataTableDescriptor>,
    #[serde(default)]
    pub recipe_list: Vec<RecipeDescriptor>,
}

impl RecipeDescriptor {
    /// Describe `recipe` and, recursively, its recipe list
    #[must_use]
    pub fn describe<R: Recipe + ?Sized>(recipe: &R) -> Self {
        Self {
            name: recipe.name().to_string(),
            display_name: recipe.display_name().to_string(),
            instance_name: recipe.instance_name(),
            description: recipe.description().to_string(),
            tags: recipe.tags(),
            estimated_effort_per_occurrence: recipe.estimated_effort_per_occurrence().as_secs(),
            options: recipe.options(),
            data_tables: recipe.data_tables(),
            recipe_list: recipe
                .recipe_list()
                .iter()
                .map(|r| Self::describe(r.as_ref()))
                .collect(),
        }
    }
}
