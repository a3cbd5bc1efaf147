//! `lst.toml`
//!
//! ```toml
//! [run]
//! max_parallelism = 4
//!
//! [[recipes]]
//! name = "lst.properties.ChangePropertyValue"
//! options = { propertyKey = "server.port", newValue = "8081" }
//! ```

use crate::error::CliError;
use lst_recipe::{DeclarativeRecipe, Recipe, RecipeCatalog, RunConfig};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Name of the recipe that wraps several configured recipes
pub const COMPOSITE_RECIPE: &str = "lst.cli.Configured";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub run: RunConfig,
    pub recipes: Vec<RecipeEntry>,
}

/// One `[[recipes]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipeEntry {
    pub name: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

impl RecipeEntry {
    /// Entry for `name` with `key=value` options
    ///
    /// A value that reads as JSON (`true`, `3`, `["a"]`) is taken as such;
    /// anything else is a string.
    ///
    /// # Errors
    /// Returns [`CliError::OptionSyntax`] for an option without `=`
    pub fn from_args(name: &str, options: &[String]) -> Result<Self, CliError> {
        let mut map = serde_json::Map::new();
        for option in options {
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| CliError::OptionSyntax(option.clone()))?;
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            map.insert(key.trim().to_string(), value);
        }
        Ok(Self {
            name: name.to_string(),
            options: serde_json::Value::Object(map),
        })
    }
}

impl CliConfig {
    /// Read a config file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The recipe to run: the only entry, or all entries in order
    ///
    /// # Errors
    /// Returns error if there are no entries or one cannot be built
    pub fn recipe(&self, catalog: &RecipeCatalog) -> Result<Arc<dyn Recipe>, CliError> {
        let mut recipes = self
            .recipes
            .iter()
            .map(|entry| catalog.create(&entry.name, entry.options.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        match recipes.len() {
            0 => Err(CliError::NoRecipe),
            1 => Ok(recipes.remove(0)),
            _ => Ok(Arc::new(recipes.into_iter().fold(
                DeclarativeRecipe::new(COMPOSITE_RECIPE, "Configured recipes")
                    .with_description("Recipes listed in the configuration file."),
                DeclarativeRecipe::then_arc,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lst_recipe::RecipeInfo;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_run_table_and_recipes() {
        let config: CliConfig = toml::from_str(
            r#"
            [run]
            max_parallelism = 4

            [[recipes]]
            name = "lst.properties.OrderProperties"

            [[recipes]]
            name = "lst.properties.AddProperty"
            options = { property = "a", value = "1" }
            "#,
        )
        .unwrap();

        assert_eq!(config.run.max_parallelism, 4);
        assert_eq!(config.run.accept_data_table_rows, None);
        assert_eq!(config.recipes[1].options, json!({"property": "a", "value": "1"}));

        let recipe = config.recipe(&RecipeCatalog::with_defaults()).unwrap();
        assert_eq!(recipe.name(), COMPOSITE_RECIPE);
        assert_eq!(recipe.recipe_list().len(), 2);
    }

    #[test]
    fn option_args_are_typed_when_they_read_as_json() {
        let entry = RecipeEntry::from_args(
            "lst.text.FindText",
            &["patterns=[\"x\"]".to_string(), "regex=true".to_string(), "note=plain words".to_string()],
        )
        .unwrap();
        assert_eq!(
            entry.options,
            json!({"patterns": ["x"], "regex": true, "note": "plain words"})
        );
        assert!(matches!(
            RecipeEntry::from_args("x", &["novalue".to_string()]),
            Err(CliError::OptionSyntax(_))
        ));
    }

    #[test]
    fn empty_config_has_no_recipe() {
        let config = CliConfig::default();
        assert!(matches!(
            config.recipe(&RecipeCatalog::with_defaults()),
            Err(CliError::NoRecipe)
        ));
    }
}
