//! Recipe lookup by name
//!
//! The catalog turns a recipe name and a JSON options object into a
//! configured recipe, the way a config file or CLI refers to recipes.

use crate::error::ValidationError;
use crate::options::RecipeDescriptor;
use crate::recipe::Recipe;
use crate::recipes::{
    AddProperty, ChangePropertyKey, ChangePropertyValue, ChangeText, CreateTextFile, CreateTextFileOptions,
    DeleteProperty,
    FindParseFailures, FindText, OrderProperties,
};
use crate::scanning::Scanning;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

type Constructor = Arc<dyn Fn(serde_json::Value) -> Result<Arc<dyn Recipe>, ValidationError> + Send + Sync>;

/// Options of recipes that take none
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoOptions {}

struct Entry {
    /// Described as configured with default options
    descriptor: RecipeDescriptor,
    constructor: Constructor,
}

/// Registered recipes, in registration order
#[derive(Default)]
pub struct RecipeCatalog {
    entries: IndexMap<String, Entry>,
}

impl fmt::Debug for RecipeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeCatalog")
            .field("recipes", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn decode<O: DeserializeOwned>(name: &str, options: serde_json::Value) -> Result<O, ValidationError> {
    // a recipe with no options may be given `null`
    let options = if options.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        options
    };
    serde_json::from_value(options).map_err(|source| ValidationError::Options {
        recipe: name.to_string(),
        source,
    })
}

impl RecipeCatalog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in recipe
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register_with_options(FindText::new);
        catalog.register_with_options(ChangeText::new);
        catalog.register_with_options(|o: CreateTextFileOptions| Scanning::new(CreateTextFile::new(o)));
        catalog.register_with_options(ChangePropertyKey::new);
        catalog.register_with_options(ChangePropertyValue::new);
        catalog.register_with_options(AddProperty::new);
        catalog.register_with_options(DeleteProperty::new);
        catalog.register_with_options(|NoOptions {}| OrderProperties);
        catalog.register_with_options(FindParseFailures::new);
        catalog
    }

    /// Register a recipe built from a typed options value
    ///
    /// The catalog listing describes an instance built with default options.
    pub fn register_with_options<O, R>(&mut self, build: impl Fn(O) -> R + Send + Sync + 'static)
    where
        O: DeserializeOwned + Default + 'static,
        R: Recipe + 'static,
    {
        let descriptor = RecipeDescriptor::describe(&build(O::default()));
        let name = descriptor.name.clone();
        self.register(descriptor, move |options| {
            let options = decode::<O>(&name, options)?;
            Ok(Arc::new(build(options)) as Arc<dyn Recipe>)
        });
    }

    /// Register or replace a recipe constructor
    pub fn register(
        &mut self,
        descriptor: RecipeDescriptor,
        constructor: impl Fn(serde_json::Value) -> Result<Arc<dyn Recipe>, ValidationError> + Send + Sync + 'static,
    ) {
        self.entries.insert(
            descriptor.name.clone(),
            Entry {
                descriptor,
                constructor: Arc::new(constructor),
            },
        );
    }

    /// Build the recipe registered as `name`
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownRecipe`] for an unregistered name
    /// and [`ValidationError::Options`] when `options` do not decode
    pub fn create(&self, name: &str, options: serde_json::Value) -> Result<Arc<dyn Recipe>, ValidationError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ValidationError::UnknownRecipe(name.to_string()))?;
        (entry.constructor)(options)
    }

    /// Descriptor of the recipe `name` configured with `options`
    ///
    /// # Errors
    /// Same as [`RecipeCatalog::create`]
    pub fn describe(&self, name: &str, options: serde_json::Value) -> Result<RecipeDescriptor, ValidationError> {
        Ok(RecipeDescriptor::describe(self.create(name, options)?.as_ref()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every registered recipe, described with default options
    pub fn descriptors(&self) -> impl Iterator<Item = &RecipeDescriptor> {
        self.entries.values().map(|e| &e.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeInfo;
    use serde_json::json;

    #[test]
    fn defaults_are_listed_in_registration_order() {
        let catalog = RecipeCatalog::with_defaults();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names.first(), Some(&"lst.text.FindText"));
        assert!(catalog.contains("lst.properties.OrderProperties"));
        assert_eq!(names.len(), 9);
        let parse_failures = catalog
            .descriptors()
            .find(|d| d.name == "lst.FindParseFailures")
            .unwrap();
        assert_eq!(parse_failures.data_tables[0].name, "lst.table.ParseFailures");
    }

    #[test]
    fn create_decodes_camel_case_options() {
        let catalog = RecipeCatalog::with_defaults();
        let recipe = catalog
            .create(
                "lst.properties.ChangePropertyKey",
                json!({"oldPropertyKey": "a", "newPropertyKey": "b"}),
            )
            .unwrap();
        assert_eq!(recipe.instance_name(), "Change property key `a` to `b`");
        assert!(recipe.validate().is_valid());
    }

    #[test]
    fn recipe_without_options_accepts_null() {
        let catalog = RecipeCatalog::with_defaults();
        assert!(catalog.create("lst.properties.OrderProperties", serde_json::Value::Null).is_ok());
        assert!(matches!(
            catalog.create("lst.properties.OrderProperties", json!({"x": 1})),
            Err(ValidationError::Options { .. })
        ));
    }

    #[test]
    fn unknown_name_is_reported() {
        let err = RecipeCatalog::with_defaults().create("nope", json!({})).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownRecipe(name) if name == "nope"));
    }

    #[test]
    fn scanning_recipe_is_described_with_options() {
        let descriptor = RecipeCatalog::with_defaults()
            .describe(
                "lst.text.CreateTextFile",
                json!({"relativeFileName": "a.txt", "fileContents": "hi"}),
            )
            .unwrap();
        assert_eq!(descriptor.instance_name, "Create text file `a.txt`");
        assert_eq!(descriptor.options.len(), 3);
    }
}
