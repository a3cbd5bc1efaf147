//! Recipe traits
//!
//! A recipe is a named, option-configured transformation. It hands the
//! scheduler a fresh [`TreeVisitor`] from [`Recipe::editor`] and may list
//! sub-recipes that run after it, in order, on the same evolving trees.

use crate::data_table::DataTableDescriptor;
use crate::options::{OptionDescriptor, RecipeDescriptor};
use crate::validation::Validation;
use lst_tree::{BoxError, Cursor, ExecutionContext, NoopVisitor, SourceFile, TreeVisitor};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Metadata shared by plain and scanning recipes
pub trait RecipeInfo: Send + Sync {
    /// Fully qualified name, e.g. `lst.text.FindText`
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// Display name specialized by options
    fn instance_name(&self) -> String {
        self.display_name().to_string()
    }

    fn tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Manual effort one change saves
    fn estimated_effort_per_occurrence(&self) -> Duration {
        Duration::from_secs(5 * 60)
    }

    /// Declared options with their configured values
    fn options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// Data tables this recipe writes rows to
    fn data_tables(&self) -> Vec<DataTableDescriptor> {
        Vec::new()
    }

    /// Checked before a run starts; defaults to required-option presence
    fn validate(&self) -> Validation {
        Validation::required_options(&self.options())
    }
}

/// A transformation the scheduler can run
pub trait Recipe: RecipeInfo {
    /// Visitor for the edit phase
    ///
    /// The scheduler calls this once per run in sequential mode and once per
    /// file when files are processed in parallel; a returned visitor is
    /// never shared between threads.
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(NoopVisitor)
    }

    /// Sub-recipes run after this one, in order
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        Vec::new()
    }

    /// Visitor for the scan phase; `None` for recipes that do not scan
    fn scanner(&self) -> Option<Box<dyn TreeVisitor>> {
        None
    }

    /// New source files produced between scan and edit
    ///
    /// # Errors
    /// Returns error if generation fails; this aborts the run
    fn generate(&self, _root: &Cursor, _ctx: &ExecutionContext) -> Result<Vec<SourceFile>, BoxError> {
        Ok(Vec::new())
    }

    /// Called once after every file has been edited
    ///
    /// # Errors
    /// Returns error if final aggregation fails
    fn on_complete(&self, _ctx: &ExecutionContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Serializable description of this recipe and its recipe list
    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor::describe(self)
    }
}

impl fmt::Debug for dyn Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("name", &self.name())
            .field("instance_name", &self.instance_name())
            .finish()
    }
}

/// This recipe followed by its recipe list, depth first
#[must_use]
pub fn flatten(recipe: Arc<dyn Recipe>) -> Vec<Arc<dyn Recipe>> {
    let mut chain = vec![recipe.clone()];
    for child in recipe.recipe_list() {
        chain.extend(flatten(child));
    }
    chain
}

/// A named list of recipes with no editor of its own
#[derive(Clone)]
pub struct DeclarativeRecipe {
    name: String,
    display_name: String,
    description: String,
    tags: Vec<String>,
    recipes: Vec<Arc<dyn Recipe>>,
}

impl fmt::Debug for DeclarativeRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarativeRecipe")
            .field("name", &self.name)
            .field("recipes", &self.recipes)
            .finish()
    }
}

impl DeclarativeRecipe {
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            tags: Vec::new(),
            recipes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append a recipe to the list
    #[must_use]
    pub fn then(mut self, recipe: impl Recipe + 'static) -> Self {
        self.recipes.push(Arc::new(recipe));
        self
    }

    /// Append an already shared recipe
    #[must_use]
    pub fn then_arc(mut self, recipe: Arc<dyn Recipe>) -> Self {
        self.recipes.push(recipe);
        self
    }
}

impl RecipeInfo for DeclarativeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> Vec<String> {
        self.tags.clone()
    }
}

impl Recipe for DeclarativeRecipe {
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.recipes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> DeclarativeRecipe {
        DeclarativeRecipe::new(name, name)
    }

    #[test]
    fn flatten_is_depth_first() {
        let recipe = named("root")
            .then(named("a").then(named("a1")).then(named("a2")))
            .then(named("b"));
        let names: Vec<String> = flatten(Arc::new(recipe))
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, ["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn descriptor_nests_recipe_list() {
        let recipe = named("root").with_tag("demo").then(named("child"));
        let descriptor = recipe.descriptor();
        assert_eq!(descriptor.tags, ["demo"]);
        assert_eq!(descriptor.recipe_list.len(), 1);
        assert_eq!(descriptor.recipe_list[0].name, "child");
        assert_eq!(descriptor.estimated_effort_per_occurrence, 300);
    }
}
