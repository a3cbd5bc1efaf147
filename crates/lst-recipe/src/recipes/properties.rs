//! Recipes over `.properties` files

use crate::options::OptionDescriptor;
use crate::recipe::{Recipe, RecipeInfo};
use crate::validation::Validation;
use lst_tree::lang::properties::{Entry, File};
use lst_tree::{produce, walk_properties_entry, Traversal, Tree, TreeVisitor, VisitResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whitespace a node at `index` of a file's content should carry
fn prefix_at(index: usize) -> &'static str {
    if index == 0 {
        ""
    } else {
        "\n"
    }
}

fn tree_prefix(tree: &Tree) -> Option<&str> {
    match tree {
        Tree::PropertiesEntry(e) => Some(e.prefix.as_str()),
        Tree::PropertiesComment(c) => Some(c.prefix.as_str()),
        _ => None,
    }
}

fn with_prefix(tree: &Tree, prefix: &str) -> Tree {
    match tree {
        Tree::PropertiesEntry(e) if e.prefix != prefix => {
            Tree::PropertiesEntry(produce(e, |d| d.prefix = prefix.to_string()))
        }
        Tree::PropertiesComment(c) if c.prefix != prefix => {
            Tree::PropertiesComment(produce(c, |d| d.prefix = prefix.to_string()))
        }
        other => other.clone(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyKeyOptions {
    pub old_property_key: String,
    pub new_property_key: String,
}

/// Renames a property key
#[derive(Debug, Clone)]
pub struct ChangePropertyKey {
    options: Arc<ChangePropertyKeyOptions>,
}

impl ChangePropertyKey {
    #[must_use]
    pub fn new(options: ChangePropertyKeyOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for ChangePropertyKey {
    fn name(&self) -> &str {
        "lst.properties.ChangePropertyKey"
    }

    fn display_name(&self) -> &str {
        "Change property key"
    }

    fn description(&self) -> &str {
        "Change a property key leaving the value intact."
    }

    fn instance_name(&self) -> String {
        format!(
            "Change property key `{}` to `{}`",
            self.options.old_property_key, self.options.new_property_key
        )
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("oldPropertyKey", "Old property key", "The property key to rename.")
                .with_example("management.metrics.binders")
                .with_value(self.options.old_property_key.clone()),
            OptionDescriptor::new("newPropertyKey", "New property key", "The new name for the key.")
                .with_example("management.metrics.enable.process.files")
                .with_value(self.options.new_property_key.clone()),
        ]
    }

    fn validate(&self) -> Validation {
        Validation::required_options(&self.options())
            .check(!self.options.old_property_key.is_empty(), "oldPropertyKey", "must not be empty")
            .check(!self.options.new_property_key.is_empty(), "newPropertyKey", "must not be empty")
    }
}

impl Recipe for ChangePropertyKey {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(ChangeKeyVisitor(self.options.clone()))
    }
}

struct ChangeKeyVisitor(Arc<ChangePropertyKeyOptions>);

impl TreeVisitor for ChangeKeyVisitor {
    fn visit_properties_entry(&mut self, entry: Arc<Entry>, t: &mut Traversal<'_>) -> VisitResult {
        let entry = if entry.key == self.0.old_property_key {
            produce(&entry, |d| d.key = self.0.new_property_key.clone())
        } else {
            entry
        };
        walk_properties_entry(self, entry, t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyValueOptions {
    pub property_key: String,
    pub new_value: String,
    /// Only change entries currently holding this value
    #[serde(default)]
    pub old_value: Option<String>,
}

/// Sets the value of a property
#[derive(Debug, Clone)]
pub struct ChangePropertyValue {
    options: Arc<ChangePropertyValueOptions>,
}

impl ChangePropertyValue {
    #[must_use]
    pub fn new(options: ChangePropertyValueOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for ChangePropertyValue {
    fn name(&self) -> &str {
        "lst.properties.ChangePropertyValue"
    }

    fn display_name(&self) -> &str {
        "Change property value"
    }

    fn description(&self) -> &str {
        "Change the value of a property."
    }

    fn instance_name(&self) -> String {
        format!(
            "Change property `{}` to `{}`",
            self.options.property_key, self.options.new_value
        )
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("propertyKey", "Property key", "The name of the property whose value to change.")
                .with_example("management.metrics.binders.files.enabled")
                .with_value(self.options.property_key.clone()),
            OptionDescriptor::new("newValue", "New value", "The new value to be used for the key.")
                .with_example("management.metrics.enable.process.files")
                .with_value(self.options.new_value.clone()),
            OptionDescriptor::new("oldValue", "Old value", "Only change the property if it currently has this value.")
                .required(false)
                .with_value(self.options.old_value.clone()),
        ]
    }

    fn validate(&self) -> Validation {
        Validation::required_options(&self.options())
            .check(!self.options.property_key.is_empty(), "propertyKey", "must not be empty")
    }
}

impl Recipe for ChangePropertyValue {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(ChangeValueVisitor(self.options.clone()))
    }
}

struct ChangeValueVisitor(Arc<ChangePropertyValueOptions>);

impl TreeVisitor for ChangeValueVisitor {
    fn visit_properties_entry(&mut self, entry: Arc<Entry>, t: &mut Traversal<'_>) -> VisitResult {
        let options = &self.0;
        let matches = entry.key == options.property_key
            && entry.value.text != options.new_value
            && options.old_value.as_ref().map_or(true, |old| *old == entry.value.text);
        let entry = if matches {
            produce(&entry, |d| {
                d.value = produce(&d.value, |v| v.text = options.new_value.clone());
            })
        } else {
            entry
        };
        walk_properties_entry(self, entry, t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropertyOptions {
    pub property: String,
    pub value: String,
}

/// Appends a property to files that do not define it yet
#[derive(Debug, Clone)]
pub struct AddProperty {
    options: Arc<AddPropertyOptions>,
}

impl AddProperty {
    #[must_use]
    pub fn new(options: AddPropertyOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for AddProperty {
    fn name(&self) -> &str {
        "lst.properties.AddProperty"
    }

    fn display_name(&self) -> &str {
        "Add a new property"
    }

    fn description(&self) -> &str {
        "Adds a new property to a property file at the bottom of the file if it's missing."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("property", "Property key", "The property key to add.")
                .with_example("management.metrics.enable.process.files")
                .with_value(self.options.property.clone()),
            OptionDescriptor::new("value", "Property value", "The value of the new property key.")
                .with_example("true")
                .with_value(self.options.value.clone()),
        ]
    }

    fn validate(&self) -> Validation {
        Validation::required_options(&self.options())
            .check(!self.options.property.is_empty(), "property", "must not be empty")
            .check(
                !self.options.property.chars().any(char::is_whitespace),
                "property",
                "must not contain whitespace",
            )
    }
}

impl Recipe for AddProperty {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(AddPropertyVisitor(self.options.clone()))
    }
}

struct AddPropertyVisitor(Arc<AddPropertyOptions>);

impl TreeVisitor for AddPropertyVisitor {
    fn visit_properties_file(&mut self, file: Arc<File>, t: &mut Traversal<'_>) -> VisitResult {
        if file.find_entry(&self.0.property).is_none() {
            t.do_after_visit(Box::new(AppendEntry(self.0.clone())));
        }
        Ok(Some(Tree::PropertiesFile(file)))
    }
}

/// Runs after the file visit so the append sees the final content
struct AppendEntry(Arc<AddPropertyOptions>);

impl TreeVisitor for AppendEntry {
    fn visit_properties_file(&mut self, file: Arc<File>, _t: &mut Traversal<'_>) -> VisitResult {
        if file.find_entry(&self.0.property).is_some() {
            return Ok(Some(Tree::PropertiesFile(file)));
        }
        let entry = Entry::new(&self.0.property, &self.0.value).with_prefix(prefix_at(file.content.len()));
        Ok(Some(Tree::PropertiesFile(produce(&file, |d| {
            d.content.push_back(Tree::from(entry));
        }))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePropertyOptions {
    pub property_key: String,
}

/// Removes every entry with a given key
#[derive(Debug, Clone)]
pub struct DeleteProperty {
    options: Arc<DeletePropertyOptions>,
}

impl DeleteProperty {
    #[must_use]
    pub fn new(options: DeletePropertyOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }
}

impl RecipeInfo for DeleteProperty {
    fn name(&self) -> &str {
        "lst.properties.DeleteProperty"
    }

    fn display_name(&self) -> &str {
        "Delete property"
    }

    fn description(&self) -> &str {
        "Deletes key/value pairs from properties files."
    }

    fn options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new("propertyKey", "Property key", "The key to be deleted.")
            .with_example("management.metrics.binders.files.enabled")
            .with_value(self.options.property_key.clone())]
    }
}

impl Recipe for DeleteProperty {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(DeleteVisitor(self.options.clone()))
    }
}

struct DeleteVisitor(Arc<DeletePropertyOptions>);

impl TreeVisitor for DeleteVisitor {
    fn visit_properties_file(&mut self, file: Arc<File>, _t: &mut Traversal<'_>) -> VisitResult {
        let key = &self.0.property_key;
        if file.find_entry(key).is_none() {
            return Ok(Some(Tree::PropertiesFile(file)));
        }
        let first_prefix = file.content.front().and_then(tree_prefix).unwrap_or_default().to_string();
        let mut content: im::Vector<Tree> = file
            .content
            .iter()
            .filter(|t| t.as_properties_entry().map_or(true, |e| e.key != *key))
            .cloned()
            .collect();
        if let Some(first) = content.get_mut(0) {
            *first = with_prefix(first, &first_prefix);
        }
        Ok(Some(Tree::PropertiesFile(produce(&file, |d| d.content = content))))
    }
}

/// Sorts entries by key
///
/// Blank lines stay where they were. Comments split the file into sections that are sorted independently, so
/// a comment stays above the entries it describes.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderProperties;

impl RecipeInfo for OrderProperties {
    fn name(&self) -> &str {
        "lst.properties.OrderProperties"
    }

    fn display_name(&self) -> &str {
        "Order properties"
    }

    fn description(&self) -> &str {
        "Sort the entries of properties files by key, section by section."
    }
}

impl Recipe for OrderProperties {
    fn editor(&self) -> Box<dyn TreeVisitor> {
        Box::new(OrderVisitor)
    }
}

struct OrderVisitor;

impl TreeVisitor for OrderVisitor {
    fn visit_properties_file(&mut self, file: Arc<File>, _t: &mut Traversal<'_>) -> VisitResult {
        let mut ordered: Vec<Tree> = Vec::with_capacity(file.content.len());
        let mut section: Vec<Arc<Entry>> = Vec::new();
        for tree in &file.content {
            match tree.as_properties_entry() {
                Some(entry) => section.push(entry.clone()),
                None => {
                    flush(&mut section, &mut ordered);
                    ordered.push(tree.clone());
                }
            }
        }
        flush(&mut section, &mut ordered);

        let moved = ordered.iter().zip(file.content.iter()).any(|(a, b)| a.id() != b.id());
        if !moved {
            return Ok(Some(Tree::PropertiesFile(file)));
        }
        // whitespace belongs to the slot, not to the entry that moved into it
        let content = ordered
            .iter()
            .zip(file.content.iter())
            .map(|(tree, slot)| with_prefix(tree, tree_prefix(slot).unwrap_or_default()))
            .collect();
        Ok(Some(Tree::PropertiesFile(produce(&file, |d| d.content = content))))
    }
}

fn flush(section: &mut Vec<Arc<Entry>>, ordered: &mut Vec<Tree>) {
    section.sort_by(|a, b| a.key.cmp(&b.key));
    ordered.extend(section.drain(..).map(Tree::from));
}
