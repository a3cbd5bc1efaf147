//! Built-in recipes
//!
//! Each recipe takes a serde options struct, so the catalog can build it
//! from JSON or TOML.

mod parse_failures;
mod properties;
mod text;

pub use parse_failures::{FindParseFailures, FindParseFailuresOptions};
pub use properties::{
    AddProperty, AddPropertyOptions, ChangePropertyKey, ChangePropertyKeyOptions,
    ChangePropertyValue, ChangePropertyValueOptions, DeleteProperty, DeletePropertyOptions,
    OrderProperties,
};
pub use text::{
    ChangeText, ChangeTextOptions, CreateTextFile, CreateTextFileOptions, FindText, FindTextOptions,
};
