//! Option validation
//!
//! Validation runs over the whole recipe tree before a run starts. A
//! recipe with any failure prevents the run from visiting a single file.

use crate::options::OptionDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One rejected option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Option name
    pub property: String,
    pub message: String,
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// Accumulated validation outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    failures: Vec<ValidationFailure>,
}

impl Validation {
    /// Passing validation
    #[inline]
    #[must_use]
    pub fn valid() -> Self {
        Self::default()
    }

    /// Single failure
    #[must_use]
    pub fn invalid(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failures: vec![ValidationFailure {
                property: property.into(),
                message: message.into(),
            }],
        }
    }

    /// Fails for every required option whose value is null
    #[must_use]
    pub fn required_options(options: &[OptionDescriptor]) -> Self {
        options
            .iter()
            .filter(|o| o.required && o.value.is_null())
            .fold(Self::valid(), |v, o| v.and(Self::invalid(&o.name, "is required")))
    }

    /// Fails with `message` unless `condition` holds
    #[must_use]
    pub fn check(self, condition: bool, property: &str, message: &str) -> Self {
        if condition {
            self
        } else {
            self.and(Self::invalid(property, message))
        }
    }

    /// Combine two outcomes
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.failures.extend(other.failures);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    #[must_use]
    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(name: &str, required: bool, value: serde_json::Value) -> OptionDescriptor {
        OptionDescriptor::new(name, name, "").required(required).with_value(value)
    }

    #[test]
    fn missing_required_option_fails() {
        let options = [
            option("find", true, serde_json::Value::Null),
            option("replace", false, serde_json::Value::Null),
            option("key", true, json!("a")),
        ];
        let validation = Validation::required_options(&options);
        assert!(!validation.is_valid());
        assert_eq!(validation.failures().len(), 1);
        assert_eq!(validation.failures()[0].to_string(), "find: is required");
    }

    #[test]
    fn check_and_combine() {
        let validation = Validation::valid()
            .check(true, "a", "never")
            .check(false, "b", "must be positive");
        assert_eq!(validation.into_failures().len(), 1);
    }
}
