//! Validation outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single validity-affecting finding, located by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Locator of the offending value, e.g. `"editor.rulers[1]"`. Empty at
    /// the document root.
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Category of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    /// The setting still works but should be migrated.
    Deprecation,
}

/// A non-fatal finding. Warnings never affect [`ValidationResult::valid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning category.
    #[serde(rename = "type")]
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: String,
}

/// Aggregate outcome of validating a value against a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True exactly when `errors` is empty.
    pub valid: bool,
    /// Validity-affecting findings, in schema traversal order.
    pub errors: Vec<ValidationError>,
    /// Non-fatal findings such as deprecation notices.
    pub warnings: Vec<ValidationWarning>,
    /// Rewritten value when validation passed and a coercion changed the
    /// representation. Absent when the input already matched, and always
    /// absent on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coerced_value: Option<Value>,
}
