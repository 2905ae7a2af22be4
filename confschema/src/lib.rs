//! # confschema
//!
//! A JSON Schema flavored validation and coercion engine for configuration
//! documents.
//!
//! Configuration values come from hand-edited files, environment variables
//! and remote overrides, so this crate validates leniently: values that are
//! "close enough" to the declared type are coerced instead of rejected, and
//! documents with comments or trailing commas still parse.
//!
//! ## Features
//!
//! - Schema validation for types, numeric/string/array/object constraints,
//!   `enum`/`const` literals, `anyOf`/`oneOf`/`allOf`/`not` combinators and
//!   `if`/`then`/`else` conditionals
//! - Best-effort type coercion with a fixed, total conversion table
//! - Named string formats (`email`, `uri`, `date-time`, `uuid`, ...);
//!   unknown format names are accepted, never rejected
//! - Batch validation of keyed settings documents
//! - Default resolution, including synthesized object defaults
//! - Tolerant parsing of JSON with `//` and `/* */` comments and trailing
//!   commas, plus a canonical pretty formatter
//!
//! ## Quick Start
//!
//! ```rust
//! use confschema::{Schema, validate};
//! use serde_json::json;
//!
//! let schema = Schema::from_value(&json!({
//!     "type": "object",
//!     "properties": {
//!         "tabSize": {"type": "number", "minimum": 1},
//!     },
//! }))
//! .unwrap();
//!
//! // "4" is coerced to 4 and the rewritten document is reported
//! let result = validate(&json!({"tabSize": "4"}), &schema);
//! assert!(result.valid);
//! assert_eq!(result.coerced_value, Some(json!({"tabSize": 4})));
//!
//! let result = validate(&json!({"tabSize": 0}), &schema);
//! assert!(!result.valid);
//! assert_eq!(result.errors[0].path, "tabSize");
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Typed schema tree parsed from JSON documents
//! - [`validator`] - Recursive validation with coercion
//! - [`coerce`] - The type conversion table
//! - [`format`] - Named string-format predicates
//! - [`defaults`] - Default value resolution
//! - [`parse`] - Tolerant parsing and canonical formatting
//! - [`result`] - Validation outcome types
//! - [`error`] - Schema and parse error types

/// Best-effort type coercion between JSON value kinds.
pub mod coerce;

/// Default value resolution for schema nodes.
pub mod defaults;

/// Error types for schema loading and document parsing.
pub mod error;

/// Named string-format predicates.
pub mod format;

/// Tolerant configuration-document parsing and formatting.
pub mod parse;

/// Validation outcome types.
pub mod result;

/// Typed schema tree parsed from JSON Schema flavored documents.
pub mod schema;

/// Recursive schema validation with best-effort coercion.
pub mod validator;

/// Runtime kind inspection and loose equality over JSON values.
pub mod value;

// Re-export main types for convenience
pub use coerce::{coerce, coerce_to};
pub use defaults::default_value;
pub use error::{ParseError, SchemaError};
pub use format::check_format;
pub use parse::{format_config, format_config_indent, parse_config};
pub use result::{ValidationError, ValidationResult, ValidationWarning, WarningKind};
pub use schema::{AdditionalProperties, Items, Schema, SchemaType, TypeSet};
pub use validator::{validate, validate_all};
pub use value::{ValueKind, deep_equal};

pub use serde_json::Value;
