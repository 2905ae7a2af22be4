//! Error types for schema loading and document parsing.

use thiserror::Error;

/// Errors produced when converting a JSON value into a [`Schema`] tree.
///
/// [`Schema`]: crate::schema::Schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document is not a JSON object.
    #[error("schema must be a JSON object, found {found}")]
    NotAnObject {
        /// Runtime kind of the offending value.
        found: &'static str,
    },

    /// A known keyword has the wrong shape, e.g. a `type` that is neither
    /// a string nor a list of strings.
    #[error("invalid schema: {source}")]
    Invalid {
        #[from]
        source: serde_json::Error,
    },
}

/// Errors produced by the tolerant configuration parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not valid JSON even after comment and trailing-comma
    /// removal.
    #[error("invalid configuration JSON at offset {position}: {message}")]
    Syntax {
        /// Message from the strictest parse attempt that was tried last.
        message: String,
        /// Byte offset of the failure in the document.
        position: usize,
    },

    /// The document parsed, but the top level is not a JSON object.
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject {
        /// Runtime kind of the parsed top-level value.
        found: &'static str,
    },
}
