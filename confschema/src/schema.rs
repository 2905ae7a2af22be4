//! Typed schema tree parsed from JSON Schema flavored documents.
//!
//! A [`Schema`] is one node of the tree. Every field is optional and an
//! empty schema accepts any value. Unknown keywords in the source document
//! are ignored so schemas written for richer dialects still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SchemaError;
use crate::value::{ValueKind, is_integral};

/// Scalar type kinds a schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    /// Keyword used in schema documents and error messages.
    pub fn name(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    /// Whether a value's runtime type satisfies this declared type.
    ///
    /// `integer` accepts any JSON number here; integral-ness is enforced by
    /// the numeric constraint checks so that `1.5` against `integer` reports
    /// "not an integer" rather than a blunt type mismatch.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            SchemaType::String => value.is_string(),
            SchemaType::Number | SchemaType::Integer => value.is_number(),
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Array => value.is_array(),
            SchemaType::Object => value.is_object(),
            SchemaType::Null => value.is_null(),
        }
    }
}

/// One declared type or a set of acceptable types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    /// A single acceptable type: `"type": "string"`.
    One(SchemaType),
    /// Any of the listed types: `"type": ["string", "null"]`.
    Many(Vec<SchemaType>),
}

impl TypeSet {
    /// Iterate over the declared types in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = SchemaType> + '_ {
        match self {
            TypeSet::One(t) => std::slice::from_ref(t).iter().copied(),
            TypeSet::Many(list) => list.iter().copied(),
        }
    }

    /// Whether the set contains the given type.
    pub fn contains(&self, t: SchemaType) -> bool {
        self.iter().any(|candidate| candidate == t)
    }

    /// Whether the value's runtime type matches any declared type.
    pub fn matches(&self, value: &Value) -> bool {
        self.iter().any(|t| t.matches(value))
    }

    /// Declared types joined for error messages, e.g. `"string or number"`.
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.iter().map(SchemaType::name).collect();
        names.join(" or ")
    }
}

/// `items` keyword: one schema for all elements or a positional list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Every element validates against the same schema.
    Uniform(Box<Schema>),
    /// Elements validate positionally; extra elements are unconstrained.
    Positional(Vec<Schema>),
}

/// `additionalProperties` keyword: a blanket allow/deny, or a schema that
/// keys not covered by `properties`/`patternProperties` must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allow(bool),
    Schema(Box<Schema>),
}

/// A single schema node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    /// Declared acceptable type or set of types.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    /// Inclusive lower bound for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Exclusive lower bound for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    /// Exclusive upper bound for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// Required divisor for numeric values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    /// Minimum string length, counted in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length, counted in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression the string must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Named format the string must satisfy, e.g. `"email"` or `"uuid"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Element schema(s) for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    /// Minimum number of array elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum number of array elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Whether array elements must be pairwise distinct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    /// Schemas for named object properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Property names that must be present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Policy for properties not named in `properties`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    /// Schemas keyed by regex over property names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<BTreeMap<String, Schema>>,

    /// Closed set of acceptable values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Single acceptable value. `Some(Value::Null)` means `"const": null`.
    #[serde(
        rename = "const",
        deserialize_with = "value_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub const_value: Option<Value>,

    /// At least one sub-schema must accept the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    /// Exactly one sub-schema must accept the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    /// Every sub-schema must accept the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    /// The sub-schema must reject the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,

    /// Condition schema selecting between `then` and `else`.
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<Box<Schema>>,
    /// Applied when `if` accepts the value.
    #[serde(rename = "then", skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<Box<Schema>>,
    /// Applied when `if` rejects the value.
    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<Box<Schema>>,

    /// Default value. `Some(Value::Null)` means `"default": null`.
    #[serde(
        deserialize_with = "value_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Marks the setting as deprecated; surfaced as a warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    /// Overrides the default message for literal-constraint failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Display description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Keeps an explicit `null` distinct from an absent field: `Option<Value>`
/// would otherwise fold `"default": null` into `None`.
fn value_or_null<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Schema {
    /// Parse a schema node from a JSON value.
    ///
    /// Unknown keywords are ignored. A document that is not a JSON object,
    /// or whose known keywords have the wrong shape, is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAnObject`] for non-object documents and
    /// [`SchemaError::Invalid`] for malformed keywords.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::NotAnObject {
                found: ValueKind::of(value).name(),
            });
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Whether a declared `integer` demand applies to this node.
    ///
    /// True when the type set names `integer` without also naming `number`
    /// (a set with both lets any numeric value through).
    pub(crate) fn demands_integer(&self) -> bool {
        self.schema_type.as_ref().is_some_and(|types| {
            types.contains(SchemaType::Integer) && !types.contains(SchemaType::Number)
        })
    }

    /// Whether a number satisfies this node's integer demand, if any.
    pub(crate) fn accepts_number_repr(&self, number: &serde_json::Number) -> bool {
        !self.demands_integer() || is_integral(number)
    }
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Schema::from_value(value)
    }
}
