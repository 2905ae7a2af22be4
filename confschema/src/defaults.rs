//! Default value resolution for schema nodes.

use serde_json::{Map, Value};

use crate::schema::{Schema, SchemaType};

/// Compute the default value described by a schema.
///
/// An explicit `default` always wins, including an explicit `null`. Object
/// schemas with `properties` synthesize a default from the properties that
/// themselves resolve one; properties without a default are omitted, and if
/// none resolves the object has no default either. Array schemas default to
/// an empty array. Everything else has no default.
pub fn default_value(schema: &Schema) -> Option<Value> {
    if let Some(explicit) = &schema.default {
        return Some(explicit.clone());
    }
    let types = schema.schema_type.as_ref()?;

    if types.contains(SchemaType::Object)
        && let Some(properties) = &schema.properties
    {
        let mut fields = Map::new();
        for (name, property) in properties {
            if let Some(value) = default_value(property) {
                fields.insert(name.clone(), value);
            }
        }
        return if fields.is_empty() {
            None
        } else {
            Some(Value::Object(fields))
        };
    }

    if types.contains(SchemaType::Array) {
        return Some(Value::Array(Vec::new()));
    }

    None
}

impl Schema {
    /// Compute this schema's default value, if any.
    pub fn default_value(&self) -> Option<Value> {
        default_value(self)
    }
}
