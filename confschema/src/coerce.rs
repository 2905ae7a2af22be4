//! Best-effort type coercion between JSON value kinds.
//!
//! Configuration values arrive from editors, environment variables and
//! command lines, so "close enough" representations are converted rather
//! than rejected:
//!
//! - numeric strings become numbers (`"42"` -> `42`)
//! - `"true"`/`"1"`/`"yes"`/`"on"` style strings become booleans
//! - the exact string `"null"` becomes `null`
//! - JSON-encoded strings become arrays or objects when they parse to one
//! - numbers and booleans become their textual representation
//! - numbers become booleans by zero/non-zero
//!
//! The conversion table is fixed and total: every `(value, target)` pair
//! either produces a value or fails, and no input panics. Pairs outside the
//! table (an object asked to become a number, say) always fail.

use serde_json::{Number, Value};

use crate::schema::{Schema, SchemaType};

/// Attempt to coerce `value` to one of `schema`'s declared types.
///
/// Returns the value unchanged when the schema declares no type or the
/// runtime type already matches, the converted value when a table rule
/// applies, and `None` when no rule does. Multi-type schemas try each
/// declared type in order and keep the first success.
pub fn coerce(value: &Value, schema: &Schema) -> Option<Value> {
    let Some(types) = &schema.schema_type else {
        return Some(value.clone());
    };
    if types.matches(value) {
        return Some(value.clone());
    }
    types.iter().find_map(|target| coerce_to(value, target))
}

/// Apply the conversion table for a single target type.
pub fn coerce_to(value: &Value, target: SchemaType) -> Option<Value> {
    if target.matches(value) {
        return Some(value.clone());
    }
    match (value, target) {
        (Value::String(s), SchemaType::Number) => parse_number(s).map(Value::Number),
        (Value::String(s), SchemaType::Integer) => {
            integral_number(&parse_number(s)?).map(Value::Number)
        }
        (Value::String(s), SchemaType::Boolean) => parse_boolean(s).map(Value::Bool),
        (Value::String(s), SchemaType::Null) => (s == "null").then_some(Value::Null),
        (Value::String(s), SchemaType::Array) => match serde_json::from_str(s) {
            Ok(parsed @ Value::Array(_)) => Some(parsed),
            _ => None,
        },
        (Value::String(s), SchemaType::Object) => match serde_json::from_str(s) {
            Ok(parsed @ Value::Object(_)) => Some(parsed),
            _ => None,
        },
        (Value::Number(n), SchemaType::String) => Some(Value::String(n.to_string())),
        (Value::Number(n), SchemaType::Boolean) => {
            Some(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)))
        }
        (Value::Bool(b), SchemaType::String) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

/// Parse a string as a strict JSON number, ignoring surrounding whitespace.
fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Reject numbers with a fractional part; normalize integral floats.
fn integral_number(number: &Number) -> Option<Number> {
    if number.is_i64() || number.is_u64() {
        return Some(number.clone());
    }
    let f = number.as_f64()?;
    if f.fract() != 0.0 {
        return None;
    }
    if (i64::MIN as f64..=i64::MAX as f64).contains(&f) {
        Some(Number::from(f as i64))
    } else {
        Number::from_f64(f)
    }
}

fn parse_boolean(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn schema(doc: serde_json::Value) -> Schema {
        Schema::from_value(&doc).unwrap()
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(coerce_to(&json!("42"), SchemaType::Number), Some(json!(42)));
        assert_eq!(coerce_to(&json!("4.5"), SchemaType::Number), Some(json!(4.5)));
        assert_eq!(
            coerce_to(&json!(" -1e2 "), SchemaType::Number),
            Some(json!(-100.0))
        );
        assert_eq!(coerce_to(&json!("abc"), SchemaType::Number), None);
        assert_eq!(coerce_to(&json!(""), SchemaType::Number), None);
        assert_eq!(coerce_to(&json!("0x10"), SchemaType::Number), None);
        assert_eq!(coerce_to(&json!("1,000"), SchemaType::Number), None);
    }

    #[test]
    fn test_string_to_integer() {
        assert_eq!(coerce_to(&json!("7"), SchemaType::Integer), Some(json!(7)));
        assert_eq!(coerce_to(&json!("7.0"), SchemaType::Integer), Some(json!(7)));
        assert_eq!(coerce_to(&json!("7.5"), SchemaType::Integer), None);
        assert_eq!(coerce_to(&json!("-3"), SchemaType::Integer), Some(json!(-3)));
    }

    #[test]
    fn test_string_to_boolean() {
        for s in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(coerce_to(&json!(s), SchemaType::Boolean), Some(json!(true)));
        }
        for s in ["false", "0", "No", "OFF"] {
            assert_eq!(coerce_to(&json!(s), SchemaType::Boolean), Some(json!(false)));
        }
        assert_eq!(coerce_to(&json!("maybe"), SchemaType::Boolean), None);
        assert_eq!(coerce_to(&json!(""), SchemaType::Boolean), None);
    }

    #[test]
    fn test_string_to_null() {
        assert_eq!(coerce_to(&json!("null"), SchemaType::Null), Some(json!(null)));
        assert_eq!(coerce_to(&json!("NULL"), SchemaType::Null), None);
        assert_eq!(coerce_to(&json!(" null"), SchemaType::Null), None);
    }

    #[test]
    fn test_string_to_containers() {
        assert_eq!(
            coerce_to(&json!("[1, 2]"), SchemaType::Array),
            Some(json!([1, 2]))
        );
        assert_eq!(coerce_to(&json!("{\"a\": 1}"), SchemaType::Array), None);
        assert_eq!(
            coerce_to(&json!("{\"a\": 1}"), SchemaType::Object),
            Some(json!({"a": 1}))
        );
        assert_eq!(coerce_to(&json!("[1, 2"), SchemaType::Array), None);
        assert_eq!(coerce_to(&json!("not json"), SchemaType::Object), None);
    }

    #[test]
    fn test_scalars_to_string() {
        assert_eq!(coerce_to(&json!(42), SchemaType::String), Some(json!("42")));
        assert_eq!(coerce_to(&json!(4.5), SchemaType::String), Some(json!("4.5")));
        assert_eq!(coerce_to(&json!(true), SchemaType::String), Some(json!("true")));
        assert_eq!(coerce_to(&json!(false), SchemaType::String), Some(json!("false")));
    }

    #[test]
    fn test_number_to_boolean() {
        assert_eq!(coerce_to(&json!(0), SchemaType::Boolean), Some(json!(false)));
        assert_eq!(coerce_to(&json!(0.0), SchemaType::Boolean), Some(json!(false)));
        assert_eq!(coerce_to(&json!(2), SchemaType::Boolean), Some(json!(true)));
        assert_eq!(coerce_to(&json!(-0.5), SchemaType::Boolean), Some(json!(true)));
    }

    #[test]
    fn test_pairs_outside_the_table_fail() {
        assert_eq!(coerce_to(&json!({"a": 1}), SchemaType::Number), None);
        assert_eq!(coerce_to(&json!([1]), SchemaType::Boolean), None);
        assert_eq!(coerce_to(&json!(null), SchemaType::String), None);
        assert_eq!(coerce_to(&json!(true), SchemaType::Number), None);
    }

    #[test]
    fn test_matching_type_passes_through() {
        let s = schema(json!({"type": "number"}));
        assert_eq!(coerce(&json!(4.5), &s), Some(json!(4.5)));

        let untyped = schema(json!({}));
        assert_eq!(coerce(&json!("anything"), &untyped), Some(json!("anything")));
    }

    #[test]
    fn test_multi_type_tries_in_order() {
        // "1" converts to both number and boolean; number is declared first
        let s = schema(json!({"type": ["number", "boolean"]}));
        assert_eq!(coerce(&json!("1"), &s), Some(json!(1)));

        let flipped = schema(json!({"type": ["boolean", "number"]}));
        assert_eq!(coerce(&json!("1"), &flipped), Some(json!(true)));
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let s = schema(json!({"type": "integer"}));
        let once = coerce(&json!("42"), &s).unwrap();
        assert_eq!(coerce(&once, &s), Some(once.clone()));
    }
}
