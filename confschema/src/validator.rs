//! Recursive schema validation with best-effort coercion.
//!
//! [`validate`] walks a value against a schema node in a fixed order:
//! declared type (with coercion on mismatch), `const`/`enum` literals,
//! per-kind constraints, combinators, conditionals, and deprecation
//! notices. Errors carry the dotted/bracketed path of the offending value
//! (`"editor.rulers[1]"`); warnings never affect validity. Malformed
//! schema fragments such as an unparseable `pattern` degrade to ordinary
//! validation errors, so one bad node cannot take down the document.
//!
//! Combinator and conditional sub-schemas run as probes: their verdict
//! counts, but coercions they would apply are discarded. Only `allOf`
//! branches and a selected `then`/`else` branch surface their own errors
//! and warnings, bound to the current node's path.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use regex::Regex;
use serde_json::{Map, Value};

use crate::coerce::coerce;
use crate::format::check_format;
use crate::result::{ValidationError, ValidationResult, ValidationWarning, WarningKind};
use crate::schema::{AdditionalProperties, Items, Schema};
use crate::value::{ValueKind, deep_equal};

/// Validate a value against a schema.
///
/// When the only problem with the input is its representation and the
/// coercion table can fix it, the result is valid and carries the
/// rewritten document as `coerced_value`.
pub fn validate(value: &Value, schema: &Schema) -> ValidationResult {
    let mut run = Run::default();
    let rewritten = run.node(value, schema, "");
    run.finish(rewritten)
}

/// Validate a keyed document against a keyed schema map.
///
/// Keys without a schema pass through untouched. Keys with one validate
/// independently, the key seeding the error path, and the aggregate is
/// valid only when every checked key is. When any key was coerced the
/// aggregate `coerced_value` holds the whole document with the rewritten
/// entries applied.
pub fn validate_all(
    values: &Map<String, Value>,
    schemas: &BTreeMap<String, Schema>,
) -> ValidationResult {
    let mut run = Run::default();
    let mut rewritten: Option<Map<String, Value>> = None;
    for (key, value) in values {
        let Some(schema) = schemas.get(key) else {
            continue;
        };
        if let Some(replacement) = run.node(value, schema, key) {
            rewritten
                .get_or_insert_with(|| values.clone())
                .insert(key.clone(), replacement);
        }
    }
    run.finish(rewritten.map(Value::Object))
}

impl Schema {
    /// Validate a value against this schema node.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        validate(value, self)
    }
}

/// Per-call validation state: collected findings plus a cache of compiled
/// schema regexes, keyed by source. `None` marks a pattern that does not
/// compile so it is reported once and never retried.
#[derive(Default)]
struct Run {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
    regexes: HashMap<String, Option<Regex>>,
}

impl Run {
    fn finish(self, rewritten: Option<Value>) -> ValidationResult {
        let valid = self.errors.is_empty();
        ValidationResult {
            valid,
            errors: self.errors,
            warnings: self.warnings,
            coerced_value: if valid { rewritten } else { None },
        }
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn regex(&mut self, source: &str) -> Option<Regex> {
        if let Some(cached) = self.regexes.get(source) {
            return cached.clone();
        }
        let compiled = match Regex::new(source) {
            Ok(re) => Some(re),
            Err(err) => {
                debug!("schema pattern {source:?} does not compile: {err}");
                None
            }
        };
        self.regexes.insert(source.to_string(), compiled.clone());
        compiled
    }

    /// Validate one node. Returns the rewritten subtree when this node or
    /// one of its children was coerced.
    fn node(&mut self, value: &Value, schema: &Schema, path: &str) -> Option<Value> {
        let mut rewritten: Option<Value> = None;
        let mut type_ok = true;

        if let Some(types) = &schema.schema_type
            && !types.matches(value)
        {
            match coerce(value, schema) {
                Some(replacement) => rewritten = Some(replacement),
                None => {
                    type_ok = false;
                    self.error(
                        path,
                        format!(
                            "Invalid type: expected {}, got {}",
                            types.describe(),
                            ValueKind::of(value).name()
                        ),
                    );
                }
            }
        }

        // Literal and structural checks are skipped on a type mismatch;
        // combinators and conditionals below still see the original value.
        if type_ok {
            self.check_literals(rewritten.as_ref().unwrap_or(value), schema, path);
            if let Some(deeper) = self.check_shape(rewritten.as_ref().unwrap_or(value), schema, path)
            {
                rewritten = Some(deeper);
            }
        }

        self.check_combinators(rewritten.as_ref().unwrap_or(value), schema, path);
        self.check_conditional(rewritten.as_ref().unwrap_or(value), schema, path);

        if let Some(message) = &schema.deprecation_message {
            self.warnings.push(ValidationWarning {
                kind: WarningKind::Deprecation,
                message: message.clone(),
            });
        }

        rewritten
    }

    /// `const` and `enum`, compared with loose deep equality.
    fn check_literals(&mut self, value: &Value, schema: &Schema, path: &str) {
        if let Some(expected) = &schema.const_value
            && !deep_equal(value, expected)
        {
            let message = match &schema.error_message {
                Some(custom) => custom.clone(),
                None => format!("Value must be {expected}"),
            };
            self.error(path, message);
        }

        if let Some(allowed) = &schema.enum_values
            && !allowed.iter().any(|candidate| deep_equal(value, candidate))
        {
            let message = match &schema.error_message {
                Some(custom) => custom.clone(),
                None => {
                    let listed: Vec<String> =
                        allowed.iter().map(|candidate| candidate.to_string()).collect();
                    format!("Value must be one of: {}", listed.join(", "))
                }
            };
            self.error(path, message);
        }
    }

    /// Constraints keyed on the runtime kind of the (possibly coerced)
    /// value. Constraints for other kinds are ignored, so `minimum` on a
    /// string schema is simply inert.
    fn check_shape(&mut self, value: &Value, schema: &Schema, path: &str) -> Option<Value> {
        match value {
            Value::Number(number) => {
                self.check_number(number, schema, path);
                None
            }
            Value::String(s) => {
                self.check_string(s, schema, path);
                None
            }
            Value::Array(elements) => self.check_array(elements, schema, path),
            Value::Object(fields) => self.check_object(fields, schema, path),
            _ => None,
        }
    }

    fn check_number(&mut self, number: &serde_json::Number, schema: &Schema, path: &str) {
        if !schema.accepts_number_repr(number) {
            self.error(path, "Value is not an integer");
        }
        let Some(n) = number.as_f64() else {
            return;
        };
        if let Some(min) = schema.minimum
            && n < min
        {
            self.error(path, format!("Value is below the minimum of {min}"));
        }
        if let Some(max) = schema.maximum
            && n > max
        {
            self.error(path, format!("Value exceeds the maximum of {max}"));
        }
        if let Some(bound) = schema.exclusive_minimum
            && n <= bound
        {
            self.error(path, format!("Value must be greater than {bound}"));
        }
        if let Some(bound) = schema.exclusive_maximum
            && n >= bound
        {
            self.error(path, format!("Value must be less than {bound}"));
        }
        if let Some(divisor) = schema.multiple_of
            && divisor != 0.0
            && n % divisor != 0.0
        {
            self.error(path, format!("Value must be a multiple of {divisor}"));
        }
    }

    fn check_string(&mut self, s: &str, schema: &Schema, path: &str) {
        // Lengths count characters, not bytes.
        let length = s.chars().count() as u64;
        if let Some(min) = schema.min_length
            && length < min
        {
            self.error(
                path,
                format!("String is shorter than the minimum length of {min}"),
            );
        }
        if let Some(max) = schema.max_length
            && length > max
        {
            self.error(
                path,
                format!("String is longer than the maximum length of {max}"),
            );
        }
        if let Some(pattern) = &schema.pattern {
            match self.regex(pattern) {
                Some(re) => {
                    if !re.is_match(s) {
                        self.error(path, format!("String does not match the pattern {pattern:?}"));
                    }
                }
                None => self.error(path, format!("Invalid regex: {pattern}")),
            }
        }
        if let Some(format) = &schema.format
            && !check_format(format, s)
        {
            self.error(path, format!("String is not a valid {format}"));
        }
    }

    fn check_array(&mut self, elements: &[Value], schema: &Schema, path: &str) -> Option<Value> {
        let count = elements.len() as u64;
        if let Some(min) = schema.min_items
            && count < min
        {
            self.error(path, format!("Array has fewer than {min} items"));
        }
        if let Some(max) = schema.max_items
            && count > max
        {
            self.error(path, format!("Array has more than {max} items"));
        }
        if schema.unique_items == Some(true) {
            'search: for (i, a) in elements.iter().enumerate() {
                for b in &elements[..i] {
                    if deep_equal(a, b) {
                        self.error(path, "Array items are not unique");
                        break 'search;
                    }
                }
            }
        }

        let mut patched: Vec<(usize, Value)> = Vec::new();
        match &schema.items {
            Some(Items::Uniform(element_schema)) => {
                for (i, element) in elements.iter().enumerate() {
                    let child = format!("{path}[{i}]");
                    if let Some(replacement) = self.node(element, element_schema, &child) {
                        patched.push((i, replacement));
                    }
                }
            }
            Some(Items::Positional(element_schemas)) => {
                // Extra elements beyond the listed schemas are unconstrained.
                for (i, (element, element_schema)) in
                    elements.iter().zip(element_schemas).enumerate()
                {
                    let child = format!("{path}[{i}]");
                    if let Some(replacement) = self.node(element, element_schema, &child) {
                        patched.push((i, replacement));
                    }
                }
            }
            None => {}
        }

        if patched.is_empty() {
            return None;
        }
        let mut rewritten = elements.to_vec();
        for (i, replacement) in patched {
            rewritten[i] = replacement;
        }
        Some(Value::Array(rewritten))
    }

    fn check_object(
        &mut self,
        fields: &Map<String, Value>,
        schema: &Schema,
        path: &str,
    ) -> Option<Value> {
        if let Some(required) = &schema.required {
            for name in required {
                if !fields.contains_key(name) {
                    self.error(path, format!("Missing required property {name:?}"));
                }
            }
        }

        let mut patched: Vec<(String, Value)> = Vec::new();

        if let Some(properties) = &schema.properties {
            for (name, property) in properties {
                if let Some(field) = fields.get(name) {
                    let child = join_path(path, name);
                    if let Some(replacement) = self.node(field, property, &child) {
                        patched.push((name.clone(), replacement));
                    }
                }
            }
        }

        if let Some(patterns) = &schema.pattern_properties {
            for (source, property) in patterns {
                let Some(re) = self.regex(source) else {
                    self.error(path, format!("Invalid regex: {source}"));
                    continue;
                };
                for (name, field) in fields {
                    if re.is_match(name) {
                        let child = join_path(path, name);
                        if let Some(replacement) = self.node(field, property, &child) {
                            patched.push((name.clone(), replacement));
                        }
                    }
                }
            }
        }

        match &schema.additional_properties {
            Some(AdditionalProperties::Allow(false)) => {
                for name in fields.keys() {
                    if !self.covered(name, schema) {
                        self.error(path, format!("Property {name:?} is not allowed"));
                    }
                }
            }
            Some(AdditionalProperties::Schema(extra)) => {
                for (name, field) in fields {
                    if !self.covered(name, schema) {
                        let child = join_path(path, name);
                        if let Some(replacement) = self.node(field, extra, &child) {
                            patched.push((name.clone(), replacement));
                        }
                    }
                }
            }
            Some(AdditionalProperties::Allow(true)) | None => {}
        }

        if patched.is_empty() {
            return None;
        }
        let mut rewritten = fields.clone();
        for (name, replacement) in patched {
            rewritten.insert(name, replacement);
        }
        Some(Value::Object(rewritten))
    }

    /// Whether a property name is covered by `properties` or a compiling
    /// `patternProperties` entry, and therefore exempt from
    /// `additionalProperties`.
    fn covered(&mut self, name: &str, schema: &Schema) -> bool {
        if let Some(properties) = &schema.properties
            && properties.contains_key(name)
        {
            return true;
        }
        if let Some(patterns) = &schema.pattern_properties {
            for source in patterns.keys() {
                if let Some(re) = self.regex(source)
                    && re.is_match(name)
                {
                    return true;
                }
            }
        }
        false
    }

    fn check_combinators(&mut self, value: &Value, schema: &Schema, path: &str) {
        if let Some(branches) = &schema.any_of {
            let matched = branches.iter().any(|branch| self.probe(value, branch));
            if !matched {
                self.error(path, "Value does not match any of the allowed schemas");
            }
        }

        if let Some(branches) = &schema.one_of {
            let matches = branches
                .iter()
                .filter(|branch| self.probe(value, branch))
                .count();
            if matches == 0 {
                self.error(path, "Value matches none of the expected schemas");
            } else if matches > 1 {
                self.error(
                    path,
                    format!("Value matches {matches} schemas, expected exactly one"),
                );
            }
        }

        if let Some(branches) = &schema.all_of {
            // allOf findings bind to this node; coercions a branch would
            // apply are discarded.
            for branch in branches {
                self.node(value, branch, path);
            }
        }

        if let Some(branch) = &schema.not
            && self.probe(value, branch)
        {
            self.error(path, "Value must not match the disallowed schema");
        }
    }

    /// `if`/`then`/`else`. A bare `then` or `else` without `if` is inert,
    /// and the `if` verdict itself is never surfaced.
    fn check_conditional(&mut self, value: &Value, schema: &Schema, path: &str) {
        let Some(condition) = &schema.if_schema else {
            return;
        };
        let branch = if self.probe(value, condition) {
            schema.then_schema.as_deref()
        } else {
            schema.else_schema.as_deref()
        };
        if let Some(branch) = branch {
            self.node(value, branch, path);
        }
    }

    /// Validate as a predicate: the verdict is returned, findings and
    /// coercions are discarded. The regex cache is shared with the probe.
    fn probe(&mut self, value: &Value, schema: &Schema) -> bool {
        let mut scratch = Run {
            errors: Vec::new(),
            warnings: Vec::new(),
            regexes: std::mem::take(&mut self.regexes),
        };
        scratch.node(value, schema, "");
        self.regexes = scratch.regexes;
        scratch.errors.is_empty()
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}
