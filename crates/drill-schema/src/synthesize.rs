//! Default value synthesis
//!
//! Builds a structurally complete default value from an [`EffectiveSchema`].
//! Synthesis only walks the effective schema; it never performs lookups.

use crate::effective::{Child, EffectiveSchema, Shape};
use serde_json::{Map, Number, Value};

/// Synthesize the default value for `schema`
///
/// First match wins:
/// 1. explicit `default` (deep copy)
/// 2. first `enum` value
/// 3. by type: `""`, `minimum` or `0`, `false`, `[]`, an object of
///    synthesized properties in declaration order, `null` for unknown
///
/// Arrays are always empty; items are only appended by explicit adds.
/// Deferred and unresolved properties synthesize to `null`.
#[must_use]
pub fn synthesize(schema: &EffectiveSchema) -> Value {
    if let Some(default) = &schema.default {
        return default.clone();
    }
    if let Some(first) = schema.enum_values.first() {
        return first.clone();
    }

    match &schema.shape {
        Shape::String => Value::String(String::new()),
        Shape::Number => schema
            .minimum
            .clone()
            .map_or_else(|| Value::Number(0.into()), Value::Number),
        Shape::Integer => Value::Number(
            schema
                .minimum
                .as_ref()
                .map_or_else(|| 0.into(), integer_lower_bound),
        ),
        Shape::Boolean => Value::Bool(false),
        Shape::Array { .. } => Value::Array(Vec::new()),
        Shape::Object { properties } => Value::Object(
            properties
                .iter()
                .map(|(name, child)| (name.clone(), synthesize_child(child)))
                .collect::<Map<String, Value>>(),
        ),
        Shape::Unknown => Value::Null,
    }
}

/// Synthesize a child slot; only resolved children have a shape to follow
#[must_use]
pub fn synthesize_child(child: &Child) -> Value {
    match child {
        Child::Resolved(schema) => synthesize(schema),
        Child::Deferred(_) | Child::Unresolved(_) => Value::Null,
    }
}

/// Smallest whole number not below `minimum`
fn integer_lower_bound(minimum: &Number) -> Number {
    if minimum.is_i64() || minimum.is_u64() {
        return minimum.clone();
    }
    #[allow(clippy::cast_possible_truncation)]
    let rounded = minimum.as_f64().map_or(0, |f| f.ceil() as i64);
    rounded.into()
}
