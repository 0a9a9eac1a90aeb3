//! Effective schemas
//!
//! An [`EffectiveSchema`] is a schema node with named references expanded
//! into a concrete object/array/primitive shape. Children that could not be
//! expanded stay visible as [`Child::Deferred`] or [`Child::Unresolved`].

use crate::error::SchemaDiagnostic;
use crate::schema::{PrimitiveType, Schema};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Number, Value};
use std::sync::Arc;

/// Concrete shape of an effective schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    String,
    Number,
    Integer,
    Boolean,
    Array {
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Child>,
    },
    Object {
        properties: IndexMap<String, Child>,
    },
    /// Untyped leaf: not navigable, not editable
    #[serde(rename = "null")]
    Unknown,
}

impl From<PrimitiveType> for Shape {
    fn from(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::String => Self::String,
            PrimitiveType::Number => Self::Number,
            PrimitiveType::Integer => Self::Integer,
            PrimitiveType::Boolean => Self::Boolean,
        }
    }
}

/// Resolution state of a nested schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resolution", rename_all = "lowercase")]
pub enum Child {
    /// Fully expanded
    Resolved(Arc<EffectiveSchema>),
    /// Re-enters a reference already being expanded; resolved on demand
    Deferred(Arc<Schema>),
    /// Expansion failed
    Unresolved(SchemaDiagnostic),
}

impl Child {
    /// Expanded schema, if resolved
    #[inline]
    #[must_use]
    pub fn resolved(&self) -> Option<&Arc<EffectiveSchema>> {
        match self {
            Self::Resolved(schema) => Some(schema),
            Self::Deferred(_) | Self::Unresolved(_) => None,
        }
    }

    /// Check if this child still needs a resolution pass
    #[inline]
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// Schema with all reachable named references expanded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSchema {
    /// Concrete shape
    #[serde(flatten)]
    pub shape: Shape,

    /// Explicit default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    /// Lower bound for numeric types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    /// Names of required properties
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,

    /// Human-readable label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Longer human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Named schema this was expanded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_from: Option<String>,
}

impl EffectiveSchema {
    /// Bare schema of the given shape
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            default: None,
            enum_values: Vec::new(),
            minimum: None,
            required: IndexSet::new(),
            title: None,
            description: None,
            resolved_from: None,
        }
    }

    /// Shape plus the annotations carried by an authored node
    #[must_use]
    pub fn from_node(shape: Shape, node: &Schema) -> Self {
        Self {
            shape,
            default: node.default.clone(),
            enum_values: node.enum_values.clone().unwrap_or_default(),
            minimum: node.minimum.clone(),
            required: node.required.clone().unwrap_or_default(),
            title: node.title.clone(),
            description: node.description.clone(),
            resolved_from: None,
        }
    }

    /// Untyped placeholder leaf
    #[inline]
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(Shape::Unknown)
    }

    /// Check if columns can be opened beneath this schema
    #[inline]
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        matches!(self.shape, Shape::Array { .. } | Shape::Object { .. })
    }

    /// Check if this is an array schema
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array { .. })
    }

    /// Check if this is a string/number/integer/boolean schema
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.shape,
            Shape::String | Shape::Number | Shape::Integer | Shape::Boolean
        )
    }

    /// Declared type name as it appears in schema JSON
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.shape {
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Integer => "integer",
            Shape::Boolean => "boolean",
            Shape::Array { .. } => "array",
            Shape::Object { .. } => "object",
            Shape::Unknown => "null",
        }
    }

    /// Object properties, if this is an object schema
    #[inline]
    #[must_use]
    pub fn properties(&self) -> Option<&IndexMap<String, Child>> {
        match &self.shape {
            Shape::Object { properties } => Some(properties),
            _ => None,
        }
    }

    /// Named property, if this is an object schema declaring it
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Child> {
        self.properties().and_then(|properties| properties.get(name))
    }

    /// Item schema, if this is an array schema with items
    #[inline]
    #[must_use]
    pub fn items(&self) -> Option<&Child> {
        match &self.shape {
            Shape::Array { items } => items.as_ref(),
            _ => None,
        }
    }

    /// Copy of this array schema with its item slot replaced
    ///
    /// Returns `None` for non-array schemas.
    #[must_use]
    pub fn with_items(&self, items: Child) -> Option<Self> {
        if !self.is_array() {
            return None;
        }
        let mut upgraded = self.clone();
        upgraded.shape = Shape::Array { items: Some(items) };
        Some(upgraded)
    }

    /// Copy of this object schema with one property slot replaced
    ///
    /// Returns `None` if this is not an object declaring `name`.
    #[must_use]
    pub fn with_property(&self, name: &str, child: Child) -> Option<Self> {
        let mut upgraded = self.clone();
        match &mut upgraded.shape {
            Shape::Object { properties } => {
                let slot = properties.get_mut(name)?;
                *slot = child;
                Some(upgraded)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> Arc<EffectiveSchema> {
        Arc::new(EffectiveSchema::new(Shape::String))
    }

    #[test]
    fn navigability() {
        assert!(!EffectiveSchema::new(Shape::String).is_navigable());
        assert!(!EffectiveSchema::unknown().is_navigable());
        assert!(EffectiveSchema::new(Shape::Array { items: None }).is_navigable());
        assert!(EffectiveSchema::new(Shape::Object {
            properties: IndexMap::new()
        })
        .is_navigable());
    }

    #[test]
    fn with_items_upgrades_array_only() {
        let array = EffectiveSchema::new(Shape::Array {
            items: Some(Child::Deferred(Arc::new(Schema::reference("user", false)))),
        });
        let upgraded = array.with_items(Child::Resolved(string())).unwrap();
        assert!(upgraded.items().unwrap().resolved().is_some());
        assert!(EffectiveSchema::new(Shape::String)
            .with_items(Child::Resolved(string()))
            .is_none());
    }

    #[test]
    fn with_property_requires_declared_name() {
        let mut properties = IndexMap::new();
        properties.insert("a".to_string(), Child::Resolved(string()));
        let object = EffectiveSchema::new(Shape::Object { properties });
        assert!(object.with_property("b", Child::Resolved(string())).is_none());
        assert!(object.with_property("a", Child::Resolved(string())).is_some());
    }

    #[test]
    fn serializes_with_type_tag() {
        let mut properties = IndexMap::new();
        properties.insert("id".to_string(), Child::Resolved(string()));
        let mut schema = EffectiveSchema::new(Shape::Object { properties });
        schema.resolved_from = Some("user".into());

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["resolvedFrom"], "user");
        assert_eq!(json["properties"]["id"]["type"], "string");
        assert_eq!(json["properties"]["id"]["resolution"], "resolved");
        assert_eq!(json.get("enum"), None);
        assert_eq!(EffectiveSchema::unknown().type_name(), "null");
    }
}
