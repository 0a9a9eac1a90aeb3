//! Schema nodes as authored
//!
//! A [`Schema`] is the JSON-Schema-like node exactly as it comes out of the
//! schema registry or an entity definition. Named references are still
//! unexpanded here; see [`crate::resolver`] for the effective form.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Declared `type` of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Reference to a named schema held by the registry
    JsonschemaReference,
    /// Explicitly untyped; treated the same as an absent `type`
    Undefined,
}

/// Scalar kinds that have no navigable children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
}

/// A schema node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Declared type; absent means "infer from shape"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Object properties in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    /// Array item schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Allowed values, first one is the synthesized default
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Explicit default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Names of required properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<IndexSet<String>>,

    /// Lower bound for numeric types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Longer human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Target of a `jsonschema-reference` node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_schema_name: Option<String>,

    /// Reference is "array of referenced entity"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
}

/// Classified shape of a schema node
///
/// Produced by [`Schema::kind`]; resolution dispatches on this instead of
/// branching on raw fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    Primitive(PrimitiveType),
    Array(Option<&'a Schema>),
    Object(Option<&'a IndexMap<String, Schema>>),
    Reference {
        name: Option<&'a str>,
        multiple: bool,
    },
    /// No type and nothing to infer from
    Unknown,
}

impl Schema {
    /// Create a node with only a type set
    #[inline]
    #[must_use]
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Object node with the given properties
    #[must_use]
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self {
            schema_type: Some(SchemaType::Object),
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.into(), schema))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Array node with the given item schema
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// Reference node pointing at a named schema
    #[must_use]
    pub fn reference(name: impl Into<String>, multiple: bool) -> Self {
        Self {
            schema_type: Some(SchemaType::JsonschemaReference),
            referenced_schema_name: Some(name.into()),
            multiple: Some(multiple),
            ..Self::default()
        }
    }

    /// With explicit default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// With enum values
    #[inline]
    #[must_use]
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Classify this node
    ///
    /// Precedence is fixed: an explicit `type` wins; without one (or with
    /// `undefined`), `properties` means object, then `items` means array,
    /// otherwise the node is [`SchemaKind::Unknown`]. `properties` is
    /// checked before `items`.
    #[must_use]
    pub fn kind(&self) -> SchemaKind<'_> {
        match self.schema_type {
            Some(SchemaType::String) => SchemaKind::Primitive(PrimitiveType::String),
            Some(SchemaType::Number) => SchemaKind::Primitive(PrimitiveType::Number),
            Some(SchemaType::Integer) => SchemaKind::Primitive(PrimitiveType::Integer),
            Some(SchemaType::Boolean) => SchemaKind::Primitive(PrimitiveType::Boolean),
            Some(SchemaType::Array) => SchemaKind::Array(self.items.as_deref()),
            Some(SchemaType::Object) => SchemaKind::Object(self.properties.as_ref()),
            Some(SchemaType::JsonschemaReference) => SchemaKind::Reference {
                name: self.referenced_schema_name.as_deref(),
                multiple: self.multiple.unwrap_or(false),
            },
            Some(SchemaType::Undefined) | None => self.inferred_kind(),
        }
    }

    fn inferred_kind(&self) -> SchemaKind<'_> {
        if let Some(properties) = &self.properties {
            SchemaKind::Object(Some(properties))
        } else if let Some(items) = &self.items {
            SchemaKind::Array(Some(items))
        } else {
            SchemaKind::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_camel_case_reference() {
        let schema = parse(json!({
            "type": "jsonschema-reference",
            "referencedSchemaName": "user",
            "multiple": true
        }));
        assert_eq!(
            schema.kind(),
            SchemaKind::Reference {
                name: Some("user"),
                multiple: true
            }
        );
    }

    #[test]
    fn properties_preserve_declaration_order() {
        let schema = parse(json!({
            "type": "object",
            "properties": { "z": {"type": "string"}, "a": {"type": "number"} }
        }));
        let names: Vec<_> = schema.properties.unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn typeless_with_properties_is_object() {
        let schema = parse(json!({ "properties": {} }));
        assert!(matches!(schema.kind(), SchemaKind::Object(Some(_))));
    }

    #[test]
    fn typeless_with_items_is_array() {
        let schema = parse(json!({ "items": {"type": "string"} }));
        assert!(matches!(schema.kind(), SchemaKind::Array(Some(_))));
    }

    #[test]
    fn properties_checked_before_items() {
        let schema = parse(json!({
            "properties": { "a": {"type": "string"} },
            "items": {"type": "string"}
        }));
        assert!(matches!(schema.kind(), SchemaKind::Object(Some(_))));
    }

    #[test]
    fn undefined_type_infers() {
        let schema = parse(json!({ "type": "undefined", "items": {} }));
        assert!(matches!(schema.kind(), SchemaKind::Array(Some(_))));
        assert_eq!(parse(json!({ "type": "undefined" })).kind(), SchemaKind::Unknown);
    }

    #[test]
    fn bare_node_is_unknown() {
        assert_eq!(parse(json!({})).kind(), SchemaKind::Unknown);
    }

    #[test]
    fn reference_defaults_to_single() {
        let schema = parse(json!({
            "type": "jsonschema-reference",
            "referencedSchemaName": "user"
        }));
        assert!(matches!(
            schema.kind(),
            SchemaKind::Reference { multiple: false, .. }
        ));
    }
}
