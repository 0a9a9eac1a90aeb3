//! Effective schema resolution
//!
//! [`SchemaResolver`] expands `jsonschema-reference` nodes through the
//! session [`SchemaCache`] and produces [`EffectiveSchema`]s.
//!
//! # Reference handling
//!
//! - single reference: the effective schema is the resolved target
//! - `multiple` reference: an array whose items are the resolved target
//!
//! Resolution tracks the chain of names being expanded. A nested reference
//! that would re-enter a name on the chain is kept as [`Child::Deferred`]
//! and expanded later by [`SchemaResolver::settle`], so self-referential
//! schemas resolve one level at a time. A reference that aliases itself
//! directly is a [`SchemaError::ReferenceCycle`]; chains longer than the
//! configured depth are [`SchemaError::ReferenceDepthExceeded`].
//!
//! Expanded named schemas are memoized in the session cache unless they
//! deferred to a name further up the chain, so a schema referenced from
//! many places is expanded once per session.

use crate::cache::SchemaCache;
use crate::effective::{Child, EffectiveSchema, Shape};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Schema, SchemaKind};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use indexmap::IndexMap;
use std::sync::Arc;

/// Default cap on nested reference expansion
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 32;

/// Resolves schema nodes into effective schemas
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    cache: SchemaCache,
    max_reference_depth: usize,
}

impl SchemaResolver {
    /// Create resolver over a session cache
    #[inline]
    #[must_use]
    pub fn new(cache: SchemaCache) -> Self {
        Self {
            cache,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }

    /// With reference depth cap
    #[inline]
    #[must_use]
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// Session cache backing this resolver
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Resolve a schema node into its effective schema
    ///
    /// # Errors
    /// - `SchemaError::NotFound` if a reference target does not exist
    /// - `SchemaError::MissingReferenceName` for a nameless reference node
    /// - `SchemaError::ReferenceCycle` / `ReferenceDepthExceeded` for runaway chains
    ///
    /// Failures of nested children do not fail the parent; they are kept as
    /// [`Child::Unresolved`].
    pub async fn resolve(&self, schema: &Schema) -> SchemaResult<EffectiveSchema> {
        let (effective, _) = self.resolve_in(schema, &[]).await?;
        Ok(effective)
    }

    /// Resolve the schema registered under `name`
    ///
    /// # Errors
    /// Same as [`SchemaResolver::resolve`]
    pub async fn resolve_named(&self, name: &str) -> SchemaResult<EffectiveSchema> {
        self.resolve(&Schema::reference(name, false)).await
    }

    /// Bring a child slot to its final state
    ///
    /// Deferred children are resolved now; resolved and unresolved children
    /// are returned unchanged. The result is never [`Child::Deferred`].
    pub async fn settle(&self, child: &Child) -> Child {
        match child {
            Child::Deferred(schema) => match self.resolve(schema).await {
                Ok(effective) => Child::Resolved(Arc::new(effective)),
                Err(err) => {
                    tracing::warn!(error = %err, "deferred schema failed to resolve");
                    Child::Unresolved(err.diagnostic())
                }
            },
            other => other.clone(),
        }
    }

    fn resolve_in<'a>(
        &'a self,
        schema: &'a Schema,
        chain: &'a [String],
    ) -> BoxFuture<'a, SchemaResult<(EffectiveSchema, Anchor)>> {
        async move {
            match schema.kind() {
                SchemaKind::Primitive(primitive) => Ok((
                    EffectiveSchema::from_node(primitive.into(), schema),
                    None,
                )),
                SchemaKind::Unknown => Ok((EffectiveSchema::from_node(Shape::Unknown, schema), None)),
                SchemaKind::Array(items) => {
                    let (items, anchor) = match items {
                        Some(items) => {
                            let (child, anchor) = self.child_in(items, chain).await;
                            (Some(child), anchor)
                        }
                        None => (None, None),
                    };
                    Ok((
                        EffectiveSchema::from_node(Shape::Array { items }, schema),
                        anchor,
                    ))
                }
                SchemaKind::Object(properties) => {
                    let (properties, anchor) = match properties {
                        Some(properties) => self.properties_in(properties, chain).await,
                        None => (IndexMap::new(), None),
                    };
                    Ok((
                        EffectiveSchema::from_node(Shape::Object { properties }, schema),
                        anchor,
                    ))
                }
                SchemaKind::Reference { name: None, .. } => Err(SchemaError::MissingReferenceName),
                SchemaKind::Reference {
                    name: Some(name),
                    multiple: true,
                } => {
                    let (items, anchor) = match chain.iter().position(|n| n == name) {
                        Some(at) => (
                            Child::Deferred(Arc::new(Schema::reference(name, false))),
                            Some(at),
                        ),
                        None => {
                            let (target, anchor) = self.expand(name, chain).await?;
                            (Child::Resolved(target), anchor)
                        }
                    };
                    let mut effective =
                        EffectiveSchema::from_node(Shape::Array { items: Some(items) }, schema);
                    effective.resolved_from = Some(name.to_string());
                    Ok((effective, anchor))
                }
                SchemaKind::Reference {
                    name: Some(name),
                    multiple: false,
                } => {
                    let (target, anchor) = self.expand(name, chain).await?;
                    let mut effective = (*target).clone();
                    overlay_annotations(&mut effective, schema);
                    Ok((effective, anchor))
                }
            }
        }
        .boxed()
    }

    /// Look up `name` and resolve its target with `name` pushed on the chain
    ///
    /// A target whose expansion does not depend on the outer chain is
    /// memoized in the session cache and shared by later references.
    async fn expand(
        &self,
        name: &str,
        chain: &[String],
    ) -> SchemaResult<(Arc<EffectiveSchema>, Anchor)> {
        if chain.iter().any(|n| n == name) {
            return Err(SchemaError::ReferenceCycle {
                name: name.to_string(),
            });
        }
        if chain.len() >= self.max_reference_depth {
            return Err(SchemaError::ReferenceDepthExceeded {
                name: name.to_string(),
                depth: self.max_reference_depth,
            });
        }
        if let Some(memoized) = self.cache.get_resolved(name).await {
            return Ok((memoized, None));
        }

        tracing::debug!(schema = name, depth = chain.len(), "expanding reference");
        let target = self.cache.get_or_fetch(name).await?;

        let mut next = chain.to_vec();
        next.push(name.to_string());
        let (mut effective, anchor) = self.resolve_in(&target, &next).await?;
        effective.resolved_from = Some(name.to_string());
        let effective = Arc::new(effective);

        // `name` sits at chain.len() in `next`; deferrals at or below it are internal
        if anchor.map_or(true, |at| at >= chain.len()) {
            self.cache.insert_resolved(name, Arc::clone(&effective)).await;
            return Ok((effective, None));
        }
        Ok((effective, anchor))
    }

    async fn properties_in(
        &self,
        properties: &IndexMap<String, Schema>,
        chain: &[String],
    ) -> (IndexMap<String, Child>, Anchor) {
        let children = join_all(
            properties
                .values()
                .map(|property| self.child_in(property, chain)),
        )
        .await;

        let mut anchor = None;
        let resolved = properties
            .keys()
            .cloned()
            .zip(children)
            .map(|(key, (child, at))| {
                anchor = shallowest(anchor, at);
                (key, child)
            })
            .collect();
        (resolved, anchor)
    }

    /// Resolve a nested node, capturing failures and re-entrant references
    async fn child_in(&self, schema: &Schema, chain: &[String]) -> (Child, Anchor) {
        if let SchemaKind::Reference {
            name: Some(name),
            multiple: false,
        } = schema.kind()
        {
            if let Some(at) = chain.iter().position(|n| n == name) {
                return (Child::Deferred(Arc::new(schema.clone())), Some(at));
            }
        }

        match self.resolve_in(schema, chain).await {
            Ok((effective, anchor)) => (Child::Resolved(Arc::new(effective)), anchor),
            Err(err) => {
                tracing::warn!(error = %err, "nested schema failed to resolve");
                // Failures may be transient or chain-relative; never memoize above them
                (Child::Unresolved(err.diagnostic()), Some(0))
            }
        }
    }
}

/// Shallowest chain position a resolved subtree deferred to
///
/// `None` means the subtree does not depend on the chain it was resolved in.
type Anchor = Option<usize>;

fn shallowest(a: Anchor, b: Anchor) -> Anchor {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) | (None, x) => x,
    }
}

/// Annotations on the reference node win over the target's
fn overlay_annotations(effective: &mut EffectiveSchema, reference: &Schema) {
    if let Some(default) = &reference.default {
        effective.default = Some(default.clone());
    }
    if let Some(title) = &reference.title {
        effective.title = Some(title.clone());
    }
    if let Some(description) = &reference.description {
        effective.description = Some(description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;
    use crate::schema::SchemaType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    fn resolver(registry: InMemoryRegistry) -> SchemaResolver {
        SchemaResolver::new(SchemaCache::new(Arc::new(registry), 100))
    }

    fn user_registry() -> InMemoryRegistry {
        InMemoryRegistry::new().with(
            "user",
            schema(json!({"type": "object", "properties": {"id": {"type": "string"}}})),
        )
    }

    #[tokio::test]
    async fn primitive_passes_through() {
        let r = resolver(InMemoryRegistry::new());
        let effective = r
            .resolve(&schema(json!({"type": "integer", "minimum": 3})))
            .await
            .unwrap();
        assert_eq!(effective.shape, Shape::Integer);
        assert_eq!(effective.minimum, Some(3.into()));
    }

    #[tokio::test]
    async fn object_preserves_property_order() {
        let r = resolver(InMemoryRegistry::new());
        let effective = r
            .resolve(&schema(json!({
                "type": "object",
                "properties": {"n": {"type": "number"}, "s": {"type": "string"}, "b": {"type": "boolean"}}
            })))
            .await
            .unwrap();
        let names: Vec<_> = effective.properties().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["n", "s", "b"]);
    }

    #[tokio::test]
    async fn multiple_reference_is_array_of_target() {
        let r = resolver(user_registry());
        let effective = r
            .resolve(&Schema::reference("user", true))
            .await
            .unwrap();

        let expected_items = r.resolve(&Schema::reference("user", false)).await.unwrap();
        assert!(effective.is_array());
        assert_eq!(effective.resolved_from.as_deref(), Some("user"));
        assert_eq!(
            effective.items().and_then(Child::resolved).map(|s| (**s).clone()),
            Some(expected_items)
        );
    }

    #[tokio::test]
    async fn single_reference_is_target() {
        let r = resolver(user_registry());
        let effective = r.resolve_named("user").await.unwrap();
        assert!(effective.property("id").is_some());
        assert_eq!(effective.resolved_from.as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn reference_annotations_override_target() {
        let registry = InMemoryRegistry::new().with(
            "status",
            schema(json!({"type": "string", "title": "Status", "default": "open"})),
        );
        let r = resolver(registry);
        let reference = Schema::reference("status", false)
            .with_title("Ticket status")
            .with_default(json!("closed"));

        let effective = r.resolve(&reference).await.unwrap();
        assert_eq!(effective.title.as_deref(), Some("Ticket status"));
        assert_eq!(effective.default, Some(json!("closed")));
    }

    #[tokio::test]
    async fn missing_top_level_reference_is_typed_error() {
        let r = resolver(InMemoryRegistry::new());
        let err = r.resolve(&Schema::reference("ghost", true)).await.unwrap_err();
        assert_eq!(
            err,
            SchemaError::NotFound {
                name: "ghost".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_nested_reference_is_unresolved_child() {
        let r = resolver(InMemoryRegistry::new());
        let effective = r
            .resolve(&Schema::object([
                ("owner", Schema::reference("ghost", false)),
                ("name", Schema::of_type(SchemaType::String)),
            ]))
            .await
            .unwrap();

        match effective.property("owner") {
            Some(Child::Unresolved(diagnostic)) => {
                assert_eq!(diagnostic.reference.as_deref(), Some("ghost"));
            }
            other => panic!("expected unresolved child, got {other:?}"),
        }
        assert!(effective.property("name").unwrap().resolved().is_some());
    }

    #[tokio::test]
    async fn nameless_reference_is_error() {
        let r = resolver(InMemoryRegistry::new());
        let err = r
            .resolve(&Schema::of_type(SchemaType::JsonschemaReference))
            .await
            .unwrap_err();
        assert_eq!(err, SchemaError::MissingReferenceName);
    }

    #[tokio::test]
    async fn typeless_schema_infers_shape() {
        let r = resolver(InMemoryRegistry::new());
        let object = r
            .resolve(&schema(json!({"properties": {"a": {"type": "string"}}})))
            .await
            .unwrap();
        let array = r.resolve(&schema(json!({"items": {"type": "string"}}))).await.unwrap();
        let unknown = r.resolve(&schema(json!({}))).await.unwrap();

        assert_eq!(object.type_name(), "object");
        assert_eq!(array.type_name(), "array");
        assert_eq!(unknown.shape, Shape::Unknown);
    }

    #[tokio::test]
    async fn self_reference_is_deferred() {
        let registry = InMemoryRegistry::new().with(
            "person",
            Schema::object([
                ("name", Schema::of_type(SchemaType::String)),
                ("manager", Schema::reference("person", false)),
                ("reports", Schema::reference("person", true)),
            ]),
        );
        let r = resolver(registry);
        let person = r.resolve_named("person").await.unwrap();

        assert!(person.property("manager").unwrap().is_deferred());
        let reports = person.property("reports").unwrap().resolved().unwrap();
        assert!(reports.items().unwrap().is_deferred());

        let manager = r.settle(person.property("manager").unwrap()).await;
        let manager = manager.resolved().unwrap();
        assert_eq!(manager.resolved_from.as_deref(), Some("person"));
        assert!(manager.property("manager").unwrap().is_deferred());
    }

    #[tokio::test]
    async fn mutual_references_terminate() {
        let registry = InMemoryRegistry::new()
            .with("a", Schema::object([("b", Schema::reference("b", false))]))
            .with("b", Schema::object([("a", Schema::reference("a", false))]));
        let r = resolver(registry);

        let a = r.resolve_named("a").await.unwrap();
        let b = a.property("b").unwrap().resolved().unwrap();
        assert!(b.property("a").unwrap().is_deferred());
    }

    #[tokio::test]
    async fn alias_cycle_is_error() {
        let registry = InMemoryRegistry::new().with("loop", Schema::reference("loop", false));
        let r = resolver(registry);
        let err = r.resolve_named("loop").await.unwrap_err();
        assert_eq!(
            err,
            SchemaError::ReferenceCycle {
                name: "loop".into()
            }
        );
    }

    #[tokio::test]
    async fn depth_cap_applies() {
        let registry = InMemoryRegistry::new()
            .with("l1", Schema::reference("l2", false))
            .with("l2", Schema::reference("l3", false))
            .with("l3", Schema::of_type(SchemaType::String));
        let r = resolver(registry).with_max_reference_depth(2);

        let err = r.resolve_named("l1").await.unwrap_err();
        assert!(matches!(err, SchemaError::ReferenceDepthExceeded { depth: 2, .. }));
    }

    #[tokio::test]
    async fn settle_keeps_resolved_and_unresolved() {
        let r = resolver(InMemoryRegistry::new());
        let resolved = Child::Resolved(Arc::new(EffectiveSchema::new(Shape::String)));
        assert_eq!(r.settle(&resolved).await, resolved);

        let deferred = Child::Deferred(Arc::new(Schema::reference("ghost", false)));
        assert!(matches!(r.settle(&deferred).await, Child::Unresolved(_)));
    }

    fn diamond_registry(levels: usize) -> InMemoryRegistry {
        let registry = InMemoryRegistry::new().with(
            format!("s{levels}"),
            Schema::of_type(SchemaType::String),
        );
        for level in 0..levels {
            let next = format!("s{}", level + 1);
            registry.insert(
                format!("s{level}"),
                Schema::object([
                    ("a", Schema::reference(&next, false)),
                    ("b", Schema::reference(&next, false)),
                ]),
            );
        }
        registry
    }

    #[tokio::test]
    async fn diamond_references_expand_once_per_name() {
        let r = resolver(diamond_registry(24));
        let root = r.resolve_named("s0").await.unwrap();

        let a = root.property("a").unwrap().resolved().unwrap();
        let b = root.property("b").unwrap().resolved().unwrap();
        assert!(Arc::ptr_eq(
            a.property("a").unwrap().resolved().unwrap(),
            b.property("a").unwrap().resolved().unwrap(),
        ));

        r.cache().sync().await;
        assert_eq!(r.cache().stats().entry_count, 25);
    }

    #[tokio::test]
    async fn memoized_expansion_is_dropped_on_invalidation() {
        let r = resolver(diamond_registry(2));
        let first = r.resolve_named("s0").await.unwrap();
        let again = r.resolve_named("s0").await.unwrap();
        assert!(Arc::ptr_eq(
            first.property("a").unwrap().resolved().unwrap(),
            again.property("a").unwrap().resolved().unwrap(),
        ));

        r.cache().invalidate_all();
        let fresh = r.resolve_named("s0").await.unwrap();
        assert!(!Arc::ptr_eq(
            first.property("a").unwrap().resolved().unwrap(),
            fresh.property("a").unwrap().resolved().unwrap(),
        ));
        assert_eq!(first, fresh);
    }

    #[tokio::test]
    async fn expansion_below_a_cycle_is_not_memoized() {
        let registry = InMemoryRegistry::new()
            .with("a", Schema::object([("b", Schema::reference("b", false))]))
            .with("b", Schema::object([("a", Schema::reference("a", false))]));
        let r = resolver(registry);
        r.resolve_named("a").await.unwrap();

        // `b` as seen from `a` defers back to `a`; on its own it expands `a`
        let b = r.resolve_named("b").await.unwrap();
        let a = b.property("a").unwrap().resolved().unwrap();
        assert!(a.property("b").unwrap().is_deferred());
    }

    #[tokio::test]
    async fn shared_reference_yields_identical_shapes() {
        let r = resolver(user_registry());
        let effective = r
            .resolve(&Schema::object([
                ("author", Schema::reference("user", false)),
                ("editor", Schema::reference("user", false)),
            ]))
            .await
            .unwrap();
        assert_eq!(
            effective.property("author"),
            effective.property("editor")
        );
    }
}
