//! Concurrency Tests
//!
//! Lookup coalescing across editors sharing a schema session, and
//! cancellation of pending operations.

use drill_core::prelude::*;
use drill_schema::{InMemoryRegistry, SchemaCache, SchemaResolver, SchemaType};
use drill_test_utils::{path, person_registry, user_registry, CountingRegistry};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn shared_resolver(registry: &Arc<CountingRegistry>) -> SchemaResolver {
    let registry: Arc<dyn SchemaRegistry> = registry.clone();
    SchemaResolver::new(SchemaCache::new(registry, 100))
}

#[tokio::test]
async fn editors_sharing_a_session_coalesce_lookups() {
    let registry =
        Arc::new(CountingRegistry::new(user_registry()).with_delay(Duration::from_millis(20)));
    let resolver = shared_resolver(&registry);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move {
                let mut editor = EntityEditor::new(resolver);
                editor
                    .open_entity(&Schema::reference("user", false), json!(null))
                    .await
                    .unwrap();
                editor.into_data()
            })
        })
        .collect();

    for data in join_all(handles).await {
        assert_eq!(
            data.unwrap(),
            Some(json!({"id": "", "email": "", "tags": []}))
        );
    }
    // one lookup each for `user` and `tag`
    assert_eq!(registry.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropped_navigation_leaves_editor_untouched() {
    let registry =
        Arc::new(CountingRegistry::new(person_registry()).with_delay(Duration::from_millis(50)));
    let mut editor = EntityEditor::new(shared_resolver(&registry));
    editor
        .open_entity(&Schema::reference("person", false), json!(null))
        .await
        .unwrap();
    let before = editor.data().cloned();

    // Force the deferred `manager` reference back to the registry
    editor.resolver().cache().invalidate_all();
    let result = tokio::time::timeout(
        Duration::from_millis(5),
        editor.navigate(0, "manager"),
    )
    .await;
    assert!(result.is_err());

    assert_eq!(editor.columns().len(), 1);
    assert_eq!(editor.data().cloned(), before);

    editor.navigate(0, "manager").await.unwrap();
    assert_eq!(editor.columns().len(), 2);
    assert_eq!(
        editor.value_at(&path("manager.name")),
        Some(&json!(""))
    );
}

#[tokio::test(start_paused = true)]
async fn dropped_add_leaves_array_unchanged() {
    let registry =
        Arc::new(CountingRegistry::new(person_registry()).with_delay(Duration::from_millis(50)));
    let mut editor = EntityEditor::new(shared_resolver(&registry));
    editor
        .open_entity(&Schema::reference("person", false), json!(null))
        .await
        .unwrap();
    editor.resolver().cache().invalidate_all();

    let result = tokio::time::timeout(
        Duration::from_millis(5),
        editor.add_array_item(&path("reports")),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(editor.value_at(&path("reports")), Some(&json!([])));

    let index = editor.add_array_item(&path("reports")).await.unwrap();
    assert_eq!(index, 0);
}

#[tokio::test]
async fn navigated_new_item_needs_no_lookup() {
    let registry = Arc::new(CountingRegistry::new(person_registry()));
    let mut editor = EntityEditor::new(shared_resolver(&registry));
    editor
        .open_entity(&Schema::reference("person", false), json!(null))
        .await
        .unwrap();

    editor.navigate(0, "reports").await.unwrap();
    let index = editor.add_array_item(&path("reports")).await.unwrap();

    let reports = editor.column(1).unwrap().effective().unwrap();
    assert!(reports.items().unwrap().resolved().is_some());

    let calls = registry.calls();
    editor.resolver().cache().invalidate_all();
    editor.navigate(1, index).await.unwrap();
    assert_eq!(registry.calls(), calls);
    assert!(!editor.column(2).unwrap().is_placeholder());
}

#[tokio::test]
async fn staged_item_from_closed_entity_is_rejected() {
    let registry = Arc::new(CountingRegistry::new(user_registry()));
    let mut editor = EntityEditor::new(shared_resolver(&registry));
    editor
        .open_entity(&Schema::reference("user", false), json!(null))
        .await
        .unwrap();

    let staged = editor.stage_array_item(&path("tags")).await.unwrap();
    editor.close_entity();
    assert!(matches!(
        editor.commit_array_item(staged),
        Err(EditorError::NoEntityOpen)
    ));
}

#[tokio::test]
async fn diamond_references_cost_one_lookup_per_name() {
    let levels = 24;
    let diamond = InMemoryRegistry::new().with(
        format!("s{levels}"),
        Schema::of_type(SchemaType::String),
    );
    for level in 0..levels {
        let next = format!("s{}", level + 1);
        diamond.insert(
            format!("s{level}"),
            Schema::object([
                ("a", Schema::reference(&next, false)),
                ("b", Schema::reference(&next, false)),
            ]),
        );
    }
    let registry = Arc::new(CountingRegistry::new(diamond));
    let resolver = shared_resolver(&registry);

    let root = resolver.resolve_named("s0").await.unwrap();
    assert_eq!(root.type_name(), "object");
    assert_eq!(registry.calls(), levels + 1);

    resolver.resolve_named("s0").await.unwrap();
    assert_eq!(registry.calls(), levels + 1);
}
