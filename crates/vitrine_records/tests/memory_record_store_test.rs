//! Tests for the in-memory record store.

use serde_json::json;
use vitrine_core::{EntityId, EntityKind, RecordPatch};
use vitrine_records::{MemoryRecordStore, RecordErrorKind, RecordStore};

#[tokio::test]
async fn test_create_assigns_id_and_timestamp() {
    let store = MemoryRecordStore::new();
    let mut fields = RecordPatch::new();
    fields.set("title", "Harbour").set("slug", "harbour");

    let record = store.create(EntityKind::Project, fields).await.unwrap();

    assert!(!record.id().as_str().is_empty());
    assert!(record.created_at().is_some());
    assert_eq!(record.title(), Some("Harbour"));
    assert_eq!(store.count(EntityKind::Project), 1);
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let store = MemoryRecordStore::new();
    let err = store
        .update(EntityKind::Service, &EntityId::from("nope"), RecordPatch::new())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, RecordErrorKind::NotFound { .. }));
}

#[tokio::test]
async fn test_update_is_partial() {
    let store = MemoryRecordStore::new();
    store
        .seed(
            EntityKind::NewsArticle,
            json!({"id": 1, "title": "Old", "image_path": "a.jpg"}),
        )
        .unwrap();

    let mut patch = RecordPatch::new();
    patch.set("title", "New");
    let record = store
        .update(EntityKind::NewsArticle, &EntityId::from(1), patch)
        .await
        .unwrap();

    assert_eq!(record.title(), Some("New"));
    assert_eq!(record.str_field("image_path"), Some("a.jpg"));
}

#[tokio::test]
async fn test_get_all_uses_display_order() {
    let store = MemoryRecordStore::new();
    store
        .seed(EntityKind::Service, json!({"id": "a", "order_index": null, "created_at": "2024-01-01T00:00:00Z"}))
        .unwrap();
    store
        .seed(EntityKind::Service, json!({"id": "b", "order_index": 2, "created_at": "2024-01-01T00:00:00Z"}))
        .unwrap();
    store
        .seed(EntityKind::Service, json!({"id": "c", "order_index": 1, "created_at": "2024-01-01T00:00:00Z"}))
        .unwrap();

    let rows = store.get_all(EntityKind::Service).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, ["c", "b", "a"]);
}

#[tokio::test]
async fn test_find_by_matches_numeric_and_text_ids() {
    let store = MemoryRecordStore::new();
    store
        .seed(EntityKind::ProjectGalleryImage, json!({"id": 1, "project_id": 7, "sort": 1}))
        .unwrap();
    store
        .seed(EntityKind::ProjectGalleryImage, json!({"id": 2, "project_id": "7", "sort": 0}))
        .unwrap();
    store
        .seed(EntityKind::ProjectGalleryImage, json!({"id": 3, "project_id": 8, "sort": 0}))
        .unwrap();

    let rows = store
        .find_by(EntityKind::ProjectGalleryImage, "project_id", &json!("7"))
        .await
        .unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, ["2", "1"]);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let store = MemoryRecordStore::new();
    store.seed(EntityKind::Award, json!({"id": 5})).unwrap();

    store.delete(EntityKind::Award, &EntityId::from(5)).await.unwrap();
    assert!(store.get_by_id(EntityKind::Award, &EntityId::from(5)).await.is_err());
    assert!(store.delete(EntityKind::Award, &EntityId::from(5)).await.is_err());
}

#[tokio::test]
async fn test_rejects_unsafe_column_names() {
    let store = MemoryRecordStore::new();
    let mut fields = RecordPatch::new();
    fields.set("title; drop table", "x");
    let err = store.create(EntityKind::Award, fields).await.unwrap_err();
    assert!(matches!(err.kind, RecordErrorKind::InvalidQuery(_)));
}
