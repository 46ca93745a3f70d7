//! Replace and remove workflows against fault-injecting backends.

mod test_utils;

use serde_json::json;
use test_utils::{RecordCall, StorageCall, setup};
use vitrine_config::CleanupOrder;
use vitrine_core::{
    BannerUpdate, EntityKind, EntityUpdate, MediaPath, NewsUpdate, PendingUpload, UpdateFields,
};
use vitrine_error::{FailureClass, RecordErrorKind, StorageErrorKind};
use vitrine_sync::{OldMediaCleanup, SyncOutcome, SyncPolicyBuilder};

fn png() -> PendingUpload {
    PendingUpload::new("new.png", vec![0x89, 0x50, 0x4E, 0x47]).unwrap()
}

fn media_only() -> EntityUpdate {
    EntityUpdate::media_only(EntityKind::AboutBanner)
}

#[tokio::test]
async fn replacing_existing_media_deletes_uploads_then_updates() {
    let (storage, records, sync) = setup();
    storage.put("old.jpg");
    let banner = records.seed(
        EntityKind::AboutBanner,
        json!({"id": 1, "image": "/uploads/old.jpg"}),
    );

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    let SyncOutcome::Committed {
        record,
        media_path,
        old_media_cleanup,
    } = outcome
    else {
        panic!("expected a committed outcome, got {outcome:?}");
    };

    let uploads = storage.uploads();
    assert_eq!(storage.deletes(), vec!["old.jpg".to_string()]);
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("about-banner-"));
    assert!(uploads[0].ends_with(".png"));

    let calls = storage.calls();
    assert!(matches!(&calls[0], StorageCall::Delete(_)));
    assert!(matches!(&calls[1], StorageCall::Upload(_)));

    let new_path = media_path.unwrap();
    assert_eq!(new_path.as_str(), uploads[0]);
    assert_eq!(record.media_path(), Some(new_path.clone()));
    assert_eq!(records.updates().len(), 1);
    assert!(matches!(old_media_cleanup, OldMediaCleanup::Deleted { ref key } if key == "old.jpg"));

    // Nothing references the old object and the new one exists.
    assert!(!storage.contains("old.jpg"));
    assert!(storage.contains(&uploads[0]));
    let persisted = records.row(EntityKind::AboutBanner, banner.id()).await;
    assert!(!persisted.to_json().to_string().contains("old.jpg"));
}

#[tokio::test]
async fn entity_without_media_never_deletes() {
    let (storage, records, sync) = setup();
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": null}));

    let outcome = sync
        .replace_media(banner.id(), None, Some(&png()), media_only())
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(storage.deletes().is_empty());
    assert_eq!(storage.uploads().len(), 1);
    assert_eq!(records.updates().len(), 1);
}

#[tokio::test]
async fn upload_conflict_never_touches_the_record() {
    let (storage, records, sync) = setup();
    storage.fail_uploads(StorageErrorKind::Conflict("about-banner-1.png".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": null}));

    let outcome = sync
        .replace_media(banner.id(), None, Some(&png()), media_only())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SyncOutcome::UploadFailed {
            old_media_deleted: false,
            ..
        }
    ));
    assert_eq!(outcome.failure_class(), Some(FailureClass::Conflict));
    assert!(records.updates().is_empty());
    let persisted = records.row(EntityKind::AboutBanner, banner.id()).await;
    assert_eq!(persisted.field("image"), Some(&json!(null)));
}

#[tokio::test]
async fn upload_failure_after_delete_reports_the_lost_object() {
    let (storage, records, sync) = setup();
    storage.put("old.jpg");
    storage.fail_uploads(StorageErrorKind::Transport("offline".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    // The record is unchanged but its object is already gone.
    assert!(matches!(
        outcome,
        SyncOutcome::UploadFailed {
            old_media_deleted: true,
            ..
        }
    ));
    assert!(outcome.message().contains("previous image"));
    let persisted = records.row(EntityKind::AboutBanner, banner.id()).await;
    assert_eq!(persisted.str_field("image"), Some("old.jpg"));
    assert!(!storage.contains("old.jpg"));
}

#[tokio::test]
async fn upload_first_keeps_old_media_when_upload_fails() {
    let (storage, records, sync) = setup();
    storage.put("old.jpg");
    storage.fail_uploads(StorageErrorKind::Transport("offline".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));
    let sync = sync.with_policy(
        SyncPolicyBuilder::default()
            .cleanup_order(CleanupOrder::UploadFirst)
            .build()
            .unwrap(),
    );

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SyncOutcome::UploadFailed {
            old_media_deleted: false,
            ..
        }
    ));
    assert!(storage.deletes().is_empty());
    assert!(storage.contains("old.jpg"));
}

#[tokio::test]
async fn upload_first_deletes_old_media_after_the_update() {
    let (storage, records, sync) = setup();
    storage.put("old.jpg");
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));
    let sync = sync.with_policy(
        SyncPolicyBuilder::default()
            .cleanup_order(CleanupOrder::UploadFirst)
            .build()
            .unwrap(),
    );

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    assert!(outcome.is_success());
    let calls = storage.calls();
    assert!(matches!(&calls[0], StorageCall::Upload(_)));
    assert_eq!(calls[1], StorageCall::Delete("old.jpg".to_string()));
}

#[tokio::test]
async fn failed_update_orphans_the_new_object_by_default() {
    let (storage, records, sync) = setup();
    records.fail_updates(RecordErrorKind::Transport("timeout".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1}));

    let outcome = sync
        .replace_media(banner.id(), None, Some(&png()), media_only())
        .await
        .unwrap();

    let SyncOutcome::UpdateFailed { orphaned, .. } = &outcome else {
        panic!("expected an update failure, got {outcome:?}");
    };
    let orphan = orphaned.clone().unwrap();
    assert!(storage.contains(&orphan));
    assert_eq!(outcome.failure_class(), Some(FailureClass::Transport));
}

#[tokio::test]
async fn compensation_removes_the_new_object_when_the_update_fails() {
    let (storage, records, sync) = setup();
    records.fail_updates(RecordErrorKind::Transport("timeout".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1}));
    let sync = sync.with_policy(
        SyncPolicyBuilder::default()
            .compensate_orphans(true)
            .build()
            .unwrap(),
    );

    let outcome = sync
        .replace_media(banner.id(), None, Some(&png()), media_only())
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::UpdateFailed { orphaned: None, .. }));
    let uploaded = storage.uploads().pop().unwrap();
    assert!(!storage.contains(&uploaded));
    assert_eq!(storage.deletes(), vec![uploaded]);
}

#[tokio::test]
async fn no_file_and_no_changes_makes_no_calls() {
    let (storage, records, sync) = setup();
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "/uploads/keep.jpg"}));
    let before = records.row(EntityKind::AboutBanner, banner.id()).await;

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), None, media_only())
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Unchanged { .. }));
    assert_eq!(outcome.media_path().unwrap().as_str(), "/uploads/keep.jpg");
    assert!(storage.calls().is_empty());
    assert!(records.calls().is_empty());
    assert_eq!(records.row(EntityKind::AboutBanner, banner.id()).await, before);
}

#[tokio::test]
async fn no_file_with_field_changes_updates_only_those_fields() {
    let (storage, records, sync) = setup();
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "/uploads/keep.jpg"}));
    let update = EntityUpdate::new(
        EntityKind::AboutBanner,
        UpdateFields::Banner(BannerUpdate::default().with_title("Studio")),
    );

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), None, update)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(storage.calls().is_empty());
    let patches = records.updates();
    assert_eq!(patches.len(), 1);
    assert!(patches[0].get("image").is_none());
    let persisted = records.row(EntityKind::AboutBanner, banner.id()).await;
    assert_eq!(persisted.str_field("image"), Some("/uploads/keep.jpg"));
    assert_eq!(persisted.title(), Some("Studio"));
}

#[tokio::test]
async fn invalid_update_fails_before_any_call() {
    let (storage, records, sync) = setup();
    let news = records.seed(EntityKind::NewsArticle, json!({"id": "n1"}));
    let update = EntityUpdate::new(
        EntityKind::NewsArticle,
        UpdateFields::News(NewsUpdate::default().with_slug("Not A Slug")),
    );

    let err = sync
        .replace_media(news.id(), None, Some(&png()), update)
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::Validation);
    assert!(storage.calls().is_empty());
    assert!(records.calls().is_empty());
}

#[tokio::test]
async fn external_media_is_never_deleted() {
    let (storage, records, sync) = setup();
    let banner = records.seed(
        EntityKind::AboutBanner,
        json!({"id": 1, "image": "https://cdn.example.com/hero.jpg"}),
    );

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    let SyncOutcome::Committed { old_media_cleanup, .. } = outcome else {
        panic!("expected a committed outcome");
    };
    assert!(matches!(old_media_cleanup, OldMediaCleanup::SkippedExternal { .. }));
    assert!(storage.deletes().is_empty());
}

#[tokio::test]
async fn failed_old_delete_does_not_block_the_replace() {
    let (storage, records, sync) = setup();
    storage.put("old.jpg");
    storage.fail_deletes(StorageErrorKind::PermissionDenied("old.jpg".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));

    let outcome = sync
        .replace_media(banner.id(), banner.media_path().as_ref(), Some(&png()), media_only())
        .await
        .unwrap();

    let SyncOutcome::Committed { old_media_cleanup, .. } = outcome else {
        panic!("expected a committed outcome");
    };
    assert!(matches!(old_media_cleanup, OldMediaCleanup::Failed { .. }));
}

#[tokio::test]
async fn committed_paths_follow_each_kinds_convention() {
    let (_, records, sync) = setup();
    let project = records.seed(EntityKind::Project, json!({"id": 1}));
    let header = records.seed(EntityKind::HeaderSettings, json!({"id": 1}));

    let project_outcome = sync
        .replace_media(project.id(), None, Some(&png()), EntityUpdate::media_only(EntityKind::Project))
        .await
        .unwrap();
    let header_outcome = sync
        .replace_media(header.id(), None, Some(&png()), EntityUpdate::media_only(EntityKind::HeaderSettings))
        .await
        .unwrap();

    assert!(project_outcome.media_path().unwrap().as_str().starts_with("/uploads/project-banner-"));
    assert!(header_outcome
        .media_path()
        .unwrap()
        .as_str()
        .starts_with("https://demo.supabase.co/storage/v1/object/public/uploads/logo-"));
}

#[tokio::test]
async fn kinds_without_media_reject_files() {
    let (storage, records, sync) = setup();
    let tab = records.seed(EntityKind::ProjectTab, json!({"id": 1}));

    let err = sync
        .replace_media(tab.id(), None, Some(&png()), EntityUpdate::media_only(EntityKind::ProjectTab))
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::Validation);
    assert!(storage.calls().is_empty());
}

#[tokio::test]
async fn remove_media_clears_the_reference_even_when_delete_fails() {
    let (storage, records, sync) = setup();
    storage.fail_deletes(StorageErrorKind::Transport("offline".to_string()));
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));

    let outcome = sync
        .remove_media(EntityKind::AboutBanner, banner.id(), banner.media_path().as_ref())
        .await
        .unwrap();

    assert_eq!(storage.deletes(), vec!["old.jpg".to_string()]);
    assert!(outcome.is_success());
    assert!(outcome.media_path().is_none());
    match &records.calls()[..] {
        [RecordCall::Update(EntityKind::AboutBanner, id, patch)] => {
            assert_eq!(id, banner.id());
            assert_eq!(patch.get("image"), Some(&json!(null)));
        }
        other => panic!("unexpected record calls: {other:?}"),
    }
}

#[tokio::test]
async fn remove_media_of_a_missing_object_still_clears_the_reference() {
    let (_, records, sync) = setup();
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "gone.jpg"}));

    let outcome = sync
        .remove_media(EntityKind::AboutBanner, banner.id(), Some(&MediaPath::parse("gone.jpg").unwrap()))
        .await
        .unwrap();

    let SyncOutcome::Committed { old_media_cleanup, .. } = outcome else {
        panic!("expected a committed outcome");
    };
    assert!(matches!(old_media_cleanup, OldMediaCleanup::AlreadyMissing { .. }));
    let persisted = records.row(EntityKind::AboutBanner, banner.id()).await;
    assert!(persisted.media_path().is_none());
}
