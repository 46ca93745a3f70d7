//! Temp promotion, temp sweep, cascade deletion and form state.

mod test_utils;

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use test_utils::{RecordCall, StorageCall, setup};
use vitrine_core::{
    EntityId, EntityKind, EntityUpdate, MediaPath, PendingUpload, PreviewRegistry,
};
use vitrine_error::{FailureClass, RecordErrorKind, StorageErrorKind};
use vitrine_sync::{MediaFormState, OldMediaCleanup, TempMediaPromoter, TempSweeper};

const BUCKET_URL: &str = "https://demo.supabase.co/storage/v1/object/public/uploads/";

#[tokio::test]
async fn inline_images_are_promoted_and_urls_rewritten() {
    let (storage, records, _) = setup();
    let promoter = TempMediaPromoter::new(storage.clone(), records.clone(), "temp/").unwrap();
    let upload = PendingUpload::new("figure.png", vec![1, 2]).unwrap();

    let inline = promoter.upload_inline(EntityKind::NewsArticle, &upload).await.unwrap();
    assert!(inline.key().starts_with("temp/news-content-"));
    assert_eq!(inline.url(), &format!("{}{}", BUCKET_URL, inline.key()));

    let html = format!(
        r#"<p>Intro</p><img src="{url}"><p>Again</p><img src="{url}"><img src="https://cdn.example.com/x.png">"#,
        url = inline.url()
    );
    let report = promoter
        .promote(EntityKind::NewsArticle, &EntityId::from("a1"), &html)
        .await;

    assert_eq!(report.promoted().len(), 1);
    assert!(report.failed().is_empty());
    let (from, to) = &report.promoted()[0];
    assert_eq!(from, inline.key());
    assert!(to.starts_with("news-content-a1-"));
    assert!(to.ends_with(".png"));
    assert!(!report.html().contains("/uploads/temp/"));
    assert_eq!(report.html().matches(to.as_str()).count(), 2);
    assert!(report.html().contains("https://cdn.example.com/x.png"));
    assert!(storage.contains(to));
    assert!(!storage.contains(inline.key()));
}

#[tokio::test]
async fn failed_promotion_leaves_the_temp_url() {
    let (storage, records, _) = setup();
    storage.put("temp/news-content-1.jpg");
    storage.put("temp/news-content-2.jpg");
    storage.fail_relocate("temp/news-content-1.jpg");
    let promoter = TempMediaPromoter::new(storage.clone(), records.clone(), "temp").unwrap();

    let html = format!(
        r#"<img src="{b}temp/news-content-1.jpg"><img src="{b}temp/news-content-2.jpg">"#,
        b = BUCKET_URL
    );
    let report = promoter
        .promote(EntityKind::NewsArticle, &EntityId::from(9_i64), &html)
        .await;

    assert_eq!(report.failed().len(), 1);
    assert_eq!(report.failed()[0].0, "temp/news-content-1.jpg");
    assert_eq!(report.promoted().len(), 1);
    assert!(report.html().contains("temp/news-content-1.jpg"));
    assert!(!report.html().contains("temp/news-content-2.jpg"));
    let relocations = storage
        .calls()
        .into_iter()
        .filter(|c| matches!(c, StorageCall::Relocate(..)))
        .count();
    assert_eq!(relocations, 2);
}

#[tokio::test]
async fn promote_and_save_writes_the_body_only_when_it_changed() {
    let (storage, records, _) = setup();
    storage.put("temp/news-content-1.jpg");
    let article = records.seed(
        EntityKind::NewsArticle,
        json!({"id": "a1", "content": format!(r#"<img src="{}temp/news-content-1.jpg">"#, BUCKET_URL)}),
    );
    let plain = records.seed(EntityKind::NewsArticle, json!({"id": "a2", "content": "<p>text</p>"}));
    let promoter = TempMediaPromoter::new(storage.clone(), records.clone(), "temp/").unwrap();

    let report = promoter
        .promote_and_save(EntityKind::NewsArticle, article.id())
        .await
        .unwrap();
    assert!(report.changed());
    let saved = records.row(EntityKind::NewsArticle, article.id()).await;
    assert_eq!(saved.str_field("content"), Some(report.html().as_str()));

    let report = promoter
        .promote_and_save(EntityKind::NewsArticle, plain.id())
        .await
        .unwrap();
    assert!(!report.changed());
    assert_eq!(records.updates().len(), 1);
}

#[tokio::test]
async fn promote_and_save_requires_a_rich_text_kind() {
    let (storage, records, _) = setup();
    let promoter = TempMediaPromoter::new(storage, records, "temp/").unwrap();
    let err = promoter
        .promote_and_save(EntityKind::Award, &EntityId::from(1_i64))
        .await
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::Validation);
}

#[tokio::test]
async fn sweep_deletes_only_stale_temp_objects() {
    let (storage, _, _) = setup();
    let now = Utc::now();
    storage.inner().insert_at("temp/old.png", b"x", now - Duration::hours(30));
    storage.inner().insert_at("temp/fresh.png", b"x", now - Duration::hours(1));
    storage.inner().insert_at("old-but-permanent.png", b"x", now - Duration::hours(300));

    let sweeper = TempSweeper::new(storage.clone(), "temp/").unwrap();
    let report = sweeper.sweep(Duration::hours(24), now).await.unwrap();

    assert_eq!(report.deleted(), &vec!["temp/old.png".to_string()]);
    assert_eq!(*report.kept(), 1);
    assert!(storage.contains("temp/fresh.png"));
    assert!(storage.contains("old-but-permanent.png"));
}

#[tokio::test]
async fn sweep_reports_failed_deletes() {
    let (storage, _, _) = setup();
    let now = Utc::now();
    storage.inner().insert_at("temp/old.png", b"x", now - Duration::days(3));
    storage.fail_deletes(StorageErrorKind::PermissionDenied("temp/old.png".to_string()));

    let report = TempSweeper::new(storage.clone(), "temp")
        .unwrap()
        .sweep(Duration::hours(24), now)
        .await
        .unwrap();

    assert!(report.deleted().is_empty());
    assert_eq!(report.failed().len(), 1);
}

#[test]
fn sweeping_the_whole_bucket_is_refused() {
    let storage = Arc::new(test_utils::MockStorage::new());
    assert!(TempSweeper::new(storage, "/").is_err());
}

#[tokio::test]
async fn deleting_a_project_cascades_to_its_gallery() {
    let (storage, records, sync) = setup();
    storage.put("project-banner-1.jpg");
    storage.put("project-gallery-1.jpg");
    records.seed(
        EntityKind::Project,
        json!({"id": 7, "banner_media": "/uploads/project-banner-1.jpg"}),
    );
    records.seed(
        EntityKind::ProjectGalleryImage,
        json!({"id": "g1", "project_id": 7, "image_path": "/uploads/project-gallery-1.jpg", "sort": 0}),
    );
    records.seed(
        EntityKind::ProjectGalleryImage,
        json!({"id": "g2", "project_id": 7, "image_path": "/uploads/project-gallery-2.jpg", "sort": 1}),
    );
    records.seed(
        EntityKind::ProjectGalleryImage,
        json!({"id": "other", "project_id": 8, "image_path": "/uploads/x.jpg", "sort": 0}),
    );

    let report = sync
        .delete_entity(EntityKind::Project, &EntityId::from(7_i64))
        .await
        .unwrap();

    assert_eq!(*report.child_rows_deleted(), 2);
    assert_eq!(report.media().len(), 3);
    assert!(matches!(report.media()[2], OldMediaCleanup::AlreadyMissing { .. }));
    assert!(!storage.contains("project-banner-1.jpg"));
    assert!(!storage.contains("project-gallery-1.jpg"));
    assert_eq!(records.count(EntityKind::Project), 0);
    assert_eq!(records.count(EntityKind::ProjectGalleryImage), 1);

    // Children go before the parent row.
    let deletes: Vec<_> = records
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RecordCall::Delete(kind, _) => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        deletes,
        vec![
            EntityKind::ProjectGalleryImage,
            EntityKind::ProjectGalleryImage,
            EntityKind::Project
        ]
    );
}

#[tokio::test]
async fn failed_child_delete_keeps_the_parent_row() {
    let (_, records, sync) = setup();
    records.seed(EntityKind::Project, json!({"id": 7}));
    records.seed(
        EntityKind::ProjectGalleryImage,
        json!({"id": "g1", "project_id": 7, "sort": 0}),
    );
    records.fail_deletes(RecordErrorKind::Transport("offline".to_string()));

    let err = sync
        .delete_entity(EntityKind::Project, &EntityId::from(7_i64))
        .await
        .unwrap_err();

    assert_eq!(err.class(), FailureClass::Transport);
    assert_eq!(records.count(EntityKind::Project), 1);
}

#[tokio::test]
async fn form_submission_commits_and_releases_the_preview() {
    let (_, records, sync) = setup();
    let previews = Arc::new(PreviewRegistry::new());
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1, "image": "old.jpg"}));
    let mut form = MediaFormState::new(previews.clone(), banner.media_path());

    let preview = form.select_file(PendingUpload::new("new.png", vec![1]).unwrap());
    assert!(previews.is_live(&preview));
    assert_eq!(form.preview_url(), Some(&preview));

    let outcome = sync
        .submit(&mut form, banner.id(), EntityUpdate::media_only(EntityKind::AboutBanner))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(!form.is_busy());
    assert!(form.pending().is_none());
    assert!(!previews.is_live(&preview));
    assert_eq!(previews.live_count(), 0);
    assert_eq!(form.committed(), outcome.media_path());
    assert_ne!(form.committed(), MediaPath::parse("old.jpg").as_ref());
}

#[tokio::test]
async fn failed_submission_keeps_the_selection_for_a_retry() {
    let (storage, records, sync) = setup();
    storage.fail_uploads(StorageErrorKind::Transport("offline".to_string()));
    let previews = Arc::new(PreviewRegistry::new());
    let banner = records.seed(EntityKind::AboutBanner, json!({"id": 1}));
    let mut form = MediaFormState::new(previews.clone(), None);
    form.select_file(PendingUpload::new("new.png", vec![1]).unwrap());

    let outcome = sync
        .submit(&mut form, banner.id(), EntityUpdate::media_only(EntityKind::AboutBanner))
        .await
        .unwrap();

    assert!(!outcome.is_success());
    assert!(!form.is_busy());
    assert!(form.pending().is_some());
    assert!(form.last_error().unwrap().starts_with("Upload failed"));
    assert_eq!(previews.live_count(), 1);

    drop(form);
    assert_eq!(previews.live_count(), 0);
}

#[test]
fn busy_forms_refuse_a_second_submission() {
    let mut form = MediaFormState::new(Arc::new(PreviewRegistry::new()), None);
    form.begin_submit().unwrap();
    assert!(form.begin_submit().is_err());
    form.abort_submit();
    assert!(form.begin_submit().is_ok());
}
