//! Tests for configuration loading.

use std::io::Write;
use vitrine_config::{CleanupOrder, RecordBackend, StorageBackend, VitrineConfig};
use vitrine_error::FailureClass;

#[test]
fn test_bundled_defaults() {
    let config = VitrineConfig::from_toml_str("").unwrap();

    assert_eq!(config.storage.bucket, "uploads");
    assert_eq!(config.storage.backend, StorageBackend::Rest);
    assert_eq!(config.backend.records, RecordBackend::Rest);
    assert_eq!(config.sync.cleanup_order, CleanupOrder::DeleteFirst);
    assert!(!config.sync.compensate_orphans);
    assert_eq!(config.sweep.max_age_hours, 24);
    assert_eq!(config.listing.page_size, 10);
    assert_eq!(config.temp_prefix(), "temp/");
}

#[test]
fn test_overrides_keep_unspecified_defaults() {
    let config = VitrineConfig::from_toml_str(
        r#"
        [sync]
        cleanup_order = "upload_first"

        [storage]
        backend = "memory"
        "#,
    )
    .unwrap();

    assert_eq!(config.sync.cleanup_order, CleanupOrder::UploadFirst);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.bucket, "uploads");
    assert_eq!(config.listing.page_size, 10);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[backend]\napi_base_url = \"https://demo.supabase.co\"\napi_key = \"service\"\n\n[sweep]\nmax_age_hours = 2"
    )
    .unwrap();

    let config = VitrineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.sweep.max_age().as_secs(), 7200);
    assert!(config.validate().is_ok());
    assert_eq!(
        config.public_url_base().url_for("a.jpg"),
        "https://demo.supabase.co/storage/v1/object/public/uploads/a.jpg"
    );
}

#[test]
fn test_missing_file_is_a_config_error() {
    let err = VitrineConfig::from_file("/definitely/not/here.toml").unwrap_err();
    assert_eq!(err.class(), FailureClass::Config);
}

#[test]
fn test_rest_backend_requires_url_and_key() {
    let config = VitrineConfig::from_toml_str("").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("api_base_url"));

    let config = VitrineConfig::from_toml_str(
        "[backend]\napi_base_url = \"https://demo.supabase.co\"",
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("api_key"));
}

#[test]
fn test_local_backends_need_no_credentials() {
    let config = VitrineConfig::from_toml_str(
        "[backend]\nrecords = \"memory\"\n\n[storage]\nbackend = \"filesystem\"",
    )
    .unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_postgres_requires_database_url() {
    let config = VitrineConfig::from_toml_str(
        "[backend]\nrecords = \"postgres\"\n\n[storage]\nbackend = \"memory\"",
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("database_url"));
}

#[test]
fn test_storage_base_url_falls_back_to_api_base() {
    let config = VitrineConfig::from_toml_str(
        "[backend]\napi_base_url = \"https://demo.supabase.co/\"",
    )
    .unwrap();
    assert_eq!(
        config.public_url_base().bucket_url(),
        "https://demo.supabase.co/storage/v1/object/public/uploads/"
    );
}
