//! Tests against a live storage API.
//!
//! Run with `--features api` and `VITRINE_TEST_URL`/`VITRINE_TEST_KEY` set.

use std::env;
use vitrine_core::PublicUrlBase;
use vitrine_storage::{ObjectStorage, RestStorage, RestStorageConfig, temp_object_name};

fn storage() -> RestStorage {
    let url = env::var("VITRINE_TEST_URL").expect("VITRINE_TEST_URL must be set for API tests");
    let key = env::var("VITRINE_TEST_KEY").expect("VITRINE_TEST_KEY must be set for API tests");
    let config = RestStorageConfig::new(&url, key, PublicUrlBase::new(&url, "uploads"));
    RestStorage::new(config).unwrap()
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_upload_relocate_delete() -> Result<(), Box<dyn std::error::Error>> {
    let storage = storage();
    let key = temp_object_name("temp/", "vitrine-test", "txt");
    let target = key.replace("temp/", "");

    storage.upload(&key, b"hello", "text/plain").await?;
    assert!(storage.exists(&key).await?);
    assert!(storage.upload(&key, b"again", "text/plain").await.is_err());

    storage.relocate(&key, &target).await?;
    assert!(!storage.exists(&key).await?);

    storage.delete(&target).await?;
    assert!(storage.delete(&target).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_list_temp_namespace() -> Result<(), Box<dyn std::error::Error>> {
    let storage = storage();
    let key = temp_object_name("temp/", "vitrine-list", "txt");
    storage.upload(&key, b"x", "text/plain").await?;

    let listed = storage.list("temp/").await?;
    assert!(listed.iter().any(|o| o.path() == &key));

    storage.delete(&key).await?;
    Ok(())
}
