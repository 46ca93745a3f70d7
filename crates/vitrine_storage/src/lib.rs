//! Object storage for uploaded media.
//!
//! Every media file lives in a single bucket under a flat, caller-chosen key.
//! Keys are made unique by the caller (see [`unique_object_name`]) and backends
//! never overwrite: writing to an existing key is a conflict.
//!
//! # Backends
//!
//! - [`RestStorage`]: hosted storage REST API
//! - [`FileSystemStorage`]: a local directory, for development and tests
//! - [`MemoryStorage`]: process-local, for dry runs and tests
//!
//! # Example
//!
//! ```rust
//! use vitrine_storage::{MemoryStorage, ObjectStorage, unique_object_name};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MemoryStorage::new("uploads");
//! let key = unique_object_name("news", "jpg");
//!
//! let receipt = storage.upload(&key, b"jpeg bytes", "image/jpeg").await?;
//! assert_eq!(receipt.path(), &key);
//! assert!(storage.exists(&key).await?);
//!
//! storage.delete(&key).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod naming;
mod rest;
mod storage;

pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;
pub use naming::{random_token, temp_object_name, unique_object_name};
pub use rest::{RestStorage, RestStorageConfig};
pub use storage::{ObjectInfo, ObjectStorage, UploadReceipt, content_hash, validate_key};
pub use vitrine_error::{StorageError, StorageErrorKind};
