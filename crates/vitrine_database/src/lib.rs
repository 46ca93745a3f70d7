//! PostgreSQL record store for Vitrine.
//!
//! Rows are read and written as JSON through `row_to_json` and
//! `json_populate_record`, so any content table can be served without a
//! generated schema module.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_database::PgRecordStore;
//! use vitrine_records::RecordStore;
//! use vitrine_core::EntityKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PgRecordStore::connect("postgres://localhost/site", 4)?;
//! let projects = store.get_all(EntityKind::Project).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod sql;
mod store;

pub use connection::{PgPool, establish_pool};
pub use store::PgRecordStore;
pub use vitrine_error::{DatabaseError, DatabaseErrorKind};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
