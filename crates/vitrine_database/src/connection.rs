//! Database connection utilities.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use vitrine_error::{DatabaseError, DatabaseErrorKind};

/// Pool of PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build a connection pool for a database URL.
///
/// # Errors
///
/// Returns an error if the URL is empty or no connection can be opened.
#[tracing::instrument(skip(database_url))]
pub fn establish_pool(database_url: &str, max_size: u32) -> DatabaseResult<PgPool> {
    if database_url.trim().is_empty() {
        return Err(DatabaseError::new(DatabaseErrorKind::Connection(
            "database URL is empty".to_string(),
        )));
    }

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size.max(1))
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

    tracing::info!("Opened database pool");
    Ok(pool)
}
