//! [`RecordStore`] over a direct PostgreSQL connection.

use crate::{DatabaseResult, PgPool, establish_pool, sql};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Json, Text};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use vitrine_core::{ContentRecord, EntityId, EntityKind, RecordPatch};
use vitrine_error::{DatabaseError, DatabaseErrorKind, RecordError, RecordErrorKind};
use vitrine_records::{RecordStore, filter_literal, validate_identifier};

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Json)]
    json: JsonValue,
}

/// Record store that talks to PostgreSQL directly.
///
/// Diesel is synchronous; every query runs on the blocking thread pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRecordStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

fn to_record_error(err: DatabaseError, kind: EntityKind, id: Option<&str>) -> RecordError {
    let record_kind = match err.kind {
        DatabaseErrorKind::NotFound => RecordErrorKind::NotFound {
            table: kind.table().to_string(),
            id: id.unwrap_or_default().to_string(),
        },
        DatabaseErrorKind::Connection(msg) => RecordErrorKind::Transport(msg),
        DatabaseErrorKind::UniqueViolation(msg) => RecordErrorKind::Conflict(msg),
        DatabaseErrorKind::Serialization(msg) => RecordErrorKind::Serialization(msg),
        DatabaseErrorKind::TableNotFound(table) => {
            RecordErrorKind::InvalidQuery(format!("table '{}' does not exist", table))
        }
        DatabaseErrorKind::Query(msg) => RecordErrorKind::InvalidQuery(msg),
    };
    RecordError::new(record_kind)
}

fn load_rows(
    conn: &mut PgConnection,
    query: diesel::query_builder::BoxedSqlQuery<'static, diesel::pg::Pg, diesel::query_builder::SqlQuery>,
) -> DatabaseResult<Vec<JsonValue>> {
    let rows = query.load::<JsonRow>(conn).map_err(DatabaseError::from)?;
    Ok(rows.into_iter().map(|r| r.json).collect())
}

fn first_row(rows: Vec<JsonValue>) -> DatabaseResult<JsonValue> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))
}

fn decode(kind: EntityKind, rows: Vec<JsonValue>) -> Result<Vec<ContentRecord>, RecordError> {
    rows.into_iter()
        .map(|row| ContentRecord::from_row(kind, row))
        .collect()
}

impl PgRecordStore {
    /// Connect with a pool of up to `max_size` connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be built.
    pub fn connect(database_url: &str, max_size: u32) -> DatabaseResult<Self> {
        Ok(Self::from_pool(establish_pool(database_url, max_size)?))
    }

    /// Use an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, f: F) -> DatabaseResult<T>
    where
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    fn columns(patch: &RecordPatch) -> Result<Vec<String>, RecordError> {
        patch
            .fields()
            .filter(|f| *f != "id")
            .map(|f| validate_identifier(f).map(|_| f.to_string()))
            .collect()
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, fields), fields(table = kind.table()))]
    async fn create(
        &self,
        kind: EntityKind,
        fields: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        let columns = Self::columns(&fields)?;
        let query = {
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            sql::insert(kind, &cols)
        };
        let body = JsonValue::Object(fields.into_map());
        debug!(query = %query, "Inserting row");

        let row = self
            .run(move |conn| {
                let q = diesel::sql_query(query).into_boxed().bind::<Json, _>(body);
                first_row(load_rows(conn, q)?)
            })
            .await
            .map_err(|e| to_record_error(e, kind, None))?;

        let record = ContentRecord::from_row(kind, row)?;
        tracing::info!(id = %record.id(), "Created row");
        Ok(record)
    }

    #[instrument(skip(self, patch), fields(table = kind.table(), id = %id))]
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        let columns = Self::columns(&patch)?;
        if columns.is_empty() {
            return self.get_by_id(kind, id).await;
        }

        let query = {
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            sql::update(kind, &cols)
        };
        let body = JsonValue::Object(patch.into_map());
        let key = id.as_str().to_string();
        debug!(query = %query, "Updating row");

        let row = self
            .run(move |conn| {
                let q = diesel::sql_query(query)
                    .into_boxed()
                    .bind::<Json, _>(body)
                    .bind::<Text, _>(key);
                first_row(load_rows(conn, q)?)
            })
            .await
            .map_err(|e| to_record_error(e, kind, Some(id.as_str())))?;

        tracing::info!("Updated row");
        Ok(ContentRecord::from_row(kind, row)?)
    }

    #[instrument(skip(self), fields(table = kind.table()))]
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<ContentRecord>, RecordError> {
        let query = sql::select_all(kind);
        let rows = self
            .run(move |conn| load_rows(conn, diesel::sql_query(query).into_boxed()))
            .await
            .map_err(|e| to_record_error(e, kind, None))?;
        debug!(count = rows.len(), "Fetched rows");
        decode(kind, rows)
    }

    #[instrument(skip(self), fields(table = kind.table(), id = %id))]
    async fn get_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<ContentRecord, RecordError> {
        let query = sql::select_by_id(kind);
        let key = id.as_str().to_string();
        let row = self
            .run(move |conn| {
                let q = diesel::sql_query(query).into_boxed().bind::<Text, _>(key);
                first_row(load_rows(conn, q)?)
            })
            .await
            .map_err(|e| to_record_error(e, kind, Some(id.as_str())))?;
        Ok(ContentRecord::from_row(kind, row)?)
    }

    #[instrument(skip(self, value), fields(table = kind.table()))]
    async fn find_by(
        &self,
        kind: EntityKind,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<ContentRecord>, RecordError> {
        validate_identifier(field)?;
        let is_null = value.is_null();
        let literal = filter_literal(value)?;
        let query = sql::select_where(kind, field, is_null);

        let rows = self
            .run(move |conn| {
                let q = diesel::sql_query(query).into_boxed();
                let q = if is_null { q } else { q.bind::<Text, _>(literal) };
                load_rows(conn, q)
            })
            .await
            .map_err(|e| to_record_error(e, kind, None))?;
        decode(kind, rows)
    }

    #[instrument(skip(self), fields(table = kind.table(), id = %id))]
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RecordError> {
        let query = sql::delete(kind);
        let key = id.as_str().to_string();
        self.run(move |conn| {
            let q = diesel::sql_query(query).into_boxed().bind::<Text, _>(key);
            first_row(load_rows(conn, q)?)
        })
        .await
        .map_err(|e| to_record_error(e, kind, Some(id.as_str())))?;

        tracing::info!("Deleted row");
        Ok(())
    }
}
