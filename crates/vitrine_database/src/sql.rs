//! SQL text for JSON-shaped row access.
//!
//! Table and column names are validated identifiers; values are always bound.

use vitrine_core::EntityKind;

/// Wrap a row-producing query so each row comes back as one JSON value.
pub(crate) fn as_json_rows(query: &str) -> String {
    format!("SELECT row_to_json(t) AS json FROM ({}) t", query)
}

pub(crate) fn order_by(kind: EntityKind) -> String {
    match kind.order_field() {
        Some(field) => format!(" ORDER BY {} ASC NULLS LAST, created_at DESC", field),
        None => " ORDER BY created_at DESC".to_string(),
    }
}

pub(crate) fn select_all(kind: EntityKind) -> String {
    as_json_rows(&format!("SELECT * FROM {}{}", kind.table(), order_by(kind)))
}

pub(crate) fn select_by_id(kind: EntityKind) -> String {
    as_json_rows(&format!("SELECT * FROM {} WHERE id::text = $1", kind.table()))
}

/// `column` must already be validated.
pub(crate) fn select_where(kind: EntityKind, column: &str, is_null: bool) -> String {
    let predicate = if is_null {
        format!("{} IS NULL", column)
    } else {
        format!("{}::text = $1", column)
    };
    as_json_rows(&format!(
        "SELECT * FROM {} WHERE {}{}",
        kind.table(),
        predicate,
        order_by(kind)
    ))
}

/// `columns` must already be validated.
pub(crate) fn insert(kind: EntityKind, columns: &[&str]) -> String {
    let table = kind.table();
    if columns.is_empty() {
        return format!(
            "INSERT INTO {} AS r DEFAULT VALUES RETURNING row_to_json(r) AS json",
            table
        );
    }
    let cols = columns.join(", ");
    format!(
        "INSERT INTO {table} AS r ({cols}) SELECT {cols} FROM json_populate_record(NULL::{table}, $1) RETURNING row_to_json(r) AS json"
    )
}

/// `columns` must already be validated and non-empty.
pub(crate) fn update(kind: EntityKind, columns: &[&str]) -> String {
    let table = kind.table();
    let cols = columns.join(", ");
    format!(
        "UPDATE {table} AS r SET ({cols}) = (SELECT {cols} FROM json_populate_record(NULL::{table}, $1)) WHERE r.id::text = $2 RETURNING row_to_json(r) AS json"
    )
}

pub(crate) fn delete(kind: EntityKind) -> String {
    format!(
        "DELETE FROM {} AS r WHERE r.id::text = $1 RETURNING row_to_json(r) AS json",
        kind.table()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_orders_unset_last() {
        assert_eq!(
            select_all(EntityKind::Project),
            "SELECT row_to_json(t) AS json FROM (SELECT * FROM projects ORDER BY display_order ASC NULLS LAST, created_at DESC) t"
        );
    }

    #[test]
    fn null_filters_use_is_null() {
        assert!(select_where(EntityKind::ProjectGalleryImage, "project_id", true)
            .contains("project_id IS NULL"));
        assert!(select_where(EntityKind::ProjectGalleryImage, "project_id", false)
            .contains("project_id::text = $1"));
    }

    #[test]
    fn update_assigns_from_json_record() {
        let sql = update(EntityKind::NewsArticle, &["title", "image_path"]);
        assert_eq!(
            sql,
            "UPDATE news AS r SET (title, image_path) = (SELECT title, image_path FROM json_populate_record(NULL::news, $1)) WHERE r.id::text = $2 RETURNING row_to_json(r) AS json"
        );
    }

    #[test]
    fn insert_without_columns_uses_defaults() {
        assert!(insert(EntityKind::Award, &[]).contains("DEFAULT VALUES"));
    }
}
