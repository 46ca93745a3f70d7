//! Listing, promotion, cascade deletion and temp sweeps.

use super::{Context, read_file};
use std::path::Path;
use vitrine::{
    EntityId, EntityKind, OldMediaCleanup, PageButton, SortDirection, ValidationError, VitrineResult,
    filter_by_title, page_window, paginate, sort_by_created,
};

/// Rewrite temp image URLs of an article body.
///
/// With `html`, the file is rewritten in place; otherwise the stored body is
/// promoted and saved.
pub async fn promote(
    ctx: &Context,
    kind: EntityKind,
    id: EntityId,
    html: Option<&Path>,
) -> VitrineResult<bool> {
    let promoter = ctx.backends.promoter(&ctx.config)?;
    let report = match html {
        Some(path) => {
            let body = String::from_utf8(read_file(path).await?).map_err(|_| {
                ValidationError::invalid("html", format!("{} is not UTF-8", path.display()))
            })?;
            let report = promoter.promote(kind, &id, &body).await;
            if report.changed() {
                tokio::fs::write(path, report.html()).await.map_err(|e| {
                    ValidationError::invalid("html", format!("cannot write {}: {}", path.display(), e))
                })?;
            }
            report
        }
        None => promoter.promote_and_save(kind, &id).await?,
    };

    ctx.emit(&report, || {
        for (from, to) in report.promoted() {
            println!("{} -> {}", from, to);
        }
        for (key, reason) in report.failed() {
            eprintln!("Left in temp namespace: {} ({})", key, reason);
        }
        println!(
            "Promoted {} image(s), {} left in place",
            report.promoted().len(),
            report.failed().len()
        );
    })?;
    Ok(report.failed().is_empty())
}

/// List rows in display order, filtered and paged.
pub async fn list(
    ctx: &Context,
    kind: EntityKind,
    search: Option<&str>,
    created: Option<SortDirection>,
    page: usize,
    page_size: Option<usize>,
) -> VitrineResult<bool> {
    let mut rows = ctx.backends.records.get_all(kind).await?;
    if let Some(direction) = created {
        sort_by_created(&mut rows, direction);
    }
    let rows = filter_by_title(rows, search.unwrap_or_default());
    let page = paginate(rows, page, page_size.unwrap_or(ctx.config.listing.page_size));

    ctx.emit(&page, || {
        let base = ctx.backends.storage.public_base();
        println!(
            "{} (page {} of {}, {} rows)",
            kind.table(),
            page.page(),
            page.total_pages(),
            page.total_items()
        );
        println!("{:-<80}", "");
        for row in page.items() {
            println!(
                "{:<38} {:>6}  {:<30}  {}",
                row.id(),
                row.order_value().map_or_else(|| "-".to_string(), |o| o.to_string()),
                row.title().unwrap_or("(untitled)"),
                row.media_path().map(|p| p.public_url(base)).unwrap_or_default()
            );
        }
        let pager: Vec<String> = page_window(*page.page(), *page.total_pages())
            .into_iter()
            .map(|b| match b {
                PageButton::Page(n) if n == *page.page() => format!("[{}]", n),
                PageButton::Page(n) => n.to_string(),
                PageButton::Gap => "…".to_string(),
            })
            .collect();
        println!("{}", pager.join(" "));
    })?;
    Ok(true)
}

/// Delete an entity with its media and gallery rows.
pub async fn delete_entity(ctx: &Context, kind: EntityKind, id: EntityId) -> VitrineResult<bool> {
    let report = ctx.backends.media_sync(&ctx.config).delete_entity(kind, &id).await?;
    ctx.emit(&report, || {
        println!(
            "Deleted {} {} with {} gallery row(s)",
            kind,
            id,
            report.child_rows_deleted()
        );
        let failed = report
            .media()
            .iter()
            .filter(|c| matches!(c, OldMediaCleanup::Failed { .. }))
            .count();
        if failed > 0 {
            eprintln!("{} object(s) could not be deleted", failed);
        }
    })?;
    Ok(true)
}

/// Delete stale temp objects.
pub async fn sweep_temp(ctx: &Context, max_age_hours: Option<u64>) -> VitrineResult<bool> {
    let max_age = match max_age_hours {
        Some(hours) => std::time::Duration::from_secs(hours.saturating_mul(3600)),
        None => ctx.config.sweep.max_age(),
    };
    let max_age = chrono::Duration::from_std(max_age)
        .map_err(|e| ValidationError::invalid("max_age_hours", e.to_string()))?;

    let report = ctx
        .backends
        .sweeper(&ctx.config)?
        .sweep(max_age, chrono::Utc::now())
        .await?;
    ctx.emit(&report, || {
        for key in report.deleted() {
            println!("Deleted {}", key);
        }
        for (key, reason) in report.failed() {
            eprintln!("Failed to delete {}: {}", key, reason);
        }
        println!(
            "Swept {} object(s), kept {}, {} failed",
            report.deleted().len(),
            report.kept(),
            report.failed().len()
        );
    })?;
    Ok(report.failed().is_empty())
}
