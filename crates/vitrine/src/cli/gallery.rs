//! Gallery command handlers.

use super::{Context, GalleryCommands, read_file};
use std::path::PathBuf;
use vitrine::{EntityId, EntityKind, NewGalleryImage, PendingUpload, VitrineResult};

/// Handle gallery commands.
pub async fn handle_gallery_command(ctx: &Context, cmd: GalleryCommands) -> VitrineResult<bool> {
    match cmd {
        GalleryCommands::Add {
            kind,
            id,
            files,
            sort,
        } => add(ctx, kind, id.into(), files, sort).await,
        GalleryCommands::Remove { kind, id } => remove(ctx, kind, id.into()).await,
        GalleryCommands::Reorder { kind, orders } => reorder(ctx, kind, orders).await,
    }
}

async fn add(
    ctx: &Context,
    kind: EntityKind,
    id: EntityId,
    files: Vec<PathBuf>,
    first_sort: Option<i64>,
) -> VitrineResult<bool> {
    let mut images = Vec::with_capacity(files.len());
    for (offset, path) in (0_i64..).zip(&files) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut image = NewGalleryImage::new(PendingUpload::new(name, read_file(path).await?)?);
        if let Some(first) = first_sort {
            image = image.with_sort(first.saturating_add(offset));
        }
        images.push(image);
    }

    let report = ctx.backends.gallery(&ctx.config).append(kind, &id, images).await?;
    ctx.emit(&report, || {
        for row in report.created() {
            println!(
                "Added {} (order {})",
                row.id(),
                row.order_value().map_or_else(|| "-".to_string(), |o| o.to_string())
            );
        }
        if let Some(failure) = report.failure() {
            eprintln!(
                "Error: image {} ({}) failed: {}",
                failure.index() + 1,
                files[*failure.index()].display(),
                failure.message()
            );
            if let Some(key) = failure.orphaned() {
                eprintln!("Uploaded object '{}' is not referenced by any row", key);
            }
        }
    })?;
    Ok(report.is_complete())
}

async fn remove(ctx: &Context, kind: EntityKind, id: EntityId) -> VitrineResult<bool> {
    let cleanup = ctx.backends.gallery(&ctx.config).remove(kind, &id).await?;
    ctx.emit(&cleanup, || println!("Removed {} {}", kind, id))?;
    Ok(true)
}

async fn reorder(ctx: &Context, kind: EntityKind, orders: Vec<(String, i64)>) -> VitrineResult<bool> {
    let orders: Vec<(EntityId, i64)> = orders
        .into_iter()
        .map(|(id, order)| (EntityId::from(id), order))
        .collect();
    let rows = ctx.backends.gallery(&ctx.config).reorder(kind, &orders).await?;
    ctx.emit(&rows, || println!("Updated order of {} rows", rows.len()))?;
    Ok(true)
}
