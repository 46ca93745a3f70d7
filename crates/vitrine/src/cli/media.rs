//! Replace and remove media.

use super::{Context, read_file};
use std::path::Path;
use tracing::debug;
use vitrine::{
    EntityId, EntityKind, EntityUpdate, JsonError, PendingUpload, SyncOutcome, UpdateFields,
    VitrineResult,
};

fn parse_fields(kind: EntityKind, fields: Option<&str>) -> VitrineResult<EntityUpdate> {
    let Some(raw) = fields else {
        return Ok(EntityUpdate::media_only(kind));
    };
    let fields: UpdateFields =
        serde_json::from_str(raw).map_err(|e| JsonError::new(format!("--fields: {}", e)))?;
    Ok(EntityUpdate::new(kind, fields))
}

fn report(ctx: &Context, outcome: &SyncOutcome) -> VitrineResult<bool> {
    ctx.emit(outcome, || {
        if outcome.is_success() {
            match outcome.media_path() {
                Some(path) => println!(
                    "{} ({})",
                    outcome.message(),
                    path.public_url(ctx.backends.storage.public_base())
                ),
                None => println!("{}", outcome.message()),
            }
        } else {
            eprintln!("Error: {}", outcome.message());
        }
        if let SyncOutcome::UpdateFailed {
            orphaned: Some(key),
            ..
        } = outcome
        {
            eprintln!("Uploaded object '{}' is not referenced by any row", key);
        }
    })?;
    Ok(outcome.is_success())
}

/// Upload a file for an entity and write its path with any other fields.
pub async fn replace_media(
    ctx: &Context,
    kind: EntityKind,
    id: EntityId,
    file: Option<&Path>,
    fields: Option<&str>,
) -> VitrineResult<bool> {
    let update = parse_fields(kind, fields)?;
    update.validate()?;

    let upload = match file {
        Some(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(PendingUpload::new(name, read_file(path).await?)?)
        }
        None => None,
    };

    let current = ctx.backends.records.get_by_id(kind, &id).await?.media_path();
    debug!(current = ?current, "Current media");

    let outcome = ctx
        .backends
        .media_sync(&ctx.config)
        .replace_media(&id, current.as_ref(), upload.as_ref(), update)
        .await?;
    report(ctx, &outcome)
}

/// Delete an entity's media and clear the reference.
pub async fn remove_media(ctx: &Context, kind: EntityKind, id: EntityId) -> VitrineResult<bool> {
    let current = ctx.backends.records.get_by_id(kind, &id).await?.media_path();
    let outcome = ctx
        .backends
        .media_sync(&ctx.config)
        .remove_media(kind, &id, current.as_ref())
        .await?;
    report(ctx, &outcome)
}
