//! Draft files and media paths given on the command line.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use form_core::{
    crop::crop_to_aspect,
    media::LocalFile,
    model::{EntityDraft, FormModel},
    wire::{studio_draft, workshop_draft},
    MediaSet,
};
use shared::{
    domain::{EntityId, EntityKind, MediaCategory},
    protocol::{StudioDocument, StudioRecord, WorkshopDocument, WorkshopPayload},
};

/// `CATEGORY=PATH` as given to `--media`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArg {
    pub category: String,
    pub path: PathBuf,
}

pub fn parse_media_arg(raw: &str) -> Result<MediaArg, String> {
    let (category, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=PATH, got '{raw}'"))?;
    if category.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected CATEGORY=PATH, got '{raw}'"));
    }
    Ok(MediaArg {
        category: category.trim().to_string(),
        path: PathBuf::from(path.trim()),
    })
}

/// `CATEGORY=FILENAME` or `CATEGORY=URL` as given to `--remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalArg {
    pub category: String,
    pub target: String,
}

pub fn parse_removal_arg(raw: &str) -> Result<RemovalArg, String> {
    let (category, target) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=FILENAME, got '{raw}'"))?;
    if category.trim().is_empty() || target.trim().is_empty() {
        return Err(format!("expected CATEGORY=FILENAME, got '{raw}'"));
    }
    Ok(RemovalArg {
        category: category.trim().to_string(),
        target: target.trim().to_string(),
    })
}

/// URL of the stored item named by `target`, matched on the full URL or
/// on its decoded filename.
pub fn resolve_removal(set: &MediaSet, target: &str) -> anyhow::Result<String> {
    set.existing()
        .iter()
        .find(|remote| remote.url == target || remote.filename() == target)
        .map(|remote| remote.url.clone())
        .ok_or_else(|| {
            let stored: Vec<String> = set.existing().iter().map(|remote| remote.filename()).collect();
            if stored.is_empty() {
                anyhow!("{} has no stored media to remove", set.category)
            } else {
                anyhow!(
                    "'{target}' is not stored under {}, found: {}",
                    set.category,
                    stored.join(", ")
                )
            }
        })
}

pub fn resolve_category(kind: EntityKind, name: &str) -> anyhow::Result<MediaCategory> {
    MediaCategory::from_name(kind, name).ok_or_else(|| {
        let known: Vec<&str> = kind
            .media_categories()
            .iter()
            .map(|category| category.name())
            .collect();
        anyhow!(
            "unknown {kind} media category '{name}', expected one of: {}",
            known.join(", ")
        )
    })
}

/// Reads a JSON draft in the backend record shape. With an id the model is
/// in edit mode.
pub fn load_draft(
    kind: EntityKind,
    path: &Path,
    entity_id: Option<EntityId>,
) -> anyhow::Result<FormModel> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft '{}'", path.display()))?;
    let context = || format!("draft '{}' is not a valid {kind}", path.display());

    let model = match (kind, entity_id) {
        (EntityKind::Studio, Some(id)) => {
            let studio: StudioRecord = serde_json::from_str(&raw).with_context(context)?;
            FormModel::from_studio_document(&StudioDocument { id, studio })
        }
        (EntityKind::Studio, None) => {
            let studio: StudioRecord = serde_json::from_str(&raw).with_context(context)?;
            let mut model = FormModel::new(kind);
            model.entity = EntityDraft::Studio(studio_draft(&studio));
            model
        }
        (EntityKind::Workshop, Some(workshop_id)) => {
            let payload: WorkshopPayload = serde_json::from_str(&raw).with_context(context)?;
            FormModel::from_workshop_document(&WorkshopDocument {
                workshop_id,
                workshop: payload.workshop,
                variants: payload.variants,
            })
        }
        (EntityKind::Workshop, None) => {
            let payload: WorkshopPayload = serde_json::from_str(&raw).with_context(context)?;
            let mut model = FormModel::new(kind);
            model.entity =
                EntityDraft::Workshop(workshop_draft(&payload.workshop, &payload.variants));
            model
        }
    };
    Ok(model)
}

pub async fn read_media_file(path: &Path) -> anyhow::Result<LocalFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read media file '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("media path '{}' has no file name", path.display()))?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(LocalFile::new(filename, content_type, bytes))
}

/// Center-crops the file when the category only accepts cropped images.
pub fn prepare_for(set: &MediaSet, file: LocalFile) -> anyhow::Result<LocalFile> {
    match set.config.aspect_ratio {
        Some(aspect) if set.config.needs_crop() => crop_to_aspect(&file, aspect, None)
            .with_context(|| format!("failed to crop '{}' for {}", file.filename, set.category)),
        _ => Ok(file),
    }
}
