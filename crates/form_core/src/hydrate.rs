use futures::future::join_all;
use shared::{
    domain::{EntityKind, MediaCategory},
    protocol::{LocationSummary, StudioDocument, WorkshopDocument},
};
use tracing::{debug, info, warn};

use crate::{
    error::LookupError,
    gateway::BackendGateway,
    media::MediaSet,
    model::{empty_media, EntityDraft, FormMode, FormModel},
    validation::is_valid_email,
    wire::{studio_draft, workshop_draft},
};

impl FormModel {
    pub fn from_studio_document(document: &StudioDocument) -> Self {
        Self {
            id: Some(document.id.clone()),
            mode: FormMode::Edit,
            entity: EntityDraft::Studio(studio_draft(&document.studio)),
            media: empty_media(EntityKind::Studio),
        }
    }

    pub fn from_workshop_document(document: &WorkshopDocument) -> Self {
        Self {
            id: Some(document.workshop_id.clone()),
            mode: FormMode::Edit,
            entity: EntityDraft::Workshop(workshop_draft(&document.workshop, &document.variants)),
            media: empty_media(EntityKind::Workshop),
        }
    }
}

/// Fills every media category of a hydrated model with what the backend
/// already stores. A category whose fetch fails stays empty.
pub async fn load_for_edit(gateway: &dyn BackendGateway, mut model: FormModel) -> FormModel {
    let Some(owner) = model.id.clone() else {
        debug!(kind = %model.kind(), "no record id, existing media not fetched");
        return model;
    };
    let categories: Vec<MediaCategory> = model.media.keys().copied().collect();
    let fetched = join_all(
        categories
            .iter()
            .map(|category| gateway.fetch_existing(*category, &owner)),
    )
    .await;

    for (category, result) in categories.into_iter().zip(fetched) {
        match result {
            Ok(existing) => {
                debug!(%category, owner = %owner, count = existing.len(), "existing media loaded");
                model
                    .media
                    .insert(category, MediaSet::new(category).with_existing(existing));
            }
            Err(err) => {
                warn!(%category, owner = %owner, "failed to load existing media: {err}");
            }
        }
    }
    info!(kind = %model.kind(), id = %owner, "record loaded for edit");
    model
}

/// Checks that `creator_email` belongs to a registered user. Workshop
/// details stay locked until it does.
pub async fn verify_creator(
    gateway: &dyn BackendGateway,
    creator_email: &str,
) -> Result<(), LookupError> {
    let email = creator_email.trim();
    if !is_valid_email(email) {
        return Err(LookupError::InvalidEmail(email.to_string()));
    }
    if gateway.creator_exists(email).await? {
        Ok(())
    } else {
        warn!(creator = email, "creator email has no account");
        Err(LookupError::UnknownCreator(email.to_string()))
    }
}

/// Studios a registered creator owns, offered as workshop venues.
pub async fn list_locations(
    gateway: &dyn BackendGateway,
    creator_email: &str,
) -> Result<Vec<LocationSummary>, LookupError> {
    verify_creator(gateway, creator_email).await?;
    let locations = gateway.list_locations(creator_email.trim()).await?;
    debug!(count = locations.len(), "venue locations loaded");
    Ok(locations)
}
