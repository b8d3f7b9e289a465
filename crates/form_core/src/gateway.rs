//! Seams to the services the orchestrator depends on but does not own.

use async_trait::async_trait;
use shared::{
    domain::{EntityId, MediaCategory},
    protocol::{EntityPayload, LocationSummary, UploadResult},
};

use crate::{
    error::GatewayError,
    media::{LocalFile, RemoteRef},
};

#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn create_entity(&self, payload: &EntityPayload) -> Result<EntityId, GatewayError>;
    async fn update_entity(
        &self,
        id: &EntityId,
        payload: &EntityPayload,
    ) -> Result<(), GatewayError>;
    async fn upload_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        files: &[LocalFile],
    ) -> Result<Vec<UploadResult>, GatewayError>;
    async fn delete_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        filename: &str,
    ) -> Result<(), GatewayError>;
    async fn fetch_existing(
        &self,
        category: MediaCategory,
        owner: &EntityId,
    ) -> Result<Vec<RemoteRef>, GatewayError>;
    /// Whether a user account is registered under `email`.
    async fn creator_exists(&self, email: &str) -> Result<bool, GatewayError>;
    /// Studios registered by a creator, the candidates for a workshop venue.
    async fn list_locations(
        &self,
        creator_email: &str,
    ) -> Result<Vec<LocationSummary>, GatewayError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSuggestion {
    pub description: String,
    pub place_id: String,
}

/// Geocoding and place autocomplete.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve_address(&self, query: &str) -> Result<ResolvedAddress, GatewayError>;
    async fn lookup_place_autocomplete(
        &self,
        text: &str,
    ) -> Result<Vec<PlaceSuggestion>, GatewayError>;
}
