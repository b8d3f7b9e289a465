use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use shared::{
    domain::{EntityId, EntityKind, MediaCategory},
    error::ApiError,
    protocol::{EntityPayload, LocationSummary, UploadResult},
};
use tokio::sync::Mutex;

use crate::{
    error::GatewayError,
    gateway::BackendGateway,
    media::{LocalFile, RemoteRef},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(EntityKind),
    Update(EntityId),
    Upload {
        category: MediaCategory,
        owner: EntityId,
        filenames: Vec<String>,
    },
    Delete {
        category: MediaCategory,
        owner: EntityId,
        filename: String,
    },
    FetchExisting {
        category: MediaCategory,
        owner: EntityId,
    },
    LookupCreator(String),
    ListLocations(String),
}

impl Call {
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Upload { .. } | Self::Delete { .. })
    }
}

pub fn server_error() -> GatewayError {
    GatewayError::Api(ApiError::new(500, "internal error"))
}

/// In-memory backend that records every call in arrival order.
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    created_id: EntityId,
    fail_primary: Option<GatewayError>,
    fail_uploads: HashSet<MediaCategory>,
    fail_deletes: HashSet<String>,
    fail_fetches: HashSet<MediaCategory>,
    existing: HashMap<MediaCategory, Vec<String>>,
    locations: Vec<LocationSummary>,
    creator_registered: bool,
}

impl RecordingGateway {
    pub fn new(created_id: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            created_id: EntityId::new(created_id),
            fail_primary: None,
            fail_uploads: HashSet::new(),
            fail_deletes: HashSet::new(),
            fail_fetches: HashSet::new(),
            existing: HashMap::new(),
            locations: Vec::new(),
            creator_registered: true,
        }
    }

    pub fn failing_primary(mut self, err: GatewayError) -> Self {
        self.fail_primary = Some(err);
        self
    }

    pub fn failing_upload(mut self, category: MediaCategory) -> Self {
        self.fail_uploads.insert(category);
        self
    }

    pub fn failing_delete(mut self, filename: &str) -> Self {
        self.fail_deletes.insert(filename.to_string());
        self
    }

    pub fn failing_fetch(mut self, category: MediaCategory) -> Self {
        self.fail_fetches.insert(category);
        self
    }

    pub fn with_existing(mut self, category: MediaCategory, urls: &[&str]) -> Self {
        self.existing
            .insert(category, urls.iter().map(|url| url.to_string()).collect());
        self
    }

    pub fn with_locations(mut self, locations: Vec<LocationSummary>) -> Self {
        self.locations = locations;
        self
    }

    pub fn without_creator(mut self) -> Self {
        self.creator_registered = false;
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn media_calls(&self) -> Vec<Call> {
        self.calls()
            .await
            .into_iter()
            .filter(Call::is_media)
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl BackendGateway for RecordingGateway {
    async fn create_entity(&self, payload: &EntityPayload) -> Result<EntityId, GatewayError> {
        self.record(Call::Create(payload.kind())).await;
        match &self.fail_primary {
            Some(err) => Err(err.clone()),
            None => Ok(self.created_id.clone()),
        }
    }

    async fn update_entity(
        &self,
        id: &EntityId,
        _payload: &EntityPayload,
    ) -> Result<(), GatewayError> {
        self.record(Call::Update(id.clone())).await;
        match &self.fail_primary {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn upload_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        files: &[LocalFile],
    ) -> Result<Vec<UploadResult>, GatewayError> {
        self.record(Call::Upload {
            category,
            owner: owner.clone(),
            filenames: files.iter().map(|file| file.filename.clone()).collect(),
        })
        .await;
        if self.fail_uploads.contains(&category) {
            return Err(server_error());
        }
        Ok(files
            .iter()
            .map(|file| UploadResult {
                filename: Some(file.filename.clone()),
                url: Some(format!("https://cdn.example.com/{}", file.filename)),
                error: None,
            })
            .collect())
    }

    async fn delete_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        filename: &str,
    ) -> Result<(), GatewayError> {
        self.record(Call::Delete {
            category,
            owner: owner.clone(),
            filename: filename.to_string(),
        })
        .await;
        if self.fail_deletes.contains(filename) {
            return Err(server_error());
        }
        Ok(())
    }

    async fn fetch_existing(
        &self,
        category: MediaCategory,
        owner: &EntityId,
    ) -> Result<Vec<RemoteRef>, GatewayError> {
        self.record(Call::FetchExisting {
            category,
            owner: owner.clone(),
        })
        .await;
        if self.fail_fetches.contains(&category) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        Ok(self
            .existing
            .get(&category)
            .into_iter()
            .flatten()
            .map(RemoteRef::new)
            .collect())
    }

    async fn creator_exists(&self, email: &str) -> Result<bool, GatewayError> {
        self.record(Call::LookupCreator(email.to_string())).await;
        Ok(self.creator_registered)
    }

    async fn list_locations(
        &self,
        creator_email: &str,
    ) -> Result<Vec<LocationSummary>, GatewayError> {
        self.record(Call::ListLocations(creator_email.to_string()))
            .await;
        Ok(self.locations.clone())
    }
}
