//! [`BackendGateway`] over the admin REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EntityId, EntityKind, MediaCategory},
    error::BackendErrorBody,
    protocol::{
        CreateEntityResponse, EntityPayload, LocationListResponse, LocationSummary,
        MediaListResponse, MediaUploadResponse, UploadResult, UserLookupResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    error::GatewayError,
    gateway::BackendGateway,
    media::{LocalFile, RemoteRef},
};

pub struct HttpBackendGateway {
    http: Client,
    base_url: Url,
}

impl HttpBackendGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, GatewayError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|err| GatewayError::Transport(format!("invalid server url {base_url}: {err}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|err| GatewayError::Transport(format!("invalid endpoint {path}: {err}")))
    }

    fn media_endpoint(&self, category: MediaCategory, rest: &[&str]) -> Result<Url, GatewayError> {
        let mut path = format!("imagesCrud/{}/", category.collection());
        for segment in rest {
            path.push_str(&urlencoding::encode(segment));
            path.push('/');
        }
        self.endpoint(&path)
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Passes 2xx responses through and turns the rest into [`GatewayError::Api`].
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body: BackendErrorBody = serde_json::from_str(&text).unwrap_or_default();
    Err(GatewayError::Api(body.into_api_error(
        status.as_u16(),
        status.canonical_reason().unwrap_or("request failed"),
    )))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let bytes = check(response).await?.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn create_entity(&self, payload: &EntityPayload) -> Result<EntityId, GatewayError> {
        let path = match payload.kind() {
            EntityKind::Studio => "crud/create_studio/",
            EntityKind::Workshop => "crud/create_workshop/",
        };
        let url = self.endpoint(path)?;
        debug!(%url, "creating record");
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        let created: CreateEntityResponse = decode(response).await?;
        Ok(created.id)
    }

    async fn update_entity(
        &self,
        id: &EntityId,
        payload: &EntityPayload,
    ) -> Result<(), GatewayError> {
        let path = match payload.kind() {
            EntityKind::Studio => format!("crud/update_studio/{}", urlencoding::encode(id.as_str())),
            EntityKind::Workshop => {
                format!("crud/update_workshop/{}", urlencoding::encode(id.as_str()))
            }
        };
        let url = self.endpoint(&path)?;
        debug!(%url, "updating record");
        let response = self
            .http
            .put(url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn upload_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        files: &[LocalFile],
    ) -> Result<Vec<UploadResult>, GatewayError> {
        let mut form = Form::new().text("entity_id", owner.to_string());
        for file in files {
            let part = Part::bytes(file.bytes.to_vec())
                .file_name(file.filename.clone())
                .mime_str(&file.content_type)
                .map_err(transport)?;
            form = form.part("images", part);
        }
        let url = self.media_endpoint(category, &[])?;
        debug!(%url, files = files.len(), "uploading media");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let uploaded: MediaUploadResponse = decode(response).await?;
        Ok(uploaded.results)
    }

    async fn delete_media(
        &self,
        category: MediaCategory,
        owner: &EntityId,
        filename: &str,
    ) -> Result<(), GatewayError> {
        let url = self.media_endpoint(category, &[owner.as_str(), filename])?;
        debug!(%url, "deleting media");
        let response = self.http.delete(url).send().await.map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_existing(
        &self,
        category: MediaCategory,
        owner: &EntityId,
    ) -> Result<Vec<RemoteRef>, GatewayError> {
        let url = self.media_endpoint(category, &[owner.as_str()])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        let listed: MediaListResponse = decode(response).await?;
        Ok(listed.image_urls.into_iter().map(RemoteRef::new).collect())
    }

    async fn creator_exists(&self, email: &str) -> Result<bool, GatewayError> {
        let url = self.endpoint(&format!(
            "crud/getUserDataByEmail/{}",
            urlencoding::encode(email)
        ))?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let found: UserLookupResponse = decode(response).await?;
        Ok(found.has_user())
    }

    async fn list_locations(
        &self,
        creator_email: &str,
    ) -> Result<Vec<LocationSummary>, GatewayError> {
        let url = self.endpoint("crud/listStudiosWithFilters/")?;
        let response = self
            .http
            .get(url)
            .query(&[("creatorEmail", creator_email)])
            .send()
            .await
            .map_err(transport)?;
        let listed: LocationListResponse = decode(response).await?;
        Ok(listed.data)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
