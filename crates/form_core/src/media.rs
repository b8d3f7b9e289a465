use std::{fmt, sync::Arc};

use futures::future::{join_all, BoxFuture, FutureExt};
use shared::domain::{EntityId, MediaCategory};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{GatewayError, MediaError},
    gateway::BackendGateway,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSetConfig {
    pub min_count: usize,
    pub max_count: usize,
    pub crop_required: bool,
    pub aspect_ratio: Option<AspectRatio>,
}

impl MediaSetConfig {
    pub fn for_category(category: MediaCategory) -> Self {
        match category {
            MediaCategory::StudioPhotos => Self {
                min_count: 0,
                max_count: 10,
                crop_required: false,
                aspect_ratio: None,
            },
            MediaCategory::StudioLogo => Self {
                min_count: 0,
                max_count: 1,
                crop_required: true,
                aspect_ratio: Some(AspectRatio::SQUARE),
            },
            MediaCategory::StudioAnnouncements => Self {
                min_count: 0,
                max_count: 5,
                crop_required: false,
                aspect_ratio: None,
            },
            MediaCategory::WorkshopIcon => Self {
                min_count: 0,
                max_count: 1,
                crop_required: false,
                aspect_ratio: None,
            },
        }
    }

    /// Files must pass the crop step before they are accepted.
    pub fn needs_crop(&self) -> bool {
        self.crop_required && self.max_count == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(pub Uuid);

impl LocalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file picked on this machine and not uploaded yet.
///
/// The bytes double as the preview source; dropping the file releases them.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub id: LocalId,
    pub filename: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
    pub cropped: bool,
}

impl LocalFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            id: LocalId::new(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
            cropped: false,
        }
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("id", &self.id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("cropped", &self.cropped)
            .finish()
    }
}

/// Media already stored by the backend, identified by its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    pub url: String,
}

impl RemoteRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Backend file name: the last path segment of the URL, percent-decoded,
    /// and the part after the last `/` once decoded (storage URLs encode the
    /// object path as a single segment).
    pub fn filename(&self) -> String {
        let segment = match url::Url::parse(&self.url) {
            Ok(parsed) => parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string)
                .unwrap_or_default(),
            Err(_) => self
                .url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        let decoded = urlencoding::decode(&segment)
            .map(|cow| cow.into_owned())
            .unwrap_or(segment);
        decoded
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Existing, newly added and pending-removal media of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSet {
    pub category: MediaCategory,
    pub config: MediaSetConfig,
    existing: Vec<RemoteRef>,
    added: Vec<LocalFile>,
    removed: Vec<RemoteRef>,
}

impl MediaSet {
    pub fn new(category: MediaCategory) -> Self {
        Self {
            category,
            config: MediaSetConfig::for_category(category),
            existing: Vec::new(),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Seeds the set with media the backend already holds. Extra refs beyond
    /// `max_count` are kept; they only block further additions.
    pub fn with_existing(mut self, existing: Vec<RemoteRef>) -> Self {
        self.existing = existing;
        self
    }

    pub fn existing(&self) -> &[RemoteRef] {
        &self.existing
    }

    pub fn added(&self) -> &[LocalFile] {
        &self.added
    }

    pub fn removed(&self) -> &[RemoteRef] {
        &self.removed
    }

    /// Items the record will hold after commit.
    pub fn visible_count(&self) -> usize {
        self.existing.len() + self.added.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.config.max_count.saturating_sub(self.visible_count())
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn add_local(&mut self, files: Vec<LocalFile>) -> Result<(), MediaError> {
        if self.visible_count() + files.len() > self.config.max_count {
            return Err(MediaError::CapacityExceeded {
                category: self.category,
                max: self.config.max_count,
                current: self.visible_count(),
                requested: files.len(),
            });
        }
        if self.config.needs_crop() && files.iter().any(|file| !file.cropped) {
            return Err(MediaError::CropRequired {
                category: self.category,
            });
        }
        self.added.extend(files);
        Ok(())
    }

    pub fn remove_existing(&mut self, url: &str) -> Result<(), MediaError> {
        let position = self
            .existing
            .iter()
            .position(|remote| remote.url == url)
            .ok_or_else(|| MediaError::UnknownRemote {
                category: self.category,
                url: url.to_string(),
            })?;
        let remote = self.existing.remove(position);
        self.removed.push(remote);
        Ok(())
    }

    pub fn remove_local(&mut self, id: LocalId) -> Option<LocalFile> {
        let position = self.added.iter().position(|file| file.id == id)?;
        Some(self.added.remove(position))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOp {
    Upload { files: usize },
    Delete { filename: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaOpOutcome {
    pub op: MediaOp,
    pub result: Result<(), GatewayError>,
}

impl MediaOpOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No owner id existed, nothing was sent.
    Skipped,
    Committed(Vec<MediaOpOutcome>),
}

impl CommitOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn operations(&self) -> &[MediaOpOutcome] {
        match self {
            Self::Skipped => &[],
            Self::Committed(operations) => operations,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &MediaOpOutcome> {
        self.operations().iter().filter(|outcome| !outcome.is_ok())
    }

    pub fn all_ok(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Drives one category's media state against the backend.
pub struct MediaSetController {
    set: MediaSet,
    gateway: Arc<dyn BackendGateway>,
}

impl MediaSetController {
    pub fn new(set: MediaSet, gateway: Arc<dyn BackendGateway>) -> Self {
        Self { set, gateway }
    }

    pub fn category(&self) -> MediaCategory {
        self.set.category
    }

    pub fn set(&self) -> &MediaSet {
        &self.set
    }

    pub fn add_local(&mut self, files: Vec<LocalFile>) -> Result<(), MediaError> {
        self.set.add_local(files)
    }

    pub fn remove_existing(&mut self, url: &str) -> Result<(), MediaError> {
        self.set.remove_existing(url)
    }

    pub fn remove_local(&mut self, id: LocalId) -> Option<LocalFile> {
        self.set.remove_local(id)
    }

    /// Uploads added files in one batch and deletes every removed ref.
    ///
    /// All calls run together and each failure is recorded in place; nothing
    /// here aborts a sibling call and this never returns an error.
    pub async fn commit(&self, owner: Option<&EntityId>) -> CommitOutcome {
        let category = self.set.category;
        let Some(owner) = owner else {
            debug!(%category, "media commit skipped: record has no id");
            return CommitOutcome::Skipped;
        };

        let mut operations: Vec<BoxFuture<'_, MediaOpOutcome>> = Vec::new();
        if !self.set.added.is_empty() {
            let files = self.set.added.as_slice();
            let gateway = &self.gateway;
            operations.push(
                async move {
                    let result = gateway
                        .upload_media(category, owner, files)
                        .await
                        .map(|_| ());
                    MediaOpOutcome {
                        op: MediaOp::Upload { files: files.len() },
                        result,
                    }
                }
                .boxed(),
            );
        }
        for remote in &self.set.removed {
            let filename = remote.filename();
            let gateway = &self.gateway;
            operations.push(
                async move {
                    let result = gateway.delete_media(category, owner, &filename).await;
                    MediaOpOutcome {
                        op: MediaOp::Delete { filename },
                        result,
                    }
                }
                .boxed(),
            );
        }

        let outcomes = join_all(operations).await;
        for outcome in outcomes.iter().filter(|outcome| !outcome.is_ok()) {
            if let Err(err) = &outcome.result {
                warn!(%category, owner = %owner, op = ?outcome.op, "media operation failed: {err}");
            }
        }
        info!(
            %category,
            owner = %owner,
            operations = outcomes.len(),
            failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count(),
            "media commit settled"
        );
        CommitOutcome::Committed(outcomes)
    }
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
