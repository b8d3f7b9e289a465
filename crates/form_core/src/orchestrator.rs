use std::{fmt::Write as _, sync::Arc};

use futures::future::join_all;
use shared::domain::{EntityId, EntityKind, MediaCategory};
use tracing::{info, warn};

use crate::{
    error::SubmitError,
    gateway::BackendGateway,
    media::{CommitOutcome, MediaOpOutcome, MediaSetController},
    model::FormModel,
    validation,
    wire::transform,
};

/// Settled state of one media category after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    pub category: MediaCategory,
    pub ok: bool,
    pub error: Option<String>,
    pub operations: Vec<MediaOpOutcome>,
}

impl CategoryResult {
    fn from_commit(category: MediaCategory, outcome: CommitOutcome) -> Self {
        let errors: Vec<String> = outcome
            .failures()
            .filter_map(|failure| failure.result.as_ref().err())
            .map(ToString::to_string)
            .collect();
        Self {
            category,
            ok: errors.is_empty(),
            error: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
            operations: outcome.operations().to_vec(),
        }
    }
}

/// Result of a submission whose primary write succeeded.
///
/// Media failures are reported here rather than as an error: the record
/// exists and stays created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub entity_id: EntityId,
    pub kind: EntityKind,
    pub created: bool,
    pub media_results: Vec<CategoryResult>,
}

impl SubmissionOutcome {
    pub fn all_ok(&self) -> bool {
        self.media_results.iter().all(|result| result.ok)
    }

    pub fn failed_categories(&self) -> Vec<MediaCategory> {
        self.media_results
            .iter()
            .filter(|result| !result.ok)
            .map(|result| result.category)
            .collect()
    }

    /// One combined message for the operator.
    pub fn notification(&self) -> String {
        let kind = match self.kind {
            EntityKind::Studio => "Studio",
            EntityKind::Workshop => "Workshop",
        };
        let verb = if self.created { "created" } else { "updated" };
        if self.all_ok() {
            return format!("{kind} {verb} successfully.");
        }
        let mut message = format!("{kind} {verb}, but some media could not be saved:");
        for result in self.media_results.iter().filter(|result| !result.ok) {
            let _ = write!(
                message,
                "\n- {}: {}",
                result.category,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        message.push_str("\nOpen the record and add or remove the failed media again.");
        message
    }
}

/// Sequences the primary write and the per-category media commits.
pub struct SubmissionOrchestrator {
    gateway: Arc<dyn BackendGateway>,
}

impl SubmissionOrchestrator {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }

    /// Validates, writes the record, then commits every media category.
    ///
    /// A create assigns the returned id to `model`. Nothing is sent when
    /// validation fails, and no media call is made when the primary write
    /// fails.
    pub async fn submit(
        &self,
        model: &mut FormModel,
        is_update: bool,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let kind = model.kind();
        let errors = validation::full(model);
        if !errors.is_empty() {
            warn!(%kind, errors = errors.len(), "submission blocked by validation: {errors}");
            return Err(SubmitError::Validation(errors));
        }

        let payload = transform(model);
        let entity_id = if is_update {
            let id = model.id.clone().ok_or(SubmitError::MissingEntityId)?;
            self.gateway
                .update_entity(&id, &payload)
                .await
                .map_err(|source| SubmitError::Primary { kind, source })?;
            info!(%kind, id = %id, "record updated");
            id
        } else {
            if let Some(existing) = &model.id {
                return Err(SubmitError::AlreadyCreated(existing.to_string()));
            }
            let id = self
                .gateway
                .create_entity(&payload)
                .await
                .map_err(|source| SubmitError::Primary { kind, source })?;
            model
                .assign_id(id.clone())
                .map_err(|_| SubmitError::AlreadyCreated(id.to_string()))?;
            info!(%kind, id = %id, "record created");
            id
        };

        let controllers: Vec<MediaSetController> = model
            .media
            .values()
            .map(|set| MediaSetController::new(set.clone(), self.gateway.clone()))
            .collect();
        let outcomes = join_all(
            controllers
                .iter()
                .map(|controller| controller.commit(Some(&entity_id))),
        )
        .await;

        let media_results: Vec<CategoryResult> = controllers
            .iter()
            .zip(outcomes)
            .map(|(controller, outcome)| CategoryResult::from_commit(controller.category(), outcome))
            .collect();
        let outcome = SubmissionOutcome {
            entity_id,
            kind,
            created: !is_update,
            media_results,
        };
        if outcome.all_ok() {
            info!(%kind, id = %outcome.entity_id, "submission complete");
        } else {
            warn!(
                %kind,
                id = %outcome.entity_id,
                failed = ?outcome.failed_categories(),
                "submission saved with media failures"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
