//! One operator's pass through the wizard.

use tracing::{debug, info};

use crate::{
    error::{FormError, GatewayError, LookupError, SubmitError, ValidationErrors},
    gateway::{AddressResolver, PlaceSuggestion, ResolvedAddress},
    model::{EntityDraft, FormMode, FormModel},
    orchestrator::{SubmissionOrchestrator, SubmissionOutcome},
    reducer::{reduce, FormAction},
    validation::{per_step, WizardStep},
};

pub struct FormSession {
    model: FormModel,
    step: WizardStep,
    orchestrator: SubmissionOrchestrator,
}

impl FormSession {
    pub fn new(model: FormModel, orchestrator: SubmissionOrchestrator) -> Self {
        Self {
            model,
            step: WizardStep::Basics,
            orchestrator,
        }
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_update(&self) -> bool {
        self.model.mode == FormMode::Edit
    }

    pub fn dispatch(&mut self, action: FormAction) -> Result<(), FormError> {
        self.model = reduce(&self.model, action)?;
        Ok(())
    }

    /// Moves forward when the current step is complete.
    pub fn next_step(&mut self) -> Result<WizardStep, ValidationErrors> {
        let errors = per_step(self.step, &self.model);
        if !errors.is_empty() {
            debug!(step = self.step.number(), errors = errors.len(), "step incomplete");
            return Err(errors);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn previous_step(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Geocodes the address typed so far and stores the result in the form.
    pub async fn find_on_map(
        &mut self,
        resolver: &dyn AddressResolver,
    ) -> Result<ResolvedAddress, LookupError> {
        let query = self.address_query();
        if query.is_empty() {
            return Err(LookupError::EmptyQuery);
        }
        let resolved = resolver.resolve_address(&query).await?;
        self.dispatch(FormAction::ApplyResolvedAddress(resolved.clone()))?;
        Ok(resolved)
    }

    pub async fn suggest_places(
        &self,
        resolver: &dyn AddressResolver,
        text: &str,
    ) -> Result<Vec<PlaceSuggestion>, GatewayError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        resolver.lookup_place_autocomplete(text.trim()).await
    }

    /// Submits the whole form. After a saved primary write the session
    /// starts over with an empty form; on error the form is kept as is.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, SubmitError> {
        let is_update = self.is_update();
        let outcome = self.orchestrator.submit(&mut self.model, is_update).await?;
        info!(id = %outcome.entity_id, "form saved, session reset");
        self.reset();
        Ok(outcome)
    }

    /// Discards the form. Calls already in flight are not cancelled.
    pub fn cancel(&mut self) {
        debug!(kind = %self.model.kind(), "form cancelled");
        self.reset();
    }

    fn reset(&mut self) {
        self.model = self.model.initial();
        self.step = WizardStep::Basics;
    }

    fn address_query(&self) -> String {
        let parts: Vec<&str> = match &self.model.entity {
            EntityDraft::Studio(studio) => vec![
                &studio.building_name,
                &studio.street,
                &studio.landmark,
                &studio.city,
                &studio.state,
                &studio.pincode,
            ],
            EntityDraft::Workshop(workshop) => vec![
                &workshop.address.building,
                &workshop.address.street,
                &workshop.address.landmark,
                &workshop.address.city,
                &workshop.address.state,
            ],
        }
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
        parts.join(", ")
    }
}
