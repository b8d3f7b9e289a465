//! Creation and editing of studios and workshops together with their media.
//!
//! A [`FormModel`] is changed only through [`reduce`]. [`SubmissionOrchestrator`]
//! writes the record first and then settles every media category against the
//! id the backend returned.

pub mod crop;
pub mod error;
pub mod gateway;
pub mod hydrate;
pub mod media;
pub mod model;
pub mod orchestrator;
pub mod reducer;
pub mod session;
pub mod timings;
pub mod transport;
pub mod validation;
pub mod venue;
pub mod wire;

pub use error::{FormError, GatewayError, MediaError, SubmitError, ValidationErrors};
pub use gateway::{AddressResolver, BackendGateway};
pub use media::{CommitOutcome, LocalFile, MediaSet, MediaSetController, RemoteRef};
pub use model::{EntityDraft, FormMode, FormModel};
pub use orchestrator::{SubmissionOrchestrator, SubmissionOutcome};
pub use reducer::{reduce, FormAction};
pub use session::FormSession;
pub use transport::HttpBackendGateway;
pub use validation::WizardStep;
pub use wire::transform;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
