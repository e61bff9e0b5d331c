// libs/booking-cell/src/services/submission.rs
use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shared_models::error::ApiError;

use crate::backend::BookingBackend;
use crate::error::SubmissionError;
use crate::models::{BookingConfirmation, BookingId, BookingRequest};
use crate::services::selection::BookingDraft;

/// A request that has passed validation; the draft it came from is now
/// in `Submitting`.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub draft_id: Uuid,
    pub request: BookingRequest,
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub draft_id: Uuid,
    pub result: Result<BookingConfirmation, ApiError>,
}

/// Sends a booking for a draft, allowing at most one request in flight.
///
/// No idempotency key is sent: if a failure was really a slow success on
/// the backend, a manual retry creates a second appointment.
pub struct SubmissionFlow {
    backend: Arc<dyn BookingBackend>,
}

impl SubmissionFlow {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self { backend }
    }

    pub fn prepare(&self, draft: &mut BookingDraft) -> Result<PendingSubmission, SubmissionError> {
        let request = draft.begin_submission()?;
        Ok(PendingSubmission { draft_id: draft.id(), request })
    }

    pub fn execute(&self, pending: PendingSubmission) -> impl Future<Output = SubmissionOutcome> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        async move {
            let result = backend.create_appointment(&pending.request).await;
            SubmissionOutcome { draft_id: pending.draft_id, result }
        }
    }

    /// Moves the draft to `Submitted`, or back to `SlotChosen` with its
    /// fields untouched.
    pub fn apply(&self, draft: &mut BookingDraft, outcome: SubmissionOutcome) -> Result<BookingId, SubmissionError> {
        if outcome.draft_id != draft.id() {
            warn!("Ignoring submission outcome for draft {} in draft {}", outcome.draft_id, draft.id());
            return Err(SubmissionError::ForeignOutcome(outcome.draft_id));
        }

        match outcome.result {
            Ok(confirmation) => {
                draft.submission_succeeded();
                info!("Appointment {} booked for draft {}", confirmation.id, draft.id());
                Ok(confirmation.id)
            }
            Err(e) => {
                warn!("Failed to book appointment for draft {}: {}", draft.id(), e);
                draft.submission_failed(e.clone());
                Err(SubmissionError::Rejected(e))
            }
        }
    }

    pub async fn submit(&self, draft: &mut BookingDraft) -> Result<BookingId, SubmissionError> {
        let pending = self.prepare(draft)?;
        let outcome = self.execute(pending).await;
        self.apply(draft, outcome)
    }
}
