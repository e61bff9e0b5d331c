pub mod selection;
pub mod availability;
pub mod submission;
pub mod directory;

pub use selection::{BookingDraft, BookingPhase, DraftStatus, SlotAvailability};
pub use availability::{AvailabilityCoordinator, SlotFetchOutcome, SlotQuery};
pub use submission::{PendingSubmission, SubmissionFlow, SubmissionOutcome};
pub use directory::DoctorDirectory;
