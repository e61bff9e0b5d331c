use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use shared_models::error::ApiError;

use crate::models::DoctorId;
use crate::services::selection::BookingPhase;

/// Missing or inconsistent input. The view keeps the submit control
/// disabled while any of these hold, so reaching them at runtime means a
/// caller skipped `can_submit`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No doctor selected")]
    MissingDoctor,

    #[error("No date selected")]
    MissingDate,

    #[error("No time slot selected")]
    MissingSlot,

    #[error("Reason for visit is required")]
    EmptyReason,

    #[error("Date {date} is before the earliest bookable date {min_date}")]
    PastDate { date: NaiveDate, min_date: NaiveDate },

    #[error("Slot starting at {0} is not in the current availability")]
    UnknownSlot(DateTime<Utc>),

    #[error("Doctor {0} is not in the doctor list")]
    UnknownDoctor(DoctorId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("A booking request is already in flight")]
    AlreadyInFlight,

    #[error("This booking has already been submitted")]
    AlreadySubmitted,

    #[error("Submission outcome belongs to draft {0}")]
    ForeignOutcome(uuid::Uuid),

    #[error("Booking draft is incomplete: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to book appointment: {0}")]
    Rejected(#[from] ApiError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Fetch error: {0}")]
    FetchError(#[from] ApiError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Submission error: {0}")]
    SubmissionError(#[from] SubmissionError),

    #[error("Cannot {action} while {from:?}")]
    InvalidTransition { from: BookingPhase, action: &'static str },
}
