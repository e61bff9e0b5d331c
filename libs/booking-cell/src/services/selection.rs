// libs/booking-cell/src/services/selection.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use shared_models::error::ApiError;

use crate::error::{BookingError, SubmissionError, ValidationError};
use crate::models::{BookingRequest, DoctorId, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingPhase {
    Idle,
    DoctorChosen,
    DoctorAndDateChosen,
    SlotsLoaded,
    SlotChosen,
    Submitting,
    Submitted,
}

impl BookingPhase {
    /// Selections cannot change once a request has been sent.
    pub fn is_locked(&self) -> bool {
        matches!(self, BookingPhase::Submitting | BookingPhase::Submitted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingPhase::Submitted)
    }
}

/// Coarse status shown to the user; derived from the phase and the last
/// fetch and submission outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DraftStatus {
    Idle,
    FetchingSlots,
    ReadyToSubmit,
    Submitting,
    Submitted,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotAvailability {
    NotRequested,
    Pending,
    Loaded,
    Empty,
    Failed(ApiError),
}

/// In-progress booking selection for one view.
///
/// Every mutation goes through a transition method; replaying the same
/// sequence of calls on a fresh draft yields the same state.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    id: Uuid,
    min_date: NaiveDate,
    doctor_id: Option<DoctorId>,
    date: Option<NaiveDate>,
    slots: Vec<Slot>,
    selected_slot: Option<DateTime<Utc>>,
    reason: String,
    duration_minutes: u32,
    phase: BookingPhase,
    availability: SlotAvailability,
    submission_error: Option<ApiError>,
}

impl BookingDraft {
    pub fn new(min_date: NaiveDate, duration_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            min_date,
            doctor_id: None,
            date: None,
            slots: Vec::new(),
            selected_slot: None,
            reason: String::new(),
            duration_minutes,
            phase: BookingPhase::Idle,
            availability: SlotAvailability::NotRequested,
            submission_error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn doctor_id(&self) -> Option<&DoctorId> {
        self.doctor_id.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn selected_slot(&self) -> Option<DateTime<Utc>> {
        self.selected_slot
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    pub fn availability(&self) -> &SlotAvailability {
        &self.availability
    }

    pub fn submission_error(&self) -> Option<&ApiError> {
        self.submission_error.as_ref()
    }

    /// The (doctor, date) pair slots are wanted for, once both are set.
    pub fn slot_key(&self) -> Option<(&DoctorId, NaiveDate)> {
        match (&self.doctor_id, self.date) {
            (Some(doctor_id), Some(date)) => Some((doctor_id, date)),
            _ => None,
        }
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), BookingError> {
        if self.phase.is_locked() {
            return Err(BookingError::InvalidTransition { from: self.phase, action });
        }
        Ok(())
    }

    fn invalidate_slots(&mut self) {
        self.slots.clear();
        self.selected_slot = None;
        self.availability = if self.slot_key().is_some() {
            SlotAvailability::Pending
        } else {
            SlotAvailability::NotRequested
        };
    }

    /// Returns whether the selection changed. The chosen date survives a
    /// doctor change; slots and the chosen slot do not.
    pub fn select_doctor(&mut self, doctor_id: DoctorId) -> Result<bool, BookingError> {
        self.ensure_editable("select a doctor")?;

        if self.doctor_id.as_ref() == Some(&doctor_id) {
            return Ok(false);
        }

        debug!("Draft {}: doctor {} selected", self.id, doctor_id);
        self.doctor_id = Some(doctor_id);
        self.submission_error = None;
        self.phase = if self.date.is_some() {
            BookingPhase::DoctorAndDateChosen
        } else {
            BookingPhase::DoctorChosen
        };
        self.invalidate_slots();

        Ok(true)
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<bool, BookingError> {
        self.ensure_editable("select a date")?;

        if date < self.min_date {
            return Err(ValidationError::PastDate { date, min_date: self.min_date }.into());
        }
        if self.date == Some(date) {
            return Ok(false);
        }

        debug!("Draft {}: date {} selected", self.id, date);
        self.date = Some(date);
        self.submission_error = None;
        // Without a doctor the date is only remembered.
        self.phase = if self.doctor_id.is_some() {
            BookingPhase::DoctorAndDateChosen
        } else {
            BookingPhase::Idle
        };
        self.invalidate_slots();

        Ok(true)
    }

    /// Re-arms the slot request after a failed or empty fetch.
    pub fn mark_slots_pending(&mut self) -> Result<(), BookingError> {
        let settled = matches!(
            self.availability,
            SlotAvailability::Failed(_) | SlotAvailability::Empty
        );
        if self.phase != BookingPhase::DoctorAndDateChosen || !settled {
            return Err(BookingError::InvalidTransition {
                from: self.phase,
                action: "retry availability",
            });
        }
        self.invalidate_slots();
        Ok(())
    }

    /// Stores the slots of a current fetch. Returns false when the draft is
    /// not waiting for slots.
    pub fn apply_slots(&mut self, slots: Vec<Slot>) -> bool {
        if self.phase != BookingPhase::DoctorAndDateChosen
            || self.availability != SlotAvailability::Pending
        {
            debug!("Draft {}: ignoring slots while {:?}", self.id, self.phase);
            return false;
        }

        if slots.is_empty() {
            debug!("Draft {}: no slots available", self.id);
            self.availability = SlotAvailability::Empty;
        } else {
            debug!("Draft {}: {} slots loaded", self.id, slots.len());
            self.slots = slots;
            self.availability = SlotAvailability::Loaded;
            self.phase = BookingPhase::SlotsLoaded;
        }
        true
    }

    pub fn apply_slot_failure(&mut self, error: ApiError) -> bool {
        if self.phase != BookingPhase::DoctorAndDateChosen
            || self.availability != SlotAvailability::Pending
        {
            return false;
        }

        self.slots.clear();
        self.availability = SlotAvailability::Failed(error);
        true
    }

    pub fn choose_slot(&mut self, start_time: DateTime<Utc>) -> Result<(), BookingError> {
        self.ensure_editable("choose a slot")?;

        if !matches!(self.phase, BookingPhase::SlotsLoaded | BookingPhase::SlotChosen) {
            return Err(BookingError::InvalidTransition {
                from: self.phase,
                action: "choose a slot",
            });
        }
        if !self.slots.iter().any(|slot| slot.start_time == start_time) {
            return Err(ValidationError::UnknownSlot(start_time).into());
        }

        self.selected_slot = Some(start_time);
        self.phase = BookingPhase::SlotChosen;
        Ok(())
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) -> Result<(), BookingError> {
        self.ensure_editable("edit the reason")?;
        self.reason = reason.into();
        Ok(())
    }

    /// Builds the request the current selection would submit.
    pub fn validate(&self) -> Result<BookingRequest, ValidationError> {
        let doctor = self.doctor_id.clone().ok_or(ValidationError::MissingDoctor)?;
        self.date.ok_or(ValidationError::MissingDate)?;
        let appointment_time = self.selected_slot.ok_or(ValidationError::MissingSlot)?;

        if !self.slots.iter().any(|slot| slot.start_time == appointment_time) {
            return Err(ValidationError::UnknownSlot(appointment_time));
        }

        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyReason);
        }

        Ok(BookingRequest {
            doctor,
            appointment_time,
            reason: reason.to_string(),
            duration: self.duration_minutes,
        })
    }

    pub fn can_submit(&self) -> bool {
        self.phase == BookingPhase::SlotChosen && self.validate().is_ok()
    }

    pub fn status(&self) -> DraftStatus {
        match self.phase {
            BookingPhase::Submitting => DraftStatus::Submitting,
            BookingPhase::Submitted => DraftStatus::Submitted,
            _ if self.submission_error.is_some() => DraftStatus::Failed,
            _ => match self.availability {
                SlotAvailability::Pending => DraftStatus::FetchingSlots,
                SlotAvailability::Failed(_) => DraftStatus::Failed,
                _ if self.can_submit() => DraftStatus::ReadyToSubmit,
                _ => DraftStatus::Idle,
            },
        }
    }

    pub fn begin_submission(&mut self) -> Result<BookingRequest, SubmissionError> {
        match self.phase {
            BookingPhase::Submitting => return Err(SubmissionError::AlreadyInFlight),
            BookingPhase::Submitted => return Err(SubmissionError::AlreadySubmitted),
            _ => {}
        }

        let request = self.validate()?;

        debug!("Draft {}: submitting", self.id);
        self.phase = BookingPhase::Submitting;
        self.submission_error = None;
        Ok(request)
    }

    pub fn submission_succeeded(&mut self) -> bool {
        if self.phase != BookingPhase::Submitting {
            return false;
        }
        self.phase = BookingPhase::Submitted;
        true
    }

    /// Back to `SlotChosen` with every field intact so the user can retry.
    pub fn submission_failed(&mut self, error: ApiError) -> bool {
        if self.phase != BookingPhase::Submitting {
            return false;
        }
        self.phase = BookingPhase::SlotChosen;
        self.submission_error = Some(error);
        true
    }
}
