// libs/booking-cell/src/presentation.rs
//! Render-ready values for the booking page and appointment lists.

use chrono::{DateTime, Utc};

use crate::models::{AppointmentStatus, Doctor, Slot};
use crate::services::selection::BookingPhase;
use crate::view::BookingSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Primary,
    Success,
    Danger,
    Warning,
    Info,
    Neutral,
}

impl BadgeVariant {
    pub fn for_status(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Scheduled => BadgeVariant::Primary,
            AppointmentStatus::Confirmed => BadgeVariant::Info,
            AppointmentStatus::InProgress => BadgeVariant::Warning,
            AppointmentStatus::Completed => BadgeVariant::Success,
            AppointmentStatus::Cancelled => BadgeVariant::Danger,
        }
    }

    /// Labels that do not parse get the neutral badge.
    pub fn for_label(label: &str) -> Self {
        label
            .parse::<AppointmentStatus>()
            .map(Self::for_status)
            .unwrap_or(BadgeVariant::Neutral)
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            BadgeVariant::Primary => "primary",
            BadgeVariant::Success => "success",
            BadgeVariant::Danger => "danger",
            BadgeVariant::Warning => "warning",
            BadgeVariant::Info => "info",
            BadgeVariant::Neutral => "neutral",
        }
    }
}

pub fn doctor_option_label(doctor: &Doctor) -> String {
    format!("Dr. {} ({})", doctor.full_name(), doctor.specialization)
}

pub fn slot_label(slot: &Slot) -> String {
    slot.start_time.format("%H:%M").to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotButton {
    pub start_time: DateTime<Utc>,
    pub label: String,
    pub selected: bool,
}

/// `None` means the grid is not rendered at all.
pub fn slot_grid(snapshot: &BookingSnapshot) -> Option<Vec<SlotButton>> {
    let slots = snapshot.draft.slots();
    if slots.is_empty() {
        return None;
    }

    let selected = snapshot.draft.selected_slot();
    Some(
        slots
            .iter()
            .map(|slot| SlotButton {
                start_time: slot.start_time,
                label: slot_label(slot),
                selected: selected == Some(slot.start_time),
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub enabled: bool,
}

pub fn submit_control(snapshot: &BookingSnapshot) -> SubmitControl {
    let submitting = snapshot.draft.phase() == BookingPhase::Submitting;
    SubmitControl {
        label: if submitting { "Booking..." } else { "Confirm Booking" },
        enabled: !submitting && snapshot.can_submit(),
    }
}
