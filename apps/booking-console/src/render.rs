use std::fmt::{self, Write};

use booking_cell::presentation::{doctor_option_label, slot_grid, submit_control};
use booking_cell::services::selection::SlotAvailability;
use booking_cell::view::BookingSnapshot;

/// Plain-text rendering of the booking page.
pub fn render(snapshot: &BookingSnapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut out, snapshot);
    out
}

fn write_page(out: &mut impl Write, snapshot: &BookingSnapshot) -> fmt::Result {
    let draft = &snapshot.draft;

    writeln!(out, "--- Book an appointment ---")?;

    if snapshot.doctors_loading {
        writeln!(out, "Loading doctors...")?;
    } else if let Some(e) = &snapshot.doctors_error {
        writeln!(out, "Could not load doctors: {} (type 'doctors' to retry)", e)?;
    } else {
        for doctor in &snapshot.doctors {
            let marker = if draft.doctor_id() == Some(&doctor.id) { '*' } else { ' ' };
            writeln!(out, " {} [{}] {}", marker, doctor.id, doctor_option_label(doctor))?;
        }
    }

    match draft.date() {
        Some(date) => writeln!(out, "Date: {}", date.format("%Y-%m-%d"))?,
        None => writeln!(out, "Date: (earliest {})", draft.min_date().format("%Y-%m-%d"))?,
    }

    match draft.availability() {
        SlotAvailability::Pending => writeln!(out, "Checking availability...")?,
        SlotAvailability::Empty => writeln!(out, "No slots available for this date.")?,
        SlotAvailability::Failed(e) => writeln!(out, "Could not load slots: {} (type 'retry')", e)?,
        SlotAvailability::NotRequested | SlotAvailability::Loaded => {}
    }

    if let Some(grid) = slot_grid(snapshot) {
        let buttons: Vec<String> = grid
            .iter()
            .enumerate()
            .map(|(index, button)| {
                if button.selected {
                    format!("[{}) {}]", index + 1, button.label)
                } else {
                    format!(" {}) {} ", index + 1, button.label)
                }
            })
            .collect();
        writeln!(out, "Slots: {}", buttons.join(" "))?;
    }

    writeln!(out, "Reason: {}", draft.reason())?;

    let control = submit_control(snapshot);
    let suffix = if control.enabled { "" } else { " (disabled)" };
    writeln!(out, "[{}]{}", control.label, suffix)?;

    if let Some(notice) = &snapshot.notice {
        writeln!(out, "! {}", notice)?;
    }

    Ok(())
}
