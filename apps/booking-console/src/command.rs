use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;

use booking_cell::models::DoctorId;
use booking_cell::presentation::slot_grid;
use booking_cell::view::{BookingSnapshot, UserAction};

pub const HELP: &str = "\
Commands:
  doctor <id>        choose a doctor
  date <YYYY-MM-DD>  choose a date
  slot <HH:MM|n>     choose a slot by time or by its number in the list
  reason <text>      set the reason for the visit
  submit             confirm the booking
  retry              fetch availability again
  doctors            reload the doctor list
  show               print the current state
  help               print this message
  quit               leave without booking";

#[derive(Debug, Clone, PartialEq)]
pub enum SlotPick {
    Label(String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(UserAction),
    Slot(SlotPick),
    Show,
    Help,
}

pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "doctor" => {
            if rest.is_empty() {
                bail!("usage: doctor <id>");
            }
            Command::Action(UserAction::SelectDoctor(DoctorId::new(rest)))
        }
        "date" => {
            let date = NaiveDate::parse_from_str(rest, "%Y-%m-%d")
                .with_context(|| format!("'{}' is not a date (expected YYYY-MM-DD)", rest))?;
            Command::Action(UserAction::SelectDate(date))
        }
        "slot" => {
            if rest.is_empty() {
                bail!("usage: slot <HH:MM|n>");
            }
            match rest.parse::<usize>() {
                Ok(position) => Command::Slot(SlotPick::Position(position)),
                Err(_) => Command::Slot(SlotPick::Label(rest.to_string())),
            }
        }
        "reason" => Command::Action(UserAction::SetReason(rest.to_string())),
        "submit" => Command::Action(UserAction::Submit),
        "retry" => Command::Action(UserAction::RetryAvailability),
        "doctors" => Command::Action(UserAction::RetryDoctors),
        "quit" | "exit" => Command::Action(UserAction::Close),
        "show" | "" => Command::Show,
        "help" | "?" => Command::Help,
        other => bail!("unknown command '{}', type 'help' for a list", other),
    };

    Ok(command)
}

/// Turns a slot pick into a concrete action against the slots on screen.
pub fn resolve_slot(pick: &SlotPick, snapshot: &BookingSnapshot) -> Result<UserAction> {
    let grid = slot_grid(snapshot).ok_or_else(|| anyhow!("no slots to choose from"))?;

    let button = match pick {
        SlotPick::Position(position) => position
            .checked_sub(1)
            .and_then(|index| grid.get(index))
            .ok_or_else(|| anyhow!("there is no slot number {}", position))?,
        SlotPick::Label(label) => grid
            .iter()
            .find(|button| &button.label == label)
            .ok_or_else(|| anyhow!("no slot starts at {}", label))?,
    };

    Ok(UserAction::ChooseSlot(button.start_time))
}
