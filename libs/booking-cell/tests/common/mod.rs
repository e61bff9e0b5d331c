// libs/booking-cell/tests/common/mod.rs
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tokio::sync::{mpsc, oneshot};

use booking_cell::models::{BookingConfirmation, BookingId, BookingRequest, Doctor, DoctorId, DoctorUser, Slot};
use booking_cell::view::{BookingSnapshot, BookingViewHandle, ViewSettings};
use booking_cell::BookingBackend;
use shared_models::error::ApiError;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// A slot request the test answers by hand.
pub struct AvailabilityCall {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    reply: oneshot::Sender<Result<Vec<Slot>, ApiError>>,
}

impl AvailabilityCall {
    pub fn respond(self, result: Result<Vec<Slot>, ApiError>) {
        // The view may already be gone.
        let _ = self.reply.send(result);
    }
}

pub struct SubmissionCall {
    pub request: BookingRequest,
    reply: oneshot::Sender<Result<BookingConfirmation, ApiError>>,
}

impl SubmissionCall {
    pub fn respond(self, result: Result<BookingConfirmation, ApiError>) {
        let _ = self.reply.send(result);
    }

    pub fn confirm(self, id: &str) {
        let confirmation = BookingConfirmation {
            id: BookingId::new(id),
            doctor: Some(self.request.doctor.clone()),
            appointment_time: Some(self.request.appointment_time),
            reason: Some(self.request.reason.clone()),
            duration: Some(self.request.duration),
        };
        self.respond(Ok(confirmation));
    }
}

/// Backend whose availability and booking calls block until the test
/// replies, so completion order is under the test's control.
pub struct ScriptedBackend {
    doctors: Vec<Doctor>,
    availability: mpsc::UnboundedSender<AvailabilityCall>,
    submissions: mpsc::UnboundedSender<SubmissionCall>,
}

pub struct Script {
    pub availability: mpsc::UnboundedReceiver<AvailabilityCall>,
    pub submissions: mpsc::UnboundedReceiver<SubmissionCall>,
}

impl Script {
    pub async fn next_availability(&mut self) -> AvailabilityCall {
        tokio::time::timeout(SETTLE_TIMEOUT, self.availability.recv())
            .await
            .expect("no availability request arrived")
            .expect("backend dropped")
    }

    pub async fn next_submission(&mut self) -> SubmissionCall {
        tokio::time::timeout(SETTLE_TIMEOUT, self.submissions.recv())
            .await
            .expect("no submission arrived")
            .expect("backend dropped")
    }
}

pub fn scripted_backend(doctors: Vec<Doctor>) -> (Arc<ScriptedBackend>, Script) {
    let (availability_tx, availability_rx) = mpsc::unbounded_channel();
    let (submissions_tx, submissions_rx) = mpsc::unbounded_channel();
    let backend = ScriptedBackend {
        doctors,
        availability: availability_tx,
        submissions: submissions_tx,
    };
    let script = Script {
        availability: availability_rx,
        submissions: submissions_rx,
    };
    (Arc::new(backend), script)
}

#[async_trait]
impl BookingBackend for ScriptedBackend {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        Ok(self.doctors.clone())
    }

    async fn fetch_availability(&self, doctor_id: &DoctorId, date: NaiveDate) -> Result<Vec<Slot>, ApiError> {
        let (reply, response) = oneshot::channel();
        self.availability
            .send(AvailabilityCall { doctor_id: doctor_id.clone(), date, reply })
            .map_err(|_| ApiError::Network("script closed".into()))?;
        response
            .await
            .map_err(|_| ApiError::Network("request abandoned".into()))?
    }

    async fn create_appointment(&self, request: &BookingRequest) -> Result<BookingConfirmation, ApiError> {
        let (reply, response) = oneshot::channel();
        self.submissions
            .send(SubmissionCall { request: request.clone(), reply })
            .map_err(|_| ApiError::Network("script closed".into()))?;
        response
            .await
            .map_err(|_| ApiError::Network("request abandoned".into()))?
    }
}

pub fn doctor(id: &str, first_name: &str, last_name: &str, specialization: &str) -> Doctor {
    Doctor {
        id: DoctorId::new(id),
        user: DoctorUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        },
        specialization: specialization.to_string(),
    }
}

pub fn staff() -> Vec<Doctor> {
    vec![
        doctor("1", "Sarah", "Smith", "Cardiology"),
        doctor("2", "James", "Wilson", "Neurology"),
    ]
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
}

pub fn slot(date: NaiveDate, hh: u32, mm: u32) -> Slot {
    let start = Utc.from_utc_datetime(&date.and_hms_opt(hh, mm, 0).unwrap());
    Slot {
        start_time: start,
        end_time: start + chrono::Duration::minutes(30),
        formatted_time: None,
    }
}

pub fn settings() -> ViewSettings {
    ViewSettings {
        today: day(20),
        duration_minutes: 30,
    }
}

/// Waits for a snapshot matching `predicate`, failing the test after a few seconds.
pub async fn settle<F>(handle: &mut BookingViewHandle, predicate: F) -> BookingSnapshot
where
    F: FnMut(&BookingSnapshot) -> bool,
{
    tokio::time::timeout(SETTLE_TIMEOUT, handle.wait_for(predicate))
        .await
        .expect("view did not reach the expected state")
        .expect("view exited")
}
