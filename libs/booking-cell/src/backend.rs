use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_http::HospitalApiClient;
use shared_models::error::ApiError;

use crate::models::{
    AvailabilityResponse, BookingConfirmation, BookingRequest, Doctor, DoctorId, Slot,
};

/// The three backend operations the booking flow depends on.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError>;

    async fn fetch_availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ApiError>;

    async fn create_appointment(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError>;
}

pub struct HttpBookingBackend {
    client: HospitalApiClient,
}

impl HttpBookingBackend {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: HospitalApiClient::new(config)?,
        })
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        debug!("Fetching doctor list");
        self.client.get("/doctors/").await
    }

    async fn fetch_availability(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, ApiError> {
        debug!("Fetching availability for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/doctors/{}/availability/",
            urlencoding::encode(doctor_id.as_str())
        );
        let response: AvailabilityResponse = self
            .client
            .get_with_query(&path, &[("date", date.format("%Y-%m-%d").to_string())])
            .await?;

        Ok(response.slots)
    }

    async fn create_appointment(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        debug!(
            "Creating appointment with doctor {} at {}",
            request.doctor, request.appointment_time
        );

        let body = serde_json::to_value(request).map_err(|e| ApiError::Encode(e.to_string()))?;

        self.client.post("/appointments/", body).await
    }
}
