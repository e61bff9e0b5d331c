// libs/booking-cell/src/services/directory.rs
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use shared_models::error::ApiError;

use crate::backend::BookingBackend;
use crate::models::{Doctor, DoctorId};

/// Doctor list for one booking view. Loaded once on mount; a failed load
/// leaves it empty until retried.
pub struct DoctorDirectory {
    backend: Arc<dyn BookingBackend>,
    doctors: Vec<Doctor>,
    load_error: Option<ApiError>,
    loading: bool,
    loaded: bool,
}

impl DoctorDirectory {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self {
            backend,
            doctors: Vec::new(),
            load_error: None,
            loading: false,
            loaded: false,
        }
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn load_error(&self) -> Option<&ApiError> {
        self.load_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, doctor_id: &DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|doctor| &doctor.id == doctor_id)
    }

    /// Starts a load unless one is outstanding or the list is already in.
    pub fn begin_load(&mut self) -> Option<impl Future<Output = Result<Vec<Doctor>, ApiError>> + Send + 'static> {
        if self.loading || self.loaded {
            debug!("Doctor list load skipped (loading: {}, loaded: {})", self.loading, self.loaded);
            return None;
        }
        self.loading = true;
        self.load_error = None;

        let backend = Arc::clone(&self.backend);
        Some(async move { backend.list_doctors().await })
    }

    pub fn apply(&mut self, result: Result<Vec<Doctor>, ApiError>) {
        self.loading = false;
        match result {
            Ok(doctors) => {
                debug!("Loaded {} doctors", doctors.len());
                self.doctors = doctors;
                self.loaded = true;
            }
            Err(e) => {
                warn!("Failed to fetch doctors: {}", e);
                self.doctors.clear();
                self.load_error = Some(e);
            }
        }
    }

    pub async fn load(&mut self) -> Result<&[Doctor], ApiError> {
        if let Some(fetch) = self.begin_load() {
            let result = fetch.await;
            self.apply(result);
        }
        match &self.load_error {
            Some(e) => Err(e.clone()),
            None => Ok(&self.doctors),
        }
    }
}
