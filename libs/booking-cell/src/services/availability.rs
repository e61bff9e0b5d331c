// libs/booking-cell/src/services/availability.rs
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use shared_models::error::ApiError;

use crate::backend::BookingBackend;
use crate::models::{DoctorId, Slot};
use crate::services::selection::BookingDraft;

/// One slot request, stamped with the generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub generation: u64,
}

#[derive(Debug)]
pub struct SlotFetchOutcome {
    pub query: SlotQuery,
    pub result: Result<Vec<Slot>, ApiError>,
}

/// Decides when slots are fetched and whether a finished fetch still
/// matters.
///
/// Each distinct (doctor, date) pair gets one query with a fresh
/// generation. A completion is applied only if its query is still the
/// current one, so a slow response for an old selection can never
/// overwrite the slots of a newer one, whatever order they arrive in.
pub struct AvailabilityCoordinator {
    backend: Arc<dyn BookingBackend>,
    generation: u64,
    current: Option<SlotQuery>,
    detached: bool,
}

impl AvailabilityCoordinator {
    pub fn new(backend: Arc<dyn BookingBackend>) -> Self {
        Self {
            backend,
            generation: 0,
            current: None,
            detached: false,
        }
    }

    pub fn current(&self) -> Option<&SlotQuery> {
        self.current.as_ref()
    }

    fn issue(&mut self, doctor_id: DoctorId, date: NaiveDate) -> SlotQuery {
        self.generation += 1;
        let query = SlotQuery { doctor_id, date, generation: self.generation };
        debug!(
            "Issuing slot query #{} for doctor {} on {}",
            query.generation, query.doctor_id, query.date
        );
        self.current = Some(query.clone());
        query
    }

    /// Returns a query to run when the selection names a new pair.
    /// Clearing either input supersedes whatever is outstanding.
    pub fn observe(&mut self, doctor_id: Option<&DoctorId>, date: Option<NaiveDate>) -> Option<SlotQuery> {
        if self.detached {
            return None;
        }

        match (doctor_id, date) {
            (Some(doctor_id), Some(date)) => {
                if let Some(current) = &self.current {
                    if &current.doctor_id == doctor_id && current.date == date {
                        return None;
                    }
                }
                Some(self.issue(doctor_id.clone(), date))
            }
            _ => {
                if self.current.take().is_some() {
                    self.generation += 1;
                }
                None
            }
        }
    }

    pub fn observe_draft(&mut self, draft: &BookingDraft) -> Option<SlotQuery> {
        self.observe(draft.doctor_id(), draft.date())
    }

    /// Re-issues the current pair under a new generation.
    pub fn retry(&mut self) -> Option<SlotQuery> {
        if self.detached {
            return None;
        }
        let current = self.current.clone()?;
        Some(self.issue(current.doctor_id, current.date))
    }

    pub fn is_current(&self, query: &SlotQuery) -> bool {
        !self.detached && self.current.as_ref() == Some(query)
    }

    /// Stops accepting completions, e.g. when the owning view goes away.
    pub fn detach(&mut self) {
        debug!("Availability coordinator detached at generation {}", self.generation);
        self.detached = true;
        self.current = None;
    }

    /// The request for `query`, detached from `self` so it can be spawned.
    pub fn fetch(&self, query: SlotQuery) -> impl Future<Output = SlotFetchOutcome> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        async move {
            let result = backend.fetch_availability(&query.doctor_id, query.date).await;
            SlotFetchOutcome { query, result }
        }
    }

    /// Applies a finished fetch to `draft` if it is still current.
    /// Returns whether the draft changed.
    pub fn resolve(&self, outcome: SlotFetchOutcome, draft: &mut BookingDraft) -> bool {
        let SlotFetchOutcome { query, result } = outcome;

        if !self.is_current(&query) {
            debug!(
                "Discarding stale slots for doctor {} on {} (query #{}, current #{})",
                query.doctor_id, query.date, query.generation, self.generation
            );
            return false;
        }
        if draft.slot_key() != Some((&query.doctor_id, query.date)) {
            debug!("Discarding slots for query #{}: draft selection moved on", query.generation);
            return false;
        }

        match result {
            Ok(slots) => draft.apply_slots(slots),
            Err(e) => {
                warn!(
                    "Failed to fetch slots for doctor {} on {}: {}",
                    query.doctor_id, query.date, e
                );
                draft.apply_slot_failure(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::models::{BookingConfirmation, BookingRequest, Doctor};
    use crate::services::selection::{BookingPhase, SlotAvailability};

    /// Answers availability with one slot at an hour derived from the
    /// doctor id, so tests can tell whose slots were applied.
    struct EchoBackend;

    #[async_trait]
    impl BookingBackend for EchoBackend {
        async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
            Ok(Vec::new())
        }

        async fn fetch_availability(&self, doctor_id: &DoctorId, date: NaiveDate) -> Result<Vec<Slot>, ApiError> {
            if doctor_id.as_str() == "broken" {
                return Err(ApiError::Server { status: 502, body: "bad gateway".into() });
            }
            let hour: u32 = doctor_id.as_str().trim_start_matches('D').parse().unwrap_or(0) + 8;
            let start = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
            Ok(vec![Slot {
                start_time: start,
                end_time: start + chrono::Duration::minutes(30),
                formatted_time: None,
            }])
        }

        async fn create_appointment(&self, _request: &BookingRequest) -> Result<BookingConfirmation, ApiError> {
            Err(ApiError::Network("not used".into()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn coordinator() -> AvailabilityCoordinator {
        AvailabilityCoordinator::new(Arc::new(EchoBackend))
    }

    #[test]
    fn fetch_needs_both_doctor_and_date() {
        let mut coordinator = coordinator();
        let d1 = DoctorId::new("D1");

        assert!(coordinator.observe(Some(&d1), None).is_none());
        assert!(coordinator.observe(None, Some(day(25))).is_none());

        let query = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        assert_eq!(query.generation, 1);
        assert_eq!(coordinator.current(), Some(&query));
    }

    #[test]
    fn one_query_per_distinct_pair() {
        let mut coordinator = coordinator();
        let d1 = DoctorId::new("D1");
        let d2 = DoctorId::new("D2");

        let first = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        assert!(coordinator.observe(Some(&d1), Some(day(25))).is_none());

        let second = coordinator.observe(Some(&d2), Some(day(25))).unwrap();
        assert!(second.generation > first.generation);
        assert!(!coordinator.is_current(&first));
        assert!(coordinator.is_current(&second));

        let back = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        assert_ne!(back, first);
        assert!(!coordinator.is_current(&first));
    }

    #[test]
    fn clearing_an_input_supersedes_outstanding_query() {
        let mut coordinator = coordinator();
        let d1 = DoctorId::new("D1");

        let query = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        assert!(coordinator.observe(Some(&d1), None).is_none());

        assert!(!coordinator.is_current(&query));
        assert!(coordinator.retry().is_none());
    }

    #[test]
    fn retry_reissues_current_pair() {
        let mut coordinator = coordinator();
        let d1 = DoctorId::new("D1");

        let first = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        let retried = coordinator.retry().unwrap();

        assert_eq!(retried.doctor_id, first.doctor_id);
        assert_eq!(retried.date, first.date);
        assert!(!coordinator.is_current(&first));
        assert!(coordinator.is_current(&retried));
    }

    #[test]
    fn detached_coordinator_accepts_nothing() {
        let mut coordinator = coordinator();
        let d1 = DoctorId::new("D1");

        let query = coordinator.observe(Some(&d1), Some(day(25))).unwrap();
        coordinator.detach();

        assert!(!coordinator.is_current(&query));
        assert!(coordinator.observe(Some(&DoctorId::new("D2")), Some(day(26))).is_none());
        assert!(coordinator.retry().is_none());
    }

    #[tokio::test]
    async fn late_response_for_old_selection_is_discarded() {
        let mut coordinator = coordinator();
        let mut draft = BookingDraft::new(day(20), 30);

        draft.select_doctor(DoctorId::new("D1")).unwrap();
        draft.select_date(day(25)).unwrap();
        let query_a = coordinator.observe_draft(&draft).unwrap();
        let fetch_a = coordinator.fetch(query_a);

        draft.select_doctor(DoctorId::new("D2")).unwrap();
        let query_mid = coordinator.observe_draft(&draft).unwrap();
        let fetch_mid = coordinator.fetch(query_mid);

        draft.select_date(day(26)).unwrap();
        let query_b = coordinator.observe_draft(&draft).unwrap();
        let fetch_b = coordinator.fetch(query_b);

        // B completes first, the older fetches trail in afterwards.
        let outcome_b = fetch_b.await;
        assert!(coordinator.resolve(outcome_b, &mut draft));
        let applied = draft.slots().to_vec();

        assert!(!coordinator.resolve(fetch_a.await, &mut draft));
        assert!(!coordinator.resolve(fetch_mid.await, &mut draft));

        assert_eq!(draft.slots(), applied.as_slice());
        assert_eq!(draft.slots()[0].start_time.date_naive(), day(26));
        assert_eq!(draft.phase(), BookingPhase::SlotsLoaded);
    }

    #[tokio::test]
    async fn failed_fetch_is_recorded_not_raised() {
        let mut coordinator = coordinator();
        let mut draft = BookingDraft::new(day(20), 30);

        draft.select_doctor(DoctorId::new("broken")).unwrap();
        draft.select_date(day(25)).unwrap();
        let query = coordinator.observe_draft(&draft).unwrap();

        let outcome = coordinator.fetch(query).await;
        assert!(coordinator.resolve(outcome, &mut draft));

        assert_eq!(draft.phase(), BookingPhase::DoctorAndDateChosen);
        assert!(matches!(draft.availability(), SlotAvailability::Failed(ApiError::Server { status: 502, .. })));
        assert!(draft.slots().is_empty());
    }

    #[tokio::test]
    async fn completion_after_detach_is_dropped() {
        let mut coordinator = coordinator();
        let mut draft = BookingDraft::new(day(20), 30);

        draft.select_doctor(DoctorId::new("D1")).unwrap();
        draft.select_date(day(25)).unwrap();
        let query = coordinator.observe_draft(&draft).unwrap();
        let pending = coordinator.fetch(query);

        coordinator.detach();

        assert!(!coordinator.resolve(pending.await, &mut draft));
        assert!(draft.slots().is_empty());
    }
}
