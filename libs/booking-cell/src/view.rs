// libs/booking-cell/src/view.rs
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::error::ApiError;

use crate::backend::BookingBackend;
use crate::error::{BookingError, ValidationError};
use crate::models::{BookingId, Doctor, DoctorId};
use crate::services::availability::{AvailabilityCoordinator, SlotFetchOutcome};
use crate::services::directory::DoctorDirectory;
use crate::services::selection::{BookingDraft, DraftStatus};
use crate::services::submission::{SubmissionFlow, SubmissionOutcome};

const ACTION_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    SelectDoctor(DoctorId),
    SelectDate(NaiveDate),
    ChooseSlot(DateTime<Utc>),
    SetReason(String),
    Submit,
    RetryAvailability,
    RetryDoctors,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Appointments,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Appointments => "/appointments",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewExit {
    Navigate { route: Route, booking_id: BookingId },
    Unmounted,
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub today: NaiveDate,
    pub duration_minutes: u32,
}

impl ViewSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            today: Local::now().date_naive(),
            duration_minutes: config.default_duration_minutes,
        }
    }
}

/// Everything the booking page renders, published after every change.
#[derive(Debug, Clone)]
pub struct BookingSnapshot {
    /// Bumped on every publish, including ones where nothing visible changed.
    pub revision: u64,
    pub doctors: Vec<Doctor>,
    pub doctors_loading: bool,
    pub doctors_error: Option<ApiError>,
    pub draft: BookingDraft,
    /// Last rejected action or failed submission, shown inline.
    pub notice: Option<String>,
}

impl BookingSnapshot {
    pub fn status(&self) -> DraftStatus {
        self.draft.status()
    }

    pub fn can_submit(&self) -> bool {
        self.draft.can_submit()
    }
}

pub struct BookingViewHandle {
    actions: mpsc::Sender<UserAction>,
    snapshots: watch::Receiver<BookingSnapshot>,
}

impl BookingViewHandle {
    /// Returns false once the view has exited.
    pub async fn dispatch(&self, action: UserAction) -> bool {
        self.actions.send(action).await.is_ok()
    }

    pub fn snapshot(&self) -> BookingSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BookingSnapshot> {
        self.snapshots.clone()
    }

    /// Waits for a snapshot matching `predicate`; `None` if the view exited first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<BookingSnapshot>
    where
        F: FnMut(&BookingSnapshot) -> bool,
    {
        self.snapshots.wait_for(predicate).await.ok().map(|snapshot| snapshot.clone())
    }
}

enum Completion {
    Doctors(Result<Vec<Doctor>, ApiError>),
    Slots(SlotFetchOutcome),
    Submission(SubmissionOutcome),
}

/// The booking page: one draft, driven by user actions and fetch
/// completions on a single task.
///
/// Network calls run in spawned tasks that report back over a channel the
/// loop owns; when the loop exits the channel goes with it, so nothing
/// lands on a view that is gone.
pub struct BookingView {
    directory: DoctorDirectory,
    coordinator: AvailabilityCoordinator,
    submission: SubmissionFlow,
    draft: BookingDraft,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<BookingSnapshot>,
    revision: u64,
    notice: Option<String>,
}

impl BookingView {
    pub fn mount(backend: Arc<dyn BookingBackend>, settings: ViewSettings) -> (BookingViewHandle, JoinHandle<ViewExit>) {
        let draft = BookingDraft::new(settings.today, settings.duration_minutes);
        info!("Mounting booking view for draft {}", draft.id());

        let (actions_tx, actions_rx) = mpsc::channel(ACTION_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(BookingSnapshot {
            revision: 0,
            doctors: Vec::new(),
            doctors_loading: false,
            doctors_error: None,
            draft: draft.clone(),
            notice: None,
        });

        let view = Self {
            directory: DoctorDirectory::new(Arc::clone(&backend)),
            coordinator: AvailabilityCoordinator::new(Arc::clone(&backend)),
            submission: SubmissionFlow::new(backend),
            draft,
            completions: completions_tx,
            snapshots: snapshots_tx,
            revision: 0,
            notice: None,
        };

        let task = tokio::spawn(view.run(actions_rx, completions_rx));
        let handle = BookingViewHandle {
            actions: actions_tx,
            snapshots: snapshots_rx,
        };

        (handle, task)
    }

    async fn run(
        mut self,
        mut actions: mpsc::Receiver<UserAction>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) -> ViewExit {
        self.load_doctors();
        self.publish();

        let exit = loop {
            tokio::select! {
                action = actions.recv() => match action {
                    Some(UserAction::Close) | None => break ViewExit::Unmounted,
                    Some(action) => self.handle_action(action),
                },
                Some(completion) = completions.recv() => {
                    if let Some(exit) = self.handle_completion(completion) {
                        break exit;
                    }
                }
            }
            self.publish();
        };

        self.coordinator.detach();
        info!("Booking view for draft {} exited: {:?}", self.draft.id(), exit);
        exit
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.snapshots.send_replace(BookingSnapshot {
            revision: self.revision,
            doctors: self.directory.doctors().to_vec(),
            doctors_loading: self.directory.is_loading(),
            doctors_error: self.directory.load_error().cloned(),
            draft: self.draft.clone(),
            notice: self.notice.clone(),
        });
    }

    fn handle_action(&mut self, action: UserAction) {
        debug!("Draft {}: handling {:?}", self.draft.id(), action);

        if let Err(e) = self.apply_action(action) {
            warn!("Draft {}: action rejected: {}", self.draft.id(), e);
            self.notice = Some(e.to_string());
        }
    }

    fn apply_action(&mut self, action: UserAction) -> Result<(), BookingError> {
        match action {
            UserAction::SelectDoctor(doctor_id) => {
                if self.directory.find(&doctor_id).is_none() {
                    return Err(ValidationError::UnknownDoctor(doctor_id).into());
                }
                if self.draft.select_doctor(doctor_id)? {
                    self.notice = None;
                    self.request_slots();
                }
            }
            UserAction::SelectDate(date) => {
                if self.draft.select_date(date)? {
                    self.notice = None;
                    self.request_slots();
                }
            }
            UserAction::ChooseSlot(start_time) => {
                self.draft.choose_slot(start_time)?;
            }
            UserAction::SetReason(reason) => {
                self.draft.set_reason(reason)?;
            }
            UserAction::Submit => {
                let pending = self.submission.prepare(&mut self.draft)?;
                self.notice = None;
                let fetch = self.submission.execute(pending);
                self.spawn(async move { Completion::Submission(fetch.await) });
            }
            UserAction::RetryAvailability => {
                self.draft.mark_slots_pending()?;
                if let Some(query) = self.coordinator.retry() {
                    let fetch = self.coordinator.fetch(query);
                    self.spawn(async move { Completion::Slots(fetch.await) });
                }
            }
            UserAction::RetryDoctors => self.load_doctors(),
            UserAction::Close => {}
        }
        Ok(())
    }

    fn handle_completion(&mut self, completion: Completion) -> Option<ViewExit> {
        match completion {
            Completion::Doctors(result) => {
                self.directory.apply(result);
                None
            }
            Completion::Slots(outcome) => {
                self.coordinator.resolve(outcome, &mut self.draft);
                None
            }
            Completion::Submission(outcome) => match self.submission.apply(&mut self.draft, outcome) {
                Ok(booking_id) => Some(ViewExit::Navigate {
                    route: Route::Appointments,
                    booking_id,
                }),
                Err(e) => {
                    self.notice = Some(format!("{}. Please try again.", e));
                    None
                }
            },
        }
    }

    fn load_doctors(&mut self) {
        if let Some(fetch) = self.directory.begin_load() {
            self.spawn(async move { Completion::Doctors(fetch.await) });
        }
    }

    fn request_slots(&mut self) {
        if let Some(query) = self.coordinator.observe_draft(&self.draft) {
            let fetch = self.coordinator.fetch(query);
            self.spawn(async move { Completion::Slots(fetch.await) });
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = Completion> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let completion = task.await;
            if completions.send(completion).is_err() {
                debug!("Booking view gone, dropping completion");
            }
        });
    }
}
