//! Shared application state.
//!
//! All UI state lives in one [`AppState`] owned by the front end and lent
//! to the pipeline and the locator. Locks are only held for synchronous
//! sections, never across an `.await`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use muster_core::config::ValidationSettings;

use crate::feedback::{FeedbackController, FeedbackState};
use crate::form::FormState;
use crate::geolocation::LocateControl;

pub struct AppState {
    form: Mutex<FormState>,
    feedback: Mutex<FeedbackController>,
    locate: Mutex<LocateControl>,
    in_flight: AtomicBool,
}

impl AppState {
    pub fn new(limits: ValidationSettings, geolocation_supported: bool) -> Self {
        Self {
            form: Mutex::new(FormState::new(limits)),
            feedback: Mutex::new(FeedbackController::new()),
            locate: Mutex::new(LocateControl::new(geolocation_supported)),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn form(&self) -> MutexGuard<'_, FormState> {
        lock(&self.form)
    }

    pub fn feedback(&self) -> MutexGuard<'_, FeedbackController> {
        lock(&self.feedback)
    }

    pub fn locate_control(&self) -> MutexGuard<'_, LocateControl> {
        lock(&self.locate)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn submit_enabled(&self) -> bool {
        let in_flight = self.is_in_flight();
        self.form().submit_enabled(in_flight)
    }

    /// Admit one submission by taking the in-flight flag.
    ///
    /// Returns `None` when another submission already holds the flag.
    /// Loading is not shown until [`InFlightGuard::show_loading`].
    pub(crate) fn begin_submission(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlightGuard {
            state: self,
            loading: false,
            outcome: None,
        })
    }
}

/// Held for the duration of one submission. Dropping it hides loading (if
/// shown) and then clears the in-flight flag, once, on every exit path.
pub(crate) struct InFlightGuard<'a> {
    state: &'a AppState,
    loading: bool,
    outcome: Option<FeedbackState>,
}

impl InFlightGuard<'_> {
    pub(crate) fn show_loading(&mut self) {
        self.loading = self.state.feedback().begin_loading();
    }

    /// Release the submission, opening `outcome` as loading hides.
    pub(crate) fn complete(mut self, outcome: FeedbackState) {
        self.outcome = Some(outcome);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.loading {
            self.state.feedback().finish_loading(self.outcome.take());
        }
        self.state.in_flight.store(false, Ordering::Release);
    }
}

/// Lock ignoring poison. Every critical section leaves the state valid.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
