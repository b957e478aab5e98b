//! Geolocation adapter.
//!
//! Platforms report positions through a pair of one-shot callbacks.
//! [`Geolocator::locate`] bridges that contract into a future resolving to
//! [`Coordinates`] or a classified [`GeolocationError`].
//! [`LocateControl`] is the state of the "get current location" trigger.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use muster_core::config::GeolocationSettings;
use tokio::sync::oneshot;

use crate::state::AppState;

/// W3C `GeolocationPositionError` codes.
pub const PERMISSION_DENIED: u16 = 1;
pub const POSITION_UNAVAILABLE: u16 = 2;
pub const TIMEOUT: u16 = 3;

/// How long the confirmation label stays after a successful fix.
pub const CONFIRMATION_DISPLAY: Duration = Duration::from_millis(3_000);

/// Slack on top of the requested platform timeout before the adapter
/// gives up on a platform that never calls back.
const CALLBACK_GRACE: Duration = Duration::from_millis(500);

pub const LABEL_IDLE: &str = "Obter Localização Atual";
pub const LABEL_REQUESTING: &str = "Obtendo localização...";
pub const LABEL_CONFIRMED: &str = "Localização obtida!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fix reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters, when known.
    pub accuracy: Option<f64>,
}

/// Failure reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionError {
    pub code: u16,
    pub message: String,
}

pub type SuccessCallback = Box<dyn FnOnce(Position) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(PositionError) + Send>;

/// Callback-style location source.
///
/// Implementations call exactly one of the two callbacks, at most once,
/// from any thread. They are expected to honour `options.timeout` by
/// reporting [`TIMEOUT`].
pub trait GeolocationPlatform: Send + Sync {
    fn get_current_position(
        &self,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
        options: GeolocationSettings,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Erro ao obter localização: Permissão negada pelo usuário.")]
    PermissionDenied,

    #[error("Erro ao obter localização: Informação de localização indisponível.")]
    PositionUnavailable,

    #[error("Erro ao obter localização: Timeout na solicitação de localização.")]
    Timeout,

    #[error("Erro ao obter localização: Erro desconhecido.")]
    Unknown,

    #[error("Geolocalização não é suportada por este dispositivo.")]
    Unsupported,
}

impl GeolocationError {
    /// Classify a platform error code.
    pub fn from_code(code: u16) -> Self {
        match code {
            PERMISSION_DENIED => Self::PermissionDenied,
            POSITION_UNAVAILABLE => Self::PositionUnavailable,
            TIMEOUT => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

pub struct Geolocator {
    platform: Option<Arc<dyn GeolocationPlatform>>,
    options: GeolocationSettings,
}

impl Geolocator {
    pub fn new(platform: Arc<dyn GeolocationPlatform>, options: GeolocationSettings) -> Self {
        Self {
            platform: Some(platform),
            options,
        }
    }

    /// A locator for hosts without any location source.
    pub fn unsupported(options: GeolocationSettings) -> Self {
        Self {
            platform: None,
            options,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_some()
    }

    /// Request the current position once.
    ///
    /// There is no cancellation. A platform that drops both callbacks
    /// yields [`GeolocationError::Unknown`]; one that stays silent past the
    /// requested timeout yields [`GeolocationError::Timeout`].
    pub async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let platform = self.platform.as_ref().ok_or(GeolocationError::Unsupported)?;

        let (tx, rx) = oneshot::channel::<Result<Position, PositionError>>();
        let slot = Arc::new(Mutex::new(Some(tx)));
        let error_slot = Arc::clone(&slot);

        platform.get_current_position(
            Box::new(move |position: Position| deliver(&slot, Ok(position))),
            Box::new(move |error: PositionError| deliver(&error_slot, Err(error))),
            self.options,
        );

        let deadline = self.options.timeout + CALLBACK_GRACE;
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(Ok(position))) => {
                tracing::info!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    accuracy = ?position.accuracy,
                    "Location obtained",
                );
                Ok(Coordinates {
                    latitude: position.latitude,
                    longitude: position.longitude,
                })
            }
            Ok(Ok(Err(error))) => {
                tracing::error!(code = error.code, message = %error.message, "Geolocation error");
                Err(GeolocationError::from_code(error.code))
            }
            Ok(Err(_)) => {
                tracing::error!("Geolocation platform dropped its callbacks");
                Err(GeolocationError::Unknown)
            }
            Err(_) => {
                tracing::error!(timeout_ms = deadline.as_millis() as u64, "Geolocation platform never answered");
                Err(GeolocationError::Timeout)
            }
        }
    }
}

fn deliver<T>(slot: &Mutex<Option<oneshot::Sender<T>>>, value: T) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        // Receiver gone means the adapter already timed out.
        let _ = sender.send(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocatePhase {
    Idle,
    Requesting,
    /// Last request succeeded at `at`; the confirmation label shows
    /// until [`CONFIRMATION_DISPLAY`] has passed.
    Resolved { coordinates: Coordinates, at: Instant },
}

/// The "get current location" trigger.
#[derive(Debug, Clone)]
pub struct LocateControl {
    supported: bool,
    phase: LocatePhase,
}

impl LocateControl {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            phase: LocatePhase::Idle,
        }
    }

    pub fn phase(&self) -> LocatePhase {
        self.phase
    }

    /// Hidden when the host has no location source.
    pub fn is_visible(&self) -> bool {
        self.supported
    }

    pub fn is_enabled(&self) -> bool {
        self.supported && self.phase != LocatePhase::Requesting
    }

    /// Enter `Requesting`. Refused while a request is pending.
    pub fn begin(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.phase = LocatePhase::Requesting;
        true
    }

    pub fn resolve(&mut self, coordinates: Coordinates, at: Instant) {
        self.phase = LocatePhase::Resolved { coordinates, at };
    }

    /// Failure returns straight to idle, without a confirmation.
    pub fn fail(&mut self) {
        self.phase = LocatePhase::Idle;
    }

    /// Drop an expired confirmation back to idle.
    pub fn refresh(&mut self, now: Instant) {
        if let LocatePhase::Resolved { at, .. } = self.phase {
            if now.saturating_duration_since(at) >= CONFIRMATION_DISPLAY {
                self.phase = LocatePhase::Idle;
            }
        }
    }

    pub fn label(&self, now: Instant) -> &'static str {
        match self.phase {
            LocatePhase::Idle => LABEL_IDLE,
            LocatePhase::Requesting => LABEL_REQUESTING,
            LocatePhase::Resolved { at, .. } => {
                if now.saturating_duration_since(at) < CONFIRMATION_DISPLAY {
                    LABEL_CONFIRMED
                } else {
                    LABEL_IDLE
                }
            }
        }
    }
}

/// Run the locate flow against the shared state.
///
/// On success the coordinates are written into the form; on failure the
/// error overlay opens and the trigger returns to idle. Returns
/// `Ok(None)` when a request is already pending.
pub async fn locate_into_form(
    state: &AppState,
    geolocator: &Geolocator,
) -> Result<Option<Coordinates>, GeolocationError> {
    if !geolocator.is_supported() {
        let error = GeolocationError::Unsupported;
        state.feedback().show_error(error.to_string());
        return Err(error);
    }

    if !state.locate_control().begin() {
        tracing::debug!("Location request already pending");
        return Ok(None);
    }

    match geolocator.locate().await {
        Ok(coordinates) => {
            state
                .form()
                .set_coordinates(coordinates.latitude, coordinates.longitude);
            state.locate_control().resolve(coordinates, Instant::now());
            Ok(Some(coordinates))
        }
        Err(error) => {
            state.locate_control().fail();
            state.feedback().show_error(error.to_string());
            Err(error)
        }
    }
}
