//! Integration tests for the geolocation adapter and the locate flow.

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use serde_json::json;
use tokio::sync::Notify;

use muster_core::config::{GeolocationSettings, ValidationSettings};
use muster_core::fields::Field;
use muster_form::feedback::FeedbackState;
use muster_form::geolocation::{
    locate_into_form, ErrorCallback, GeolocationError, GeolocationPlatform, Geolocator,
    LocatePhase, Position, PositionError, SuccessCallback, LABEL_CONFIRMED, PERMISSION_DENIED,
    POSITION_UNAVAILABLE, TIMEOUT,
};
use muster_form::pipeline::{SubmissionPipeline, SubmitOutcome};
use muster_form::state::AppState;

use common::{fill_reference, new_state, test_config, FakeAppender};

/// Answers every request from a background thread, like a native
/// location service would.
struct ThreadedPlatform {
    reply: Result<Position, PositionError>,
    seen_options: Mutex<Vec<GeolocationSettings>>,
}

impl ThreadedPlatform {
    fn new(reply: Result<Position, PositionError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            seen_options: Mutex::new(Vec::new()),
        })
    }
}

impl GeolocationPlatform for ThreadedPlatform {
    fn get_current_position(
        &self,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
        options: GeolocationSettings,
    ) {
        self.seen_options.lock().unwrap().push(options);
        let reply = self.reply.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            match reply {
                Ok(position) => on_success(position),
                Err(error) => on_error(error),
            }
        });
    }
}

/// Holds on to the callbacks and never calls them.
#[derive(Default)]
struct SilentPlatform {
    parked: Mutex<Vec<(SuccessCallback, ErrorCallback)>>,
}

impl GeolocationPlatform for SilentPlatform {
    fn get_current_position(
        &self,
        on_success: SuccessCallback,
        on_error: ErrorCallback,
        _options: GeolocationSettings,
    ) {
        self.parked.lock().unwrap().push((on_success, on_error));
    }
}

/// Drops both callbacks without calling either.
struct DroppingPlatform;

impl GeolocationPlatform for DroppingPlatform {
    fn get_current_position(
        &self,
        _on_success: SuccessCallback,
        _on_error: ErrorCallback,
        _options: GeolocationSettings,
    ) {
    }
}

fn fix(latitude: f64, longitude: f64) -> Result<Position, PositionError> {
    Ok(Position {
        latitude,
        longitude,
        accuracy: Some(12.0),
    })
}

fn failure(code: u16) -> Result<Position, PositionError> {
    Err(PositionError {
        code,
        message: "platform said no".into(),
    })
}

fn short_timeout() -> GeolocationSettings {
    GeolocationSettings {
        timeout: Duration::from_millis(50),
        ..GeolocationSettings::default()
    }
}

// ---------------------------------------------------------------------------
// Test: successful fix
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fix_is_written_into_form_with_eight_decimals() {
    let platform = ThreadedPlatform::new(fix(-23.5505199, -46.6333094));
    let geolocator = Geolocator::new(platform.clone(), GeolocationSettings::default());
    let state = new_state();

    let coordinates = locate_into_form(&state, &geolocator).await.unwrap().unwrap();

    assert_eq!(coordinates.latitude, -23.5505199);
    assert_eq!(state.form().fields().latitude, "-23.55051990");
    assert_eq!(state.form().fields().longitude, "-46.63330940");
    assert_matches!(state.locate_control().phase(), LocatePhase::Resolved { .. });
    assert_eq!(state.locate_control().label(Instant::now()), LABEL_CONFIRMED);
    assert_eq!(state.feedback().state(), &FeedbackState::Idle);

    let seen = platform.seen_options.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].enable_high_accuracy);
    assert_eq!(seen[0].timeout, Duration::from_millis(10_000));
    assert_eq!(seen[0].maximum_age, Duration::ZERO);
}

/// The located position completes an otherwise filled form, and the row
/// carries it as numbers.
#[tokio::test]
async fn located_position_flows_into_submitted_row() {
    let geolocator = Geolocator::new(ThreadedPlatform::new(fix(-15.79, -47.88)), short_timeout());
    let appender = Arc::new(FakeAppender::new());
    let config = test_config();
    let pipeline = SubmissionPipeline::with_resolver(appender.clone(), move || config.clone());
    let state = new_state();
    fill_reference(&state);
    {
        let mut form = state.form();
        form.input(Field::Latitude, "").unwrap();
        form.input(Field::Longitude, "").unwrap();
        assert!(!form.is_submittable());
    }

    locate_into_form(&state, &geolocator).await.unwrap();
    assert!(state.submit_enabled());

    let outcome = pipeline.submit(&state).await.unwrap();
    assert_matches!(outcome, SubmitOutcome::Submitted(_));
    let row = &appender.calls()[0].row;
    assert_eq!(row[5], json!(-15.79));
    assert_eq!(row[6], json!(-47.88));
}

// ---------------------------------------------------------------------------
// Test: classified failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failures_are_classified_with_distinct_messages() {
    let mut messages = Vec::new();

    for (code, expected) in [
        (PERMISSION_DENIED, GeolocationError::PermissionDenied),
        (POSITION_UNAVAILABLE, GeolocationError::PositionUnavailable),
        (TIMEOUT, GeolocationError::Timeout),
        (99, GeolocationError::Unknown),
    ] {
        let geolocator =
            Geolocator::new(ThreadedPlatform::new(failure(code)), short_timeout());
        let state = new_state();

        let err = locate_into_form(&state, &geolocator).await.unwrap_err();

        assert_eq!(err, expected);
        assert_eq!(state.locate_control().phase(), LocatePhase::Idle);
        let message = state.feedback().error_message().map(str::to_string).unwrap();
        assert_eq!(message, expected.to_string());
        messages.push(message);
    }

    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), 4);
}

#[tokio::test]
async fn failure_keeps_manual_coordinates() {
    let geolocator = Geolocator::new(
        ThreadedPlatform::new(failure(PERMISSION_DENIED)),
        short_timeout(),
    );
    let state = new_state();
    fill_reference(&state);

    locate_into_form(&state, &geolocator).await.unwrap_err();

    assert_eq!(state.form().fields().latitude, "-23.5");
    assert_eq!(state.form().fields().longitude, "-46.6");
    assert!(state.form().is_submittable());
}

/// A denied request that fails while a submission is loading still
/// reaches the error channel once loading ends.
#[tokio::test]
async fn failure_during_submission_surfaces_after_loading() {
    let gate = Arc::new(Notify::new());
    let appender = Arc::new(FakeAppender::gated(Arc::clone(&gate)));
    let config = test_config();
    let pipeline = SubmissionPipeline::with_resolver(appender.clone(), move || config.clone());
    let geolocator = Geolocator::new(
        ThreadedPlatform::new(failure(PERMISSION_DENIED)),
        short_timeout(),
    );
    let state = new_state();
    fill_reference(&state);

    let (submitted, located) = tokio::join!(pipeline.submit(&state), async {
        while !state.is_in_flight() {
            tokio::task::yield_now().await;
        }
        let located = locate_into_form(&state, &geolocator).await;
        assert_eq!(state.feedback().state(), &FeedbackState::Loading);
        gate.notify_one();
        located
    });

    assert_matches!(submitted, Ok(SubmitOutcome::Submitted(_)));
    assert_eq!(located, Err(GeolocationError::PermissionDenied));
    assert_eq!(
        state.feedback().error_message(),
        Some(GeolocationError::PermissionDenied.to_string().as_str())
    );
    assert_eq!(state.feedback().loading_transitions(), (1, 1));
    assert!(!state.is_in_flight());
}

#[tokio::test]
async fn silent_platform_times_out() {
    let geolocator = Geolocator::new(Arc::new(SilentPlatform::default()), short_timeout());

    let err = geolocator.locate().await.unwrap_err();

    assert_eq!(err, GeolocationError::Timeout);
}

#[tokio::test]
async fn dropped_callbacks_are_unknown() {
    let geolocator = Geolocator::new(Arc::new(DroppingPlatform), short_timeout());

    assert_eq!(geolocator.locate().await.unwrap_err(), GeolocationError::Unknown);
}

// ---------------------------------------------------------------------------
// Test: unsupported host and duplicate requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsupported_host_reports_error() {
    let geolocator = Geolocator::unsupported(GeolocationSettings::default());
    let state = AppState::new(ValidationSettings::default(), geolocator.is_supported());

    assert!(!state.locate_control().is_visible());
    let err = locate_into_form(&state, &geolocator).await.unwrap_err();

    assert_eq!(err, GeolocationError::Unsupported);
    assert!(matches!(state.feedback().state(), FeedbackState::Error(_)));
}

#[tokio::test]
async fn second_request_while_pending_is_refused() {
    let geolocator = Geolocator::new(ThreadedPlatform::new(fix(1.0, 2.0)), short_timeout());
    let state = new_state();

    let (first, second) = tokio::join!(locate_into_form(&state, &geolocator), async {
        while state.locate_control().phase() != LocatePhase::Requesting {
            tokio::task::yield_now().await;
        }
        locate_into_form(&state, &geolocator).await
    });

    assert_matches!(first, Ok(Some(_)));
    assert_matches!(second, Ok(None));
}
