#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use muster_core::config::{
    AppConfig, GeolocationSettings, SheetsSettings, ValidationSettings, DEFAULT_RANGE,
};
use muster_core::fields::Field;
use muster_form::state::AppState;
use muster_sheets::{AppendResponse, RowAppender, SheetTarget, SheetsApiError};

/// One call seen by [`FakeAppender`].
#[derive(Debug, Clone)]
pub struct AppendCall {
    pub target: SheetTarget,
    pub row: Vec<Value>,
}

/// In-memory [`RowAppender`] with scripted replies.
///
/// Replies are consumed in order; once exhausted every call succeeds.
#[derive(Default)]
pub struct FakeAppender {
    calls: Mutex<Vec<AppendCall>>,
    replies: Mutex<VecDeque<Result<AppendResponse, SheetsApiError>>>,
    gate: Option<Arc<Notify>>,
    delay: Option<Duration>,
}

impl FakeAppender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(
        replies: impl IntoIterator<Item = Result<AppendResponse, SheetsApiError>>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every call waits for `gate` to be notified before replying.
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Every call sleeps for `delay` before replying.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<AppendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowAppender for FakeAppender {
    async fn append_row(
        &self,
        target: &SheetTarget,
        row: &[Value],
    ) -> Result<AppendResponse, SheetsApiError> {
        self.calls.lock().unwrap().push(AppendCall {
            target: target.clone(),
            row: row.to_vec(),
        });

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(AppendResponse::default()))
    }
}

pub fn api_error(status: u16, message: &str) -> SheetsApiError {
    SheetsApiError::Api {
        status,
        status_text: String::new(),
        message: message.to_string(),
    }
}

/// Fully configured settings with fast retries.
pub fn test_config() -> AppConfig {
    AppConfig {
        api_key: "test-key".into(),
        spreadsheet_id: "sheet-42".into(),
        range: DEFAULT_RANGE.into(),
        sheets: SheetsSettings {
            retry_delay: Duration::ZERO,
            ..SheetsSettings::default()
        },
        geolocation: GeolocationSettings::default(),
        validation: ValidationSettings::default(),
    }
}

pub fn new_state() -> AppState {
    AppState::new(ValidationSettings::default(), true)
}

/// Fill every field with the reference registration.
pub fn fill_reference(state: &AppState) {
    let mut form = state.form();
    form.input(Field::Rank, "CAP").unwrap();
    form.input(Field::Name, "Jo~ao").unwrap();
    form.input(Field::Battalion, "1BPM").unwrap();
    form.input(Field::Address, "Rua X").unwrap();
    form.input(Field::Latitude, "-23.5").unwrap();
    form.input(Field::Longitude, "-46.6").unwrap();
}
