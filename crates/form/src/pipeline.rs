//! Submission pipeline.
//!
//! One call to [`SubmissionPipeline::submit`] takes the form from "user
//! pressed submit" to a rendered outcome:
//!
//! 1. take the in-flight flag, or do nothing if another submission holds it,
//! 2. validate the current fields,
//! 3. show loading,
//! 4. assemble the [`MilitaryRecord`],
//! 5. resolve configuration and refuse to call out without credentials,
//! 6. append the row, bounded by the configured timeout,
//! 7. reset the form on success, then hide loading in favour of the
//!    success or error overlay and clear the flag.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use muster_core::config::{self, AppConfig, ConfigSources};
use muster_core::error::CoreError;
use muster_core::fields::FormFields;
use muster_core::record::MilitaryRecord;
use muster_core::validation::{self, ValidationError, INVALID_FORM_MESSAGE};
use muster_sheets::{AppendResponse, RowAppender, SheetTarget, SheetsApiError};

use crate::feedback::FeedbackState;
use crate::state::AppState;

/// Message when the API key or spreadsheet id is missing.
pub const CONFIGURATION_MESSAGE: &str =
    "Configuração do Google Sheets não encontrada. Verifique as variáveis de ambiente.";

type ConfigResolver = Box<dyn Fn() -> AppConfig + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("{}", INVALID_FORM_MESSAGE)]
    Validation(#[source] ValidationError),

    #[error("Erro ao cadastrar militar: {0}")]
    Record(CoreError),

    #[error("{}", CONFIGURATION_MESSAGE)]
    Configuration { missing: Vec<&'static str> },

    #[error("Tempo limite de {}s excedido ao enviar os dados. Tente novamente.", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Network(#[source] SheetsApiError),

    #[error("{message}")]
    Remote { status: u16, message: String },
}

impl From<CoreError> for SubmissionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => Self::Validation(e),
            other => Self::Record(other),
        }
    }
}

impl From<SheetsApiError> for SubmissionError {
    fn from(err: SheetsApiError) -> Self {
        match err {
            SheetsApiError::Api {
                status, message, ..
            } => Self::Remote { status, message },
            other => Self::Network(other),
        }
    }
}

/// Result of a submit action that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The row was appended; the record is what was sent.
    Submitted(MilitaryRecord),
    /// Another submission was in flight; nothing happened.
    Skipped,
}

pub struct SubmissionPipeline {
    appender: Arc<dyn RowAppender>,
    resolve_config: ConfigResolver,
}

impl SubmissionPipeline {
    /// Pipeline that resolves configuration from `sources` on every submit.
    pub fn new(appender: Arc<dyn RowAppender>, sources: ConfigSources) -> Self {
        Self::with_resolver(appender, move || config::resolve(&sources))
    }

    pub fn with_resolver(
        appender: Arc<dyn RowAppender>,
        resolve_config: impl Fn() -> AppConfig + Send + Sync + 'static,
    ) -> Self {
        Self {
            appender,
            resolve_config: Box::new(resolve_config),
        }
    }

    /// Submit the current form contents.
    ///
    /// Errors are also rendered on the feedback channel before being
    /// returned, so callers only need the result for logging or tests.
    pub async fn submit(&self, state: &AppState) -> Result<SubmitOutcome, SubmissionError> {
        let Some(mut guard) = state.begin_submission() else {
            tracing::debug!("Submission already in flight, ignoring submit");
            return Ok(SubmitOutcome::Skipped);
        };

        // Read under the flag so a finished submission's reset is visible.
        let fields = state.form().fields().clone();
        if let Err(e) = validation::validate(&fields) {
            tracing::info!(error = %e, "Submit refused by validation");
            let err = SubmissionError::Validation(e);
            state.feedback().show_error(err.to_string());
            return Err(err);
        }

        guard.show_loading();
        let result = self.send(&fields).await;

        match result {
            Ok(record) => {
                state.form().reset();
                guard.complete(FeedbackState::Success);
                Ok(SubmitOutcome::Submitted(record))
            }
            Err(err) => {
                tracing::error!(error = %err, "Error submitting form");
                guard.complete(FeedbackState::Error(err.to_string()));
                Err(err)
            }
        }
    }

    async fn send(&self, fields: &FormFields) -> Result<MilitaryRecord, SubmissionError> {
        let record = MilitaryRecord::assemble(fields, Utc::now())?;

        let config = (self.resolve_config)();
        if !config.is_configured() {
            return Err(SubmissionError::Configuration {
                missing: config.missing_settings(),
            });
        }

        let target = SheetTarget {
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            api_key: config.api_key.clone(),
        };

        tracing::info!(
            rank = record.rank().code,
            battalion = record.battalion(),
            "Submitting military record",
        );

        self.append_with_retry(&config, &target, &record.to_row())
            .await?;

        Ok(record)
    }

    /// Append with the configured timeout per attempt.
    ///
    /// Only failures that guarantee nothing was stored are retried; a
    /// timeout may have reached the sheet and is never resent.
    async fn append_with_retry(
        &self,
        config: &AppConfig,
        target: &SheetTarget,
        row: &[Value],
    ) -> Result<AppendResponse, SubmissionError> {
        let settings = &config.sheets;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match tokio::time::timeout(
                settings.timeout,
                self.appender.append_row(target, row),
            )
            .await
            {
                Ok(Ok(echo)) => return Ok(echo),
                Ok(Err(e)) if e.is_timeout() => return Err(SubmissionError::Timeout(settings.timeout)),
                Ok(Err(e)) => e,
                Err(_) => return Err(SubmissionError::Timeout(settings.timeout)),
            };

            if !err.is_transient() || attempt > settings.retry_attempts {
                return Err(err.into());
            }

            tracing::warn!(
                attempt,
                max_retries = settings.retry_attempts,
                error = %err,
                "Append rejected before storing the row, retrying",
            );
            tokio::time::sleep(settings.retry_delay).await;
        }
    }
}
