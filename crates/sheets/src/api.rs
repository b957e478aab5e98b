//! REST API client for the Google Sheets `values:append` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::appender::{AppendResponse, RowAppender, SheetTarget};

/// HTTP client for the spreadsheets collection.
pub struct SheetsApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the Sheets REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Falha na comunicação com o Google Sheets: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("{message}")]
    Api {
        status: u16,
        status_text: String,
        /// Provider message when the body carried one, otherwise
        /// status code and text.
        message: String,
    },

    /// The append URL could not be built from the base URL.
    #[error("URL inválida para a planilha: {0}")]
    InvalidUrl(String),
}

impl SheetsApiError {
    /// Whether the failure guarantees the row was not appended, so that
    /// sending it again cannot create a duplicate.
    ///
    /// True for connection failures (nothing was delivered) and for
    /// `429 Too Many Requests` / `503 Service Unavailable` rejections.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 503),
            Self::InvalidUrl(_) => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// `{"values": [[...]]}` body of an append call.
#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    values: [&'a [Value]; 1],
}

/// Google API error envelope, `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Human-readable message for a failed append.
///
/// Uses the provider's `error.message` when the body has that shape and
/// falls back to status code and status text otherwise.
pub fn error_message(status: u16, status_text: &str, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("Erro na API: {status} {status_text}"),
    }
}

/// Build `{base}/{spreadsheetId}/values/{range}:append?valueInputOption=USER_ENTERED&key={apiKey}`.
pub fn append_url(base_url: &str, target: &SheetTarget) -> Result<Url, SheetsApiError> {
    let mut url = Url::parse(base_url).map_err(|e| SheetsApiError::InvalidUrl(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| SheetsApiError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .push(&target.spreadsheet_id)
        .push("values")
        .push(&format!("{}:append", target.range));

    url.query_pairs_mut()
        .append_pair("valueInputOption", "USER_ENTERED")
        .append_pair("key", &target.api_key);

    Ok(url)
}

impl SheetsApi {
    /// Create a client with a per-request timeout.
    ///
    /// * `base_url` - spreadsheets collection URL, e.g.
    ///   `https://sheets.googleapis.com/v4/spreadsheets`.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, SheetsApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into [`SheetsApiError::Api`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SheetsApiError> {
        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status.as_u16(), &status_text, &body);
            return Err(SheetsApiError::Api {
                status: status.as_u16(),
                status_text,
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RowAppender for SheetsApi {
    async fn append_row(
        &self,
        target: &SheetTarget,
        row: &[Value],
    ) -> Result<AppendResponse, SheetsApiError> {
        let url = append_url(&self.base_url, target)?;

        tracing::debug!(
            spreadsheet_id = %target.spreadsheet_id,
            range = %target.range,
            columns = row.len(),
            "Appending row to Google Sheets",
        );

        let response = self
            .client
            .post(url)
            .json(&AppendRequest { values: [row] })
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        // The row is already stored at this point; an odd echo is not a failure.
        let echo = match response.json::<AppendResponse>().await {
            Ok(echo) => echo,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable append response body");
                AppendResponse::default()
            }
        };

        tracing::info!(
            updated_range = ?echo.updates.as_ref().and_then(|u| u.updated_range.as_deref()),
            "Row appended to Google Sheets",
        );

        Ok(echo)
    }
}
