//! The append-row seam between the submission pipeline and the remote
//! spreadsheet.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::api::SheetsApiError;

/// Where a row is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    /// A1-notation range, e.g. `Militares!A:G`.
    pub range: String,
    pub api_key: String,
}

/// Provider echo of an append call. Only used for logging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppendResponse {
    pub spreadsheet_id: Option<String>,
    pub table_range: Option<String>,
    pub updates: Option<UpdateSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateSummary {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u32>,
    pub updated_cells: Option<u32>,
}

/// Anything that can append one row to a spreadsheet range.
///
/// The call is all-or-nothing: either the whole row is appended or an
/// error is returned.
#[async_trait]
pub trait RowAppender: Send + Sync {
    async fn append_row(
        &self,
        target: &SheetTarget,
        row: &[Value],
    ) -> Result<AppendResponse, SheetsApiError>;
}
