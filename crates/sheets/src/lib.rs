//! Google Sheets REST client.
//!
//! Appends rows to a spreadsheet range through the `values:append`
//! endpoint using [`reqwest`]. The [`RowAppender`] trait is the seam the
//! submission pipeline depends on.

pub mod api;
pub mod appender;

pub use api::{SheetsApi, SheetsApiError};
pub use appender::{AppendResponse, RowAppender, SheetTarget};
