//! `muster-form` -- terminal front end for the military registration form.
//!
//! Presents the form on stdin/stdout, validates as the user types, and
//! appends each completed registration as a row to a Google Sheet.
//!
//! # Configuration
//!
//! Each key is read from a `.env` file first, then the process
//! environment, then built-in development defaults.
//!
//! | Variable                       | Required | Default         |
//! |--------------------------------|----------|-----------------|
//! | `GOOGLE_SHEETS_API_KEY`        | yes      | --              |
//! | `GOOGLE_SHEETS_SPREADSHEET_ID` | yes      | --              |
//! | `GOOGLE_SHEETS_RANGE`          | no       | `Militares!A:G` |

use std::collections::HashMap;
use std::sync::Arc;

use muster_core::config::{self, ConfigSources, APP_NAME, APP_VERSION};
use muster_form::geolocation::Geolocator;
use muster_form::pipeline::SubmissionPipeline;
use muster_form::state::AppState;
use muster_sheets::SheetsApi;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod terminal;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muster_form=info,muster_sheets=info,muster_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let sources = load_sources();
    let config = config::resolve(&sources);

    tracing::info!(
        app_name = APP_NAME,
        version = APP_VERSION,
        has_api_key = config.has_api_key(),
        has_spreadsheet_id = config.has_spreadsheet_id(),
        "Configuration loaded",
    );

    let api = SheetsApi::new(config.sheets.base_url.clone(), config.sheets.timeout)?;
    let pipeline = SubmissionPipeline::new(Arc::new(api), sources);

    // A terminal host has no location source of its own.
    let geolocator = Geolocator::unsupported(config.geolocation);
    if !geolocator.is_supported() {
        tracing::info!("Geolocation is not supported on this host");
    }

    let state = AppState::new(config.validation, geolocator.is_supported());
    tracing::info!("Military registration form initialized");

    terminal::run(&state, &pipeline, &geolocator).await
}

/// Collect configuration sources without touching the process
/// environment: `.env` entries are read as injected configuration.
fn load_sources() -> ConfigSources {
    let injected: Option<HashMap<String, String>> = match dotenvy::dotenv_iter() {
        Ok(iter) => Some(iter.filter_map(Result::ok).collect()),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    };

    ConfigSources {
        injected,
        globals: std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect(),
        development: ConfigSources::development_defaults(),
    }
}
