//! Configuration provider.
//!
//! Settings are looked up by name across [`ConfigSources`] in priority
//! order: injected runtime configuration, then named globals (the process
//! environment), then the static development table, then a hard default.
//! An empty value at one level falls through to the next.
//!
//! | Key                            | Default          |
//! |--------------------------------|------------------|
//! | `GOOGLE_SHEETS_API_KEY`        | (empty)          |
//! | `GOOGLE_SHEETS_SPREADSHEET_ID` | (empty)          |
//! | `GOOGLE_SHEETS_RANGE`          | `Militares!A:G`  |

use std::collections::HashMap;
use std::time::Duration;

use crate::format::COORDINATE_DECIMAL_PLACES;

pub const API_KEY_VAR: &str = "GOOGLE_SHEETS_API_KEY";
pub const SPREADSHEET_ID_VAR: &str = "GOOGLE_SHEETS_SPREADSHEET_ID";
pub const RANGE_VAR: &str = "GOOGLE_SHEETS_RANGE";

/// Sheet tab and columns rows are appended to.
pub const DEFAULT_RANGE: &str = "Militares!A:G";

/// Spreadsheets collection of the Google Sheets v4 REST API.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub const APP_NAME: &str = "Sistema de Cadastro Militar";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Named lookup tables, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Configuration injected at deploy time. `None` when nothing was
    /// injected.
    pub injected: Option<HashMap<String, String>>,
    /// Named global variables.
    pub globals: HashMap<String, String>,
    /// Static development values. Never holds real credentials.
    pub development: HashMap<String, String>,
}

impl ConfigSources {
    /// The committed development table: placeholders only.
    pub fn development_defaults() -> HashMap<String, String> {
        HashMap::from([
            (API_KEY_VAR.to_string(), String::new()),
            (SPREADSHEET_ID_VAR.to_string(), String::new()),
            (RANGE_VAR.to_string(), DEFAULT_RANGE.to_string()),
        ])
    }

    /// Resolve one named setting, falling back to `default`.
    pub fn lookup(&self, name: &str, default: &str) -> String {
        let layers = [self.injected.as_ref(), Some(&self.globals), Some(&self.development)];

        layers
            .into_iter()
            .flatten()
            .filter_map(|layer| layer.get(name))
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}

/// Geolocation request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationSettings {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position accepted; zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl Default for GeolocationSettings {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Input limits for the free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    pub name_max_length: usize,
    pub battalion_max_length: usize,
    pub address_max_length: usize,
    pub coordinate_decimal_places: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            name_max_length: 100,
            battalion_max_length: 100,
            address_max_length: 500,
            coordinate_decimal_places: COORDINATE_DECIMAL_PLACES,
        }
    }
}

/// Remote append call behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsSettings {
    pub base_url: String,
    /// Extra attempts after the first, for failures that provably did
    /// not append a row.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    /// Hard limit on a single append request.
    pub timeout: Duration,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1_000),
            timeout: Duration::from_millis(30_000),
        }
    }
}

/// Process-wide, read-only application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_key: String,
    pub spreadsheet_id: String,
    pub range: String,
    pub sheets: SheetsSettings,
    pub geolocation: GeolocationSettings,
    pub validation: ValidationSettings,
}

impl AppConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn has_spreadsheet_id(&self) -> bool {
        !self.spreadsheet_id.is_empty()
    }

    /// Names of required settings that resolved to empty.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_api_key() {
            missing.push(API_KEY_VAR);
        }
        if !self.has_spreadsheet_id() {
            missing.push(SPREADSHEET_ID_VAR);
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.has_api_key() && self.has_spreadsheet_id()
    }
}

/// Compute the configuration from `sources`.
///
/// Pure apart from warning events for a missing API key or spreadsheet
/// id; calling it again with the same sources yields the same value.
pub fn resolve(sources: &ConfigSources) -> AppConfig {
    let config = AppConfig {
        api_key: sources.lookup(API_KEY_VAR, ""),
        spreadsheet_id: sources.lookup(SPREADSHEET_ID_VAR, ""),
        range: sources.lookup(RANGE_VAR, DEFAULT_RANGE),
        sheets: SheetsSettings::default(),
        geolocation: GeolocationSettings::default(),
        validation: ValidationSettings::default(),
    };

    if !config.has_api_key() {
        tracing::warn!(
            "Google Sheets API key not found. Set the {API_KEY_VAR} environment variable."
        );
    }
    if !config.has_spreadsheet_id() {
        tracing::warn!(
            "Google Sheets spreadsheet id not found. Set the {SPREADSHEET_ID_VAR} environment variable."
        );
    }

    config
}
