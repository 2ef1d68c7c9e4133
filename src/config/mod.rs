use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed pause between two page fetches.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_start_page")]
    pub start_page: i64,

    #[serde(default = "default_end_page")]
    pub end_page: i64,
}

/// Transform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    /// Source currency (USD) → rupiah.
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
}

/// Load sinks configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoadConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default)]
    pub sheets: SheetsConfig,
}

/// Spreadsheet sink. Disabled unless both the id and a token are present.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default = "default_sheets_range")]
    pub range: String,

    /// Pre-issued OAuth bearer token.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
}

impl SheetsConfig {
    pub fn is_enabled(&self) -> bool {
        self.spreadsheet_id.as_deref().is_some_and(|s| !s.trim().is_empty())
            && self.access_token.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_EXCHANGE_RATE: f64 = 16_000.0;

fn default_base_url() -> String {
    "https://fashion-studio.dicoding.dev/".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_request_delay_ms() -> u64 {
    2000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_start_page() -> i64 {
    1
}
fn default_end_page() -> i64 {
    50
}
fn default_exchange_rate() -> f64 {
    DEFAULT_EXCHANGE_RATE
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("products.csv")
}
fn default_db_path() -> PathBuf {
    PathBuf::from("data/fashion.duckdb")
}
fn default_table_name() -> String {
    "fashion_data".to_string()
}
fn default_sheets_range() -> String {
    "Sheet1!A1".to_string()
}
fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
            start_page: default_start_page(),
            end_page: default_end_page(),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self { exchange_rate: default_exchange_rate() }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            db_path: default_db_path(),
            table_name: default_table_name(),
            sheets: SheetsConfig::default(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: default_sheets_range(),
            access_token: None,
            api_base: default_sheets_api_base(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FASHION").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
