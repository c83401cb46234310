use crate::core::transform::DEFAULT_CURRENCY_RATE;
use crate::utils::error::{EtlError, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::Path;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "fashion-etl")]
#[command(about = "Scrape the fashion catalogue, clean it and load it into the configured sinks")]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "fashion-etl.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Application configuration. Credentials and sink settings live in a TOML
/// file rather than CLI flags; a sink section left out disables that sink.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    pub csv: Option<CsvConfig>,
    pub sheets: Option<SheetsConfig>,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    pub base_url: String,

    /// Pause between successive page fetches, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Optional cap on pages visited; unlimited when absent. The site's
    /// next-marker is the only other stop signal.
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Source-currency to Rupiah conversion rate.
    #[serde(default = "default_currency_rate")]
    pub currency_rate: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            currency_rate: DEFAULT_CURRENCY_RATE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvConfig {
    #[serde(default = "default_csv_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Path to the service-account JSON keyfile.
    pub keyfile: String,
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_db_table")]
    pub table: String,
    #[serde(default)]
    pub mode: WriteMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Append,
    #[default]
    Overwrite,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_currency_rate() -> f64 {
    DEFAULT_CURRENCY_RATE
}

fn default_csv_path() -> String {
    "products.csv".to_string()
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_table() -> String {
    "products".to_string()
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.scrape.base_url).map_err(|e| {
            EtlError::config(format!(
                "invalid base_url '{}': {e}",
                self.scrape.base_url
            ))
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(EtlError::config(format!(
                    "unsupported base_url scheme: {scheme}"
                )))
            }
        }

        if self.transform.currency_rate <= 0.0 {
            return Err(EtlError::config("currency_rate must be positive"));
        }

        if let Some(db) = &self.database {
            if db.database.is_empty() || db.table.is_empty() {
                return Err(EtlError::config("database and table names cannot be empty"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_applies_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [scrape]
            base_url = "https://fashion-studio.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.scrape.delay_ms, 1000);
        assert_eq!(config.scrape.max_pages, None);
        assert_eq!(config.transform.currency_rate, DEFAULT_CURRENCY_RATE);
        assert!(config.csv.is_none());
        assert!(config.sheets.is_none());
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [scrape]
            base_url = "https://fashion-studio.example.com/"
            delay_ms = 250
            max_pages = 50

            [transform]
            currency_rate = 15500.0

            [csv]
            path = "out/products.csv"

            [sheets]
            keyfile = "google-sheets-api.json"
            spreadsheet_id = "sheet-id"

            [database]
            database = "fashion_db"
            user = "postgres"
            password = "secret"
            mode = "append"
            "#,
        )
        .unwrap();

        assert_eq!(config.scrape.delay_ms, 250);
        assert_eq!(config.scrape.max_pages, Some(50));
        assert_eq!(config.transform.currency_rate, 15500.0);
        assert_eq!(config.sheets.as_ref().unwrap().sheet_name, "Sheet1");

        let db = config.database.as_ref().unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);
        assert_eq!(db.table, "products");
        assert_eq!(db.mode, WriteMode::Append);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config: AppConfig = toml::from_str(
            r#"
            [scrape]
            base_url = "ftp://fashion-studio.example.com/"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }
}
