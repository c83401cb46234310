pub mod config;
pub mod core;
pub mod domain;
pub mod sinks;
pub mod utils;

pub use config::{AppConfig, Cli, DatabaseConfig, ScrapeConfig, SheetsConfig, WriteMode};
pub use core::etl::EtlEngine;
pub use core::extract::{CardParser, HttpFetcher, Scraper};
pub use core::transform::{CleaningPipeline, DEFAULT_CURRENCY_RATE};
pub use domain::model::{CleanRecord, CleanTable, RawRecord, RawTable};
pub use domain::ports::{Fetch, Sink};
pub use utils::error::{EtlError, Result};
