use crate::config::AppConfig;
use crate::core::extract::{HttpFetcher, Scraper};
use crate::core::transform::CleaningPipeline;
use crate::domain::model::CleanTable;
use crate::domain::ports::Sink;
use crate::sinks::{create_database, CsvSink, PostgresSink, SheetsSink};
use crate::utils::error::Result;
use std::time::Duration;

/// Orchestrates one ETL run: scrape, clean, then hand the table to every
/// configured sink in turn. Sink failures are logged and never abort the
/// run; the only hard errors are construction-time ones.
pub struct EtlEngine {
    config: AppConfig,
}

impl EtlEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<CleanTable> {
        tracing::info!("Starting ETL process");

        let scraper = Scraper::new(
            HttpFetcher::new(),
            Duration::from_millis(self.config.scrape.delay_ms),
        )?
        .with_max_pages(self.config.scrape.max_pages);

        let raw = scraper.scrape_all(&self.config.scrape.base_url).await;
        tracing::info!(records = raw.len(), "Extraction finished");

        let pipeline = CleaningPipeline::new(self.config.transform.currency_rate)?;
        let clean = pipeline.clean(&raw);
        tracing::info!(
            rows = clean.len(),
            dropped = raw.len() - clean.len(),
            "Transformation finished"
        );
        for record in clean.iter().take(5) {
            tracing::debug!(?record, "Sample row");
        }

        if let Some(csv) = &self.config.csv {
            self.write_sink(&CsvSink::new(&csv.path), &clean).await;
        }

        if let Some(sheets) = &self.config.sheets {
            self.write_sink(&SheetsSink::new(sheets.clone()), &clean)
                .await;
        }

        if let Some(db) = &self.config.database {
            if let Err(e) = create_database(db).await {
                tracing::error!(database = %db.database, error = %e, "Database creation failed");
            }
            self.write_sink(&PostgresSink::new(db.clone()), &clean).await;
        }

        Ok(clean)
    }

    async fn write_sink(&self, sink: &dyn Sink, table: &CleanTable) {
        match sink.write(table).await {
            Ok(()) => {
                tracing::info!(sink = sink.name(), rows = table.len(), "Sink write complete")
            }
            Err(e) => tracing::error!(sink = sink.name(), error = %e, "Sink write failed"),
        }
    }
}
