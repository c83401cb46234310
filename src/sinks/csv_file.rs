use crate::domain::model::{CleanTable, COLUMNS};
use crate::domain::ports::Sink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Writes the cleaned table as comma-delimited text, header row first,
/// no index column.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Sink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn write(&self, table: &CleanTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;

        if table.is_empty() {
            // serialize() would never run, so emit the header by hand.
            writer.write_record(COLUMNS)?;
        }
        for record in table {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!(path = %self.path.display(), rows = table.len(), "CSV written");
        Ok(())
    }
}
