use crate::domain::model::CleanTable;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Fetches one page of raw markup. Implementations perform exactly one
/// request per call; retrying is the caller's concern (and the pagination
/// driver deliberately does not retry).
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// A destination for the cleaned table. Sinks are independent: the engine
/// invokes them sequentially and a failure in one never blocks another.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    async fn write(&self, table: &CleanTable) -> Result<()>;
}
