pub mod api;
pub mod bulk;
pub mod http_fetcher;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;

pub use api::QuranApi;
pub use bulk::{BulkDownloader, DownloadReport};
pub use http_fetcher::HttpFetcher;

/// Retrieves a JSON document. Upstream APIs are treated as opaque:
/// one attempt, no retries.
#[async_trait]
pub trait Fetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}
