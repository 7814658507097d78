use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{Result, TilawaError};
use crate::cache::ContentCache;
use crate::domain::UnitKind;
use crate::store::KeyValueStore;

pub const DEFAULT_WORKERS: usize = 10;

/// Outcome of a bulk offline download.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// (unit number, ayah count)
    pub downloaded: Vec<(u16, usize)>,
    pub failed: Vec<(u16, TilawaError)>,
    /// Units already available offline.
    pub skipped: usize,
}

/// Downloads every unit of a kind for offline reading, a bounded number
/// of requests at a time.
pub struct BulkDownloader {
    semaphore: Arc<Semaphore>,
}

impl BulkDownloader {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn download_all<S: KeyValueStore + 'static>(
        &self,
        cache: Arc<ContentCache<S>>,
        kind: UnitKind,
    ) -> DownloadReport {
        let cached = cache.cached_unit_numbers(kind).await;
        let mut report = DownloadReport {
            skipped: cached.len(),
            ..Default::default()
        };

        let mut handles = Vec::new();

        for number in (1..=kind.max()).filter(|n| !cached.contains(n)) {
            let cache = cache.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let result = download_unit(&cache, &semaphore, kind, number).await;
                (number, result)
            });

            handles.push(handle);
        }

        for handle in handles {
            match handle.await {
                Ok((number, Ok(count))) => report.downloaded.push((number, count)),
                Ok((number, Err(e))) => {
                    tracing::warn!("Failed to download {} {}: {}", kind, number, e);
                    report.failed.push((number, e));
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        tracing::info!(
            "Downloaded {} {} units ({} failed, {} already cached)",
            report.downloaded.len(),
            kind,
            report.failed.len(),
            report.skipped
        );

        report
    }
}

impl Default for BulkDownloader {
    fn default() -> Self {
        Self::new()
    }
}

async fn download_unit<S: KeyValueStore>(
    cache: &ContentCache<S>,
    semaphore: &Semaphore,
    kind: UnitKind,
    number: u16,
) -> Result<usize> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|e| TilawaError::Other(e.to_string()))?;

    let data = cache.api().fetch_unit(kind, number).await?;
    let count = data.as_array().map_or(0, Vec::len);

    if !cache.save_unit(kind, number, &data).await {
        return Err(TilawaError::Other(format!(
            "could not store {} {}",
            kind, number
        )));
    }

    Ok(count)
}
