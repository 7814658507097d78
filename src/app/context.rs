use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{Result, TilawaError};
use crate::cache::ContentCache;
use crate::config::Config;
use crate::domain::ModeKey;
use crate::fetcher::{BulkDownloader, Fetcher, HttpFetcher, QuranApi};
use crate::progress::{ProgressTracker, VerseSaver};
use crate::resume::{ResumeAction, ResumeCoordinator, ScrollSaver};
use crate::settings::{BrightnessControl, SettingsStore, SysfsBrightness};
use crate::store::{keys, KeyValueStore, SqliteStore};

/// Everything a front-end needs, initialized once from the persisted
/// store and passed by reference.
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub cache: Arc<ContentCache<SqliteStore>>,
    pub progress: Arc<ProgressTracker<SqliteStore>>,
    pub settings: SettingsStore<SqliteStore, dyn BrightnessControl>,
    pub downloader: BulkDownloader,
    pub config: Config,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_timeout(
            Duration::from_secs(config.api.timeout_secs),
        )?);
        let brightness: Arc<dyn BrightnessControl> =
            Arc::new(SysfsBrightness::new(config.brightness.device.clone()));

        Ok(Self::from_parts(store, fetcher, brightness, config))
    }

    pub fn in_memory(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        brightness: Arc<dyn BrightnessControl>,
        config: Config,
    ) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::from_parts(store, fetcher, brightness, config))
    }

    fn from_parts(
        store: Arc<SqliteStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        brightness: Arc<dyn BrightnessControl>,
        config: Config,
    ) -> Self {
        let api = Arc::new(QuranApi::new(fetcher, config.api.clone()));
        let cache = Arc::new(ContentCache::new(store.clone(), api));
        let progress = Arc::new(ProgressTracker::new(store.clone()));
        let settings = SettingsStore::new(store.clone(), brightness);
        let downloader = BulkDownloader::with_workers(config.download.workers);

        Self {
            store,
            cache,
            progress,
            settings,
            downloader,
            config,
        }
    }

    /// Remove progress and preferences. Downloaded content stays cached.
    pub async fn wipe_user_data(&self) -> Result<()> {
        self.store.multi_remove(&keys::USER_DATA_KEYS).await?;
        tracing::info!("User data wiped");
        Ok(())
    }

    pub fn resume_coordinator(
        &self,
        mode: ModeKey,
    ) -> (
        ResumeCoordinator<SqliteStore>,
        tokio::sync::mpsc::UnboundedReceiver<ResumeAction>,
    ) {
        ResumeCoordinator::new(
            self.store.clone(),
            mode,
            self.config.reader.resume_timings(),
        )
    }

    pub fn verse_saver(&self) -> VerseSaver {
        VerseSaver::new(
            self.progress.clone(),
            self.config.reader.debounce(),
            self.config.reader.verse_bias_px,
        )
    }

    pub fn scroll_saver(&self, mode: ModeKey) -> ScrollSaver {
        ScrollSaver::new(self.store.clone(), mode, self.config.reader.debounce())
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TilawaError::Config("Could not find data directory".into()))?;
        let tilawa_dir = data_dir.join("tilawa");
        std::fs::create_dir_all(&tilawa_dir)?;
        Ok(tilawa_dir.join("tilawa.db"))
    }
}
