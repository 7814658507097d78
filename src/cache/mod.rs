//! Offline content cache.
//!
//! Reference datasets (surah list, Azkar categories) and per-unit ayah
//! arrays are stored verbatim as JSON. A cached entry is trusted
//! indefinitely: there is no staleness check and nothing here invalidates
//! automatically. Network and storage failures surface as `None`.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app::Result;
use crate::domain::{AzkarCategory, ContentUnit, SurahSummary, UnitKind};
use crate::fetcher::QuranApi;
use crate::store::{keys, read_json, write_json, KeyValueStore};

/// Whole datasets cached under static keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Surahs,
    Azkar,
}

impl ReferenceKind {
    pub fn cache_key(self) -> &'static str {
        match self {
            ReferenceKind::Surahs => keys::OFFLINE_SURAH_LIST,
            ReferenceKind::Azkar => keys::OFFLINE_AZKAR,
        }
    }
}

pub struct ContentCache<S: KeyValueStore> {
    store: Arc<S>,
    api: Arc<QuranApi>,
}

impl<S: KeyValueStore> ContentCache<S> {
    pub fn new(store: Arc<S>, api: Arc<QuranApi>) -> Self {
        Self { store, api }
    }

    pub fn api(&self) -> &Arc<QuranApi> {
        &self.api
    }

    /// Cache lookup only; never touches the network.
    pub async fn get_reference_list(&self, kind: ReferenceKind) -> Option<Value> {
        read_json(&*self.store, kind.cache_key()).await
    }

    pub async fn save_reference_list(&self, kind: ReferenceKind, data: &Value) -> bool {
        write_json(&*self.store, kind.cache_key(), data).await
    }

    /// Fetch a dataset from the network and replace the cached copy.
    pub async fn preload_reference_list(&self, kind: ReferenceKind) -> Option<Value> {
        match self.api.fetch_reference(kind).await {
            Ok(data) => {
                self.save_reference_list(kind, &data).await;
                Some(data)
            }
            Err(e) => {
                tracing::warn!("Failed to preload {:?}: {}", kind, e);
                None
            }
        }
    }

    /// Cache lookup only; an out-of-range number is a miss.
    pub async fn get_unit(&self, kind: UnitKind, number: u16) -> Option<Value> {
        if let Err(e) = kind.validate(number) {
            tracing::warn!("{}", e);
            return None;
        }
        read_json(&*self.store, &kind.cache_key(number)).await
    }

    pub async fn save_unit(&self, kind: UnitKind, number: u16, data: &Value) -> bool {
        if let Err(e) = kind.validate(number) {
            tracing::warn!("Not caching: {}", e);
            return false;
        }
        write_json(&*self.store, &kind.cache_key(number), data).await
    }

    /// Read-through helper: return the cached value under `key`, or call
    /// `fetch` once, write the result through and return it.
    pub async fn fetch_with_cache<F, Fut>(&self, key: &str, fetch: F) -> Option<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(cached) = read_json::<_, Value>(&*self.store, key).await {
            tracing::debug!("Cache hit: {}", key);
            return Some(cached);
        }

        tracing::debug!("Cache miss: {}", key);
        match fetch().await {
            Ok(data) => {
                write_json(&*self.store, key, &data).await;
                Some(data)
            }
            Err(e) => {
                tracing::warn!("Fetch for {} failed: {}", key, e);
                None
            }
        }
    }

    pub async fn load_reference_list(&self, kind: ReferenceKind) -> Option<Value> {
        self.fetch_with_cache(kind.cache_key(), || self.api.fetch_reference(kind))
            .await
    }

    pub async fn load_unit(&self, kind: UnitKind, number: u16) -> Option<Value> {
        if let Err(e) = kind.validate(number) {
            tracing::warn!("{}", e);
            return None;
        }
        self.fetch_with_cache(&kind.cache_key(number), || {
            self.api.fetch_unit(kind, number)
        })
        .await
    }

    pub async fn surah_list(&self) -> Option<Vec<SurahSummary>> {
        decode(self.load_reference_list(ReferenceKind::Surahs).await?)
    }

    pub async fn azkar_categories(&self) -> Option<Vec<AzkarCategory>> {
        decode(self.load_reference_list(ReferenceKind::Azkar).await?)
    }

    pub async fn content_unit(&self, kind: UnitKind, number: u16) -> Option<ContentUnit> {
        decode(self.load_unit(kind, number).await?)
    }

    /// Units of `kind` available offline, ascending.
    pub async fn cached_unit_numbers(&self, kind: UnitKind) -> Vec<u16> {
        let prefix = kind.cache_prefix();
        let keys = match self.store.keys_with_prefix(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Failed to list cached {} units: {}", kind, e);
                return Vec::new();
            }
        };

        let mut numbers: Vec<u16> = keys
            .iter()
            .filter_map(|k| k.strip_prefix(prefix)?.parse().ok())
            .filter(|&n| kind.validate(n).is_ok())
            .collect();
        numbers.sort_unstable();
        numbers
    }
}

/// Decode cached JSON, treating a shape mismatch as a miss.
pub fn decode<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("Cached content has an unexpected shape: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::config::ApiConfig;
    use crate::store::SqliteStore;
    use crate::test_support::{FailingStore, StaticFetcher};

    const SURAH_LIST_URL: &str = "https://api.alquran.cloud/v1/surah";

    fn cache_with<S: KeyValueStore>(store: S, fetcher: StaticFetcher) -> ContentCache<S> {
        let api = QuranApi::new(Arc::new(fetcher), ApiConfig::default());
        ContentCache::new(Arc::new(store), Arc::new(api))
    }

    fn surah_list_body() -> Value {
        json!({
            "code": 200,
            "status": "OK",
            "data": [
                { "number": 1, "name": "سُورَةُ ٱلْفَاتِحَةِ", "englishName": "Al-Faatiha",
                  "numberOfAyahs": 7, "revelationType": "Meccan" },
                { "number": 2, "name": "سُورَةُ البَقَرَةِ", "englishName": "Al-Baqara",
                  "numberOfAyahs": 286, "revelationType": "Medinan" }
            ]
        })
    }

    fn ayahs(count: u32) -> Value {
        Value::Array(
            (1..=count)
                .map(|n| json!({ "number": n, "numberInSurah": n, "text": "…", "surah": { "number": 1 } }))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_save_then_get_unit_every_surah() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());

        for n in 1..=114u16 {
            let data = ayahs(u32::from(n % 7) + 1);
            assert!(cache.save_unit(UnitKind::Surah, n, &data).await);
            assert_eq!(cache.get_unit(UnitKind::Surah, n).await, Some(data));
        }
    }

    #[tokio::test]
    async fn test_surah_and_juz_do_not_collide() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        cache.save_unit(UnitKind::Surah, 3, &ayahs(1)).await;
        cache.save_unit(UnitKind::Juz, 3, &ayahs(2)).await;

        assert_eq!(cache.get_unit(UnitKind::Surah, 3).await, Some(ayahs(1)));
        assert_eq!(cache.get_unit(UnitKind::Juz, 3).await, Some(ayahs(2)));
    }

    #[tokio::test]
    async fn test_get_reference_list_does_not_fetch() {
        let fetcher = StaticFetcher::new().with(SURAH_LIST_URL, surah_list_body());
        let calls = fetcher.call_counter();
        let cache = cache_with(SqliteStore::in_memory().unwrap(), fetcher);

        assert!(cache.get_reference_list(ReferenceKind::Surahs).await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_preload_writes_through() {
        let fetcher = StaticFetcher::new().with(SURAH_LIST_URL, surah_list_body());
        let cache = cache_with(SqliteStore::in_memory().unwrap(), fetcher);

        let loaded = cache.preload_reference_list(ReferenceKind::Surahs).await.unwrap();
        assert_eq!(loaded.as_array().unwrap().len(), 2);
        assert_eq!(
            cache.get_reference_list(ReferenceKind::Surahs).await,
            Some(loaded)
        );
    }

    #[tokio::test]
    async fn test_preload_failure_is_none_and_keeps_cache() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        let existing = json!([{ "number": 1, "name": "x" }]);
        cache
            .save_reference_list(ReferenceKind::Surahs, &existing)
            .await;

        assert!(cache.preload_reference_list(ReferenceKind::Surahs).await.is_none());
        assert_eq!(
            cache.get_reference_list(ReferenceKind::Surahs).await,
            Some(existing)
        );
    }

    #[tokio::test]
    async fn test_fetch_with_cache_fetches_once() {
        let fetcher = StaticFetcher::new().with(SURAH_LIST_URL, surah_list_body());
        let calls = fetcher.call_counter();
        let cache = cache_with(SqliteStore::in_memory().unwrap(), fetcher);

        let first = cache.surah_list().await.unwrap();
        let second = cache.surah_list().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[1].english_name, "Al-Baqara");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_with_cache_failure() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        let result = cache
            .fetch_with_cache("offline_surah_9", || async {
                Err(crate::app::TilawaError::Other("offline".into()))
            })
            .await;

        assert!(result.is_none());
        assert!(cache.get_unit(UnitKind::Surah, 9).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_data() {
        let fetcher = StaticFetcher::new().with(SURAH_LIST_URL, surah_list_body());
        let cache = cache_with(FailingStore, fetcher);

        let surahs = cache.surah_list().await.unwrap();
        assert_eq!(surahs.len(), 2);
        assert!(!cache.save_unit(UnitKind::Surah, 1, &ayahs(1)).await);
    }

    #[tokio::test]
    async fn test_load_unit_uses_cache_first() {
        let fetcher = StaticFetcher::new();
        let calls = fetcher.call_counter();
        let cache = cache_with(SqliteStore::in_memory().unwrap(), fetcher);
        cache.save_unit(UnitKind::Juz, 1, &ayahs(3)).await;

        let unit = cache.content_unit(UnitKind::Juz, 1).await.unwrap();
        assert_eq!(unit.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_unit_numbers_are_misses() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        assert!(!cache.save_unit(UnitKind::Surah, 0, &ayahs(1)).await);
        assert!(cache.get_unit(UnitKind::Juz, 31).await.is_none());
        assert!(cache.load_unit(UnitKind::Surah, 115).await.is_none());
    }

    #[tokio::test]
    async fn test_cached_unit_numbers_sorted_numerically() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        for n in [10, 2, 114] {
            cache.save_unit(UnitKind::Surah, n, &ayahs(1)).await;
        }
        cache.save_unit(UnitKind::Juz, 5, &ayahs(1)).await;

        assert_eq!(
            cache.cached_unit_numbers(UnitKind::Surah).await,
            vec![2, 10, 114]
        );
        assert_eq!(cache.cached_unit_numbers(UnitKind::Juz).await, vec![5]);
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_none() {
        let cache = cache_with(SqliteStore::in_memory().unwrap(), StaticFetcher::new());
        cache
            .save_unit(UnitKind::Surah, 1, &json!({ "not": "ayahs" }))
            .await;
        assert!(cache.content_unit(UnitKind::Surah, 1).await.is_none());
    }
}
