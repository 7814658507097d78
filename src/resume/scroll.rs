use std::sync::Arc;
use std::time::Duration;

use crate::domain::ModeKey;
use crate::progress::Debouncer;
use crate::store::{write_raw, KeyValueStore};

/// Read the saved scroll offset of a reading view.
///
/// Offsets are stored as plain decimal strings; anything unparsable or
/// non-finite reads as no offset.
pub async fn saved_offset<S: KeyValueStore + ?Sized>(store: &S, mode: ModeKey) -> Option<f64> {
    let key = mode.scroll_key();
    match store.get(&key).await {
        Ok(Some(raw)) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}

pub async fn save_offset<S: KeyValueStore + ?Sized>(store: &S, mode: ModeKey, offset: f64) -> bool {
    write_raw(store, &mode.scroll_key(), &offset.to_string()).await
}

/// Debounced scroll-offset saving for one reading view.
pub struct ScrollSaver {
    debouncer: Debouncer<f64>,
}

impl ScrollSaver {
    pub fn new<S: KeyValueStore + 'static>(store: Arc<S>, mode: ModeKey, delay: Duration) -> Self {
        let debouncer = Debouncer::new(delay, move |offset| {
            let store = store.clone();
            async move {
                save_offset(&*store, mode, offset).await;
            }
        });
        Self { debouncer }
    }

    pub fn observe(&mut self, offset: f64) {
        self.debouncer.push(offset);
    }

    pub async fn flush(&mut self) {
        self.debouncer.flush().await;
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    #[tokio::test]
    async fn test_offset_round_trip_and_garbage() {
        let store = SqliteStore::in_memory().unwrap();
        let mode = ModeKey::surah(36);

        assert_eq!(saved_offset(&store, mode).await, None);
        save_offset(&store, mode, 1234.5).await;
        assert_eq!(saved_offset(&store, mode).await, Some(1234.5));

        store.set(&mode.scroll_key(), "NaN").await.unwrap();
        assert_eq!(saved_offset(&store, mode).await, None);
        store.set(&mode.scroll_key(), "abc").await.unwrap();
        assert_eq!(saved_offset(&store, mode).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_saver_coalesces() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let mode = ModeKey::juz(2);
        let mut saver = ScrollSaver::new(store.clone(), mode, Duration::from_millis(800));

        for offset in [100.0, 250.0, 900.0] {
            saver.observe(offset);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(saved_offset(&*store, mode).await, None);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(saved_offset(&*store, mode).await, Some(900.0));
        assert_eq!(
            store.get("surah_scroll_juz_2").await.unwrap(),
            Some("900".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_on_unmount() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let mode = ModeKey::surah(1);
        let mut saver = ScrollSaver::new(store.clone(), mode, Duration::from_millis(800));

        saver.observe(400.0);
        saver.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(saved_offset(&*store, mode).await, None);
    }
}
