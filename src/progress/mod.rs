//! Reading progress: the last-read position and the Khatmah checklist.

pub mod debounce;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::app::Result;
use crate::domain::progress::now_millis;
use crate::domain::{CompletionSet, ContentUnit, LastRead, UnitKind};
use crate::store::{keys, read_json, write_json, KeyValueStore};

pub use debounce::Debouncer;

/// Empirical bias toward the verse near the top of the viewport.
pub const DEFAULT_VERSE_BIAS_PX: f64 = 150.0;

/// Approximate which ayah is being read from a scroll position.
///
/// `(scroll_y + bias) / content_height`, clamped to `[0, 1]`, scaled by
/// the ayah count and floored, then clamped to the last index. This is a
/// ratio heuristic, not hit-testing. `None` when there are no ayahs.
pub fn estimate_verse_index(
    scroll_y: f64,
    content_height: f64,
    ayah_count: usize,
    bias: f64,
) -> Option<usize> {
    if ayah_count == 0 {
        return None;
    }
    if content_height.is_nan() || content_height <= 0.0 {
        return Some(0);
    }

    let ratio = ((scroll_y + bias) / content_height).clamp(0.0, 1.0);
    let index = (ratio * ayah_count as f64).floor() as usize;
    Some(index.min(ayah_count - 1))
}

pub struct ProgressTracker<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> ProgressTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Overwrite the last-read record.
    pub async fn record_last_read(&self, last_read: &LastRead) -> bool {
        write_json(&*self.store, keys::LAST_READ, last_read).await
    }

    pub async fn last_read(&self) -> Option<LastRead> {
        read_json(&*self.store, keys::LAST_READ).await
    }

    /// Move the saved position to `verse`, keeping every other stored field.
    ///
    /// Without an existing record there is no unit to attach the verse to,
    /// so nothing is written.
    pub async fn update_last_read_verse(&self, verse: u32) -> Option<LastRead> {
        let Some(Value::Object(mut record)) =
            read_json::<_, Value>(&*self.store, keys::LAST_READ).await
        else {
            tracing::debug!("No last-read record; verse {} not saved", verse);
            return None;
        };

        record.insert("verse".into(), Value::from(verse));
        record.insert("time".into(), Value::from(now_millis()));

        let record = Value::Object(record);
        write_json(&*self.store, keys::LAST_READ, &record).await;

        serde_json::from_value(record).ok()
    }

    pub async fn completion(&self) -> CompletionSet {
        read_json(&*self.store, keys::KHATMAH_PROGRESS)
            .await
            .unwrap_or_default()
    }

    /// Flip one surah in the Khatmah checklist and persist the whole set.
    pub async fn toggle_completion(&self, surah: u16) -> Result<CompletionSet> {
        UnitKind::Surah.validate(surah)?;

        let mut set = self.completion().await;
        let done = set.toggle(surah);
        write_json(&*self.store, keys::KHATMAH_PROGRESS, &set).await;

        tracing::debug!(
            "Surah {} marked {}",
            surah,
            if done { "complete" } else { "incomplete" }
        );
        Ok(set)
    }

    pub async fn reset_completion(&self) -> CompletionSet {
        let set = CompletionSet::new();
        write_json(&*self.store, keys::KHATMAH_PROGRESS, &set).await;
        set
    }
}

/// Debounced verse-position saving for a reading view.
pub struct VerseSaver {
    debouncer: Debouncer<u32>,
    bias: f64,
}

impl VerseSaver {
    pub fn new<S: KeyValueStore + 'static>(
        tracker: Arc<ProgressTracker<S>>,
        delay: Duration,
        bias: f64,
    ) -> Self {
        let debouncer = Debouncer::new(delay, move |verse| {
            let tracker = tracker.clone();
            async move {
                tracker.update_last_read_verse(verse).await;
            }
        });
        Self { debouncer, bias }
    }

    pub fn observe_verse(&mut self, verse: u32) {
        self.debouncer.push(verse);
    }

    /// Estimate the visible verse of `unit` and schedule saving it.
    /// Returns the estimated global ayah number.
    pub fn observe_scroll(
        &mut self,
        unit: &ContentUnit,
        scroll_y: f64,
        content_height: f64,
    ) -> Option<u32> {
        let verse = unit.verse_at_offset(scroll_y, content_height, self.bias)?.number;
        self.observe_verse(verse);
        Some(verse)
    }

    pub async fn flush(&mut self) {
        self.debouncer.flush().await;
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}
