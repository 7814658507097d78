//! Reading-view timing and geometry.

use std::time::Duration;

use serde::Deserialize;

use crate::resume::ResumeTimings;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Coalescing window for scroll and verse saves in milliseconds (default: 800)
    pub debounce_ms: u64,

    /// Saved offsets at or below this many pixels are not offered for resume
    pub resume_threshold_px: f64,

    /// Delay before restoring a saved offset, lets layout settle (default: 800)
    pub restore_delay_ms: u64,

    /// How long a restored verse stays highlighted (default: 10)
    pub highlight_secs: u64,

    /// Added to the scroll offset before estimating the visible verse
    pub verse_bias_px: f64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            resume_threshold_px: 10.0,
            restore_delay_ms: 800,
            highlight_secs: 10,
            verse_bias_px: 150.0,
        }
    }
}

impl ReaderConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resume_timings(&self) -> ResumeTimings {
        ResumeTimings {
            threshold_px: self.resume_threshold_px,
            restore_delay: Duration::from_millis(self.restore_delay_ms),
            highlight_duration: Duration::from_secs(self.highlight_secs),
        }
    }
}
