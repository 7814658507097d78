//! Doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::app::{Result, TilawaError};
use crate::fetcher::Fetcher;
use crate::settings::BrightnessControl;
use crate::store::KeyValueStore;

/// Serves canned JSON by URL; unknown URLs fail like a network error.
#[derive(Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, Value>>,
    calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), body);
        self
    }

    /// Shared counter of `fetch_json` calls, readable after the fetcher
    /// has been moved into an `Arc<dyn Fetcher>`.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| TilawaError::Other(format!("no route to {}", url)))
    }
}

/// A store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(TilawaError::Other("store unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(TilawaError::Other("quota exceeded".into()))
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Err(TilawaError::Other("store unavailable".into()))
    }

    async fn multi_remove(&self, _keys: &[&str]) -> Result<()> {
        Err(TilawaError::Other("store unavailable".into()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(TilawaError::Other("store unavailable".into()))
    }
}

/// Brightness hooks that record each call and succeed on demand.
#[derive(Default)]
pub struct RecordingBrightness {
    pub system_ok: bool,
    pub window_ok: bool,
    pub calls: Mutex<Vec<(&'static str, f32)>>,
}

#[async_trait]
impl BrightnessControl for RecordingBrightness {
    async fn set_system_brightness(&self, level: f32) -> Result<()> {
        self.calls.lock().unwrap().push(("system", level));
        if self.system_ok {
            Ok(())
        } else {
            Err(TilawaError::Unsupported("no permission".into()))
        }
    }

    async fn set_window_brightness(&self, level: f32) -> Result<()> {
        self.calls.lock().unwrap().push(("window", level));
        if self.window_ok {
            Ok(())
        } else {
            Err(TilawaError::Unsupported("no window".into()))
        }
    }
}
