//! User preferences, theme and first-run flag.

pub mod brightness;

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{SettingUpdate, Settings};
use crate::store::{keys, read_json, write_json, write_raw, KeyValueStore};

pub use brightness::{apply_brightness, BrightnessControl, BrightnessOutcome, SysfsBrightness};

pub const DEFAULT_THEME: &str = "light";

pub struct SettingsStore<S: KeyValueStore, B: BrightnessControl + ?Sized> {
    store: Arc<S>,
    brightness: Arc<B>,
}

impl<S: KeyValueStore, B: BrightnessControl + ?Sized> SettingsStore<S, B> {
    pub fn new(store: Arc<S>, brightness: Arc<B>) -> Self {
        Self { store, brightness }
    }

    /// Stored settings merged over defaults field by field. Unreadable
    /// state yields defaults.
    pub async fn load_settings(&self) -> Settings {
        let mut settings = match read_json::<_, Value>(&*self.store, keys::APP_SETTINGS).await {
            Some(Value::Object(stored)) => Settings::merged(&stored),
            Some(_) => {
                tracing::warn!("Stored settings are not an object; using defaults");
                Settings::default()
            }
            None => Settings::default(),
        };
        settings.brightness = crate::domain::settings::clamp_brightness(settings.brightness);
        settings
    }

    /// Change one field and persist the whole record. A brightness change
    /// is applied to the display before this returns, and its outcome is
    /// reported alongside the new settings.
    pub async fn update_setting(
        &self,
        update: SettingUpdate,
    ) -> (Settings, Option<BrightnessOutcome>) {
        let mut settings = self.load_settings().await;
        update.apply(&mut settings);
        write_json(&*self.store, keys::APP_SETTINGS, &settings).await;

        let outcome = match update {
            SettingUpdate::Brightness(_) => {
                Some(apply_brightness(&*self.brightness, settings.brightness).await)
            }
            _ => None,
        };

        (settings, outcome)
    }

    pub async fn reset_settings(&self) -> Settings {
        let settings = Settings::default();
        write_json(&*self.store, keys::APP_SETTINGS, &settings).await;
        apply_brightness(&*self.brightness, settings.brightness).await;
        settings
    }

    /// Push the stored brightness to the display, as on startup.
    pub async fn apply_saved_brightness(&self) -> BrightnessOutcome {
        let settings = self.load_settings().await;
        apply_brightness(&*self.brightness, settings.brightness).await
    }

    pub async fn theme(&self) -> String {
        match self.store.get(keys::APP_THEME).await {
            Ok(Some(theme)) if !theme.trim().is_empty() => theme,
            Ok(_) => DEFAULT_THEME.to_string(),
            Err(e) => {
                tracing::warn!("Failed to read theme: {}", e);
                DEFAULT_THEME.to_string()
            }
        }
    }

    pub async fn set_theme(&self, name: &str) -> bool {
        write_raw(&*self.store, keys::APP_THEME, name.trim()).await
    }

    pub async fn has_onboarded(&self) -> bool {
        matches!(
            self.store.get(keys::HAS_ONBOARDED).await,
            Ok(Some(ref v)) if v == "true"
        )
    }

    pub async fn mark_onboarded(&self) -> bool {
        write_raw(&*self.store, keys::HAS_ONBOARDED, "true").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FontSize;
    use crate::store::SqliteStore;
    use crate::test_support::{FailingStore, RecordingBrightness};

    fn settings_store() -> (
        Arc<SqliteStore>,
        Arc<RecordingBrightness>,
        SettingsStore<SqliteStore, RecordingBrightness>,
    ) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let brightness = Arc::new(RecordingBrightness {
            system_ok: true,
            ..Default::default()
        });
        let settings = SettingsStore::new(store.clone(), brightness.clone());
        (store, brightness, settings)
    }

    #[tokio::test]
    async fn test_load_without_saved_data_is_defaults() {
        let (_, _, settings) = settings_store();
        let loaded = settings.load_settings().await;
        assert_eq!(
            loaded,
            Settings {
                font_size: FontSize::Medium,
                auto_advance: true,
                keep_screen_on: false,
                haptic_feedback: true,
                brightness: 0.8,
            }
        );
    }

    #[tokio::test]
    async fn test_load_partial_merges_defaults() {
        let (store, _, settings) = settings_store();
        store
            .set(keys::APP_SETTINGS, r#"{"fontSize":"large"}"#)
            .await
            .unwrap();

        let loaded = settings.load_settings().await;
        assert_eq!(loaded.font_size, FontSize::Large);
        assert_eq!(
            loaded,
            Settings {
                font_size: FontSize::Large,
                ..Settings::default()
            }
        );
    }

    #[tokio::test]
    async fn test_load_keeps_valid_fields_beside_a_bad_one() {
        let (store, _, settings) = settings_store();
        store
            .set(
                keys::APP_SETTINGS,
                r#"{"fontSize":"huge","keepScreenOn":true,"brightness":0.3}"#,
            )
            .await
            .unwrap();

        let loaded = settings.load_settings().await;
        assert_eq!(loaded.font_size, FontSize::Medium);
        assert!(loaded.keep_screen_on);
        assert!((loaded.brightness - 0.3).abs() < 1e-6);
        assert!(loaded.auto_advance);
    }

    #[tokio::test]
    async fn test_corrupt_settings_fall_back() {
        let (store, _, settings) = settings_store();
        store.set(keys::APP_SETTINGS, "{not json").await.unwrap();
        assert_eq!(settings.load_settings().await, Settings::default());
    }

    #[tokio::test]
    async fn test_update_persists_full_record() {
        let (store, brightness, settings) = settings_store();

        let (_, outcome) = settings
            .update_setting(SettingUpdate::HapticFeedback(false))
            .await;
        assert_eq!(outcome, None);

        let raw = store.get(keys::APP_SETTINGS).await.unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored["hapticFeedback"], false);
        assert_eq!(stored["fontSize"], "medium");
        assert!(brightness.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_brightness_update_applies_immediately() {
        let (_, brightness, settings) = settings_store();

        let (updated, outcome) = settings
            .update_setting(SettingUpdate::Brightness(0.3))
            .await;

        assert_eq!(updated.brightness, 0.3);
        assert_eq!(outcome, Some(BrightnessOutcome::System));
        assert_eq!(*brightness.calls.lock().unwrap(), vec![("system", 0.3)]);
        assert_eq!(settings.load_settings().await.brightness, 0.3);
    }

    #[tokio::test]
    async fn test_brightness_failure_does_not_block_update() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let brightness = Arc::new(RecordingBrightness::default());
        let settings = SettingsStore::new(store, brightness.clone());

        let (updated, outcome) = settings
            .update_setting(SettingUpdate::Brightness(0.1))
            .await;

        assert_eq!(updated.brightness, 0.1);
        assert_eq!(outcome, Some(BrightnessOutcome::Unavailable));
        assert_eq!(brightness.calls.lock().unwrap().len(), 2);
        assert_eq!(settings.load_settings().await.brightness, 0.1);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults_and_brightness() {
        let (_, brightness, settings) = settings_store();
        settings
            .update_setting(SettingUpdate::FontSize(FontSize::Small))
            .await;

        let reset = settings.reset_settings().await;
        assert_eq!(reset, Settings::default());
        assert_eq!(settings.load_settings().await, Settings::default());
        assert_eq!(*brightness.calls.lock().unwrap(), vec![("system", 0.8)]);
    }

    #[tokio::test]
    async fn test_theme_and_onboarding() {
        let (store, _, settings) = settings_store();
        assert_eq!(settings.theme().await, DEFAULT_THEME);
        assert!(!settings.has_onboarded().await);

        settings.set_theme("dark").await;
        settings.mark_onboarded().await;

        assert_eq!(settings.theme().await, "dark");
        assert!(settings.has_onboarded().await);
        assert_eq!(
            store.get(keys::HAS_ONBOARDED).await.unwrap(),
            Some("true".into())
        );
    }

    #[tokio::test]
    async fn test_failing_store_uses_defaults() {
        let settings = SettingsStore::new(
            Arc::new(FailingStore),
            Arc::new(RecordingBrightness::default()),
        );
        assert_eq!(settings.load_settings().await, Settings::default());
        let (updated, _) = settings
            .update_setting(SettingUpdate::AutoAdvance(false))
            .await;
        assert!(!updated.auto_advance);
        assert_eq!(settings.theme().await, DEFAULT_THEME);
        assert!(!settings.has_onboarded().await);
    }
}
