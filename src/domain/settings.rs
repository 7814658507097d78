use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::TilawaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    XLarge,
}

impl FontSize {
    pub fn scale(self) -> f32 {
        match self {
            FontSize::Small => 0.85,
            FontSize::Medium => 1.0,
            FontSize::Large => 1.2,
            FontSize::XLarge => 1.4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
            FontSize::XLarge => "xlarge",
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontSize {
    type Err = TilawaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(FontSize::Small),
            "medium" => Ok(FontSize::Medium),
            "large" => Ok(FontSize::Large),
            "xlarge" | "x-large" => Ok(FontSize::XLarge),
            other => Err(TilawaError::Other(format!("Unknown font size: {}", other))),
        }
    }
}

/// User preferences. Missing fields in stored JSON fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub font_size: FontSize,
    pub auto_advance: bool,
    pub keep_screen_on: bool,
    pub haptic_feedback: bool,
    /// 0.0 - 1.0
    pub brightness: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            auto_advance: true,
            keep_screen_on: false,
            haptic_feedback: true,
            brightness: 0.8,
        }
    }
}

impl Settings {
    /// Overlay a stored record on the defaults one field at a time. A field
    /// that fails to decode keeps its default without affecting the others.
    pub fn merged(stored: &Map<String, Value>) -> Self {
        let mut settings = Settings::default();
        merge_field(stored, "fontSize", &mut settings.font_size);
        merge_field(stored, "autoAdvance", &mut settings.auto_advance);
        merge_field(stored, "keepScreenOn", &mut settings.keep_screen_on);
        merge_field(stored, "hapticFeedback", &mut settings.haptic_feedback);
        merge_field(stored, "brightness", &mut settings.brightness);
        settings
    }
}

fn merge_field<T: DeserializeOwned>(stored: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = stored.get(key) else {
        return;
    };
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => *slot = decoded,
        Err(e) => tracing::warn!("Ignoring stored setting {}: {}", key, e),
    }
}

/// A single-field change to [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingUpdate {
    FontSize(FontSize),
    AutoAdvance(bool),
    KeepScreenOn(bool),
    HapticFeedback(bool),
    Brightness(f32),
}

impl SettingUpdate {
    /// Parse a `key value` pair. Keys are accepted in their stored
    /// camelCase form or in snake_case.
    pub fn parse(key: &str, value: &str) -> Result<Self, TilawaError> {
        let key = key.trim().replace('_', "").to_lowercase();
        let update = match key.as_str() {
            "fontsize" => SettingUpdate::FontSize(value.parse()?),
            "autoadvance" => SettingUpdate::AutoAdvance(parse_bool(value)?),
            "keepscreenon" => SettingUpdate::KeepScreenOn(parse_bool(value)?),
            "hapticfeedback" => SettingUpdate::HapticFeedback(parse_bool(value)?),
            "brightness" => SettingUpdate::Brightness(value.trim().parse().map_err(|_| {
                TilawaError::Other(format!("Invalid brightness: {}", value))
            })?),
            _ => return Err(TilawaError::Other(format!("Unknown setting: {}", key))),
        };
        Ok(update)
    }

    pub fn apply(self, settings: &mut Settings) {
        match self {
            SettingUpdate::FontSize(size) => settings.font_size = size,
            SettingUpdate::AutoAdvance(on) => settings.auto_advance = on,
            SettingUpdate::KeepScreenOn(on) => settings.keep_screen_on = on,
            SettingUpdate::HapticFeedback(on) => settings.haptic_feedback = on,
            SettingUpdate::Brightness(level) => settings.brightness = clamp_brightness(level),
        }
    }
}

pub fn clamp_brightness(level: f32) -> f32 {
    if level.is_nan() {
        return Settings::default().brightness;
    }
    level.clamp(0.0, 1.0)
}

fn parse_bool(value: &str) -> Result<bool, TilawaError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(TilawaError::Other(format!("Expected on/off, got {}", other))),
    }
}
