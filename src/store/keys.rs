//! Every key this crate writes into the shared [`KeyValueStore`](super::KeyValueStore)
//! namespace. Components touch only their own keys.

pub const HAS_ONBOARDED: &str = "has_onboarded";
pub const APP_THEME: &str = "app_theme";
pub const APP_SETTINGS: &str = "app_settings";
pub const LAST_READ: &str = "last_read";
pub const KHATMAH_PROGRESS: &str = "khatmah_progress";

pub const OFFLINE_SURAH_LIST: &str = "offline_quran_surahs";
pub const OFFLINE_AZKAR: &str = "offline_azkar_data";

pub const OFFLINE_SURAH_PREFIX: &str = "offline_surah_";
pub const OFFLINE_JUZ_PREFIX: &str = "offline_juz_";
pub const SCROLL_PREFIX: &str = "surah_scroll_";

/// Keys removed by a full wipe of user data.
///
/// The offline content cache is not listed: downloaded reference content
/// survives a wipe.
pub const USER_DATA_KEYS: [&str; 5] = [
    KHATMAH_PROGRESS,
    LAST_READ,
    APP_THEME,
    APP_SETTINGS,
    HAS_ONBOARDED,
];

pub fn offline_surah(number: u16) -> String {
    format!("{}{}", OFFLINE_SURAH_PREFIX, number)
}

pub fn offline_juz(number: u16) -> String {
    format!("{}{}", OFFLINE_JUZ_PREFIX, number)
}

/// `mode_key` is `surah_<n>` or `juz_<n>`.
pub fn scroll_offset(mode_key: &str) -> String {
    format!("{}{}", SCROLL_PREFIX, mode_key)
}
