//! Upstream endpoint configuration.

use serde::Deserialize;

/// Base URLs for the public data sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// alquran.cloud-compatible API root, without trailing slash
    pub quran_base_url: String,

    /// Edition used for juz requests
    pub juz_edition: String,

    /// Azkar dataset (JSON)
    pub azkar_url: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            quran_base_url: "https://api.alquran.cloud/v1".to_string(),
            juz_edition: "quran-uthmani".to_string(),
            azkar_url: "https://raw.githubusercontent.com/nawafalqari/azkar-api/main/azkar.json"
                .to_string(),
            timeout_secs: 10,
        }
    }
}
