//! Endpoint shaping for the Quran and Azkar data sources.
//!
//! Responses are unwrapped from the alquran.cloud `{ code, status, data }`
//! envelope and reshaped into the JSON the content cache stores.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use url::Url;

use crate::app::{Result, TilawaError};
use crate::cache::ReferenceKind;
use crate::config::ApiConfig;
use crate::domain::UnitKind;
use crate::fetcher::Fetcher;

pub struct QuranApi {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: ApiConfig,
}

impl QuranApi {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: ApiConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn reference_url(&self, kind: ReferenceKind) -> Result<Url> {
        match kind {
            ReferenceKind::Surahs => self.quran_url("surah"),
            ReferenceKind::Azkar => Ok(Url::parse(&self.config.azkar_url)?),
        }
    }

    pub fn unit_url(&self, kind: UnitKind, number: u16) -> Result<Url> {
        kind.validate(number)?;
        match kind {
            UnitKind::Surah => self.quran_url(&format!("surah/{}", number)),
            UnitKind::Juz => {
                self.quran_url(&format!("juz/{}/{}", number, self.config.juz_edition))
            }
        }
    }

    fn quran_url(&self, path: &str) -> Result<Url> {
        let base = self.config.quran_base_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    /// Fetch a whole reference dataset in its cacheable shape.
    pub async fn fetch_reference(&self, kind: ReferenceKind) -> Result<Value> {
        let url = self.reference_url(kind)?;
        let body = self.fetcher.fetch_json(url.as_str()).await?;

        match kind {
            ReferenceKind::Surahs => {
                let data = unwrap_envelope(body)?;
                if !data.is_array() {
                    return Err(TilawaError::UnexpectedPayload(
                        "surah list is not an array".into(),
                    ));
                }
                Ok(data)
            }
            ReferenceKind::Azkar => normalize_azkar(body),
        }
    }

    /// Fetch the ayah array of one surah or juz.
    pub async fn fetch_unit(&self, kind: UnitKind, number: u16) -> Result<Value> {
        let url = self.unit_url(kind, number)?;
        let body = self.fetcher.fetch_json(url.as_str()).await?;
        let data = unwrap_envelope(body)?;

        let ayahs = match data {
            Value::Object(mut obj) => obj.remove("ayahs"),
            _ => None,
        };
        let Some(Value::Array(mut ayahs)) = ayahs else {
            return Err(TilawaError::UnexpectedPayload(format!(
                "{} {} has no ayahs",
                kind, number
            )));
        };

        // Single-surah responses omit the per-ayah surah reference.
        if kind == UnitKind::Surah {
            for ayah in ayahs.iter_mut().filter_map(Value::as_object_mut) {
                ayah.entry("surah")
                    .or_insert_with(|| json!({ "number": number }));
            }
        }

        Ok(Value::Array(ayahs))
    }
}

fn unwrap_envelope(body: Value) -> Result<Value> {
    let Value::Object(mut obj) = body else {
        return Err(TilawaError::UnexpectedPayload("response is not an object".into()));
    };

    if let Some(code) = obj.get("code").and_then(Value::as_u64) {
        if code != 200 {
            let status = obj
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(TilawaError::UnexpectedPayload(format!(
                "API returned {}: {}",
                code, status
            )));
        }
    }

    obj.remove("data")
        .ok_or_else(|| TilawaError::UnexpectedPayload("response has no data".into()))
}

/// Reshape an Azkar dataset into `[{ categoryName, items }]`.
///
/// Accepts either that shape already or an object keyed by category name.
/// Nested item arrays are flattened and non-object items dropped.
pub fn normalize_azkar(body: Value) -> Result<Value> {
    match body {
        Value::Array(categories) => Ok(Value::Array(categories)),
        Value::Object(map) => {
            let categories = map
                .into_iter()
                .map(|(name, items)| {
                    let mut category = Map::new();
                    category.insert("categoryName".into(), Value::String(name));
                    category.insert("items".into(), Value::Array(flatten_items(items)));
                    Value::Object(category)
                })
                .collect();
            Ok(Value::Array(categories))
        }
        _ => Err(TilawaError::UnexpectedPayload(
            "azkar dataset is neither an array nor an object".into(),
        )),
    }
}

fn flatten_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(flatten_items).collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}
