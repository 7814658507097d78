use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::{Result, TilawaError};
use crate::store::keys;

pub const TOTAL_SURAHS: u16 = 114;
pub const TOTAL_JUZ: u16 = 30;

/// Lightweight descriptor from the surah list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub number: u16,
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: Option<String>,
    #[serde(default)]
    pub number_of_ayahs: Option<u32>,
    #[serde(default)]
    pub revelation_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahRef {
    pub number: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    /// Global ayah id, 1-6236.
    pub number: u32,
    pub number_in_surah: u32,
    pub text: String,
    #[serde(default)]
    pub surah: Option<SurahRef>,
    #[serde(default)]
    pub juz: Option<u16>,
}

/// The ayahs of a single surah or juz, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentUnit {
    pub ayahs: Vec<Ayah>,
}

impl ContentUnit {
    pub fn new(ayahs: Vec<Ayah>) -> Self {
        Self { ayahs }
    }

    pub fn len(&self) -> usize {
        self.ayahs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ayahs.is_empty()
    }

    /// Index of the ayah whose global number is `verse`.
    pub fn position_of(&self, verse: u32) -> Option<usize> {
        self.ayahs.iter().position(|a| a.number == verse)
    }

    /// Approximate the ayah at the top of the viewport for a scroll offset.
    /// See [`crate::progress::estimate_verse_index`].
    pub fn verse_at_offset(&self, scroll_y: f64, content_height: f64, bias: f64) -> Option<&Ayah> {
        crate::progress::estimate_verse_index(scroll_y, content_height, self.len(), bias)
            .and_then(|idx| self.ayahs.get(idx))
    }
}

/// The two kinds of per-unit content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Surah,
    Juz,
}

impl UnitKind {
    pub fn max(self) -> u16 {
        match self {
            UnitKind::Surah => TOTAL_SURAHS,
            UnitKind::Juz => TOTAL_JUZ,
        }
    }

    pub fn validate(self, number: u16) -> Result<()> {
        if (1..=self.max()).contains(&number) {
            return Ok(());
        }
        match self {
            UnitKind::Surah => Err(TilawaError::InvalidSurah(number)),
            UnitKind::Juz => Err(TilawaError::InvalidJuz(number)),
        }
    }

    pub fn cache_prefix(self) -> &'static str {
        match self {
            UnitKind::Surah => keys::OFFLINE_SURAH_PREFIX,
            UnitKind::Juz => keys::OFFLINE_JUZ_PREFIX,
        }
    }

    pub fn cache_key(self, number: u16) -> String {
        match self {
            UnitKind::Surah => keys::offline_surah(number),
            UnitKind::Juz => keys::offline_juz(number),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Surah => "surah",
            UnitKind::Juz => "juz",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a reading view for per-unit state such as scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeKey {
    pub kind: UnitKind,
    pub number: u16,
}

impl ModeKey {
    pub fn surah(number: u16) -> Self {
        Self {
            kind: UnitKind::Surah,
            number,
        }
    }

    pub fn juz(number: u16) -> Self {
        Self {
            kind: UnitKind::Juz,
            number,
        }
    }

    pub fn scroll_key(&self) -> String {
        keys::scroll_offset(&self.to_string())
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ayah(number: u32) -> Ayah {
        Ayah {
            number,
            number_in_surah: number,
            text: format!("ayah {}", number),
            surah: Some(SurahRef { number: 1 }),
            juz: None,
        }
    }

    #[test]
    fn test_validate_ranges() {
        assert!(UnitKind::Surah.validate(1).is_ok());
        assert!(UnitKind::Surah.validate(114).is_ok());
        assert!(matches!(
            UnitKind::Surah.validate(115),
            Err(TilawaError::InvalidSurah(115))
        ));
        assert!(UnitKind::Juz.validate(30).is_ok());
        assert!(matches!(
            UnitKind::Juz.validate(0),
            Err(TilawaError::InvalidJuz(0))
        ));
    }

    #[test]
    fn test_mode_key_rendering() {
        assert_eq!(ModeKey::surah(2).to_string(), "surah_2");
        assert_eq!(ModeKey::juz(30).scroll_key(), "surah_scroll_juz_30");
    }

    #[test]
    fn test_surah_summary_from_api_shape() {
        let json = r#"{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha",
            "englishNameTranslation":"The Opening","numberOfAyahs":7,"revelationType":"Meccan"}"#;
        let summary: SurahSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.number, 1);
        assert_eq!(summary.english_name, "Al-Faatiha");
        assert_eq!(summary.number_of_ayahs, Some(7));
    }

    #[test]
    fn test_content_unit_is_a_plain_array() {
        let unit = ContentUnit::new(vec![ayah(1), ayah(2)]);
        let json = serde_json::to_value(&unit).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["numberInSurah"], 2);
        assert_eq!(json[0]["surah"]["number"], 1);
    }

    #[test]
    fn test_position_of() {
        let unit = ContentUnit::new(vec![ayah(8), ayah(9), ayah(10)]);
        assert_eq!(unit.position_of(9), Some(1));
        assert_eq!(unit.position_of(1), None);
    }

    #[test]
    fn test_verse_at_offset() {
        let unit = ContentUnit::new((1..=10).map(ayah).collect());
        // (350 + 150) / 1000 = 0.5 -> index 5
        assert_eq!(unit.verse_at_offset(350.0, 1000.0, 150.0).unwrap().number, 6);
        assert!(ContentUnit::default()
            .verse_at_offset(0.0, 1000.0, 150.0)
            .is_none());
    }
}
