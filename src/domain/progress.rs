use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::quran::{ModeKey, UnitKind, TOTAL_SURAHS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    Surah,
    Juz,
}

impl From<ReadingMode> for UnitKind {
    fn from(mode: ReadingMode) -> Self {
        match mode {
            ReadingMode::Surah => UnitKind::Surah,
            ReadingMode::Juz => UnitKind::Juz,
        }
    }
}

/// The single "where was I" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRead {
    pub number: Option<u16>,
    pub juz: Option<u16>,
    pub name: String,
    /// Epoch milliseconds of the last write.
    pub time: i64,
    pub mode: ReadingMode,
    /// Global ayah number.
    #[serde(default)]
    pub verse: Option<u32>,
}

impl LastRead {
    pub fn surah(number: u16, name: impl Into<String>, verse: Option<u32>) -> Self {
        Self {
            number: Some(number),
            juz: None,
            name: name.into(),
            time: now_millis(),
            mode: ReadingMode::Surah,
            verse,
        }
    }

    pub fn juz(juz: u16, name: impl Into<String>, verse: Option<u32>) -> Self {
        Self {
            number: None,
            juz: Some(juz),
            name: name.into(),
            time: now_millis(),
            mode: ReadingMode::Juz,
            verse,
        }
    }

    pub fn mode_key(&self) -> Option<ModeKey> {
        let number = match self.mode {
            ReadingMode::Surah => self.number,
            ReadingMode::Juz => self.juz,
        }?;
        Some(ModeKey {
            kind: self.mode.into(),
            number,
        })
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Khatmah checklist: the set of finished surahs.
///
/// Persisted as `{ "<n>": true, ... }`. Only completed surahs are kept, so
/// un-toggling removes the entry instead of storing `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u16, bool>", into = "BTreeMap<u16, bool>")]
pub struct CompletionSet {
    completed: BTreeSet<u16>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip surah `number`. The caller validates the range.
    pub fn toggle(&mut self, number: u16) -> bool {
        if self.completed.remove(&number) {
            false
        } else {
            self.completed.insert(number);
            true
        }
    }

    pub fn is_completed(&self, number: u16) -> bool {
        self.completed.contains(&number)
    }

    pub fn completed_count(&self) -> u16 {
        self.completed.len() as u16
    }

    pub fn remaining(&self) -> u16 {
        TOTAL_SURAHS - self.completed_count()
    }

    /// Whole percent of the Quran completed, rounded half away from zero.
    pub fn percent(&self) -> u8 {
        (100.0 * f64::from(self.completed_count()) / f64::from(TOTAL_SURAHS)).round() as u8
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.completed.iter().copied()
    }
}

impl From<BTreeMap<u16, bool>> for CompletionSet {
    fn from(map: BTreeMap<u16, bool>) -> Self {
        let completed = map
            .into_iter()
            .filter(|&(n, done)| done && (1..=TOTAL_SURAHS).contains(&n))
            .map(|(n, _)| n)
            .collect();
        Self { completed }
    }
}

impl From<CompletionSet> for BTreeMap<u16, bool> {
    fn from(set: CompletionSet) -> Self {
        set.completed.into_iter().map(|n| (n, true)).collect()
    }
}
