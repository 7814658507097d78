pub mod azkar;
pub mod progress;
pub mod quran;
pub mod settings;

pub use azkar::{AzkarCategory, AzkarItem, AzkarSession};
pub use progress::{CompletionSet, LastRead, ReadingMode};
pub use quran::{Ayah, ContentUnit, ModeKey, SurahRef, SurahSummary, UnitKind};
pub use settings::{FontSize, SettingUpdate, Settings};
