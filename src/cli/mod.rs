pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::UnitKind;

#[derive(Parser)]
#[command(name = "tilawa")]
#[command(about = "Offline-first Quran reading, Khatmah tracking and Azkar", long_about = None)]
pub struct Cli {
    /// Database path (default: <data dir>/tilawa/tilawa.db)
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    /// Number of parallel downloads (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Surah,
    Juz,
}

impl From<UnitArg> for UnitKind {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Surah => UnitKind::Surah,
            UnitArg::Juz => UnitKind::Juz,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List surahs
    Surahs {
        /// Re-download the list even if it is cached
        #[arg(long)]
        refresh: bool,
    },
    /// Search surahs (or Azkar) by name, ignoring diacritics
    Search {
        query: String,
        /// Search Azkar categories instead of surahs
        #[arg(long)]
        azkar: bool,
    },
    /// Read a surah or juz
    Read {
        #[arg(value_enum)]
        unit: UnitArg,
        number: u16,
        /// Start from this ayah (number within the surah, or global for a juz)
        #[arg(long)]
        from: Option<u32>,
        /// Resume the saved position without asking
        #[arg(long)]
        resume: bool,
        /// Record a scroll position (px) for this unit
        #[arg(long, requires = "height")]
        scroll: Option<f64>,
        /// Total content height (px) used with --scroll
        #[arg(long)]
        height: Option<f64>,
        /// Print at most this many ayahs
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the last read position
    LastRead,
    /// Khatmah (full reading) checklist
    Khatmah {
        #[command(subcommand)]
        action: KhatmahAction,
    },
    /// List Azkar categories, or count through one
    Azkar {
        /// Category to open
        category: Option<String>,
        /// Count repetitions interactively
        #[arg(long)]
        count: bool,
    },
    /// Reading preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Show or set the theme
    Theme { name: Option<String> },
    /// Download everything for offline reading
    Download {
        /// Download juz instead of surahs
        #[arg(long)]
        juz: bool,
    },
    /// Show what is available offline
    Cached,
    /// Erase progress and preferences (downloaded content is kept)
    Wipe {
        /// Confirm
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum KhatmahAction {
    /// Show completion
    Status,
    /// Mark a surah complete or incomplete
    Toggle { surah: u16 },
    /// Clear the checklist
    Reset,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings
    Show,
    /// Change one setting (fontSize, autoAdvance, keepScreenOn, hapticFeedback, brightness)
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
}
