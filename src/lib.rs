//! # Tilawa
//!
//! An offline-first Quran reader with Khatmah tracking and Azkar.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Cache → Store
//!              ↓
//!   Progress / Resume / Settings → CLI
//! ```
//!
//! Every remote dataset is read through the local key-value store: once a
//! surah, juz or reference list has been fetched it is served offline.
//!
//! ## Quick Start
//!
//! ```bash
//! # Download everything for offline use
//! tilawa download
//!
//! # Read Al-Baqarah from ayah 255
//! tilawa read surah 2 --from 255
//!
//! # Mark a surah complete
//! tilawa khatmah toggle 1
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// content cache, progress tracker and settings.
pub mod app;

/// Offline content cache.
///
/// - [`ContentCache`](cache::ContentCache): read-through cache for the
///   surah list, Azkar and per-unit ayahs
pub mod cache;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/tilawa/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`SurahSummary`](domain::SurahSummary), [`Ayah`](domain::Ayah),
///   [`ContentUnit`](domain::ContentUnit)
/// - [`LastRead`](domain::LastRead), [`CompletionSet`](domain::CompletionSet)
/// - [`Settings`](domain::Settings)
pub mod domain;

/// Remote content retrieval.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for JSON retrieval
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`BulkDownloader`](fetcher::BulkDownloader): bounded parallel offline download
pub mod fetcher;

/// Arabic text normalization and search.
pub mod normalizer;

/// Last-read position and Khatmah progress.
pub mod progress;

/// Scroll offset persistence and resume-reading flow.
pub mod resume;

/// Reading preferences, theme and brightness.
pub mod settings;

/// Key-value persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): async storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

#[cfg(test)]
mod test_support;
