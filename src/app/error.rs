use thiserror::Error;

#[derive(Error, Debug)]
pub enum TilawaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid surah number: {0} (expected 1-114)")]
    InvalidSurah(u16),

    #[error("Invalid juz number: {0} (expected 1-30)")]
    InvalidJuz(u16),

    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TilawaError>;
