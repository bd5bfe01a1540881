//! Error type shared by the renderers, the deck assembler and the server

use thiserror::Error;

/// Error type for deck operations
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid survey data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    /// A second chart was mounted before the first one was destroyed
    #[error("canvas '{0}' already holds a live chart")]
    CanvasBusy(String),

    #[error("canvas '{0}' not found")]
    UnknownCanvas(String),

    #[error("no data for '{0}'")]
    MissingData(String),
}

pub type Result<T> = std::result::Result<T, DeckError>;
