use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubburnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media tool error: {0}")]
    Tool(String),

    #[error("Transcription credentials rejected: {0}")]
    Auth(String),

    #[error("Transcription input rejected: {0}")]
    InvalidInput(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Styling error: {0}")]
    Styling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, SubburnError>;
