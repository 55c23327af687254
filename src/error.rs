use thiserror::Error;

pub type Result<T> = std::result::Result<T, KwsError>;

#[derive(Error, Debug)]
pub enum KwsError {
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Speech-to-text error: {0}")]
    Stt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<hound::Error> for KwsError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => KwsError::Io(io),
            other => KwsError::Audio(other.to_string()),
        }
    }
}
