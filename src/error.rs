//! Error types for Herald

use thiserror::Error;

/// Result type alias for Herald operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Herald
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Media playback error
    #[error("media error: {0}")]
    Media(String),

    /// Encyclopedia lookup error
    #[error("encyclopedia error: {0}")]
    Encyclopedia(String),

    /// Headline provider error
    #[error("news error: {0}")]
    News(String),

    /// Joke provider error
    #[error("joke error: {0}")]
    Joke(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Why a `listen` call produced no utterance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenError {
    /// Audio was captured but could not be turned into text
    #[error("speech not understood")]
    NotUnderstood,

    /// The speech-to-text service could not be reached
    #[error("speech recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other capture failure (no device, no speech before the timeout, ...)
    #[error("capture failed: {0}")]
    Other(String),
}

impl ListenError {
    /// Apology spoken when a run ends because of this error
    #[must_use]
    pub const fn apology(&self) -> &'static str {
        match self {
            Self::NotUnderstood => "Sorry, I could not understand. Please try again.",
            Self::ServiceUnavailable(_) => "Speech recognition service is unavailable.",
            Self::Other(_) => "Sorry, something went wrong.",
        }
    }
}

impl From<reqwest::Error> for ListenError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            Self::ServiceUnavailable(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}
