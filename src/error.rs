use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    /// The request observed its cancellation token and gave up.
    #[error("request canceled")]
    Canceled,

    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

impl StorefrontError {
    /// True when the error is the cooperative cancellation signal.
    pub fn is_canceled(&self) -> bool {
        matches!(self, StorefrontError::Canceled)
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            StorefrontError::Http { status, .. } => Some(*status),
            StorefrontError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
