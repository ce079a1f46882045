use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdoLensError {
    #[error("Azure DevOps API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Azure DevOps rejected the credentials (status {status}); check the personal access token")]
    Unauthorized { status: u16 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdoLensError>;
