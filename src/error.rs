use std::path::PathBuf;
use thiserror::Error;

/// Why a report fetch failed. Returned to the screen as a value so the
/// presenter can show it instead of spinning forever.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not reach the report service: {0}")]
    Transport(String),

    #[error("report service answered with HTTP {0}")]
    Status(u16),

    #[error("report payload could not be read: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config directory not found at {0}. Run 'cuotas init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("No API URL configured. Pass --api-url, set CUOTAS_API_URL, or set [api] url in config.toml.")]
    MissingApiUrl,

    #[error("No auth token available. Pass --token, set CUOTAS_TOKEN, or set [api] token in config.toml.")]
    MissingToken,

    #[error("Unsupported locale '{0}'. Use 'es-MX' or 'en-US'.")]
    InvalidLocale(String),

    #[error("Failed to fetch maintenance report: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
