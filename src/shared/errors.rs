//! Error handling for the application

use thiserror::Error;

/// Grant-source errors
#[derive(Error, Debug, Clone)]
pub enum GrantError {
    #[error("Authorization backend error: {0}")]
    Backend(String),

    #[error("Grant fetch failed: {0}")]
    Http(String),

    #[error("Invalid grant data: {0}")]
    InvalidGrant(String),
}

/// Market-data source errors
#[derive(Error, Debug, Clone)]
pub enum MetricsError {
    #[error("Metrics backend error: {0}")]
    Backend(String),

    #[error("Metrics fetch failed: {0}")]
    Http(String),
}

/// General engine error
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Grant error: {0}")]
    GrantError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<GrantError> for EngineError {
    fn from(err: GrantError) -> Self {
        EngineError::GrantError(err.to_string())
    }
}

impl From<MetricsError> for EngineError {
    fn from(err: MetricsError) -> Self {
        EngineError::MetricsError(err.to_string())
    }
}
