use thiserror::Error;

/// Top-level error type for the EcoAware backend.
#[derive(Debug, Error)]
pub enum EcoError {
    #[error("invalid reference tables: {0}")]
    InvalidTables(String),

    #[error("invalid mode '{0}' (expected 'mock' or 'real')")]
    InvalidMode(String),

    #[error("upstream model error ({model}): {message}")]
    Upstream { model: String, message: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = EcoError> = std::result::Result<T, E>;
