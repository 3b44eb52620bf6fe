use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Reddit API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Request timeout")]
    RequestTimeout,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read document '{name}': {source}")]
    ReadFailed {
        name: String,
        source: std::io::Error,
    },

    #[error("Failed to write document '{name}': {source}")]
    WriteFailed {
        name: String,
        source: std::io::Error,
    },

    #[error("Failed to encode document '{name}': {source}")]
    EncodeFailed {
        name: String,
        source: serde_json::Error,
    },

    #[error("Data directory unavailable: {path}")]
    DirUnavailable { path: String },
}

impl ScoutError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Bad arguments and unknown resources become the structured
    /// `{"error": ...}` document on stdout; everything else escapes to
    /// stderr with a non-zero exit.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ScoutError::InvalidInput { .. } | ScoutError::NotFound { .. }
        )
    }
}
