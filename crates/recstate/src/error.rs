use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("field not found: {key}")]
    KeyNotFound { key: String },

    #[error("diff labels and values differ in length: {labels} labels, {values} values")]
    LabelMismatch { labels: usize, values: usize },

    #[error("invalid query string: {message}")]
    InvalidQuery { message: String },

    #[error("service call failed: {message}")]
    Service { message: String },
}

impl StoreError {
    #[must_use]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// The missing field, for [`StoreError::KeyNotFound`].
    #[must_use]
    pub fn missing_key(&self) -> Option<&str> {
        match self {
            Self::KeyNotFound { key } => Some(key),
            _ => None,
        }
    }
}
