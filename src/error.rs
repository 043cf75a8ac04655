use thiserror::Error;

/// Result type for fragment operations
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Errors that can occur during fragment operations
#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("Invalid fragment: {message}")]
    Validation { message: String },

    #[error("Fragment not found: {id}")]
    NotFound { id: String },

    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    #[error("Storage backend error: {source}")]
    Storage {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Unable to read fragment data: {owner_id}/{id}")]
    DataUnavailable { owner_id: String, id: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl FragmentError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an unsupported conversion error
    pub fn unsupported_conversion<F: Into<String>, T: Into<String>>(from: F, to: T) -> Self {
        Self::UnsupportedConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a conversion failure from any error type
    pub fn conversion<E: std::fmt::Display>(error: E) -> Self {
        Self::Conversion {
            message: error.to_string(),
        }
    }

    /// Create a storage error from any backend error type
    pub fn storage<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(error),
        }
    }

    /// Create a data unavailable error for a blob that cannot be read
    pub fn data_unavailable<O: Into<String>, I: Into<String>>(owner_id: O, id: I) -> Self {
        Self::DataUnavailable {
            owner_id: owner_id.into(),
            id: id.into(),
        }
    }
}
