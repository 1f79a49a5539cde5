//! Error types and result aliases shared across Strata crates.
//!
//! Domain crates define their own error enums and wrap this one for
//! failures that are not specific to their domain (configuration parsing,
//! serialization of metadata files).

/// The result type used by shared Strata helpers.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shared Strata operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a new serialization error with a source cause.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_input_message() {
        let err = Error::invalid_input("STRATA_WRITE_PARALLELISM must be a positive integer");
        assert_eq!(
            err.to_string(),
            "invalid input: STRATA_WRITE_PARALLELISM must be a positive integer"
        );
    }

    #[test]
    fn test_serialization_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
        let err = Error::serialization_with_source("failed to parse partition spec", io);
        assert_eq!(
            err.to_string(),
            "serialization error: failed to parse partition spec"
        );
        assert!(err.source().is_some());
    }
}
