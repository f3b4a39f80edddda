//! Error types for the registrar ecosystem.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the registrar ecosystem.
#[derive(Error, Debug)]
pub enum Error {
    /// No course with the requested code exists in the catalog.
    #[error("No course found with code '{code}'.")]
    CourseNotFound {
        /// The requested course code.
        code: String,
    },

    /// Required fields were missing on a submitted course.
    #[error("The following required fields are missing: {}", .fields.join(", "))]
    MissingFields {
        /// Names of the missing fields.
        fields: Vec<&'static str>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Creates a not-found error for the given course code.
    #[must_use]
    pub fn course_not_found(code: impl Into<String>) -> Self {
        Self::CourseNotFound { code: code.into() }
    }

    /// Creates an internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error should surface as a user-visible flash
    /// rather than a server failure.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::CourseNotFound { .. } | Self::MissingFields { .. }
        )
    }
}
