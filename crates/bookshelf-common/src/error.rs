//! Unified error type for bookshelf.
//!
//! The data layer and the HTTP handlers both funnel their failures into
//! [`Error`], which carries enough context for the server to derive a status
//! code via [`Error::http_status`] and a stable machine-readable [`Error::code`].

use std::fmt;

/// Every failure mode a bookshelf operation can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An id-based lookup missed, or a page lies past the end of the table.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "author", "book", "page").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A required form or JSON key was absent.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A value was present but malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The storage layer rejected a write (foreign key, NOT NULL).
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Any other database failure.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::MissingField(_) => 400,
            Error::Validation(_) => 400,
            Error::Constraint(_) => 409,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short snake_case identifier used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::MissingField(_) => "missing_field",
            Error::Validation(_) => "validation_error",
            Error::Constraint(_) => "constraint_violation",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::MissingField`].
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingField(field.into())
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("author", 12);
        assert_eq!(err.to_string(), "author not found: 12");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn missing_field_display() {
        let err = Error::missing_field("title");
        assert_eq!(err.to_string(), "Missing required field: title");
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code(), "missing_field");
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("author_id must be an integer".into());
        assert_eq!(
            err.to_string(),
            "Validation error: author_id must be an integer"
        );
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn constraint_is_conflict() {
        let err = Error::Constraint("FOREIGN KEY constraint failed".into());
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.code(), "constraint_violation");
    }

    #[test]
    fn database_display() {
        let err = Error::database("disk I/O error");
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("template missing".into());
        assert_eq!(err.to_string(), "Internal error: template missing");
        assert_eq!(err.http_status(), 500);
    }
}
