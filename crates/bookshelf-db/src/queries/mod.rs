//! Database query modules.
//!
//! - authors: Author CRUD and per-author book counts
//! - books: Book CRUD, listings joined with author names, pagination, sorting

pub mod authors;
pub mod books;

use bookshelf_common::Error;
use rusqlite::ErrorCode;

/// Classify a rusqlite failure.
///
/// Constraint failures (foreign key, NOT NULL) are caller mistakes and map to
/// [`Error::Constraint`]; everything else is an opaque database error.
pub(crate) fn db_error(e: rusqlite::Error) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            Error::Constraint(msg.unwrap_or_else(|| err.to_string()))
        }
        other => Error::database(other.to_string()),
    }
}
