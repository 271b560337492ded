//! Bookshelf-Common: shared types used by the data layer and the server.
//!
//! - **Typed IDs**: integer newtypes so an author id is never passed where a
//!   book id is expected
//! - **Error Handling**: the unified [`Error`] type and its HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use bookshelf_common::{AuthorId, Error, Result};
//!
//! fn lookup(id: AuthorId) -> Result<()> {
//!     Err(Error::not_found("author", id))
//! }
//!
//! let err = lookup(AuthorId::from(7)).unwrap_err();
//! assert_eq!(err.http_status(), 404);
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
