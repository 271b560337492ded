//! Bookshelf-DB: schema, connection pooling, and query operations.
//!
//! This crate stores authors and books in SQLite using rusqlite with r2d2
//! connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema, applied at start-up when absent
//! - `pool` - Connection pool management and request-scoped transactions
//! - `models` - Rust models matching the database schema
//! - `queries` - Author and book query operations
//!
//! # Example
//!
//! ```
//! use bookshelf_db::pool::{init_memory_pool, transaction};
//! use bookshelf_db::queries::{authors, books};
//!
//! let pool = init_memory_pool().unwrap();
//! let listing = transaction(&pool, |tx| {
//!     let author = authors::create_author(tx, "Ursula K. Le Guin", None, Some("Portland"))?;
//!     books::create_book(tx, "The Dispossessed", None, author.id)?;
//!     books::list_book_listings(tx)
//! })
//! .unwrap();
//! assert_eq!(listing[0].author, "Ursula K. Le Guin");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
