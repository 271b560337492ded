//! Bookshelf - authors and books over SQLite
//!
//! This library crate exposes the configuration and HTTP layers for
//! integration testing.

pub mod config;
pub mod server;
