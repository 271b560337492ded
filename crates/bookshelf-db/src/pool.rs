//! Connection pool management for SQLite via r2d2.
//!
//! Every pooled connection has foreign keys enabled, which is what makes
//! deleting an author cascade to its books. [`transaction`] is the unit of
//! work handlers use: one connection, one transaction, commit or roll back.

use bookshelf_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Transaction, TransactionBehavior};
use std::path::Path;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Open (creating if needed) the SQLite file at `db_path` behind a pool of
/// `max_size` connections.
///
/// Missing parent directories are created. Connections run in WAL mode with
/// foreign keys on and wait up to five seconds for a competing writer.
pub fn init_pool(db_path: &str, max_size: u32) -> Result<DbPool> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;",
        )
    });

    build(manager, max_size)
}

/// A private in-memory database for tests and doc examples.
///
/// The pool's connections all see one database, named by a process-wide
/// counter; no two pools ever share it.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:bookshelf_mem_{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build(manager, DEFAULT_POOL_SIZE)
}

fn build(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {e}")))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {e}")))?;

    let applied = migrations::run_migrations(&conn)?;
    if applied > 0 {
        tracing::info!("Applied {applied} schema migration(s)");
    }

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}

fn run_in_transaction<T, F>(pool: &DbPool, behavior: TransactionBehavior, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let mut conn = get_conn(pool)?;
    let tx = conn
        .transaction_with_behavior(behavior)
        .map_err(|e| Error::database(format!("Failed to begin transaction: {e}")))?;

    let value = f(&tx)?;

    tx.commit()
        .map_err(|e| Error::database(format!("Failed to commit transaction: {e}")))?;
    Ok(value)
}

/// Run `f` inside a single read transaction on a pooled connection.
///
/// The transaction is committed when `f` returns `Ok` and rolled back (by
/// drop) when it returns `Err`.
pub fn transaction<T, F>(pool: &DbPool, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    run_in_transaction(pool, TransactionBehavior::Deferred, f)
}

/// Like [`transaction`], but takes the write lock up front (`BEGIN
/// IMMEDIATE`).
///
/// Use this for anything that writes. A deferred transaction that reads
/// first and writes later cannot upgrade its lock while another writer is
/// active, and SQLite fails it with `SQLITE_BUSY` without waiting.
pub fn write_transaction<T, F>(pool: &DbPool, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    run_in_transaction(pool, TransactionBehavior::Immediate, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_get_conn() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_schema_created_on_init() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('authors', 'books')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_connections_share_memory_db() {
        let pool = init_memory_pool().unwrap();
        {
            let conn = get_conn(&pool).unwrap();
            conn.execute("INSERT INTO authors (name) VALUES ('Shared')", [])
                .unwrap();
        }

        let _held = get_conn(&pool).unwrap();
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row("SELECT name FROM authors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Shared");
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let pool = init_memory_pool().unwrap();
        transaction(&pool, |tx| {
            tx.execute("INSERT INTO authors (name) VALUES ('Kept')", [])
                .map_err(|e| Error::database(e.to_string()))?;
            Ok(())
        })
        .unwrap();

        let conn = get_conn(&pool).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let pool = init_memory_pool().unwrap();
        let result: Result<()> = transaction(&pool, |tx| {
            tx.execute("INSERT INTO authors (name) VALUES ('Dropped')", [])
                .map_err(|e| Error::database(e.to_string()))?;
            Err(Error::missing_field("title"))
        });
        assert!(matches!(result, Err(Error::MissingField(_))));

        let conn = get_conn(&pool).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookshelf.db");
        let path = path.to_string_lossy();

        {
            let pool = init_pool(&path, DEFAULT_POOL_SIZE).unwrap();
            let conn = get_conn(&pool).unwrap();
            conn.execute("INSERT INTO authors (name) VALUES ('Disk')", [])
                .unwrap();
        }

        let pool = init_pool(&path, 1).unwrap();
        assert_eq!(pool.max_size(), 1);
        let conn = get_conn(&pool).unwrap();
        let name: String = conn
            .query_row("SELECT name FROM authors", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Disk");
    }

    #[test]
    fn test_file_pool_uses_wal_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/bookshelf.db");

        let pool = init_pool(&path.to_string_lossy(), 2).unwrap();
        assert!(path.exists());

        let conn = get_conn(&pool).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_file_pool_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let result = init_pool(&blocker.join("bookshelf.db").to_string_lossy(), 1);
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_concurrent_read_then_write_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookshelf.db");
        let pool = init_pool(&path.to_string_lossy(), 8).unwrap();
        transaction(&pool, |tx| {
            tx.execute("INSERT INTO authors (name) VALUES ('Racer')", [])
                .map_err(|e| Error::database(e.to_string()))?;
            Ok(())
        })
        .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        write_transaction(&pool, |tx| {
                            let _: String = tx
                                .query_row("SELECT name FROM authors WHERE id = 1", [], |row| {
                                    row.get(0)
                                })
                                .map_err(|e| Error::database(e.to_string()))?;
                            tx.execute(
                                "UPDATE authors SET name = ?1 WHERE id = 1",
                                [format!("writer {t} pass {i}")],
                            )
                            .map_err(|e| Error::database(e.to_string()))?;
                            Ok(())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
