//! Database migrations module
//!
//! The schema is embedded in the binary and applied in order. A
//! `schema_migrations` table records which versions have run, so start-up
//! only creates tables that are absent.

use bookshelf_common::{Error, Result};
use rusqlite::Connection;

/// A single migration with its SQL content
struct Migration {
    version: usize,
    name: &'static str,
    sql: &'static str,
}

/// V1: the author/book table pair.
const V1_INITIAL: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id   INTEGER PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    bio  TEXT,
    city VARCHAR(100)
);

CREATE TABLE IF NOT EXISTS books (
    id        INTEGER PRIMARY KEY,
    title     VARCHAR(200) NOT NULL,
    isbn      VARCHAR(20),
    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id);
"#;

/// All available migrations
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "authors_and_books",
    sql: V1_INITIAL,
}];

fn init_migrations_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY NOT NULL,
            name       TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;
    Ok(())
}

fn get_current_version(conn: &Connection) -> rusqlite::Result<usize> {
    conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
        row.get::<_, Option<usize>>(0)
    })
    .map(|v| v.unwrap_or(0))
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute_batch(migration.sql).map_err(|e| {
        Error::database(format!("Migration {} failed: {e}", migration.version))
    })?;

    conn.execute(
        "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.name],
    )
    .map_err(|e| Error::database(format!("Migration {} failed: {e}", migration.version)))?;

    Ok(())
}

/// Run all pending migrations, each in its own transaction.
///
/// Returns the number of migrations applied (0 when the schema is current).
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    init_migrations_table(conn).map_err(|e| Error::database(e.to_string()))?;

    let current_version = get_current_version(conn).map_err(|e| Error::database(e.to_string()))?;

    let mut applied_count = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        apply_migration(&tx, migration)?;

        tx.commit()
            .map_err(|e| Error::database(format!("Migration {} failed: {e}", migration.version)))?;

        tracing::debug!(
            version = migration.version,
            name = migration.name,
            "Applied migration"
        );
        applied_count += 1;
    }

    Ok(applied_count)
}

/// Get the current schema version without applying migrations
pub fn current_version(conn: &Connection) -> Result<usize> {
    init_migrations_table(conn).map_err(|e| Error::database(e.to_string()))?;
    get_current_version(conn).map_err(|e| Error::database(e.to_string()))
}

/// Get the latest available migration version
pub fn latest_version() -> usize {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
