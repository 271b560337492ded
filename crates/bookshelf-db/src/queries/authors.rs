//! Author CRUD operations.

use bookshelf_common::{AuthorId, Error, Result};
use rusqlite::{Connection, OptionalExtension};

use super::db_error;
use crate::models::{Author, AuthorSummary};

const AUTHOR_COLUMNS: &str = "id, name, bio, city";

/// Insert a new author and return it with its assigned id.
pub fn create_author(
    conn: &Connection,
    name: &str,
    bio: Option<&str>,
    city: Option<&str>,
) -> Result<Author> {
    conn.execute(
        "INSERT INTO authors (name, bio, city) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, bio, city],
    )
    .map_err(db_error)?;

    Ok(Author {
        id: AuthorId::from(conn.last_insert_rowid()),
        name: name.to_string(),
        bio: bio.map(str::to_string),
        city: city.map(str::to_string),
    })
}

/// Get an author by ID.
pub fn get_author(conn: &Connection, id: AuthorId) -> Result<Option<Author>> {
    conn.query_row(
        &format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?1"),
        [id.get()],
        Author::from_row,
    )
    .optional()
    .map_err(db_error)
}

/// Get an author by ID, failing with [`Error::NotFound`] when it is absent.
pub fn require_author(conn: &Connection, id: AuthorId) -> Result<Author> {
    get_author(conn, id)?.ok_or_else(|| Error::not_found("author", id))
}

/// List all authors in storage order.
pub fn list_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY id"))
        .map_err(db_error)?;
    let rows = stmt
        .query_map([], Author::from_row)
        .map_err(db_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(rows)
}

/// List all authors with the number of books each one owns.
pub fn list_author_summaries(conn: &Connection) -> Result<Vec<AuthorSummary>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, a.bio, a.city, COUNT(b.id)
             FROM authors a
             LEFT JOIN books b ON b.author_id = a.id
             GROUP BY a.id
             ORDER BY a.id",
        )
        .map_err(db_error)?;
    let rows = stmt
        .query_map([], AuthorSummary::from_row)
        .map_err(db_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(rows)
}

/// Overwrite every mutable field of an author.
///
/// There are no partial updates: a `None` clears `bio` or `city`.
pub fn update_author(
    conn: &Connection,
    id: AuthorId,
    name: &str,
    bio: Option<&str>,
    city: Option<&str>,
) -> Result<Author> {
    let n = conn
        .execute(
            "UPDATE authors SET name = ?1, bio = ?2, city = ?3 WHERE id = ?4",
            rusqlite::params![name, bio, city, id.get()],
        )
        .map_err(db_error)?;

    if n == 0 {
        return Err(Error::not_found("author", id));
    }

    Ok(Author {
        id,
        name: name.to_string(),
        bio: bio.map(str::to_string),
        city: city.map(str::to_string),
    })
}

/// Delete an author; its books go with it (`ON DELETE CASCADE`).
pub fn delete_author(conn: &Connection, id: AuthorId) -> Result<()> {
    let n = conn
        .execute("DELETE FROM authors WHERE id = ?1", [id.get()])
        .map_err(db_error)?;

    if n == 0 {
        return Err(Error::not_found("author", id));
    }
    Ok(())
}
