//! Book CRUD operations, author-joined listings, pagination, and sorting.
//!
//! No function here checks that an `author_id` exists before writing; the
//! foreign key does that and a bad id surfaces as [`Error::Constraint`].

use bookshelf_common::{AuthorId, BookId, Error, Result};
use rusqlite::{Connection, OptionalExtension};

use super::db_error;
use crate::models::{Book, BookListing, Page};

const BOOK_COLUMNS: &str = "id, title, isbn, author_id";

const LISTING_SELECT: &str = "SELECT b.id, b.title, b.isbn, b.author_id, a.name
     FROM books b
     JOIN authors a ON a.id = b.author_id";

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Columns a book listing may be ordered by.
///
/// Parsing is an explicit allow-list; anything unrecognised falls back to
/// [`SortKey::Title`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Id,
    #[default]
    Title,
    Isbn,
    AuthorId,
}

impl SortKey {
    /// Parse a query-string value, substituting the default for unknown keys.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("id") => SortKey::Id,
            Some("title") => SortKey::Title,
            Some("isbn") => SortKey::Isbn,
            Some("author_id") => SortKey::AuthorId,
            _ => SortKey::default(),
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortKey::Id => "b.id",
            SortKey::Title => "b.title",
            SortKey::Isbn => "b.isbn",
            SortKey::AuthorId => "b.author_id",
        }
    }
}

/// Sort direction. Only the literal `desc` selects descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Insert a new book and return it with its assigned id.
pub fn create_book(
    conn: &Connection,
    title: &str,
    isbn: Option<&str>,
    author_id: AuthorId,
) -> Result<Book> {
    conn.execute(
        "INSERT INTO books (title, isbn, author_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![title, isbn, author_id.get()],
    )
    .map_err(db_error)?;

    Ok(Book {
        id: BookId::from(conn.last_insert_rowid()),
        title: title.to_string(),
        isbn: isbn.map(str::to_string),
        author_id,
    })
}

/// Get a book by ID.
pub fn get_book(conn: &Connection, id: BookId) -> Result<Option<Book>> {
    conn.query_row(
        &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
        [id.get()],
        Book::from_row,
    )
    .optional()
    .map_err(db_error)
}

/// Get a book by ID, failing with [`Error::NotFound`] when it is absent.
pub fn require_book(conn: &Connection, id: BookId) -> Result<Book> {
    get_book(conn, id)?.ok_or_else(|| Error::not_found("book", id))
}

/// Overwrite title, isbn, and author of a book.
pub fn update_book(
    conn: &Connection,
    id: BookId,
    title: &str,
    isbn: Option<&str>,
    author_id: AuthorId,
) -> Result<Book> {
    let n = conn
        .execute(
            "UPDATE books SET title = ?1, isbn = ?2, author_id = ?3 WHERE id = ?4",
            rusqlite::params![title, isbn, author_id.get(), id.get()],
        )
        .map_err(db_error)?;

    if n == 0 {
        return Err(Error::not_found("book", id));
    }

    Ok(Book {
        id,
        title: title.to_string(),
        isbn: isbn.map(str::to_string),
        author_id,
    })
}

/// Delete a book.
pub fn delete_book(conn: &Connection, id: BookId) -> Result<()> {
    let n = conn
        .execute("DELETE FROM books WHERE id = ?1", [id.get()])
        .map_err(db_error)?;

    if n == 0 {
        return Err(Error::not_found("book", id));
    }
    Ok(())
}

/// Total number of books.
pub fn count_books(conn: &Connection) -> Result<u64> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .map_err(db_error)?;
    Ok(n.max(0) as u64)
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

fn query_listings(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<BookListing>> {
    let mut stmt = conn.prepare(sql).map_err(db_error)?;
    let rows = stmt
        .query_map(params, BookListing::from_row)
        .map_err(db_error)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(rows)
}

/// Every book with its author's name, in storage order.
pub fn list_book_listings(conn: &Connection) -> Result<Vec<BookListing>> {
    query_listings(conn, &format!("{LISTING_SELECT} ORDER BY b.id"), [])
}

/// A single book with its author's name.
pub fn get_book_listing(conn: &Connection, id: BookId) -> Result<Option<BookListing>> {
    conn.query_row(
        &format!("{LISTING_SELECT} WHERE b.id = ?1"),
        [id.get()],
        BookListing::from_row,
    )
    .optional()
    .map_err(db_error)
}

/// Books owned by one author, in storage order.
pub fn list_books_by_author(conn: &Connection, author_id: AuthorId) -> Result<Vec<BookListing>> {
    query_listings(
        conn,
        &format!("{LISTING_SELECT} WHERE b.author_id = ?1 ORDER BY b.id"),
        [author_id.get()],
    )
}

/// Every book ordered by `key` in direction `order`; ties keep storage order.
pub fn sorted_book_listings(
    conn: &Connection,
    key: SortKey,
    order: SortOrder,
) -> Result<Vec<BookListing>> {
    let sql = format!(
        "{LISTING_SELECT} ORDER BY {} {}, b.id ASC",
        key.column(),
        order.keyword()
    );
    query_listings(conn, &sql, [])
}

/// One page of book listings in storage order.
///
/// `page` is 1-based. A page below 1, a `per_page` below 1, or a page past
/// the last one (other than page 1 of an empty table) is
/// [`Error::NotFound`].
pub fn paginate_books(conn: &Connection, page: i64, per_page: i64) -> Result<Page<BookListing>> {
    if page < 1 || per_page < 1 {
        return Err(Error::not_found(
            "page",
            format!("{page} (per_page {per_page})"),
        ));
    }

    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| Error::not_found("page", page))?;

    let total = count_books(conn)?;
    let items = query_listings(
        conn,
        &format!("{LISTING_SELECT} ORDER BY b.id LIMIT ?1 OFFSET ?2"),
        [per_page, offset],
    )?;

    if items.is_empty() && page > 1 {
        return Err(Error::not_found("page", page));
    }

    let per_page = per_page as u64;
    Ok(Page {
        page: page as u64,
        per_page,
        total,
        pages: Page::<BookListing>::page_count(total, per_page),
        items,
    })
}
