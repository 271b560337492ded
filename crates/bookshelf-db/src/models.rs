//! Rust structs mapping to database tables.
//!
//! Each row model implements `from_row` for constructing itself from a
//! `rusqlite::Row`. Column order always matches the `*_COLUMNS` constants in
//! the query modules.

use bookshelf_common::{AuthorId, BookId};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
}

impl Author {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: AuthorId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            bio: row.get(2)?,
            city: row.get(3)?,
        })
    }
}

/// An author together with how many books reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    #[serde(flatten)]
    pub author: Author,
    pub book_count: i64,
}

impl AuthorSummary {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            author: Author::from_row(row)?,
            book_count: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn: Option<String>,
    pub author_id: AuthorId,
}

impl Book {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: BookId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            isbn: row.get(2)?,
            author_id: AuthorId::from(row.get::<_, i64>(3)?),
        })
    }
}

/// A book joined with its author's name; the shape every `/api/books*`
/// endpoint serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub id: BookId,
    pub title: String,
    pub isbn: Option<String>,
    /// Name of the owning author.
    pub author: String,
    #[serde(skip)]
    pub author_id: AuthorId,
}

impl BookListing {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: BookId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            isbn: row.get(2)?,
            author_id: AuthorId::from(row.get::<_, i64>(3)?),
            author: row.get(4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// 1-based page number that was served.
    pub page: u64,
    pub per_page: u64,
    /// Row count of the whole table, not just this page.
    pub total: u64,
    /// `ceil(total / per_page)`; 0 for an empty table.
    pub pages: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` rows.
    pub fn page_count(total: u64, per_page: u64) -> u64 {
        if per_page == 0 {
            return 0;
        }
        total.div_ceil(per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
