//! Server-rendered HTML for the `/` page.
//!
//! The Handlebars template is compiled into the binary and registered once
//! when the [`AppContext`](super::AppContext) is built.

use bookshelf_common::{AuthorId, Error, Result};
use bookshelf_db::models::{Author, Book, BookListing};
use handlebars::Handlebars;
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.hbs");
const INDEX: &str = "index";

/// An `<option>` in an author picker.
#[derive(Debug, Serialize)]
pub struct AuthorOption {
    pub id: AuthorId,
    pub name: String,
    pub selected: bool,
}

/// Everything the index page shows.
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub flashes: Vec<String>,
    pub authors: Vec<Author>,
    pub books: Vec<BookListing>,
    /// Picker for the add-book form.
    pub author_options: Vec<AuthorOption>,
    pub edit_author: Option<Author>,
    pub edit_book: Option<Book>,
    /// Picker for the edit-book form, preselecting the book's author.
    pub edit_book_author_options: Vec<AuthorOption>,
    /// Whether delete links can be plain GET links.
    pub get_deletes: bool,
}

impl IndexPage {
    pub fn new(
        flashes: Vec<String>,
        authors: Vec<Author>,
        books: Vec<BookListing>,
        edit_author: Option<Author>,
        edit_book: Option<Book>,
        get_deletes: bool,
    ) -> Self {
        let options = |selected: Option<AuthorId>| -> Vec<AuthorOption> {
            authors
                .iter()
                .map(|a| AuthorOption {
                    id: a.id,
                    name: a.name.clone(),
                    selected: Some(a.id) == selected,
                })
                .collect()
        };

        let author_options = options(None);
        let edit_book_author_options = edit_book
            .as_ref()
            .map(|b| options(Some(b.author_id)))
            .unwrap_or_default();

        Self {
            flashes,
            author_options,
            edit_book_author_options,
            authors,
            books,
            edit_author,
            edit_book,
            get_deletes,
        }
    }
}

/// Compiled page templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(INDEX, INDEX_TEMPLATE)
            .map_err(|e| Error::Internal(format!("Invalid index template: {e}")))?;
        Ok(Self { registry })
    }

    pub fn render_index(&self, page: &IndexPage) -> Result<String> {
        self.registry
            .render(INDEX, page)
            .map_err(|e| Error::Internal(format!("Failed to render index page: {e}")))
    }
}
