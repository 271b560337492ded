//! JSON API routes under `/api`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use bookshelf_common::{AuthorId, BookId, Error};
use bookshelf_db::{
    models::{Author, AuthorSummary, BookListing},
    pool::{transaction, write_transaction},
    queries::{
        authors,
        books::{self, SortKey, SortOrder},
    },
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::error::AppError;
use super::fields::{
    json_author_id, json_nullable_string, json_optional_string, json_string, non_blank,
    param_optional, path_id, query_params, Pairs,
};
use super::AppContext;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/books", get(list_books))
        .route("/add-book", post(add_book))
        .route("/books-with-pagination", get(paginated_books))
        .route("/books-with-sorting", get(sorted_books))
        .route("/books/:id", get(get_book).put(update_book).delete(delete_book))
        .route("/authors", get(list_authors))
        .route("/add-author", post(add_author))
        .route(
            "/authors/:id",
            get(get_author).put(update_author).delete(delete_author),
        )
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct PaginatedBooks {
    total: u64,
    pages: u64,
    page: u64,
    per_page: u64,
    has_next: bool,
    has_prev: bool,
    books: Vec<BookListing>,
}

/// An author with every book they wrote.
#[derive(Debug, Serialize)]
struct AuthorDetail {
    #[serde(flatten)]
    author: Author,
    books: Vec<BookListing>,
}

/// Accept only a well-formed JSON object body.
fn json_object(
    body: Result<Json<Value>, JsonRejection>,
) -> bookshelf_common::Result<Map<String, Value>> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(Error::Validation("Request body must be a JSON object".into())),
        Err(rejection) => Err(Error::Validation(rejection.body_text())),
    }
}

/// Integer query parameter; anything unparsable falls back to `default`.
fn int_param(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

// ============================================================================
// Books
// ============================================================================

async fn list_books(State(ctx): State<AppContext>) -> Result<Json<Vec<BookListing>>, AppError> {
    let listings = transaction(&ctx.db, |tx| books::list_book_listings(tx))?;
    Ok(Json(listings))
}

async fn add_book(
    State(ctx): State<AppContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let body = json_object(body)?;
    let title = json_string(&body, "title")?;
    let isbn = json_nullable_string(&body, "isbn")?;
    let author_id = json_author_id(&body, "author_id")?;

    let book = write_transaction(&ctx.db, |tx| books::create_book(tx, title, isbn, author_id))?;
    tracing::info!(book_id = %book.id, author_id = %author_id, "Book added via API");

    Ok(success())
}

async fn paginated_books(
    State(ctx): State<AppContext>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<PaginatedBooks>, AppError> {
    let params = query_params(query)?;
    let page = int_param(param_optional(&params, "page"), 1);
    let mut per_page = int_param(
        param_optional(&params, "per_page"),
        ctx.config.api.default_per_page,
    );
    if let Some(max) = ctx.config.api.max_per_page {
        per_page = per_page.min(max);
    }

    let result = transaction(&ctx.db, |tx| books::paginate_books(tx, page, per_page))?;

    Ok(Json(PaginatedBooks {
        total: result.total,
        pages: result.pages,
        page: result.page,
        per_page: result.per_page,
        has_next: result.has_next(),
        has_prev: result.has_prev(),
        books: result.items,
    }))
}

async fn sorted_books(
    State(ctx): State<AppContext>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<Vec<BookListing>>, AppError> {
    let params = query_params(query)?;
    let key = SortKey::from_param(param_optional(&params, "sort"));
    let order = SortOrder::from_param(param_optional(&params, "order"));

    let listings = transaction(&ctx.db, |tx| books::sorted_book_listings(tx, key, order))?;
    Ok(Json(listings))
}

async fn get_book(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookListing>, AppError> {
    let id: BookId = path_id(&raw_id, "book")?;

    let listing = transaction(&ctx.db, |tx| {
        books::get_book_listing(tx, id)?.ok_or_else(|| Error::not_found("book", id))
    })?;
    Ok(Json(listing))
}

async fn update_book(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookListing>, AppError> {
    let id: BookId = path_id(&raw_id, "book")?;
    let body = json_object(body)?;

    let listing = write_transaction(&ctx.db, |tx| {
        books::require_book(tx, id)?;
        let title = json_string(&body, "title")?;
        let isbn = json_nullable_string(&body, "isbn")?;
        let author_id = json_author_id(&body, "author_id")?;
        books::update_book(tx, id, title, isbn, author_id)?;
        books::get_book_listing(tx, id)?.ok_or_else(|| Error::not_found("book", id))
    })?;
    tracing::info!(book_id = %id, "Book updated via API");

    Ok(Json(listing))
}

async fn delete_book(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id: BookId = path_id(&raw_id, "book")?;

    write_transaction(&ctx.db, |tx| books::delete_book(tx, id))?;
    tracing::info!(book_id = %id, "Book deleted via API");

    Ok(success())
}

// ============================================================================
// Authors
// ============================================================================

async fn list_authors(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<AuthorSummary>>, AppError> {
    let summaries = transaction(&ctx.db, |tx| authors::list_author_summaries(tx))?;
    Ok(Json(summaries))
}

async fn add_author(
    State(ctx): State<AppContext>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let body = json_object(body)?;
    let name = non_blank(json_string(&body, "name")?, "name")?;
    let bio = json_optional_string(&body, "bio")?;
    let city = json_optional_string(&body, "city")?;

    let author = write_transaction(&ctx.db, |tx| authors::create_author(tx, name, bio, city))?;
    tracing::info!(author_id = %author.id, "Author added via API");

    Ok(Json(json!({ "success": true, "id": author.id })))
}

async fn get_author(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<AuthorDetail>, AppError> {
    let id: AuthorId = path_id(&raw_id, "author")?;

    let detail = transaction(&ctx.db, |tx| {
        let author = authors::require_author(tx, id)?;
        let books = books::list_books_by_author(tx, id)?;
        Ok(AuthorDetail { author, books })
    })?;
    Ok(Json(detail))
}

async fn update_author(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Author>, AppError> {
    let id: AuthorId = path_id(&raw_id, "author")?;
    let body = json_object(body)?;

    let author = write_transaction(&ctx.db, |tx| {
        authors::require_author(tx, id)?;
        let name = non_blank(json_string(&body, "name")?, "name")?;
        let bio = json_optional_string(&body, "bio")?;
        let city = json_optional_string(&body, "city")?;
        authors::update_author(tx, id, name, bio, city)
    })?;
    tracing::info!(author_id = %id, "Author updated via API");

    Ok(Json(author))
}

async fn delete_author(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id: AuthorId = path_id(&raw_id, "author")?;

    write_transaction(&ctx.db, |tx| authors::delete_author(tx, id))?;
    tracing::info!(author_id = %id, "Author deleted via API");

    Ok(success())
}
