//! HTML routes: the index page and its form handlers.
//!
//! Every mutation runs in one transaction, queues a flash notice and answers
//! `302 Found` back to `/`.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use bookshelf_common::{AuthorId, BookId};
use bookshelf_db::{
    pool::{transaction, write_transaction},
    queries::{authors, books},
};
use super::error::AppError;
use super::fields::{
    form_params, non_blank, param_author_id, param_optional, param_required, path_id,
    query_params, Pairs,
};
use super::flash;
use super::view::IndexPage;
use super::AppContext;

/// Create the HTML routes.
///
/// Deletes always accept `POST`; `GET` is added only when
/// `ui.allow_get_deletes` is set.
pub fn ui_routes(allow_get_deletes: bool) -> Router<AppContext> {
    let (delete_author_route, delete_book_route) = if allow_get_deletes {
        (
            get(delete_author).post(delete_author),
            get(delete_book).post(delete_book),
        )
    } else {
        (post(delete_author), post(delete_book))
    };

    Router::new()
        .route("/", get(index))
        .route("/add-author", post(add_author))
        .route("/add-book", post(add_book))
        .route("/update-author/:id", post(update_author))
        .route("/update-book/:id", post(update_book))
        .route("/delete-author/:id", delete_author_route)
        .route("/delete-book/:id", delete_book_route)
}

fn redirect_home(jar: CookieJar) -> Response {
    (StatusCode::FOUND, jar, [(header::LOCATION, "/")]).into_response()
}

async fn index(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = query_params(query)?;
    let edit_author_id: Option<AuthorId> =
        param_optional(&params, "edit_author").and_then(|s| s.parse().ok());
    let edit_book_id: Option<BookId> =
        param_optional(&params, "edit_book").and_then(|s| s.parse().ok());

    let (all_authors, listings, edit_author, edit_book) = transaction(&ctx.db, |tx| {
        let edit_author = match edit_author_id {
            Some(id) => authors::get_author(tx, id)?,
            None => None,
        };
        let edit_book = match edit_book_id {
            Some(id) => books::get_book(tx, id)?,
            None => None,
        };
        Ok((
            authors::list_authors(tx)?,
            books::list_book_listings(tx)?,
            edit_author,
            edit_book,
        ))
    })?;

    let (jar, flashes) = flash::take(jar);
    let page = IndexPage::new(
        flashes,
        all_authors,
        listings,
        edit_author,
        edit_book,
        ctx.config.ui.allow_get_deletes,
    );
    let html = ctx.views.render_index(&page)?;

    Ok((jar, Html(html)).into_response())
}

async fn add_author(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_params(form)?;
    let name = non_blank(param_required(&form, "name")?, "name")?;
    let bio = param_optional(&form, "bio");
    let city = param_optional(&form, "city");

    let author = write_transaction(&ctx.db, |tx| authors::create_author(tx, name, bio, city))?;
    tracing::info!(author_id = %author.id, "Author added");

    Ok(redirect_home(flash::push(jar, "Author added successfully!")))
}

async fn update_author(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Response, AppError> {
    let id: AuthorId = path_id(&raw_id, "author")?;
    let form = form_params(form)?;

    write_transaction(&ctx.db, |tx| {
        authors::require_author(tx, id)?;
        let name = non_blank(param_required(&form, "name")?, "name")?;
        authors::update_author(
            tx,
            id,
            name,
            param_optional(&form, "bio"),
            param_optional(&form, "city"),
        )
    })?;
    tracing::info!(author_id = %id, "Author updated");

    Ok(redirect_home(flash::push(jar, "Author updated successfully!")))
}

async fn delete_author(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let id: AuthorId = path_id(&raw_id, "author")?;

    write_transaction(&ctx.db, |tx| authors::delete_author(tx, id))?;
    tracing::info!(author_id = %id, "Author deleted");

    Ok(redirect_home(flash::push(jar, "Author deleted successfully!")))
}

async fn add_book(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Response, AppError> {
    let form = form_params(form)?;
    let title = param_required(&form, "title")?;
    let isbn = param_required(&form, "isbn")?;
    let author_id = param_author_id(&form, "author_id")?;

    let book = write_transaction(&ctx.db, |tx| {
        books::create_book(tx, title, Some(isbn), author_id)
    })?;
    tracing::info!(book_id = %book.id, author_id = %author_id, "Book added");

    Ok(redirect_home(flash::push(jar, "Book added successfully!")))
}

async fn update_book(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    form: Result<Form<Pairs>, FormRejection>,
) -> Result<Response, AppError> {
    let id: BookId = path_id(&raw_id, "book")?;
    let form = form_params(form)?;

    write_transaction(&ctx.db, |tx| {
        books::require_book(tx, id)?;
        let title = param_required(&form, "title")?;
        let isbn = param_required(&form, "isbn")?;
        let author_id = param_author_id(&form, "author_id")?;
        books::update_book(tx, id, title, Some(isbn), author_id)
    })?;
    tracing::info!(book_id = %id, "Book updated");

    Ok(redirect_home(flash::push(jar, "Book updated successfully!")))
}

async fn delete_book(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let id: BookId = path_id(&raw_id, "book")?;

    write_transaction(&ctx.db, |tx| books::delete_book(tx, id))?;
    tracing::info!(book_id = %id, "Book deleted");

    Ok(redirect_home(flash::push(jar, "Book deleted successfully!")))
}
