//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a config and the
//! full [`AppContext`], then drives the router with `oneshot` requests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bookshelf::config::Config;
use bookshelf::server::{create_router, AppContext};
use bookshelf_common::{AuthorId, BookId};
use bookshelf_db::pool::{get_conn, init_memory_pool, init_pool, DbPool, PooledConnection};
use bookshelf_db::queries::{authors, books};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database, or a file database in a temp dir.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    _dir: Option<TempDir>,
}

/// Status, headers and body text of one response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", self.body))
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `name=value` part of the flash cookie this response sets.
    pub fn flash_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("flash="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration and in-memory DB.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(config, db.clone()).expect("failed to build context");
        Self { ctx, db, _dir: None }
    }

    /// Create a harness backed by an on-disk database, the way `serve` opens
    /// one, with room for `pool_size` concurrent connections.
    pub fn with_file_db(pool_size: u32) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("bookshelf.db");
        let db = init_pool(&path.to_string_lossy(), pool_size).expect("failed to create file pool");
        let ctx = AppContext::new(Config::default(), db.clone()).expect("failed to build context");
        Self {
            ctx,
            db,
            _dir: Some(dir),
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn seed_author(&self, name: &str) -> AuthorId {
        authors::create_author(&self.conn(), name, None, None)
            .expect("failed to seed author")
            .id
    }

    pub fn seed_book(&self, title: &str, isbn: Option<&str>, author_id: AuthorId) -> BookId {
        books::create_book(&self.conn(), title, isbn, author_id)
            .expect("failed to seed book")
            .id
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET with a `Cookie` header.
    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.json_request(Method::POST, uri, body.to_string()).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> TestResponse {
        self.json_request(Method::PUT, uri, body.to_string()).await
    }

    pub async fn json_request(&self, method: Method, uri: &str, body: String) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// POST a form-encoded body such as `"name=Homer&city=Chios"`.
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a body with no `Content-Type` header.
    pub async fn post_untyped(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST with no body, as a delete button does.
    pub async fn post_empty(&self, uri: &str) -> TestResponse {
        self.send(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }
}
