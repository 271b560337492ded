//! One-shot flash notices carried between a mutation and the next page view.
//!
//! Messages live in a single cookie as base64-encoded JSON so they survive the
//! redirect; reading them with [`take`] removes the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

/// Name of the cookie holding pending notices.
pub const FLASH_COOKIE: &str = "flash";

fn encode(messages: &[String]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(encoded: &str) -> Vec<String> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

fn pending(jar: &CookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

/// Queue `message` for the next page view, keeping anything already queued.
pub fn push(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    let mut messages = pending(&jar);
    messages.push(message.into());

    let cookie = Cookie::build((FLASH_COOKIE, encode(&messages)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    jar.add(cookie)
}

/// Drain the queued notices, returning the jar with the cookie removed.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let messages = pending(&jar);
    if messages.is_empty() && jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }

    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"));
    (jar, messages)
}
