//! Pulling typed fields out of query strings, form bodies and JSON bodies.
//!
//! Required fields must be present as keys; absence is
//! [`Error::MissingField`]. Presence with the wrong shape is
//! [`Error::Validation`]. A key sent more than once keeps its first value.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::Query;
use axum::Form;
use bookshelf_common::{AuthorId, Error, Result};
use serde_json::{Map, Value};

/// Decoded `key=value` pairs of a query string or form body.
pub type Params = HashMap<String, String>;

/// Raw pairs in the order they were sent.
pub type Pairs = Vec<(String, String)>;

fn first_wins(pairs: Pairs) -> Params {
    let mut params = Params::with_capacity(pairs.len());
    for (key, value) in pairs {
        params.entry(key).or_insert(value);
    }
    params
}

/// Query string parameters. A query string that does not decode is a
/// validation error rather than axum's plain-text rejection.
pub fn query_params(query: std::result::Result<Query<Pairs>, QueryRejection>) -> Result<Params> {
    match query {
        Ok(Query(pairs)) => Ok(first_wins(pairs)),
        Err(rejection) => Err(Error::Validation(rejection.body_text())),
    }
}

/// Form body parameters. A missing or wrong content type is a validation
/// error like any other malformed body.
pub fn form_params(form: std::result::Result<Form<Pairs>, FormRejection>) -> Result<Params> {
    match form {
        Ok(Form(pairs)) => Ok(first_wins(pairs)),
        Err(rejection) => Err(Error::Validation(rejection.body_text())),
    }
}

/// Required parameter, kept as sent (an empty string counts as present).
pub fn param_required<'a>(params: &'a Params, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| Error::missing_field(key))
}

/// Optional parameter.
pub fn param_optional<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

/// Required parameter holding an author id.
pub fn param_author_id(params: &Params, key: &str) -> Result<AuthorId> {
    param_required(params, key)?
        .parse()
        .map_err(|_| Error::Validation(format!("{key} must be an integer")))
}

fn json_required<'a>(body: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    body.get(key).ok_or_else(|| Error::missing_field(key))
}

/// Required JSON key holding a string.
pub fn json_string<'a>(body: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    json_required(body, key)?
        .as_str()
        .ok_or_else(|| Error::Validation(format!("{key} must be a string")))
}

/// Required JSON key holding a string or `null`.
pub fn json_nullable_string<'a>(body: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match json_required(body, key)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(Error::Validation(format!("{key} must be a string or null"))),
    }
}

/// Optional JSON key holding a string; absent and `null` are both `None`.
pub fn json_optional_string<'a>(body: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(Error::Validation(format!("{key} must be a string or null"))),
    }
}

/// Required JSON key holding an author id.
pub fn json_author_id(body: &Map<String, Value>, key: &str) -> Result<AuthorId> {
    json_required(body, key)?
        .as_i64()
        .map(AuthorId::from)
        .ok_or_else(|| Error::Validation(format!("{key} must be an integer")))
}

/// Reject blank values such as an author name of only spaces.
pub fn non_blank<'a>(value: &'a str, key: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{key} must not be empty")));
    }
    Ok(value)
}

/// Parse a path segment as an entity id. Anything that is not an integer
/// cannot name a row, so it is reported as [`Error::NotFound`].
pub fn path_id<T: FromStr>(raw: &str, entity: &'static str) -> Result<T> {
    raw.parse().map_err(|_| Error::not_found(entity, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn pairs(pairs: &[(&str, &str)]) -> Pairs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let params = query_params(Ok(Query(pairs(&[
            ("page", "2"),
            ("page", "9"),
            ("sort", "title"),
        ]))))
        .unwrap();
        assert_eq!(param_optional(&params, "page"), Some("2"));
        assert_eq!(param_optional(&params, "sort"), Some("title"));

        let params = form_params(Ok(Form(pairs(&[("name", "Ovid"), ("name", "Virgil")])))).unwrap();
        assert_eq!(param_required(&params, "name").unwrap(), "Ovid");
    }

    #[test]
    fn form_missing_vs_empty() {
        let f = form(&[("isbn", "")]);
        assert_eq!(param_required(&f, "isbn").unwrap(), "");
        assert!(matches!(
            param_required(&f, "title"),
            Err(Error::MissingField(ref k)) if k == "title"
        ));
    }

    #[test]
    fn form_author_id_parses() {
        assert_eq!(
            param_author_id(&form(&[("author_id", "4")]), "author_id").unwrap(),
            AuthorId::from(4)
        );
        assert!(matches!(
            param_author_id(&form(&[("author_id", "four")]), "author_id"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            param_author_id(&form(&[]), "author_id"),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn json_fields() {
        let body = object(json!({"title": "Dune", "isbn": null, "author_id": 2, "bio": 5}));
        assert_eq!(json_string(&body, "title").unwrap(), "Dune");
        assert_eq!(json_nullable_string(&body, "isbn").unwrap(), None);
        assert_eq!(json_author_id(&body, "author_id").unwrap(), AuthorId::from(2));
        assert_eq!(json_optional_string(&body, "city").unwrap(), None);
        assert!(matches!(json_optional_string(&body, "bio"), Err(Error::Validation(_))));
        assert!(matches!(json_string(&body, "name"), Err(Error::MissingField(_))));
        assert!(matches!(json_string(&body, "isbn"), Err(Error::Validation(_))));
    }

    #[test]
    fn json_author_id_rejects_strings() {
        let body = object(json!({"author_id": "2"}));
        assert!(matches!(json_author_id(&body, "author_id"), Err(Error::Validation(_))));
    }

    #[test]
    fn path_ids() {
        use bookshelf_common::BookId;

        assert_eq!(path_id::<BookId>("12", "book").unwrap(), BookId::from(12));
        assert!(matches!(
            path_id::<BookId>("twelve", "book"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn blank_names_rejected() {
        assert!(non_blank("  ", "name").is_err());
        assert_eq!(non_blank("Ovid", "name").unwrap(), "Ovid");
    }
}
