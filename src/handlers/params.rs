use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::error::ApiError;
use crate::validation::label;

pub const INVALID_ID_MESSAGE: &str = "The :id parameter must be of integer type.";

/// Numeric `:id` path segment. Anything else is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(INVALID_ID_MESSAGE))?;
        parse_id(&raw).map(RecordId).ok_or_else(|| ApiError::bad_request(INVALID_ID_MESSAGE))
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// JSON body whose rejection renders in the API envelope instead of axum's
/// plain-text default. Malformed JSON is a 400 `message`; a wrong-typed field
/// is a validation error keyed by that field.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        serde_path_to_error::deserialize(value)
            .map(JsonBody)
            .map_err(|err| body_error(&err))
    }
}

fn body_error(err: &serde_path_to_error::Error<serde_json::Error>) -> ApiError {
    // `Color.name` -> `name`
    let field = err
        .path()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Map { key } => Some(key.as_str()),
            _ => None,
        })
        .last();
    match field {
        Some(field) => ApiError::field(field, format!("The {} field is invalid: {}.", label(field), err.inner())),
        None => ApiError::bad_request(format!("Failed to deserialize the JSON body: {}", err.inner())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header::CONTENT_TYPE};
    use axum::http;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(rename = "Color", default)]
        color: Inner,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Inner {
        name: Option<String>,
        code: Option<String>,
    }

    async fn extract(raw: &'static str) -> Result<JsonBody<Payload>, ApiError> {
        let req = http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        JsonBody::<Payload>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn wrong_typed_field_is_keyed_by_field() {
        match extract(r#"{"Color":{"name":123,"code":"ff0000"}}"#).await {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors["name"][0].starts_with("The name field is invalid: invalid type: integer"));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        assert!(matches!(extract(r#"{"Color":"#).await, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn well_typed_body_extracts() {
        let JsonBody(payload) = extract(r#"{"Color":{"name":"Red","code":"ff0000"}}"#).await.unwrap();
        assert_eq!(payload.color.name.as_deref(), Some("Red"));
        assert_eq!(payload.color.code.as_deref(), Some("ff0000"));
    }

    #[test]
    fn parses_only_plain_integers() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("4.2"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("99999999999999999999"), None);
    }
}
