// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Field name to the list of messages raised against it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// HTTP API error rendered into the `{success, status, ...}` envelope
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(FieldErrors),

    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error (raw message is passed through to the client)
    InternalServerError(String),

    // 502 Bad Gateway (upstream unreachable)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Validation(_) => "The given data was invalid.",
            ApiError::Unauthorized(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => json!({
                "success": false,
                "status": status,
                "errors": errors,
            }),
            // Server-side failures use `error`, client-side ones use `message`
            ApiError::InternalServerError(msg) | ApiError::BadGateway(msg) | ApiError::ServiceUnavailable(msg) => {
                json!({
                    "success": false,
                    "status": status,
                    "error": msg,
                })
            }
            _ => json!({
                "success": false,
                "status": status,
                "message": self.message(),
            }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }

    /// Single-field validation failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        tracing::error!("Database error: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<crate::query::QueryError> for ApiError {
    fn from(err: crate::query::QueryError) -> Self {
        tracing::error!("List query error: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(field) = unique_field(&err) {
            return ApiError::field(field, format!("The {} has already been taken.", field));
        }
        crate::database::DatabaseError::from(err).into()
    }
}

/// Field guarded by a unique index in `sql/schema.sql`, when `err` is a
/// violation of one of them.
fn unique_field(err: &sqlx::Error) -> Option<&'static str> {
    let db = err.as_database_error()?;
    if !db.is_unique_violation() {
        return None;
    }
    match db.constraint()? {
        "colors_code_key" | "coupons_code_key" => Some("code"),
        "users_email_key" => Some("email"),
        _ => None,
    }
}

impl From<crate::upstream::UpstreamError> for ApiError {
    fn from(err: crate::upstream::UpstreamError) -> Self {
        match err {
            crate::upstream::UpstreamError::NotConfigured => {
                ApiError::service_unavailable("Upstream service is not configured")
            }
            other => {
                tracing::warn!("Upstream request failed: {}", other);
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_is_field_keyed() {
        let body = ApiError::field("code", "The code has already been taken.").to_json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["status"], json!(400));
        assert_eq!(body["errors"]["code"][0], json!("The code has already been taken."));
        assert!(body.get("message").is_none());
    }

    #[test]
    fn non_constraint_database_errors_stay_internal() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn internal_errors_expose_raw_message() {
        let err = ApiError::internal_server_error("duplicate key value violates unique constraint");
        assert_eq!(err.status_code(), 500);
        let body = err.to_json();
        assert_eq!(body["error"], json!("duplicate key value violates unique constraint"));
        assert_eq!(body["status"], json!(500));
    }

    #[test]
    fn bad_request_uses_message() {
        let body = ApiError::bad_request("The :id parameter must be of integer type.").to_json();
        assert_eq!(body["message"], json!("The :id parameter must be of integer type."));
        assert_eq!(body["status"], json!(400));
    }
}
