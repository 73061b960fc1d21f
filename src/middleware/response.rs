use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Envelope written for every successful (or soft-failed) request.
///
/// The `status` in the body is not always the transport status: a missing
/// record is transport 200 with body 404, and a delete is transport 200 with
/// body 204. Existing consumers read the body field.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize = Value> {
    pub success: bool,
    pub status: StatusCode,
    pub transport: StatusCode,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            status: StatusCode::OK,
            transport: StatusCode::OK,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<Value> {
    /// Transport 200, body 404, empty `data`
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: StatusCode::NOT_FOUND,
            transport: StatusCode::OK,
            data: Some(json!([])),
            message: Some(message.into()),
        }
    }

    pub fn updated(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status: StatusCode::OK,
            transport: StatusCode::OK,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Transport 200, body 204
    pub fn deleted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            status: StatusCode::NO_CONTENT,
            transport: StatusCode::OK,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = Map::new();
        envelope.insert("success".into(), json!(self.success));
        envelope.insert("status".into(), json!(self.status.as_u16()));

        if let Some(data) = &self.data {
            match serde_json::to_value(data) {
                Ok(value) => {
                    envelope.insert("data".into(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "status": 500,
                            "error": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            }
        }
        if let Some(message) = self.message {
            envelope.insert("message".into(), json!(message));
        }

        (self.transport, Json(Value::Object(envelope))).into_response()
    }
}

/// 201 body for create endpoints: `{success, code, message, <entity>_id}`.
#[derive(Debug)]
pub struct Created {
    pub message: String,
    pub id_key: &'static str,
    pub id: i64,
}

impl Created {
    pub fn new(message: impl Into<String>, id_key: &'static str, id: i64) -> Self {
        Self {
            message: message.into(),
            id_key,
            id,
        }
    }
}

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("success".into(), json!(true));
        body.insert("code".into(), json!(201));
        body.insert("message".into(), json!(self.message));
        body.insert(self.id_key.into(), json!(self.id));
        (StatusCode::CREATED, Json(Value::Object(body))).into_response()
    }
}

// Convenience type aliases
pub type ApiResult<T = Value> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type CreatedResult = Result<Created, crate::error::ApiError>;
