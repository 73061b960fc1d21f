//! Pass-through controllers for the upstream store's clients, orders and
//! products. Status and body come back exactly as the upstream sent them.

use axum::{
    extract::{RawQuery, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;
use crate::upstream::{UpstreamBody, UpstreamResponse};

use super::params::{JsonBody, RecordId};

/// Upstream path names for one proxied resource.
#[derive(Debug, Clone, Copy)]
pub struct ProxyResource {
    /// `api/clients`
    pub collection: &'static str,
    /// `api/client`
    pub item: &'static str,
}

pub const CLIENTS: ProxyResource = ProxyResource {
    collection: "api/clients",
    item: "api/client",
};

pub const ORDERS: ProxyResource = ProxyResource {
    collection: "api/orders",
    item: "api/order",
};

pub const PRODUCTS: ProxyResource = ProxyResource {
    collection: "api/products",
    item: "api/product",
};

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        match self.body {
            UpstreamBody::Json(value) => (self.status, Json(value)).into_response(),
            UpstreamBody::Raw { content_type, bytes } => {
                (self.status, [(CONTENT_TYPE, content_type)], bytes).into_response()
            }
        }
    }
}

/// `GET /` and `POST /` on the collection, `GET/PUT/DELETE /:id` on items.
pub fn routes(resource: ProxyResource) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |State(state): State<AppState>, RawQuery(query): RawQuery| async move {
                list(&state, resource, query.as_deref()).await
            })
            .post(move |State(state): State<AppState>, JsonBody(body): JsonBody<Value>| async move {
                create(&state, resource, body).await
            }),
        )
        .route(
            "/:id",
            get(move |State(state): State<AppState>, RecordId(id): RecordId| async move {
                show(&state, resource, id).await
            })
            .put(
                move |State(state): State<AppState>, RecordId(id): RecordId, JsonBody(body): JsonBody<Value>| async move {
                    update(&state, resource, id, body).await
                },
            )
            .delete(move |State(state): State<AppState>, RecordId(id): RecordId| async move {
                destroy(&state, resource, id).await
            }),
        )
}

/// GET /api/enjoy/<resource> - list, query string forwarded verbatim
pub async fn list(state: &AppState, resource: ProxyResource, query: Option<&str>) -> Result<UpstreamResponse, ApiError> {
    Ok(state.upstream().send(Method::GET, resource.collection, query, None).await?)
}

/// GET /api/enjoy/<resource>/:id
pub async fn show(state: &AppState, resource: ProxyResource, id: i64) -> Result<UpstreamResponse, ApiError> {
    let path = format!("{}/{}", resource.item, id);
    Ok(state.upstream().send(Method::GET, &path, None, None).await?)
}

/// POST /api/enjoy/<resource>
pub async fn create(state: &AppState, resource: ProxyResource, body: Value) -> Result<UpstreamResponse, ApiError> {
    Ok(state.upstream().send(Method::POST, resource.item, None, Some(body)).await?)
}

/// PUT /api/enjoy/<resource>/:id
pub async fn update(
    state: &AppState,
    resource: ProxyResource,
    id: i64,
    body: Value,
) -> Result<UpstreamResponse, ApiError> {
    let path = format!("{}/{}", resource.item, id);
    Ok(state.upstream().send(Method::PUT, &path, None, Some(body)).await?)
}

/// DELETE /api/enjoy/<resource>/:id
pub async fn destroy(state: &AppState, resource: ProxyResource, id: i64) -> Result<UpstreamResponse, ApiError> {
    let path = format!("{}/{}", resource.item, id);
    Ok(state.upstream().send(Method::DELETE, &path, None, None).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use reqwest::StatusCode;

    #[tokio::test]
    async fn raw_upstream_bodies_keep_status_and_content_type() {
        let response = UpstreamResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: UpstreamBody::Raw {
                content_type: "text/plain; charset=utf-8".into(),
                bytes: Bytes::from_static(b"maintenance"),
            },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"maintenance");
    }

    #[tokio::test]
    async fn json_upstream_bodies_are_relayed() {
        let response = UpstreamResponse {
            status: StatusCode::NOT_FOUND,
            body: UpstreamBody::Json(serde_json::json!({ "missing": 7 })),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), serde_json::json!({ "missing": 7 }));
    }
}
