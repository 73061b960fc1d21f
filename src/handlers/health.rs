// Public handlers: no bearer token required

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "status": 200,
        "data": {
            "name": "Catalog API",
            "version": version,
            "endpoints": {
                "catalog": "/api/{categories,colors,coupons,attributes,products,customers,orders}[/:id]",
                "attribute_values": "/api/attributes/:id/values, /api/attribute-values/:id",
                "variants": "/api/products/:id/variants, /api/product-variants/:id",
                "upstream": "/api/enjoy/{clients,orders,products}[/:id]",
                "health": "/health (public)",
            }
        }
    }))
}

/// GET /health - database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let upstream = if state.upstream().is_configured() {
        "configured"
    } else {
        "not configured"
    };

    match DatabaseManager::health_check(state.pool()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": 200,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "upstream": upstream,
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "status": 503,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
