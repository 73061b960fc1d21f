use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Color, ColorInput, Colors};
use crate::database::{transaction, TableSource};
use crate::format::datetime;
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct ColorBody {
    #[serde(rename = "Color", default)]
    pub color: ColorInput,
}

#[derive(Debug, Serialize)]
pub struct ColorView {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Color> for ColorView {
    fn from(color: Color) -> Self {
        Self {
            id: color.id,
            name: color.name,
            code: color.code,
            created_at: datetime(&color.created_at),
            updated_at: datetime(&color.updated_at),
        }
    }
}

/// GET /api/colors - list colors
pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<ListPage<ColorView>> {
    let source = TableSource::<Color>::new(state.pool(), Colors::LIST_SQL);
    let page = state.lists().list(&source, &query, Colors::SORTABLE, ColorView::from).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/colors/:id - show one color
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    match Colors::find(state.pool(), id).await? {
        Some(color) => Ok(ApiResponse::success(json!({ "Color": ColorView::from(color) }))),
        None => Ok(ApiResponse::not_found("Color not found")),
    }
}

/// POST /api/colors - create a color
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<ColorBody>) -> CreatedResult {
    let input = body.color;

    let mut v = Validator::new();
    v.required_str("name", input.name.as_ref())
        .max_len("name", input.name.as_ref(), 255)
        .required_str("code", input.code.as_ref())
        .max_len("code", input.code.as_ref(), 255);
    if let Some(code) = input.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if Colors::code_taken(state.pool(), code, None).await? {
            v.taken("code");
        }
    }
    v.finish()?;

    let name = input.name.unwrap_or_default();
    let code = input.code.unwrap_or_default();
    let id = transaction(state.pool(), move |conn| {
        Box::pin(async move { Colors::insert(conn, &name, &code).await })
    })
    .await?;

    tracing::info!("Created color {}", id);
    Ok(Created::new("Color Created Successfully", "color_id", id))
}

/// PUT /api/colors/:id - update a color
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<ColorBody>,
) -> ApiResult {
    let input = body.color;

    let mut v = Validator::new();
    v.filled("name", input.name.as_ref())
        .max_len("name", input.name.as_ref(), 255)
        .filled("code", input.code.as_ref())
        .max_len("code", input.code.as_ref(), 255);
    if let Some(code) = input.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if Colors::code_taken(state.pool(), code, Some(id)).await? {
            v.taken("code");
        }
    }
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Colors::update(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Color not found"));
    }
    Ok(ApiResponse::updated("Color Updated Successfully"))
}

/// DELETE /api/colors/:id - delete a color
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| Box::pin(Colors::delete(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Color not found"));
    }
    Ok(ApiResponse::deleted("Color Deleted Successfully"))
}
