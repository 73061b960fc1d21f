use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Categories, Category, CategoryInput};
use crate::database::{transaction, TableSource};
use crate::error::ApiError;
use crate::format::{datetime, slugify};
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct CategoryBody {
    #[serde(rename = "Category", default)]
    pub category: CategoryInput,
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub parent_id: i64,
    /// Display name of the parent, empty for top-level categories
    pub parent_name: String,
    pub level: i32,
    pub order_level: i32,
    pub banner: Option<String>,
    pub icon: Option<String>,
    pub featured: bool,
    pub top: bool,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryView {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            parent_id: c.parent_id,
            parent_name: c.parent_name.unwrap_or_default(),
            level: c.level,
            order_level: c.order_level,
            banner: c.banner,
            icon: c.icon,
            featured: c.featured,
            top: c.top,
            slug: c.slug,
            meta_title: c.meta_title,
            meta_description: c.meta_description,
            created_at: datetime(&c.created_at),
            updated_at: datetime(&c.updated_at),
        }
    }
}

fn check_fields(v: &mut Validator, input: &CategoryInput) {
    v.max_len("name", input.name.as_ref(), 255)
        .max_len("slug", input.slug.as_ref(), 255)
        .max_len("meta_title", input.meta_title.as_ref(), 255);
    if input.parent_id.is_some_and(|p| p < 0) {
        v.add("parent_id", "The selected parent id is invalid.");
    }
}

/// Level for a category placed under `parent_id`; 0 means top level.
/// Records a validation error when the parent does not exist.
async fn level_under(state: &AppState, v: &mut Validator, parent_id: i64) -> Result<i32, ApiError> {
    if parent_id <= 0 {
        return Ok(0);
    }
    match Categories::level_of(state.pool(), parent_id).await? {
        Some(level) => Ok(level + 1),
        None => {
            v.add("parent_id", "The selected parent id is invalid.");
            Ok(0)
        }
    }
}

/// GET /api/categories - list categories
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListPage<CategoryView>> {
    let source = TableSource::<Category>::new(state.pool(), Categories::LIST_SQL);
    let page = state
        .lists()
        .list(&source, &query, Categories::SORTABLE, CategoryView::from)
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/categories/:id - show one category
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    match Categories::find(state.pool(), id).await? {
        Some(category) => Ok(ApiResponse::success(json!({ "Category": CategoryView::from(category) }))),
        None => Ok(ApiResponse::not_found("Category not found")),
    }
}

/// POST /api/categories - create a category
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<CategoryBody>) -> CreatedResult {
    let input = body.category;

    let mut v = Validator::new();
    v.required_str("name", input.name.as_ref());
    check_fields(&mut v, &input);
    let level = level_under(&state, &mut v, input.parent_id.unwrap_or(0)).await?;
    v.finish()?;

    let slug = input
        .slug
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(input.name.as_deref().unwrap_or_default()));

    let id = transaction(state.pool(), move |conn| {
        Box::pin(Categories::insert(conn, input, level, slug))
    })
    .await?;

    tracing::info!("Created category {} at level {}", id, level);
    Ok(Created::new("Category Created Successfully", "category_id", id))
}

/// PUT /api/categories/:id - update a category; moving it re-levels its subtree
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<CategoryBody>,
) -> ApiResult {
    let input = body.category;

    let mut v = Validator::new();
    v.filled("name", input.name.as_ref());
    check_fields(&mut v, &input);
    if input.parent_id == Some(id) {
        v.add("parent_id", "A category cannot be its own parent.");
    } else if let Some(parent_id) = input.parent_id.filter(|p| *p > 0) {
        if Categories::is_descendant(state.pool(), id, parent_id).await? {
            v.add("parent_id", "A category cannot be moved under one of its own subcategories.");
        }
    }
    let level = match input.parent_id {
        Some(parent_id) => Some(level_under(&state, &mut v, parent_id).await?),
        None => None,
    };
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| {
        Box::pin(Categories::update(conn, id, input, level))
    })
    .await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Category not found"));
    }
    Ok(ApiResponse::updated("Category Updated Successfully"))
}

/// DELETE /api/categories/:id - delete a category
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| Box::pin(Categories::delete(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Category not found"));
    }
    Ok(ApiResponse::deleted("Category Deleted Successfully"))
}
