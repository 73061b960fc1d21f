use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Attribute, AttributeInput, AttributeValue, AttributeValueInput, Attributes};
use crate::database::{transaction, TableSource};
use crate::error::ApiError;
use crate::format::datetime;
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct AttributeBody {
    #[serde(rename = "Attribute", default)]
    pub attribute: AttributeInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributeValueBody {
    #[serde(rename = "AttributeValue", default)]
    pub value: AttributeValueInput,
}

#[derive(Debug, Serialize)]
pub struct AttributeView {
    pub id: i64,
    pub name: String,
    /// `"S, M, L"`
    pub values: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Attribute> for AttributeView {
    fn from(a: Attribute) -> Self {
        Self {
            id: a.id,
            name: a.name,
            values: a.value_list.unwrap_or_default(),
            created_at: datetime(&a.created_at),
            updated_at: datetime(&a.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttributeValueView {
    pub id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub color_code: Option<String>,
}

impl From<AttributeValue> for AttributeValueView {
    fn from(v: AttributeValue) -> Self {
        Self {
            id: v.id,
            attribute_id: v.attribute_id,
            value: v.value,
            color_code: v.color_code,
        }
    }
}

/// GET /api/attributes - list attributes with their values joined
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListPage<AttributeView>> {
    let source = TableSource::<Attribute>::new(state.pool(), Attributes::LIST_SQL);
    let page = state
        .lists()
        .list(&source, &query, Attributes::SORTABLE, AttributeView::from)
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/attributes/:id - show one attribute and its values
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let Some(attribute) = Attributes::find(state.pool(), id).await? else {
        return Ok(ApiResponse::not_found("Attribute not found"));
    };
    let values: Vec<AttributeValueView> = Attributes::values_of(state.pool(), id)
        .await?
        .into_iter()
        .map(AttributeValueView::from)
        .collect();

    Ok(ApiResponse::success(json!({
        "Attribute": AttributeView::from(attribute),
        "AttributeValues": values,
    })))
}

/// POST /api/attributes - create an attribute
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<AttributeBody>) -> CreatedResult {
    let input = body.attribute;

    let mut v = Validator::new();
    v.required_str("name", input.name.as_ref()).max_len("name", input.name.as_ref(), 255);
    v.finish()?;

    let name = input.name.unwrap_or_default();
    let id = transaction(state.pool(), move |conn| {
        Box::pin(async move { Attributes::insert(conn, &name).await })
    })
    .await?;

    tracing::info!("Created attribute {}", id);
    Ok(Created::new("Attribute Created Successfully", "attribute_id", id))
}

/// PUT /api/attributes/:id - rename an attribute
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<AttributeBody>,
) -> ApiResult {
    let input = body.attribute;

    let mut v = Validator::new();
    v.filled("name", input.name.as_ref()).max_len("name", input.name.as_ref(), 255);
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Attributes::update(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Attribute not found"));
    }
    Ok(ApiResponse::updated("Attribute Updated Successfully"))
}

/// DELETE /api/attributes/:id - delete an attribute that has no values left
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    if !Attributes::exists(state.pool(), id).await? {
        return Ok(ApiResponse::not_found("Attribute not found"));
    }
    let remaining = Attributes::value_count(state.pool(), id).await?;
    if remaining > 0 {
        return Err(ApiError::field(
            "attribute",
            format!("The attribute still has {} value(s); delete them first.", remaining),
        ));
    }

    let deleted = transaction(state.pool(), move |conn| Box::pin(Attributes::delete(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Attribute not found"));
    }
    Ok(ApiResponse::deleted("Attribute Deleted Successfully"))
}

/// GET /api/attributes/:id/values - list one attribute's values
pub async fn values(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    if !Attributes::exists(state.pool(), id).await? {
        return Ok(ApiResponse::not_found("Attribute not found"));
    }
    let source = TableSource::<AttributeValue>::new(state.pool(), Attributes::VALUES_SQL).scoped("attribute_id", id);
    let page = state
        .lists()
        .list(&source, &query, Attributes::VALUES_SORTABLE, AttributeValueView::from)
        .await?;
    let data = serde_json::to_value(page).map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    Ok(ApiResponse::success(data))
}

/// POST /api/attributes/:id/values - add a value to an attribute
pub async fn store_value(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<AttributeValueBody>,
) -> Result<Response, ApiError> {
    if !Attributes::exists(state.pool(), id).await? {
        return Ok(ApiResponse::not_found("Attribute not found").into_response());
    }
    let input = body.value;

    let mut v = Validator::new();
    v.required_str("value", input.value.as_ref())
        .max_len("value", input.value.as_ref(), 255)
        .max_len("color_code", input.color_code.as_ref(), 16);
    if let Some(value) = input.value.as_deref().filter(|s| !s.trim().is_empty()) {
        if Attributes::value_taken(state.pool(), id, value).await? {
            v.taken("value");
        }
    }
    v.finish()?;

    let value_id = transaction(state.pool(), move |conn| Box::pin(Attributes::insert_value(conn, id, input))).await?;

    tracing::info!("Added value {} to attribute {}", value_id, id);
    Ok(Created::new("Attribute Value Created Successfully", "attribute_value_id", value_id).into_response())
}

/// DELETE /api/attribute-values/:id - delete one attribute value
pub async fn destroy_value(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| Box::pin(Attributes::delete_value(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Attribute Value not found"));
    }
    Ok(ApiResponse::deleted("Attribute Value Deleted Successfully"))
}
