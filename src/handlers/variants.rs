use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{ProductVariant, ProductVariantInput, Products};
use crate::database::{transaction, TableSource};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Created};
use crate::query::ListQuery;
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct VariantBody {
    #[serde(rename = "ProductVariant", default)]
    pub variant: ProductVariantInput,
}

#[derive(Debug, Serialize)]
pub struct VariantView {
    pub id: i64,
    pub product_id: i64,
    pub variant: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub qty: i64,
    pub image: Option<String>,
}

impl From<ProductVariant> for VariantView {
    fn from(v: ProductVariant) -> Self {
        Self {
            id: v.id,
            product_id: v.product_id,
            variant: v.variant,
            sku: v.sku,
            price: v.price,
            qty: v.qty,
            image: v.image,
        }
    }
}

fn check_fields(v: &mut Validator, input: &ProductVariantInput) {
    v.max_len("variant", input.variant.as_ref(), 255)
        .max_len("sku", input.sku.as_ref(), 255)
        .non_negative("price", input.price.as_ref())
        .min_int("qty", input.qty.as_ref(), 0);
}

/// GET /api/products/:id/variants - list one product's variants
pub async fn index(
    State(state): State<AppState>,
    RecordId(product_id): RecordId,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    if !Products::exists(state.pool(), product_id).await? {
        return Ok(ApiResponse::not_found("Product not found"));
    }
    let source =
        TableSource::<ProductVariant>::new(state.pool(), Products::VARIANTS_SQL).scoped("product_id", product_id);
    let page = state
        .lists()
        .list(&source, &query, Products::VARIANTS_SORTABLE, VariantView::from)
        .await?;
    let data = serde_json::to_value(page).map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    Ok(ApiResponse::success(data))
}

/// POST /api/products/:id/variants - add a variant to a product
pub async fn store(
    State(state): State<AppState>,
    RecordId(product_id): RecordId,
    JsonBody(body): JsonBody<VariantBody>,
) -> Result<Response, ApiError> {
    if !Products::exists(state.pool(), product_id).await? {
        return Ok(ApiResponse::not_found("Product not found").into_response());
    }
    let input = body.variant;

    let mut v = Validator::new();
    v.required_str("variant", input.variant.as_ref())
        .required("price", input.price.as_ref());
    check_fields(&mut v, &input);
    if let Some(variant) = input.variant.as_deref().filter(|s| !s.trim().is_empty()) {
        if Products::variant_taken(state.pool(), product_id, variant, None).await? {
            v.taken("variant");
        }
    }
    v.finish()?;

    let id = transaction(state.pool(), move |conn| {
        Box::pin(Products::insert_variant(conn, product_id, input))
    })
    .await?;

    tracing::info!("Created variant {} for product {}", id, product_id);
    Ok(Created::new("Product Variant Created Successfully", "product_variant_id", id).into_response())
}

/// GET /api/product-variants/:id - show one variant
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    match Products::find_variant(state.pool(), id).await? {
        Some(variant) => Ok(ApiResponse::success(json!({ "ProductVariant": VariantView::from(variant) }))),
        None => Ok(ApiResponse::not_found("Product Variant not found")),
    }
}

/// PUT /api/product-variants/:id - update a variant
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<VariantBody>,
) -> ApiResult {
    let Some(existing) = Products::find_variant(state.pool(), id).await? else {
        return Ok(ApiResponse::not_found("Product Variant not found"));
    };
    let input = body.variant;

    let mut v = Validator::new();
    v.filled("variant", input.variant.as_ref());
    check_fields(&mut v, &input);
    if let Some(variant) = input.variant.as_deref().filter(|s| !s.trim().is_empty()) {
        if Products::variant_taken(state.pool(), existing.product_id, variant, Some(id)).await? {
            v.taken("variant");
        }
    }
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Products::update_variant(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Product Variant not found"));
    }
    Ok(ApiResponse::updated("Product Variant Updated Successfully"))
}

/// DELETE /api/product-variants/:id - delete a variant
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| Box::pin(Products::delete_variant(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Product Variant not found"));
    }
    Ok(ApiResponse::deleted("Product Variant Deleted Successfully"))
}
