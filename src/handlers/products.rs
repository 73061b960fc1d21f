use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Product, ProductInput, Products};
use crate::database::{transaction, TableSource};
use crate::error::ApiError;
use crate::format::{datetime, discount_symbol, slugify};
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};
use super::variants::VariantView;

const DISCOUNT_TYPES: &[&str] = &["amount", "percent"];

#[derive(Debug, Default, Deserialize)]
pub struct ProductBody {
    #[serde(rename = "Product", default)]
    pub product: ProductInput,
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub added_by: String,
    pub category_id: Option<i64>,
    pub category_name: String,
    pub brand_id: Option<i64>,
    pub brand_name: String,
    pub thumbnail_img: Option<String>,
    pub unit_price: Decimal,
    pub purchase_price: Option<Decimal>,
    pub discount: Decimal,
    /// `%` or the store currency symbol
    pub discount_type: String,
    pub current_stock: i64,
    pub unit: Option<String>,
    pub min_qty: i64,
    pub published: bool,
    pub featured: bool,
    pub tags: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProductView {
    fn new(p: Product, currency_symbol: &str) -> Self {
        Self {
            id: p.id,
            name: p.name,
            added_by: p.added_by,
            category_id: p.category_id,
            category_name: p.category_name.unwrap_or_default(),
            brand_id: p.brand_id,
            brand_name: p.brand_name.unwrap_or_default(),
            thumbnail_img: p.thumbnail_img,
            unit_price: p.unit_price,
            purchase_price: p.purchase_price,
            discount: p.discount,
            discount_type: discount_symbol(&p.discount_type, currency_symbol),
            current_stock: p.current_stock,
            unit: p.unit,
            min_qty: p.min_qty,
            published: p.published,
            featured: p.featured,
            tags: p.tags,
            description: p.description,
            slug: p.slug,
            created_at: datetime(&p.created_at),
            updated_at: datetime(&p.updated_at),
        }
    }
}

/// Field-level checks shared by create and update, plus the foreign keys.
async fn check_fields(state: &AppState, v: &mut Validator, input: &ProductInput) -> Result<(), ApiError> {
    v.max_len("name", input.name.as_ref(), 200)
        .max_len("unit", input.unit.as_ref(), 32)
        .max_len("slug", input.slug.as_ref(), 255)
        .non_negative("unit_price", input.unit_price.as_ref())
        .non_negative("purchase_price", input.purchase_price.as_ref())
        .non_negative("discount", input.discount.as_ref())
        .one_of("discount_type", input.discount_type.as_ref(), DISCOUNT_TYPES)
        .min_int("current_stock", input.current_stock.as_ref(), 0)
        .min_int("min_qty", input.min_qty.as_ref(), 1);

    if let Some(category_id) = input.category_id {
        if !Products::category_exists(state.pool(), category_id).await? {
            v.add("category_id", "The selected category id is invalid.");
        }
    }
    if let Some(brand_id) = input.brand_id {
        if !Products::brand_exists(state.pool(), brand_id).await? {
            v.add("brand_id", "The selected brand id is invalid.");
        }
    }
    Ok(())
}

/// GET /api/products - list products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ListPage<ProductView>> {
    let source = TableSource::<Product>::new(state.pool(), Products::LIST_SQL);
    let currency = state.currency_symbol().to_string();
    let page = state
        .lists()
        .list(&source, &query, Products::SORTABLE, |p| ProductView::new(p, &currency))
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/products/:id - show one product with its variants
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let Some(product) = Products::find(state.pool(), id).await? else {
        return Ok(ApiResponse::not_found("Product not found"));
    };
    let variants: Vec<VariantView> = Products::variants_of(state.pool(), id)
        .await?
        .into_iter()
        .map(VariantView::from)
        .collect();

    Ok(ApiResponse::success(json!({
        "Product": ProductView::new(product, state.currency_symbol()),
        "ProductVariants": variants,
    })))
}

/// POST /api/products - create a product
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<ProductBody>) -> CreatedResult {
    let input = body.product;

    let mut v = Validator::new();
    v.required_str("name", input.name.as_ref())
        .required("category_id", input.category_id.as_ref())
        .required("unit_price", input.unit_price.as_ref());
    check_fields(&state, &mut v, &input).await?;
    v.finish()?;

    let slug = input
        .slug
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(input.name.as_deref().unwrap_or_default()));

    let id = transaction(state.pool(), move |conn| Box::pin(Products::insert(conn, input, slug))).await?;

    tracing::info!("Created product {}", id);
    Ok(Created::new("Product Created Successfully", "product_id", id))
}

/// PUT /api/products/:id - update a product
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<ProductBody>,
) -> ApiResult {
    let input = body.product;

    let mut v = Validator::new();
    v.filled("name", input.name.as_ref());
    check_fields(&state, &mut v, &input).await?;
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Products::update(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Product not found"));
    }
    Ok(ApiResponse::updated("Product Updated Successfully"))
}

/// DELETE /api/products/:id - delete a product that has no variants left
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    if !Products::exists(state.pool(), id).await? {
        return Ok(ApiResponse::not_found("Product not found"));
    }
    let remaining = Products::variant_count(state.pool(), id).await?;
    if remaining > 0 {
        return Err(ApiError::field(
            "product",
            format!("The product still has {} variant(s); delete them first.", remaining),
        ));
    }

    let deleted = transaction(state.pool(), move |conn| Box::pin(Products::delete(conn, id))).await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Product not found"));
    }
    Ok(ApiResponse::deleted("Product Deleted Successfully"))
}
