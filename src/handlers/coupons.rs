use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Coupon, CouponInput, CouponValues, Coupons};
use crate::database::{transaction, TableSource};
use crate::format::{datetime, discount_symbol, epoch_to_ymd, ymd_to_epoch};
use crate::middleware::{ApiResponse, ApiResult, Created, CreatedResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

const TYPES: &[&str] = &["cart_base", "product_base"];

#[derive(Debug, Default, Deserialize)]
pub struct CouponBody {
    #[serde(rename = "Coupon", default)]
    pub coupon: CouponInput,
}

#[derive(Debug, Serialize)]
pub struct CouponView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub details: Option<String>,
    pub discount: Decimal,
    /// `%` or the store currency symbol
    pub discount_type: String,
    pub start_date: String,
    pub end_date: String,
    pub usage_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl CouponView {
    fn new(c: Coupon, currency_symbol: &str) -> Self {
        Self {
            id: c.id,
            kind: c.kind,
            code: c.code,
            details: c.details,
            discount: c.discount,
            discount_type: discount_symbol(&c.discount_type, currency_symbol),
            start_date: epoch_to_ymd(c.start_date),
            end_date: epoch_to_ymd(c.end_date),
            usage_count: c.usage_count,
            created_at: datetime(&c.created_at),
            updated_at: datetime(&c.updated_at),
        }
    }
}

fn check_fields(v: &mut Validator, input: &CouponInput) {
    v.one_of("type", input.kind.as_ref(), TYPES)
        .max_len("code", input.code.as_ref(), 255)
        .non_negative("discount", input.discount.as_ref())
        .one_of("discount_type", input.discount_type.as_ref(), Coupons::DISCOUNT_TYPES)
        .date("start_date", input.start_date.as_ref())
        .date("end_date", input.end_date.as_ref());

    if input.discount_type.as_deref() == Some("percent")
        && input.discount.is_some_and(|d| d > Decimal::ONE_HUNDRED)
    {
        v.add("discount", "The discount may not be greater than 100.");
    }

    let start = input.start_date.as_deref().and_then(ymd_to_epoch);
    let end = input.end_date.as_deref().and_then(ymd_to_epoch);
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            v.add("end_date", "The end date must be a date after or equal to start date.");
        }
    }
}

fn into_values(input: CouponInput) -> CouponValues {
    CouponValues {
        start_date: input.start_date.as_deref().and_then(ymd_to_epoch),
        end_date: input.end_date.as_deref().and_then(ymd_to_epoch),
        kind: input.kind,
        code: input.code,
        details: input.details,
        discount: input.discount,
        discount_type: input.discount_type,
    }
}

/// GET /api/coupons - list coupons
pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<ListPage<CouponView>> {
    let source = TableSource::<Coupon>::new(state.pool(), Coupons::LIST_SQL);
    let currency = state.currency_symbol().to_string();
    let page = state
        .lists()
        .list(&source, &query, Coupons::SORTABLE, |c| CouponView::new(c, &currency))
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/coupons/:id - show one coupon
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    match Coupons::find(state.pool(), id).await? {
        Some(coupon) => {
            let view = CouponView::new(coupon, state.currency_symbol());
            Ok(ApiResponse::success(json!({ "Coupon": view })))
        }
        None => Ok(ApiResponse::not_found("Coupon not found")),
    }
}

/// POST /api/coupons - create a coupon
pub async fn store(State(state): State<AppState>, JsonBody(body): JsonBody<CouponBody>) -> CreatedResult {
    let input = body.coupon;

    let mut v = Validator::new();
    v.required_str("type", input.kind.as_ref())
        .required_str("code", input.code.as_ref())
        .required("discount", input.discount.as_ref())
        .required_str("discount_type", input.discount_type.as_ref())
        .required_str("start_date", input.start_date.as_ref())
        .required_str("end_date", input.end_date.as_ref());
    check_fields(&mut v, &input);
    if let Some(code) = input.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if Coupons::code_taken(state.pool(), code, None).await? {
            v.taken("code");
        }
    }
    v.finish()?;

    let values = into_values(input);
    let id = transaction(state.pool(), move |conn| Box::pin(Coupons::insert(conn, values))).await?;

    tracing::info!("Created coupon {}", id);
    Ok(Created::new("Coupon Created Successfully", "coupon_id", id))
}

/// PUT /api/coupons/:id - update a coupon
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<CouponBody>,
) -> ApiResult {
    let input = body.coupon;

    let mut v = Validator::new();
    v.filled("code", input.code.as_ref());
    check_fields(&mut v, &input);
    if let Some(code) = input.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if Coupons::code_taken(state.pool(), code, Some(id)).await? {
            v.taken("code");
        }
    }
    v.finish()?;

    let values = into_values(input);
    let updated = transaction(state.pool(), move |conn| Box::pin(Coupons::update(conn, id, values))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Coupon not found"));
    }
    Ok(ApiResponse::updated("Coupon Updated Successfully"))
}

/// DELETE /api/coupons/:id - delete a coupon and its usage rows
pub async fn destroy(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let deleted = transaction(state.pool(), move |conn| {
        Box::pin(Coupons::delete_with_usages(conn, id))
    })
    .await?;
    if deleted == 0 {
        return Ok(ApiResponse::not_found("Coupon not found"));
    }
    Ok(ApiResponse::deleted("Coupon Deleted Successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(start: &str, end: &str) -> CouponInput {
        CouponInput {
            kind: Some("cart_base".into()),
            code: Some("SAVE10".into()),
            discount: Some(Decimal::new(10, 0)),
            discount_type: Some("percent".into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut v = Validator::new();
        check_fields(&mut v, &input("2024-05-10", "2024-05-01"));
        assert!(v.has_errors());

        let mut v = Validator::new();
        check_fields(&mut v, &input("2024-05-01", "2024-05-10"));
        assert!(!v.has_errors());
    }

    #[test]
    fn dates_are_stored_as_epoch_seconds() {
        let values = into_values(input("2024-03-15", "2024-03-16"));
        assert_eq!(values.start_date, Some(1_710_460_800));
        assert_eq!(values.end_date, Some(1_710_547_200));
    }
}
