use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::database::models::{Order, OrderDetail, OrderStatusInput, Orders};
use crate::database::{transaction, TableSource};
use crate::format::{datetime, epoch_to_ymd};
use crate::middleware::{ApiResponse, ApiResult};
use crate::query::{ListPage, ListQuery};
use crate::state::AppState;
use crate::validation::Validator;

use super::params::{JsonBody, RecordId};

#[derive(Debug, Default, Deserialize)]
pub struct OrderBody {
    #[serde(rename = "Order", default)]
    pub order: OrderStatusInput,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub code: String,
    pub user_id: Option<i64>,
    pub customer_name: String,
    /// `Y-m-d`
    pub date: String,
    pub grand_total: Decimal,
    pub num_of_products: i64,
    pub payment_type: Option<String>,
    pub payment_status: String,
    pub delivery_status: String,
    pub shipping_address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderView {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            code: o.code,
            user_id: o.user_id,
            customer_name: o.customer_name.unwrap_or_else(|| "Guest".to_string()),
            date: epoch_to_ymd(o.date),
            grand_total: o.grand_total,
            num_of_products: o.num_of_products,
            payment_type: o.payment_type,
            payment_status: o.payment_status,
            delivery_status: o.delivery_status,
            shipping_address: o.shipping_address,
            created_at: datetime(&o.created_at),
            updated_at: datetime(&o.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailView {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub variation: Option<String>,
    pub price: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub quantity: i64,
}

impl From<OrderDetail> for OrderDetailView {
    fn from(d: OrderDetail) -> Self {
        Self {
            id: d.id,
            product_id: d.product_id,
            product_name: d.product_name.unwrap_or_default(),
            variation: d.variation,
            price: d.price,
            tax: d.tax,
            shipping_cost: d.shipping_cost,
            quantity: d.quantity,
        }
    }
}

/// GET /api/orders - list orders
pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<ListPage<OrderView>> {
    let source = TableSource::<Order>::new(state.pool(), Orders::LIST_SQL);
    let page = state.lists().list(&source, &query, Orders::SORTABLE, OrderView::from).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/orders/:id - show one order with its line items
pub async fn show(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult {
    let Some(order) = Orders::find(state.pool(), id).await? else {
        return Ok(ApiResponse::not_found("Order not found"));
    };
    let details: Vec<OrderDetailView> = Orders::details_of(state.pool(), id)
        .await?
        .into_iter()
        .map(OrderDetailView::from)
        .collect();

    Ok(ApiResponse::success(json!({
        "Order": OrderView::from(order),
        "OrderDetails": details,
    })))
}

/// PUT /api/orders/:id - change payment and/or delivery status
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody<OrderBody>,
) -> ApiResult {
    let input = body.order;

    let mut v = Validator::new();
    v.one_of("payment_status", input.payment_status.as_ref(), Orders::PAYMENT_STATUSES)
        .one_of("delivery_status", input.delivery_status.as_ref(), Orders::DELIVERY_STATUSES);
    if input.payment_status.is_none() && input.delivery_status.is_none() {
        v.add("payment_status", "The payment status field is required when delivery status is not present.");
    }
    v.finish()?;

    let updated = transaction(state.pool(), move |conn| Box::pin(Orders::update_status(conn, id, input))).await?;
    if updated == 0 {
        return Ok(ApiResponse::not_found("Order not found"));
    }
    tracing::info!("Updated status of order {}", id);
    Ok(ApiResponse::updated("Order Updated Successfully"))
}
