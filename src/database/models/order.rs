use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: Option<i64>,
    pub code: String,
    pub date: i64,
    pub grand_total: Decimal,
    pub payment_type: Option<String>,
    pub payment_status: String,
    pub delivery_status: String,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub num_of_products: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub variation: Option<String>,
    pub price: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub quantity: i64,
}

/// Orders are placed elsewhere; this API only moves their statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderStatusInput {
    pub payment_status: Option<String>,
    pub delivery_status: Option<String>,
}

pub struct Orders;

const SELECT: &str = "SELECT o.id, o.user_id, o.code, o.date, o.grand_total, o.payment_type, \
     o.payment_status, o.delivery_status, o.shipping_address, o.created_at, o.updated_at, \
     (SELECT u.name FROM users u WHERE u.id = o.user_id) AS customer_name, \
     (SELECT COUNT(*) FROM order_details d WHERE d.order_id = o.id) AS num_of_products \
     FROM orders o";

impl Orders {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] = &[
        "id",
        "code",
        "date",
        "customer_name",
        "grand_total",
        "payment_status",
        "delivery_status",
        "num_of_products",
        "created_at",
    ];
    pub const PAYMENT_STATUSES: &'static [&'static str] = &["paid", "unpaid"];
    pub const DELIVERY_STATUSES: &'static [&'static str] =
        &["pending", "confirmed", "picked_up", "on_the_way", "delivered", "cancelled"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Order>, sqlx::Error> {
        let sql = format!("{} WHERE o.id = $1", SELECT);
        sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn details_of(pool: &PgPool, order_id: i64) -> Result<Vec<OrderDetail>, sqlx::Error> {
        sqlx::query_as::<_, OrderDetail>(
            "SELECT d.id, d.order_id, d.product_id, \
             (SELECT p.name FROM products p WHERE p.id = d.product_id) AS product_name, \
             d.variation, d.price, d.tax, d.shipping_cost, d.quantity \
             FROM order_details d WHERE d.order_id = $1 ORDER BY d.id",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: i64,
        input: OrderStatusInput,
    ) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("orders");
        update
            .set("payment_status", input.payment_status)
            .set("delivery_status", input.delivery_status);
        update.execute(conn, id).await
    }
}
