use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Coupon {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub details: Option<String>,
    pub discount: Decimal,
    pub discount_type: String,
    pub start_date: i64,
    pub end_date: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub usage_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<String>,
    /// `Y-m-d`
    pub start_date: Option<String>,
    /// `Y-m-d`
    pub end_date: Option<String>,
}

/// Validated values ready to be written; dates already converted to epoch
/// seconds.
#[derive(Debug, Clone, Default)]
pub struct CouponValues {
    pub kind: Option<String>,
    pub code: Option<String>,
    pub details: Option<String>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

pub struct Coupons;

const SELECT: &str = "SELECT c.id, c.type, c.code, c.details, c.discount, c.discount_type, \
     c.start_date, c.end_date, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM coupon_usages u WHERE u.coupon_id = c.id) AS usage_count \
     FROM coupons c";

impl Coupons {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] = &[
        "id",
        "code",
        "type",
        "discount",
        "discount_type",
        "start_date",
        "end_date",
        "usage_count",
        "created_at",
    ];
    pub const DISCOUNT_TYPES: &'static [&'static str] = &["amount", "percent"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Coupon>, sqlx::Error> {
        let sql = format!("{} WHERE c.id = $1", SELECT);
        sqlx::query_as::<_, Coupon>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn code_taken(pool: &PgPool, code: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM coupons WHERE code = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    pub async fn insert(conn: &mut PgConnection, values: CouponValues) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO coupons (type, code, details, discount, discount_type, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(values.kind.unwrap_or_else(|| "cart_base".to_string()))
        .bind(values.code.unwrap_or_default())
        .bind(values.details)
        .bind(values.discount.unwrap_or_default())
        .bind(values.discount_type.unwrap_or_else(|| "amount".to_string()))
        .bind(values.start_date.unwrap_or_default())
        .bind(values.end_date.unwrap_or_default())
        .fetch_one(conn)
        .await
    }

    pub async fn update(conn: &mut PgConnection, id: i64, values: CouponValues) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("coupons");
        update
            .set("type", values.kind)
            .set("code", values.code)
            .set("details", values.details)
            .set("discount", values.discount)
            .set("discount_type", values.discount_type)
            .set("start_date", values.start_date)
            .set("end_date", values.end_date);
        update.execute(conn, id).await
    }

    /// Usage rows go first so the coupon row can be removed. Returns the
    /// number of coupon rows deleted.
    pub async fn delete_with_usages(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let usages = sqlx::query("DELETE FROM coupon_usages WHERE coupon_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        tracing::debug!("Removed {} usage rows for coupon {}", usages.rows_affected(), id);

        let result = sqlx::query("DELETE FROM coupons WHERE id = $1").bind(id).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }
}
