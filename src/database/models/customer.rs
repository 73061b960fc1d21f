use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

/// A `users` row with `user_type = 'customer'`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub banned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub banned: Option<bool>,
}

pub struct Customers;

const SELECT: &str = "SELECT u.id, u.name, u.email, u.phone, u.banned, u.created_at, u.updated_at, \
     (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) AS order_count \
     FROM users u WHERE u.user_type = 'customer'";

impl Customers {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] =
        &["id", "name", "email", "phone", "banned", "order_count", "created_at"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Customer>, sqlx::Error> {
        let sql = format!("{} AND u.id = $1", SELECT);
        sqlx::query_as::<_, Customer>(&sql).bind(id).fetch_optional(pool).await
    }

    /// Emails are unique across all users, not only customers.
    pub async fn email_taken(pool: &PgPool, email: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    pub async fn insert(conn: &mut PgConnection, input: CustomerInput) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (user_type, name, email, phone, banned) \
             VALUES ('customer', $1, $2, $3, $4) RETURNING id",
        )
        .bind(input.name.unwrap_or_default())
        .bind(input.email.unwrap_or_default())
        .bind(input.phone)
        .bind(input.banned.unwrap_or(false))
        .fetch_one(conn)
        .await
    }

    pub async fn update(conn: &mut PgConnection, id: i64, input: CustomerInput) -> Result<u64, sqlx::Error> {
        // Staff rows live in the same table; only customer rows are editable here
        let is_customer = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND user_type = 'customer')",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
        if !is_customer {
            return Ok(0);
        }

        let mut update = UpdateBuilder::with_timestamps("users");
        update
            .set("name", input.name)
            .set("email", input.email)
            .set("phone", input.phone)
            .set("banned", input.banned);
        update.execute(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND user_type = 'customer'")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
