use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Color {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{"Color": {...}}` fields. Every field is optional so that create and
/// update share one shape; create checks required-ness itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorInput {
    pub name: Option<String>,
    pub code: Option<String>,
}

pub struct Colors;

impl Colors {
    pub const LIST_SQL: &'static str = "SELECT id, name, code, created_at, updated_at FROM colors";
    pub const SORTABLE: &'static [&'static str] = &["id", "name", "code", "created_at", "updated_at"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Color>, sqlx::Error> {
        sqlx::query_as::<_, Color>("SELECT id, name, code, created_at, updated_at FROM colors WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another color already uses `code`.
    pub async fn code_taken(pool: &PgPool, code: &str, except: Option<i64>) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM colors WHERE code = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    pub async fn insert(conn: &mut PgConnection, name: &str, code: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("INSERT INTO colors (name, code) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(code)
            .fetch_one(conn)
            .await
    }

    pub async fn update(conn: &mut PgConnection, id: i64, input: ColorInput) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("colors");
        update.set("name", input.name).set("code", input.code);
        update.execute(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM colors WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected())
    }
}
