use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Comma-joined values, in insertion order
    pub value_list: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttributeValue {
    pub id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub color_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeValueInput {
    pub value: Option<String>,
    pub color_code: Option<String>,
}

pub struct Attributes;

const SELECT: &str = "SELECT a.id, a.name, a.created_at, a.updated_at, \
     (SELECT string_agg(v.value, ', ' ORDER BY v.id) FROM attribute_values v WHERE v.attribute_id = a.id) AS value_list \
     FROM attributes a";

impl Attributes {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] = &["id", "name", "created_at", "updated_at"];

    pub const VALUES_SQL: &'static str = "SELECT id, attribute_id, value, color_code FROM attribute_values";
    pub const VALUES_SORTABLE: &'static [&'static str] = &["id", "value", "color_code"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Attribute>, sqlx::Error> {
        let sql = format!("{} WHERE a.id = $1", SELECT);
        sqlx::query_as::<_, Attribute>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM attributes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn values_of(pool: &PgPool, attribute_id: i64) -> Result<Vec<AttributeValue>, sqlx::Error> {
        sqlx::query_as::<_, AttributeValue>(
            "SELECT id, attribute_id, value, color_code FROM attribute_values WHERE attribute_id = $1 ORDER BY id",
        )
        .bind(attribute_id)
        .fetch_all(pool)
        .await
    }

    pub async fn value_count(pool: &PgPool, attribute_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attribute_values WHERE attribute_id = $1")
            .bind(attribute_id)
            .fetch_one(pool)
            .await
    }

    pub async fn value_taken(pool: &PgPool, attribute_id: i64, value: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attribute_values WHERE attribute_id = $1 AND value = $2)",
        )
        .bind(attribute_id)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    pub async fn insert(conn: &mut PgConnection, name: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("INSERT INTO attributes (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(conn)
            .await
    }

    pub async fn update(conn: &mut PgConnection, id: i64, input: AttributeInput) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("attributes");
        update.set("name", input.name);
        update.execute(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attributes WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_value(
        conn: &mut PgConnection,
        attribute_id: i64,
        input: AttributeValueInput,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO attribute_values (attribute_id, value, color_code) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(attribute_id)
        .bind(input.value.unwrap_or_default())
        .bind(input.color_code)
        .fetch_one(conn)
        .await
    }

    pub async fn delete_value(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attribute_values WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
