use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub parent_id: i64,
    pub level: i32,
    pub name: String,
    pub order_level: i32,
    pub banner: Option<String>,
    pub icon: Option<String>,
    pub featured: bool,
    pub top: bool,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryInput {
    pub parent_id: Option<i64>,
    pub name: Option<String>,
    pub order_level: Option<i32>,
    pub banner: Option<String>,
    pub icon: Option<String>,
    pub featured: Option<bool>,
    pub top: Option<bool>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

pub struct Categories;

/// Deepest subtree walked when re-levelling.
const MAX_DEPTH: i32 = 64;

const SELECT: &str = "SELECT c.id, c.parent_id, c.level, c.name, c.order_level, c.banner, c.icon, \
     c.featured, c.top, c.slug, c.meta_title, c.meta_description, c.created_at, c.updated_at, \
     (SELECT p.name FROM categories p WHERE p.id = c.parent_id) AS parent_name \
     FROM categories c";

impl Categories {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] = &[
        "id",
        "name",
        "parent_id",
        "parent_name",
        "level",
        "order_level",
        "featured",
        "top",
        "created_at",
        "updated_at",
    ];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
        let sql = format!("{} WHERE c.id = $1", SELECT);
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Level of a would-be parent; `None` when it does not exist.
    pub async fn level_of(pool: &PgPool, id: i64) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT level FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `candidate` sits anywhere below `id` in the tree.
    pub async fn is_descendant(pool: &PgPool, id: i64, candidate: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "WITH RECURSIVE subtree AS ( \
                 SELECT id FROM categories WHERE parent_id = $1 \
                 UNION \
                 SELECT c.id FROM categories c JOIN subtree s ON c.parent_id = s.id \
             ) \
             SELECT EXISTS (SELECT 1 FROM subtree WHERE id = $2)",
        )
        .bind(id)
        .bind(candidate)
        .fetch_one(pool)
        .await
    }

    /// Recompute `level` for every category below `id` from its already
    /// updated level. Returns the number of rows changed.
    pub async fn relevel_descendants(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "WITH RECURSIVE tree AS ( \
                 SELECT id, level, 0 AS depth FROM categories WHERE id = $1 \
                 UNION ALL \
                 SELECT c.id, t.level + 1, t.depth + 1 FROM categories c \
                 JOIN tree t ON c.parent_id = t.id \
                 WHERE t.depth < $2 \
             ) \
             UPDATE categories SET level = tree.level, updated_at = NOW() \
             FROM tree \
             WHERE categories.id = tree.id AND categories.level <> tree.level",
        )
        .bind(id)
        .bind(MAX_DEPTH)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert(
        conn: &mut PgConnection,
        input: CategoryInput,
        level: i32,
        slug: String,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO categories \
             (parent_id, level, name, order_level, banner, icon, featured, top, slug, meta_title, meta_description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
        )
        .bind(input.parent_id.unwrap_or(0))
        .bind(level)
        .bind(input.name.unwrap_or_default())
        .bind(input.order_level.unwrap_or(0))
        .bind(input.banner)
        .bind(input.icon)
        .bind(input.featured.unwrap_or(false))
        .bind(input.top.unwrap_or(false))
        .bind(slug)
        .bind(input.meta_title)
        .bind(input.meta_description)
        .fetch_one(conn)
        .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        input: CategoryInput,
        level: Option<i32>,
    ) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("categories");
        update
            .set("parent_id", input.parent_id)
            .set("level", level)
            .set("name", input.name)
            .set("order_level", input.order_level)
            .set("banner", input.banner)
            .set("icon", input.icon)
            .set("featured", input.featured)
            .set("top", input.top)
            .set("slug", input.slug)
            .set("meta_title", input.meta_title)
            .set("meta_description", input.meta_description);
        let updated = update.execute(&mut *conn, id).await?;

        if updated > 0 && level.is_some() {
            let moved = Self::relevel_descendants(conn, id).await?;
            tracing::debug!("Re-levelled {} categories below {}", moved, id);
        }
        Ok(updated)
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected())
    }
}
