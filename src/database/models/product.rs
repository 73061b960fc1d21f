use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::database::patch::UpdateBuilder;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub added_by: String,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub thumbnail_img: Option<String>,
    pub unit_price: Decimal,
    pub purchase_price: Option<Decimal>,
    pub discount: Decimal,
    pub discount_type: String,
    pub current_stock: i64,
    pub unit: Option<String>,
    pub min_qty: i64,
    pub published: bool,
    pub featured: bool,
    pub tags: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub added_by: Option<String>,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub thumbnail_img: Option<String>,
    pub unit_price: Option<Decimal>,
    pub purchase_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub discount_type: Option<String>,
    pub current_stock: Option<i64>,
    pub unit: Option<String>,
    pub min_qty: Option<i64>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub tags: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub variant: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub qty: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductVariantInput {
    pub variant: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub qty: Option<i64>,
    pub image: Option<String>,
}

pub struct Products;

const SELECT: &str = "SELECT p.id, p.name, p.added_by, p.category_id, p.brand_id, p.thumbnail_img, \
     p.unit_price, p.purchase_price, p.discount, p.discount_type, p.current_stock, p.unit, p.min_qty, \
     p.published, p.featured, p.tags, p.description, p.slug, p.created_at, p.updated_at, \
     (SELECT c.name FROM categories c WHERE c.id = p.category_id) AS category_name, \
     (SELECT b.name FROM brands b WHERE b.id = p.brand_id) AS brand_name \
     FROM products p";

const VARIANT_SELECT: &str = "SELECT id, product_id, variant, sku, price, qty, image FROM product_stocks";

impl Products {
    pub const LIST_SQL: &'static str = SELECT;
    pub const SORTABLE: &'static [&'static str] = &[
        "id",
        "name",
        "category_name",
        "brand_name",
        "unit_price",
        "current_stock",
        "published",
        "featured",
        "created_at",
        "updated_at",
    ];

    pub const VARIANTS_SQL: &'static str = VARIANT_SELECT;
    pub const VARIANTS_SORTABLE: &'static [&'static str] = &["id", "variant", "sku", "price", "qty"];

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Product>, sqlx::Error> {
        let sql = format!("{} WHERE p.id = $1", SELECT);
        sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn category_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn brand_exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM brands WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn insert(conn: &mut PgConnection, input: ProductInput, slug: String) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO products \
             (name, added_by, category_id, brand_id, thumbnail_img, unit_price, purchase_price, discount, \
              discount_type, current_stock, unit, min_qty, published, featured, tags, description, slug) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) RETURNING id",
        )
        .bind(input.name.unwrap_or_default())
        .bind(input.added_by.unwrap_or_else(|| "admin".to_string()))
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(input.thumbnail_img)
        .bind(input.unit_price.unwrap_or_default())
        .bind(input.purchase_price)
        .bind(input.discount.unwrap_or_default())
        .bind(input.discount_type.unwrap_or_else(|| "amount".to_string()))
        .bind(input.current_stock.unwrap_or(0))
        .bind(input.unit)
        .bind(input.min_qty.unwrap_or(1))
        .bind(input.published.unwrap_or(true))
        .bind(input.featured.unwrap_or(false))
        .bind(input.tags)
        .bind(input.description)
        .bind(slug)
        .fetch_one(conn)
        .await
    }

    pub async fn update(conn: &mut PgConnection, id: i64, input: ProductInput) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::with_timestamps("products");
        update
            .set("name", input.name)
            .set("added_by", input.added_by)
            .set("category_id", input.category_id)
            .set("brand_id", input.brand_id)
            .set("thumbnail_img", input.thumbnail_img)
            .set("unit_price", input.unit_price)
            .set("purchase_price", input.purchase_price)
            .set("discount", input.discount)
            .set("discount_type", input.discount_type)
            .set("current_stock", input.current_stock)
            .set("unit", input.unit)
            .set("min_qty", input.min_qty)
            .set("published", input.published)
            .set("featured", input.featured)
            .set("tags", input.tags)
            .set("description", input.description)
            .set("slug", input.slug);
        update.execute(conn, id).await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn variants_of(pool: &PgPool, product_id: i64) -> Result<Vec<ProductVariant>, sqlx::Error> {
        let sql = format!("{} WHERE product_id = $1 ORDER BY id", VARIANT_SELECT);
        sqlx::query_as::<_, ProductVariant>(&sql).bind(product_id).fetch_all(pool).await
    }

    pub async fn variant_count(pool: &PgPool, product_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_stocks WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_variant(pool: &PgPool, id: i64) -> Result<Option<ProductVariant>, sqlx::Error> {
        let sql = format!("{} WHERE id = $1", VARIANT_SELECT);
        sqlx::query_as::<_, ProductVariant>(&sql).bind(id).fetch_optional(pool).await
    }

    /// Whether `variant` is already used by another stock row of the same product.
    pub async fn variant_taken(
        pool: &PgPool,
        product_id: i64,
        variant: &str,
        except: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_stocks \
             WHERE product_id = $1 AND variant = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
        )
        .bind(product_id)
        .bind(variant)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    pub async fn insert_variant(
        conn: &mut PgConnection,
        product_id: i64,
        input: ProductVariantInput,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO product_stocks (product_id, variant, sku, price, qty, image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(product_id)
        .bind(input.variant.unwrap_or_default())
        .bind(input.sku)
        .bind(input.price.unwrap_or_default())
        .bind(input.qty.unwrap_or(0))
        .bind(input.image)
        .fetch_one(conn)
        .await
    }

    pub async fn update_variant(
        conn: &mut PgConnection,
        id: i64,
        input: ProductVariantInput,
    ) -> Result<u64, sqlx::Error> {
        let mut update = UpdateBuilder::new("product_stocks");
        update
            .set("variant", input.variant)
            .set("sku", input.sku)
            .set("price", input.price)
            .set("qty", input.qty)
            .set("image", input.image);
        update.execute(conn, id).await
    }

    pub async fn delete_variant(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_stocks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
