//! PostgreSQL product store. Statement text lives here; values are always bound parameters.
//!
//! Expects at most one `productimage` row per product (`UNIQUE (product_id)`); the joins below
//! return one row per product only under that constraint.

use super::ProductStore;
use crate::error::AppError;
use crate::product::{decode_image_urls, encode_image_urls, Product, ProductPayload};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const LIST_PRODUCTS: &str = r#"
    SELECT p.id, p.name, p.des, p.price::float8 AS price, p.discount::float8 AS discount,
           p.available_quantity, p.category_id, pi.image_url::text AS image_url, c.category_name
    FROM products p
    LEFT JOIN productimage pi ON p.id = pi.product_id
    LEFT JOIN category c ON p.category_id = c.category_id
    ORDER BY p.name ASC, p.id ASC
"#;

const GET_PRODUCT_BY_ID: &str = r#"
    SELECT p.id, p.name, p.des, p.price::float8 AS price, p.discount::float8 AS discount,
           p.available_quantity, p.category_id, pi.image_url::text AS image_url, c.category_name
    FROM products p
    LEFT JOIN productimage pi ON p.id = pi.product_id
    LEFT JOIN category c ON p.category_id = c.category_id
    WHERE p.id = $1
    LIMIT 1
"#;

const LOCK_PRODUCT: &str = "SELECT id FROM products WHERE id = $1 FOR UPDATE";

const UPDATE_PRODUCT: &str = r#"
    UPDATE products SET (name, des, price, discount, available_quantity, category_id)
        = ($1, $2, $3, $4, $5, $6)
    WHERE id = $7
"#;

const UPDATE_IMAGE: &str = "UPDATE productimage SET image_url = $1 WHERE product_id = $2";

const INSERT_IMAGE: &str = "INSERT INTO productimage (product_id, image_url) VALUES ($1, $2)";

const DELETE_IMAGES: &str = "DELETE FROM productimage WHERE product_id = $1";

const DELETE_PRODUCT: &str = "DELETE FROM products WHERE id = $1";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    des: String,
    price: f64,
    discount: f64,
    available_quantity: i32,
    category_id: i32,
    image_url: Option<String>,
    category_name: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let image_urls = decode_image_urls(row.image_url.as_deref()).map_err(|e| {
            tracing::error!(product_id = row.id, error = %e, "stored image_url is not a JSON string list");
            AppError::Internal(format!("product {}: bad image_url", row.id))
        })?;
        Ok(Product {
            id: row.id,
            name: row.name,
            des: row.des,
            price: row.price,
            discount: row.discount,
            available_quantity: row.available_quantity,
            category_id: row.category_id,
            category_name: row.category_name,
            image_urls,
        })
    }
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        PgProductStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        tracing::debug!(sql = %LIST_PRODUCTS, "query");
        let rows: Vec<ProductRow> = sqlx::query_as(LIST_PRODUCTS)
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error listing products"))?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_by_id(&self, id: i32) -> Result<Product, AppError> {
        tracing::debug!(sql = %GET_PRODUCT_BY_ID, product_id = id, "query");
        let row: Option<ProductRow> = sqlx::query_as(GET_PRODUCT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error selecting product by id"))?;
        row.ok_or(AppError::NotFound(id))?.try_into()
    }

    async fn update_by_id(&self, payload: &ProductPayload, id: i32) -> Result<Product, AppError> {
        // Dropping `tx` on any early return rolls back.
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i32,)> = sqlx::query_as(LOCK_PRODUCT)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error while getting product"))?;
        if existing.is_none() {
            return Err(AppError::NotFound(id));
        }

        tracing::debug!(sql = %UPDATE_PRODUCT, product_id = id, "query (tx)");
        sqlx::query(UPDATE_PRODUCT)
            .bind(&payload.name)
            .bind(&payload.des)
            .bind(payload.price)
            .bind(payload.discount)
            .bind(payload.available_quantity)
            .bind(payload.category_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error updating product attributes"))?;

        if let Some(urls) = &payload.image_urls {
            let encoded = encode_image_urls(urls).map_err(|e| AppError::Internal(e.to_string()))?;
            tracing::debug!(sql = %UPDATE_IMAGE, product_id = id, "query (tx)");
            let updated = sqlx::query(UPDATE_IMAGE)
                .bind(&encoded)
                .bind(id)
                .execute(&mut *tx)
                .await
                .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error updating product image"))?;
            if updated.rows_affected() == 0 {
                sqlx::query(INSERT_IMAGE)
                    .bind(id)
                    .bind(&encoded)
                    .execute(&mut *tx)
                    .await
                    .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error inserting product image"))?;
            }
        }

        let row: ProductRow = sqlx::query_as(GET_PRODUCT_BY_ID)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error re-reading updated product"))?;
        let product = Product::try_from(row)?;

        tx.commit().await?;
        Ok(product)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %DELETE_PRODUCT, product_id = id, "query (tx)");
        sqlx::query(DELETE_IMAGES)
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error deleting product images"))?;
        sqlx::query(DELETE_PRODUCT)
            .bind(id)
            .execute(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(product_id = id, error = %e, "error deleting product"))?;
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create the database named in `database_url` if it does not exist yet. Connects to the
/// `postgres` maintenance database on the same server to do so.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = maintenance_target(database_url)?;
    let db_name = match db_name {
        Some(name) if name != "postgres" => name,
        _ => return Ok(()),
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` database on the same server, plus the database `url` names.
fn maintenance_target(url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let opts = PgConnectOptions::from_str(url)?;
    let db_name = opts.get_database().map(str::to_string).filter(|n| !n.is_empty());
    Ok((opts.database("postgres"), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
