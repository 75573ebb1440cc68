//! Storage component: product persistence behind a trait so handlers never see SQL.

mod memory;
mod postgres;

pub use memory::InMemoryProductStore;
pub use postgres::{ensure_database_exists, PgProductStore};

use crate::error::AppError;
use crate::product::{Product, ProductPayload};
use async_trait::async_trait;

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, ordered by name then id.
    async fn list(&self) -> Result<Vec<Product>, AppError>;

    /// One product with its category name and images. `AppError::NotFound` when absent.
    async fn get_by_id(&self, id: i32) -> Result<Product, AppError>;

    /// Replace the product's attributes (and image list, when given) and return the stored row.
    /// Either every write lands or none does.
    async fn update_by_id(&self, payload: &ProductPayload, id: i32) -> Result<Product, AppError>;

    /// Remove the product. Deleting a missing id is not an error.
    async fn delete_by_id(&self, id: i32) -> Result<(), AppError>;

    /// Round-trip to the backing store; used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}
