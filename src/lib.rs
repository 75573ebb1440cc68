//! Catalog API: REST endpoints over product records stored in PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod product;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use product::{FieldErrors, Product, ProductPayload};
pub use routes::{app, common_routes, product_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, InMemoryProductStore, PgProductStore, ProductStore};
