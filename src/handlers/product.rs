//! Product handlers: list, read, update, delete.

use crate::error::{AppError, ErrorBody};
use crate::product::{Product, ProductPayload};
use crate::response::{success_many, success_one_ok, SuccessMany, SuccessOne};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
};

/// Path extraction that fails with the `invalid_id` envelope, including undecodable segments.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<i32, AppError> {
    match path {
        Ok(Path(raw)) => parse_id(&raw),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "product_id could not be extracted");
            Err(AppError::InvalidId(rejection.body_text()))
        }
    }
}

fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "error reading request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InvalidBody(rejection.body_text())
        }
    })
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse().map_err(|_| {
        tracing::warn!(product_id = %raw, "product_id is missing or invalid");
        AppError::InvalidId(raw.to_string())
    })
}

fn decode_payload(body: &[u8]) -> Result<ProductPayload, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "error decoding product body");
        AppError::InvalidBody(e.to_string())
    })
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses(
        (status = 200, description = "Every product, ordered by name", body = SuccessMany<Product>),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.store.list().await?;
    Ok(success_many(products))
}

#[utoipa::path(
    get,
    path = "/product/{product_id}",
    tag = "products",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = SuccessOne<Product>),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such product", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    product_id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(product_id)?;
    let product = state.store.get_by_id(id).await?;
    Ok(success_one_ok(product))
}

#[utoipa::path(
    put,
    path = "/product/{product_id}",
    tag = "products",
    params(("product_id" = i32, Path, description = "Product id")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "The product as stored after the update", body = SuccessOne<Product>),
        (status = 400, description = "Malformed id or body, or field validation errors", body = ErrorBody),
        (status = 413, description = "Body over the configured limit", body = ErrorBody),
        (status = 404, description = "No such product", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    product_id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(product_id)?;
    let payload = decode_payload(&body_bytes(body)?)?;
    payload.validate().map_err(|fields| {
        tracing::info!(product_id = id, fields = ?fields, "product update rejected");
        AppError::Validation(fields)
    })?;
    let product = state.store.update_by_id(&payload, id).await?;
    tracing::info!(product_id = id, "product updated");
    Ok(success_one_ok(product))
}

#[utoipa::path(
    delete,
    path = "/product/{product_id}",
    tag = "products",
    params(("product_id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted, or there was nothing to delete"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    product_id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_id(product_id)?;
    state.store.delete_by_id(id).await?;
    tracing::info!(product_id = id, "product deleted");
    Ok(StatusCode::OK)
}
