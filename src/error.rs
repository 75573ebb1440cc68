//! Typed errors and HTTP mapping.

use crate::product::FieldErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("product {0} not found")]
    NotFound(i32),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorDetail {
    #[schema(value_type = String)]
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        ErrorBody {
            error: ErrorDetail {
                code,
                message: message.into(),
                fields: None,
            },
        }
    }
}

/// Error envelope response with the given status.
pub fn error_response(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(code, message))).into_response()
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_) | AppError::InvalidBody(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::InvalidId(_) => ErrorBody::new("invalid_id", "product_id is missing or invalid"),
            AppError::InvalidBody(_) => ErrorBody::new("invalid_body", "request body is not a valid product"),
            AppError::PayloadTooLarge => ErrorBody::new("payload_too_large", "request body is too large"),
            AppError::Validation(fields) => ErrorBody {
                error: ErrorDetail {
                    code: "invalid_data",
                    message: "Please provide valid product data".into(),
                    fields: Some(fields),
                },
            },
            AppError::NotFound(id) => ErrorBody::new("not_found", format!("product {} not found", id)),
            AppError::Db(sqlx::Error::RowNotFound) => ErrorBody::new("not_found", "no matching record"),
            // Storage details stay in the logs.
            AppError::Db(_) | AppError::Internal(_) => ErrorBody::new("internal_error", "Internal server error"),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::InvalidId("abc".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidBody("eof".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AppError::NotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Db(sqlx::Error::PoolTimedOut).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Internal("lock".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn validation_envelope_carries_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), "Can't be blank Name".into());
        let (status, v) = render(AppError::Validation(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(v["error"]["code"], "invalid_data");
        assert_eq!(v["error"]["fields"]["name"], "Can't be blank Name");
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let (status, v) = render(AppError::Db(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(v["error"]["message"], "Internal server error");
        assert!(v["error"].get("fields").is_none());
    }
}
