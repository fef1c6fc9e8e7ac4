use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{ClientError, PostgresError};

/// Errors surfaced by the pooling service
#[derive(Debug, Error)]
pub enum PoolingError {
    #[error("{0}")]
    NotFound(String),

    #[error("Pool {0} is full")]
    PoolFull(String),

    #[error("Pool {0} is no longer accepting members")]
    PoolClosed(String),

    #[error("User {user_id} is already a member of pool {pool_id}")]
    AlreadyMember { pool_id: String, user_id: String },

    #[error("User {user_id} is not a member of pool {pool_id}")]
    NotMember { pool_id: String, user_id: String },

    #[error("Pool {0} changed while the request was applied, try again")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream service error: {0}")]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] PostgresError),
}

impl PoolingError {
    fn kind(&self) -> &'static str {
        match self {
            PoolingError::NotFound(_) => "Not found",
            PoolingError::PoolFull(_) => "Pool full",
            PoolingError::PoolClosed(_) => "Pool closed",
            PoolingError::AlreadyMember { .. } => "Already a member",
            PoolingError::NotMember { .. } => "Not a member",
            PoolingError::Conflict(_) => "Concurrent modification",
            PoolingError::InvalidRequest(_) => "Validation failed",
            PoolingError::Client(_) => "Upstream service failure",
            PoolingError::Storage(_) => "Storage failure",
        }
    }
}

impl ResponseError for PoolingError {
    fn status_code(&self) -> StatusCode {
        match self {
            PoolingError::NotFound(_) | PoolingError::NotMember { .. } => StatusCode::NOT_FOUND,
            PoolingError::PoolFull(_)
            | PoolingError::PoolClosed(_)
            | PoolingError::AlreadyMember { .. }
            | PoolingError::Conflict(_) => StatusCode::CONFLICT,
            PoolingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PoolingError::Client(_) => StatusCode::BAD_GATEWAY,
            PoolingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
