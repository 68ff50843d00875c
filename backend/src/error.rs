use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::services::alerts::LifecycleError;
use crate::services::chat::ResponderError;
use crate::services::documents::ProcessingError;
use crate::services::export::RenderError;
use crate::validation::Issue;

/// Every failure a procedure can report to its caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("input failed validation")]
    Validation(Vec<Issue>),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    NotImplemented(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] DieselError),

    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("file store error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        ApiError::NotFound { entity, id }
    }

    /// RPC error code, named after the HTTP status it travels with.
    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_CONTENT",
            StatusCode::NOT_IMPLEMENTED => "NOT_IMPLEMENTED",
            StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Database(DieselError::DatabaseError(kind, info)) => match kind {
                DatabaseErrorKind::UniqueViolation => match info.constraint_name() {
                    Some(constraint) => format!("value already exists ({constraint})"),
                    None => "value already exists".to_string(),
                },
                DatabaseErrorKind::ForeignKeyViolation => match info.constraint_name() {
                    Some(constraint) => format!("referenced record does not exist ({constraint})"),
                    None => "referenced record does not exist".to_string(),
                },
                DatabaseErrorKind::CheckViolation => "value violates a table constraint".to_string(),
                _ => "internal server error".to_string(),
            },
            ApiError::Database(DieselError::NotFound) => "record not found".to_string(),
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Storage(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(DieselError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(DieselError::DatabaseError(kind, _)) => match kind {
                DatabaseErrorKind::UniqueViolation => StatusCode::CONFLICT,
                DatabaseErrorKind::ForeignKeyViolation | DatabaseErrorKind::CheckViolation => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{}", self);
        }

        let mut data = serde_json::json!({ "httpStatus": status.as_u16() });
        if let ApiError::Validation(issues) = self {
            data["issues"] = serde_json::json!(issues);
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
                "data": data,
            }
        }))
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::Storage(io) if io.kind() == std::io::ErrorKind::InvalidInput => {
                ApiError::Unprocessable(io.to_string())
            }
            ProcessingError::Storage(io) => ApiError::Storage(io),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NoRenderer(format) => {
                ApiError::NotImplemented(format!("no renderer registered for {format} exports"))
            }
            RenderError::Storage(io) => ApiError::Storage(io),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<ResponderError> for ApiError {
    fn from(err: ResponderError) -> Self {
        ApiError::Unavailable(err.to_string())
    }
}
