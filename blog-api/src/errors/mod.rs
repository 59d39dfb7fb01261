use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use blog_commons::data_structures::{ErrorResponse, ValidationErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Also returned when the caller does not own the requested post.
    #[error("Not found")]
    NotFound,

    #[error("Validation failed")]
    Validation {
        #[from]
        source: validator::ValidationErrors,
    },

    #[error("Only POST requests are allowed")]
    MethodNotAllowed,

    #[error("Authentication required")]
    Unauthenticated {
        #[from]
        source: SessionValidationError,
    },

    #[error("{source}")]
    Database {
        #[from]
        source: sea_orm::DbErr,
    },

    #[error("{source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("{reason}")]
    Internal { reason: String },
}

impl ServiceError {
    pub fn internal(reason: impl ToString) -> Self {
        ServiceError::Internal {
            reason: reason.to_string(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ServiceError::Database { .. }
            | ServiceError::Storage { .. }
            | ServiceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            ServiceError::Validation { source } => {
                HttpResponse::BadRequest().json(ValidationErrorResponse {
                    reason: "validation failed".to_owned(),
                    errors: source.clone(),
                })
            }
            other => HttpResponse::build(other.status_code()).json(ErrorResponse {
                error: other.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionValidationError {
    #[error("no session cookie")]
    NoCookie,
    #[error("session expired or unknown")]
    UnknownToken,
    #[error("session user no longer exists")]
    NoUser,
    #[error("malformed session token")]
    Other {
        #[from]
        source: uuid::Error,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("image reference `{reference}` is not valid")]
    BadReference { reference: String },
    #[error("Io error")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}
