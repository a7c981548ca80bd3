use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use thiserror::Error;

use crate::model::MessageResponse;

pub type Result<T> = std::result::Result<T, Error>;

/// Outcomes of waitlist operations that are not a plain success
#[derive(Debug, Error)]
pub enum Error {
    // Validation errors, always caught before reaching the store
    #[error("{0}")]
    InvalidEmail(String),
    // Expected outcomes reported by the store
    #[error("Email address is already on the waitlist")]
    DuplicateEmail,
    #[error("Waitlist entry not found")]
    NotFound,
    // Database errors
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type RestResult<T> = std::result::Result<T, RestError>;

/// Errors rendered to HTTP callers as `{"success": false, "message": ...}`
#[derive(Debug, Error)]
pub enum RestError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InternalError(String),
}

impl RestError {
    /// Hide an unexpected failure behind a generic message, logging the cause server-side only
    pub fn internal(message: &str, error: &Error) -> Self {
        tracing::error!(error.cause_chain = ?error, "{}", message);
        Self::InternalError(message.into())
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageResponse::failure(self.to_string()))
    }
}
