use actix_web::{HttpResponse, ResponseError};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Authentication Error: {0}")]
    AuthenticationError(String),

    #[error("Hashing Error: {0}")]
    HashingError(String),

    #[error("Blocking Error: {0}")]
    BlockingError(String),

    #[error("Database Error: {0}")]
    DatabaseError(String),
}

// Lets transactional code bubble diesel errors with `?` while keeping the
// NotFound / unique-key cases as their own outcomes.
impl From<diesel::result::Error> for CustomError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                CustomError::NotFound("record not found".to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                CustomError::Conflict(info.message().to_string())
            }
            other => CustomError::DatabaseError(other.to_string()),
        }
    }
}

impl ResponseError for CustomError {
    fn error_response(&self) -> HttpResponse {
        match self {
            CustomError::NotFound(_) => HttpResponse::NotFound().body(self.to_string()),
            CustomError::Conflict(_) => HttpResponse::Conflict().body(self.to_string()),
            CustomError::Forbidden(_) => HttpResponse::Forbidden().body(self.to_string()),
            CustomError::ValidationError(_) => HttpResponse::BadRequest().body(self.to_string()),
            CustomError::AuthenticationError(_) => {
                HttpResponse::Unauthorized().body(self.to_string())
            }
            CustomError::HashingError(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
            CustomError::BlockingError(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
            CustomError::DatabaseError(_) => {
                HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}
