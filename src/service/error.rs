use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{error::HttpError, utils::currency::format_pence};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Bid {0} not found")]
    BidNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Payout {0} not found")]
    PayoutNotFound(Uuid),

    #[error("User {0} is not allowed to perform this action on {1}")]
    Forbidden(Uuid, Uuid),

    #[error("Operation not legal in the current state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient balance: requested {}, available {}", format_pence(*requested), format_pence(*available))]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::BidNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::PayoutNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Forbidden(_, _) => StatusCode::FORBIDDEN,

            ServiceError::InvalidState(_) | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,

            ServiceError::ExternalService(_) => StatusCode::BAD_GATEWAY,

            ServiceError::Database(_) | ServiceError::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map a unique-constraint violation onto Conflict; everything else
    /// stays a database error.
    pub fn from_unique_violation(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ServiceError::Conflict(conflict_message.to_string());
            }
        }
        ServiceError::Database(err)
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}
