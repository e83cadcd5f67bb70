use crate::types::BookingStatus;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Service is not available")]
    ServiceNotFound,

    #[error("Barbershop is closed at the requested time")]
    BarbershopClosed,

    #[error("Requested slot is no longer available")]
    SlotConflict,

    #[error("Booking does not exist")]
    BookingNotFound,

    #[error("Booking can't move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Booking belongs to another customer")]
    NotBookingOwner,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection error")]
    Connection(#[from] diesel::ConnectionError),
}

pub type BookingResult<T> = Result<T, BookingError>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl BookingError {
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            BookingError::ServiceNotFound => "SERVICE_NOT_FOUND",
            BookingError::BarbershopClosed => "BARBERSHOP_CLOSED",
            BookingError::SlotConflict => "SLOT_CONFLICT",
            BookingError::BookingNotFound => "BOOKING_NOT_FOUND",
            BookingError::InvalidTransition { .. } => "INVALID_TRANSITION",
            BookingError::NotBookingOwner => "FORBIDDEN",
            BookingError::Storage(_) | BookingError::Database(_) | BookingError::Connection(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            BookingError::ServiceNotFound | BookingError::BookingNotFound => StatusCode::NOT_FOUND,
            BookingError::BarbershopClosed => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::SlotConflict | BookingError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            BookingError::NotBookingOwner => StatusCode::FORBIDDEN,
            BookingError::Storage(_) | BookingError::Database(_) | BookingError::Connection(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            BookingError::Storage(_) | BookingError::Database(_) | BookingError::Connection(_) => {
                error!(err = ?self, "Booking storage failure");
                "An internal error occurred".into()
            }
            BookingError::SlotConflict => {
                "Requested slot is no longer available, please pick another time".into()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.user_message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
