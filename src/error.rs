//! Error type shared by services and handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::{CheckoutError, CouponError, OrderError, ProductError, ReviewError, UserError};
use crate::domain::status::UnknownStatus;
use crate::domain::value_objects::{CouponCodeError, EmailError, RatingError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("Coupon has expired")]
    CouponExpired,

    #[error("Coupon usage limit reached")]
    CouponExhausted,

    #[error("Invalid payment signature")]
    PaymentVerification,

    #[error("{0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }
    pub fn forbidden(why: impl Into<String>) -> Self { Self::Forbidden(why.into()) }
    pub fn validation(why: impl Into<String>) -> Self { Self::Validation(why.into()) }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::CouponExpired | Self::CouponExhausted | Self::PaymentVerification => StatusCode::BAD_REQUEST,
            Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Storage and internal details stay in the logs.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Server Error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ItemNotFound(_) => Self::NotFound(err.to_string()),
            OrderError::NotItemOwner => Self::Forbidden(err.to_string()),
            OrderError::NoItems | OrderError::InvalidQuantity(_) | OrderError::NegativeAmount | OrderError::AmountTooLarge => {
                Self::Validation(err.to_string())
            }
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::Inactive => Self::NotFound(err.to_string()),
            CouponError::Expired => Self::CouponExpired,
            CouponError::UsageLimitReached => Self::CouponExhausted,
            CouponError::InvalidDiscount(_) => Self::Validation(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::AddressNotFound => Self::NotFound(err.to_string()),
            UserError::InvalidRole(_) => Self::Validation(err.to_string()),
        }
    }
}

macro_rules! validation_from {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for AppError {
            fn from(err: $ty) -> Self { Self::Validation(err.to_string()) }
        })*
    };
}

validation_from!(ProductError, ReviewError, CheckoutError, CouponCodeError, EmailError, RatingError, UnknownStatus, validator::ValidationErrors);
