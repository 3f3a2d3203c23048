// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the mail endpoint and their HTTP mapping.

use crate::limiter::LimiterError;
use crate::mailer::MailError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Application error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token missing")]
    IdentityMissing,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Validation failed: {0:?}")]
    ValidationFailed(Vec<String>),

    #[error("Mail delivery failed ({status}): {message}")]
    MailDelivery { status: u16, message: String },

    /// Limiter store fault; the detail is logged, not returned.
    #[error("Rate limiter failure: {0}")]
    LimiterFault(String),

    #[error("{0}")]
    Internal(String),
}

impl From<LimiterError> for ApiError {
    fn from(err: LimiterError) -> Self {
        match err {
            LimiterError::IdentityMissing => ApiError::IdentityMissing,
            LimiterError::Internal(detail) => ApiError::LimiterFault(detail),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::MailDelivery {
            status: err.status,
            message: err.message,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::IdentityMissing => StatusCode::BAD_REQUEST,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MailDelivery { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::LimiterFault(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::IdentityMissing => json!({ "error": "Token missing" }),
            ApiError::RateLimitExceeded => json!({ "error": RATE_LIMIT_EXCEEDED }),
            ApiError::ValidationFailed(messages) => json!({ "status": 422, "message": messages }),
            ApiError::MailDelivery { status: 429, .. } => {
                json!({ "status": 429, "message": RATE_LIMIT_EXCEEDED })
            }
            ApiError::MailDelivery { message, .. } => {
                json!({ "status": status.as_u16(), "message": message })
            }
            ApiError::LimiterFault(detail) => {
                error!(error = %detail, "Rate limiter failure");
                json!({ "error": INTERNAL_SERVER_ERROR })
            }
            ApiError::Internal(message) => {
                error!(error = %message, "Unhandled failure");
                let message = if message.is_empty() {
                    INTERNAL_SERVER_ERROR.to_string()
                } else {
                    message
                };
                json!({ "status": 500, "message": message })
            }
        };
        (status, Json(body)).into_response()
    }
}
