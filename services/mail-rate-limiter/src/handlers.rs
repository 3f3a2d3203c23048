// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact mail service.
//!
//! The mail endpoint runs the limiter, then the validator, then the mailer,
//! and maps every failure to a response through [`ApiError`]. Responses
//! produced after a limiter check carry the `X-RateLimit-*` headers.

use crate::clock::Clock;
use crate::config::Config;
use crate::cookies::CookieIssuer;
use crate::error::ApiError;
use crate::identity::RequestMeta;
use crate::limiter::{LimiterError, RateLimiter};
use crate::mailer::Mailer;
use crate::metrics::{CheckOutcome, Metrics, SubmissionOutcome};
use crate::validator::{MailRequest, MailValidator, ValidationResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: MailValidator,
    pub mailer: Arc<dyn Mailer>,
    pub cookies: CookieIssuer,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Wire up the limiter, validator and cookie issuer from configuration.
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone(), &config.cookies, clock.clone()),
            validator: MailValidator::new(config.validation.clone()),
            mailer,
            cookies: CookieIssuer::new(config.cookies.clone(), clock),
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub tracked_identities: usize,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/mail", post(send_mail));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "mail-rate-limiter",
        version: env!("CARGO_PKG_VERSION"),
        tracked_identities: state.limiter.tracked_identities(),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}

/// Accept a contact form submission.
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => MailRequest::from_json(&value),
        Err(e) => {
            warn!(error = %e, "Unreadable mail request body");
            return ApiError::Internal(e.to_string()).into_response();
        }
    };

    let meta = RequestMeta::from_headers(&headers);
    let decision = match state.limiter.check_default(&meta) {
        Ok(decision) => decision,
        Err(e) => {
            state.metrics.record_check(match e {
                LimiterError::IdentityMissing => CheckOutcome::IdentityMissing,
                LimiterError::Internal(_) => CheckOutcome::InternalError,
            });
            return ApiError::from(e).into_response();
        }
    };

    let mut response = if decision.allowed {
        state.metrics.record_check(CheckOutcome::Allowed);
        deliver(&state, &request)
            .await
            .unwrap_or_else(|e| e.into_response())
    } else {
        state.metrics.record_check(CheckOutcome::Denied);
        info!(
            forwarded_for = ?meta.forwarded_for,
            limit = decision.limit,
            "Mail request rate limited"
        );
        ApiError::RateLimitExceeded.into_response()
    };

    decision.apply_headers(response.headers_mut());
    response
}

/// Validate, send, and on success rotate the caller's identity cookies.
async fn deliver(state: &AppState, request: &MailRequest) -> Result<Response, ApiError> {
    let message = match state.validator.validate(request) {
        ValidationResult::Valid(message) => message,
        invalid => {
            state.metrics.record_submission(SubmissionOutcome::Invalid);
            return Err(ApiError::ValidationFailed(invalid.messages()));
        }
    };

    let receipt = state.mailer.send(&message).await.map_err(|e| {
        state.metrics.record_submission(SubmissionOutcome::MailError);
        warn!(status = e.status, error = %e, "Mail delivery failed");
        ApiError::from(e)
    })?;
    state.metrics.record_submission(SubmissionOutcome::Sent);
    debug!(status = receipt.status, "Mail delivered");

    let status = StatusCode::from_u16(receipt.status).unwrap_or(StatusCode::OK);
    let mut response = (status, Json(receipt)).into_response();
    state.cookies.issue(response.headers_mut());
    Ok(response)
}
