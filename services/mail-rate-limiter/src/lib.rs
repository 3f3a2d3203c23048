// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Mail Rate Limiter
//!
//! This crate serves the contact form mail endpoint and throttles it
//! per caller:
//!
//! - Caller identity from forwarded IP + user agent, identity cookie, or a
//!   random token
//! - Fixed-capacity counter store with per-entry TTL and LRU eviction
//! - 5 submissions per identity per hour (default); the request that
//!   reaches the limit is denied
//! - Identity cookies rotated on every successful submission
//! - Field validation reporting every failing field at once

pub mod clock;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::ApiError;
pub use identity::{IdentityResolver, RequestMeta};
pub use limiter::{LimiterError, RateLimitDecision, RateLimiter};
pub use store::CounterStore;
pub use validator::{MailValidator, ValidationResult};
