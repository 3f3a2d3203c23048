// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-identity request limiter for the mail endpoint.
//!
//! Each caller is counted under `user:{identity}` in a [`CounterStore`].
//! The request that brings the count up to the limit is itself denied, so
//! with a limit of 5 only four requests per window get through.

use crate::clock::Clock;
use crate::config::{CookieConfig, RateLimitConfig};
use crate::identity::{CookieIdentityResolver, IdentityResolver, RequestMeta};
use crate::store::CounterStore;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error, info};

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Failures distinct from an ordinary denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimiterError {
    #[error("Token missing")]
    IdentityMissing,

    #[error("Rate limiter store unavailable: {0}")]
    Internal(String),
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
}

impl RateLimitDecision {
    /// Write `X-RateLimit-Limit` and `X-RateLimit-Remaining`.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
    }
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-identity counters; every check runs under this lock.
    store: Mutex<CounterStore>,
    resolver: Arc<dyn IdentityResolver>,
}

impl RateLimiter {
    /// Create a limiter using the default IP / cookie / random resolver.
    pub fn new(config: RateLimitConfig, cookies: &CookieConfig, clock: Arc<dyn Clock>) -> Self {
        let resolver = Arc::new(CookieIdentityResolver::new(cookies, clock.clone()));
        Self::with_resolver(config, clock, resolver)
    }

    /// Create a limiter with a custom identity policy.
    pub fn with_resolver(
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let store = CounterStore::new(
            config.max_tracked_identities,
            config.window_duration(),
            clock,
        );
        Self {
            config,
            store: Mutex::new(store),
            resolver,
        }
    }

    /// Count this request against its caller and decide whether it may proceed.
    pub fn check(
        &self,
        request: &RequestMeta,
        limit: u32,
    ) -> Result<RateLimitDecision, LimiterError> {
        let identity = self.resolver.resolve(request);
        if identity.is_empty() {
            return Err(LimiterError::IdentityMissing);
        }

        let key = format!("user:{identity}");
        let count = {
            let mut store = self.store.lock().map_err(|e| {
                error!(error = %e, "Counter store lock poisoned");
                LimiterError::Internal(e.to_string())
            })?;
            let count = store.get(&key).unwrap_or(0).saturating_add(1);
            store.set(&key, count);
            count
        };

        let allowed = count < limit;
        let remaining = if allowed { limit - count } else { 0 };

        if allowed {
            debug!(identity = %identity, count, remaining, "Request allowed");
        } else {
            info!(identity = %identity, count, limit, "Rate limit exceeded");
        }

        Ok(RateLimitDecision {
            allowed,
            limit,
            remaining,
        })
    }

    /// Check against the configured per-window limit.
    pub fn check_default(&self, request: &RequestMeta) -> Result<RateLimitDecision, LimiterError> {
        self.check(request, self.config.requests_per_window)
    }

    /// Clean up expired entries (should be called periodically).
    pub fn cleanup(&self) {
        match self.store.lock() {
            Ok(mut store) => {
                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = store.len(), "Purged expired counters");
                }
            }
            Err(e) => error!(error = %e, "Counter store lock poisoned during cleanup"),
        }
    }

    /// Number of identities currently held by the store.
    pub fn tracked_identities(&self) -> usize {
        self.store.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Poison the store lock by panicking while holding it.
    #[cfg(test)]
    pub(crate) fn poison_store(&self) {
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = self.store.lock();
                panic!("store writer crashed");
            })
            .join()
        });
    }
}
