// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Identity cookie issuance.
//!
//! Every successful submission mints a brand-new identity token instead of
//! extending the existing one, so the caller's cookie identity rotates on
//! each success.

use crate::clock::Clock;
use crate::config::CookieConfig;
use crate::identity::generate_token;
use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Format a timestamp as an HTTP date (`Tue, 20 Oct 2026 10:00:00 GMT`).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Writes the identity cookie pair onto successful responses.
pub struct CookieIssuer {
    config: CookieConfig,
    clock: Arc<dyn Clock>,
}

impl CookieIssuer {
    pub fn new(config: CookieConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Append fresh `Set-Cookie` headers for the identity token and its expiry.
    /// Returns the token that was issued.
    pub fn issue(&self, headers: &mut HeaderMap) -> String {
        let token = generate_token(self.config.token_length);
        let max_age = self.config.max_age();
        let expires = self.clock.utc_now()
            + chrono::Duration::from_std(max_age).unwrap_or_else(|_| chrono::Duration::days(1));

        for (name, value) in [
            (&self.config.identity_cookie, token.clone()),
            (&self.config.expiry_cookie, http_date(expires)),
        ] {
            let cookie = format!(
                "{name}={value}; Max-Age={max_age}; Path={path}; SameSite=Strict",
                value = urlencoding::encode(&value),
                max_age = max_age.as_secs(),
                path = self.config.path,
            );
            match HeaderValue::from_str(&cookie) {
                Ok(v) => {
                    headers.append(header::SET_COOKIE, v);
                }
                Err(e) => warn!(cookie = %name, error = %e, "Skipping unencodable cookie"),
            }
        }

        debug!(expires = %expires, "Issued identity cookies");
        token
    }
}
