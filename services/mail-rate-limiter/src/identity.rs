// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Caller identity derivation for rate limiting.
//!
//! Callers are identified, in order of preference, by:
//! 1. forwarded client IP plus user agent (`{ip}-{userAgent}`)
//! 2. an unexpired identity cookie pair
//! 3. a freshly generated random token
//!
//! The random fallback is weak: a client that discards cookies and hides
//! its IP or user agent gets a new bucket on every request.

use crate::clock::Clock;
use crate::config::CookieConfig;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the originating client address behind a proxy.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a random URL-safe token of `len` characters.
pub fn generate_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Request metadata relevant to identity derivation.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub forwarded_for: Option<String>,
    pub user_agent: Option<String>,
    pub cookies: HashMap<String, String>,
}

impl RequestMeta {
    /// Extract identity-relevant metadata from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();

        Self {
            forwarded_for: header_value(headers, FORWARDED_FOR),
            user_agent: header_value(headers, header::USER_AGENT.as_str()),
            cookies,
        }
    }

    /// Look up a cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Split a `Cookie` header into decoded name/value pairs.
fn parse_cookie_header(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"');
            let decoded = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((name.to_string(), decoded))
        })
        .collect()
}

/// Parse the expiry cookie. Accepts HTTP dates and RFC 3339.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Derives the identity string a caller's requests are counted under.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, request: &RequestMeta) -> String;
}

impl<F> IdentityResolver for F
where
    F: Fn(&RequestMeta) -> String + Send + Sync,
{
    fn resolve(&self, request: &RequestMeta) -> String {
        self(request)
    }
}

/// Default resolver: IP and user agent, then cookie pair, then random token.
pub struct CookieIdentityResolver {
    identity_cookie: String,
    expiry_cookie: String,
    token_length: usize,
    clock: Arc<dyn Clock>,
}

impl CookieIdentityResolver {
    pub fn new(config: &CookieConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity_cookie: config.identity_cookie.clone(),
            expiry_cookie: config.expiry_cookie.clone(),
            token_length: config.token_length,
            clock,
        }
    }

    fn cookie_identity(&self, request: &RequestMeta) -> Option<String> {
        let id = request.cookie(&self.identity_cookie)?;
        let expires = request.cookie(&self.expiry_cookie)?;

        match parse_expiry(expires) {
            Some(at) if at > self.clock.utc_now() => Some(id.to_string()),
            Some(_) => {
                debug!("Identity cookie expired");
                None
            }
            None => {
                debug!(expires, "Unparseable identity cookie expiry");
                None
            }
        }
    }
}

impl IdentityResolver for CookieIdentityResolver {
    fn resolve(&self, request: &RequestMeta) -> String {
        if let (Some(ip), Some(agent)) = (&request.forwarded_for, &request.user_agent) {
            return format!("{ip}-{agent}");
        }

        self.cookie_identity(request)
            .unwrap_or_else(|| generate_token(self.token_length))
    }
}
