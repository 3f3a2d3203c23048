// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact mail service.
//!
//! Defaults match the contact endpoint: 5 submissions per identity per hour,
//! with at most 100 identities tracked at once.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the contact mail service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Identity cookie configuration
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Form validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Rate limiting configuration for the mail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per identity per window (default: 5)
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,

    /// Window length in milliseconds; also the counter TTL (default: 3600000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum number of distinct identities tracked (default: 100)
    #[serde(default = "default_max_tracked_identities")]
    pub max_tracked_identities: usize,

    /// How often expired counters are swept, in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Names and lifetime of the identity cookie pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie carrying the identity token (default: userUuid)
    #[serde(default = "default_identity_cookie")]
    pub identity_cookie: String,

    /// Cookie carrying the token's expiry timestamp (default: userUuid_expires)
    #[serde(default = "default_expiry_cookie")]
    pub expiry_cookie: String,

    /// Cookie lifetime in seconds (default: 86400)
    #[serde(default = "default_cookie_max_age_secs")]
    pub max_age_secs: u64,

    /// Length of generated identity tokens (default: 20)
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Cookie path (default: /)
    #[serde(default = "default_cookie_path")]
    pub path: String,
}

/// Field bounds for contact form submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_name_min")]
    pub name_min: usize,
    #[serde(default = "default_name_max")]
    pub name_max: usize,
    #[serde(default = "default_subject_min")]
    pub subject_min: usize,
    #[serde(default = "default_subject_max")]
    pub subject_max: usize,
    #[serde(default = "default_message_min")]
    pub message_min: usize,
    #[serde(default = "default_message_max")]
    pub message_max: usize,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Relay endpoint receiving submissions as JSON. Unset means submissions
    /// are only logged.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Relay request timeout in seconds (default: 10)
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_requests_per_window() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    3_600_000 // one hour
}

fn default_max_tracked_identities() -> usize {
    100
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_identity_cookie() -> String {
    "userUuid".to_string()
}

fn default_expiry_cookie() -> String {
    "userUuid_expires".to_string()
}

fn default_cookie_max_age_secs() -> u64 {
    60 * 60 * 24
}

fn default_token_length() -> usize {
    20
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_name_min() -> usize {
    3
}

fn default_name_max() -> usize {
    50
}

fn default_subject_min() -> usize {
    3
}

fn default_subject_max() -> usize {
    100
}

fn default_message_min() -> usize {
    10
}

fn default_message_max() -> usize {
    1000
}

fn default_mail_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            cookies: CookieConfig::default(),
            validation: ValidationConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: default_requests_per_window(),
            window_ms: default_window_ms(),
            max_tracked_identities: default_max_tracked_identities(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            identity_cookie: default_identity_cookie(),
            expiry_cookie: default_expiry_cookie(),
            max_age_secs: default_cookie_max_age_secs(),
            token_length: default_token_length(),
            path: default_cookie_path(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_min: default_name_min(),
            name_max: default_name_max(),
            subject_min: default_subject_min(),
            subject_max: default_subject_max(),
            message_min: default_message_min(),
            message_max: default_message_max(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                requests_per_window: env_parse("RATE_LIMIT_REQUESTS")
                    .unwrap_or(defaults.rate_limit.requests_per_window),
                window_ms: env_parse("RATE_LIMIT_WINDOW_MS")
                    .unwrap_or(defaults.rate_limit.window_ms),
                max_tracked_identities: env_parse("RATE_LIMIT_MAX_IDENTITIES")
                    .unwrap_or(defaults.rate_limit.max_tracked_identities),
                ..defaults.rate_limit
            },
            mail: MailConfig {
                webhook_url: std::env::var("MAIL_WEBHOOK_URL")
                    .ok()
                    .filter(|v| !v.trim().is_empty()),
                timeout_secs: env_parse("MAIL_TIMEOUT_SECS").unwrap_or(defaults.mail.timeout_secs),
            },
            metrics: MetricsConfig {
                enabled: env_parse("METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
            ..defaults
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the cleanup sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl CookieConfig {
    /// Get the cookie lifetime
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl MailConfig {
    /// Get the relay request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
