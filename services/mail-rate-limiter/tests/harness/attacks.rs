// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.

#![allow(dead_code)]

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of unique IPs to simulate
    pub unique_ips: usize,
    /// Number of unique user agents to rotate through
    pub unique_agents: usize,
    /// Whether requests carry x-forwarded-for and user-agent headers
    pub identify_by_headers: bool,
    /// Whether submissions pass field validation
    pub valid_payload: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            unique_agents: 1,
            identify_by_headers: true,
            valid_payload: true,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// One browser hammering the form.
    pub fn single_caller_flood() -> Self {
        Self {
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Many IPs, each sending a few submissions.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 50,
            ..Default::default()
        }
    }

    /// One IP rotating its user agent on every request.
    pub fn user_agent_rotation() -> Self {
        Self {
            total_requests: 60,
            unique_agents: 60,
            ..Default::default()
        }
    }

    /// Clients that strip identifying headers and keep no cookies.
    pub fn anonymous_flood() -> Self {
        Self {
            total_requests: 50,
            identify_by_headers: false,
            ..Default::default()
        }
    }

    /// Junk submissions from a single caller.
    pub fn invalid_payload_flood() -> Self {
        Self {
            total_requests: 40,
            valid_payload: false,
            ..Default::default()
        }
    }
}

/// Expected outcomes for different abuse patterns.
pub struct AttackExpectations {
    /// Maximum number of requests that should be allowed
    pub max_allowed: usize,
    /// Description of expected behavior
    pub description: &'static str,
}

impl AttackConfig {
    /// Get expected outcomes for this pattern given a per-window limit.
    pub fn expectations(&self, limit: u32) -> AttackExpectations {
        let per_identity = limit.saturating_sub(1) as usize;
        if !self.identify_by_headers {
            AttackExpectations {
                max_allowed: self.total_requests,
                description: "Anonymous callers get a fresh bucket per request",
            }
        } else {
            let identities = self.unique_ips.max(1) * self.unique_agents.max(1);
            AttackExpectations {
                max_allowed: (identities * per_identity).min(self.total_requests),
                description: "Each ip/user-agent pair is capped at limit - 1 per window",
            }
        }
    }
}
