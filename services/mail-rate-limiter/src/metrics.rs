// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for limiter decisions and submissions.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Allowed,
    Denied,
    IdentityMissing,
    InternalError,
}

impl CheckOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::IdentityMissing => "identity_missing",
            Self::InternalError => "internal_error",
        }
    }
}

/// Outcome of a submission that passed the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent,
    Invalid,
    MailError,
}

impl SubmissionOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Invalid => "invalid",
            Self::MailError => "mail_error",
        }
    }
}

/// Service metrics registry.
pub struct Metrics {
    registry: Registry,
    checks: IntCounterVec,
    submissions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let checks = IntCounterVec::new(
            Opts::new("mail_rate_limit_checks_total", "Rate limit checks by outcome"),
            &["outcome"],
        )?;
        let submissions = IntCounterVec::new(
            Opts::new("mail_submissions_total", "Contact form submissions by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(checks.clone()))?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            registry,
            checks,
            submissions,
        })
    }

    pub fn record_check(&self, outcome: CheckOutcome) {
        self.checks.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn record_submission(&self, outcome: SubmissionOutcome) {
        self.submissions.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn check_count(&self, outcome: CheckOutcome) -> u64 {
        self.checks.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn submission_count(&self, outcome: SubmissionOutcome) -> u64 {
        self.submissions.with_label_values(&[outcome.as_str()]).get()
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
