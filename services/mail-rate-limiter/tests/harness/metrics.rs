// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tallies for abuse simulation runs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// What happened to a simulated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Passed the limiter and the validator
    Allowed,
    /// Denied by the limiter
    RateLimited,
    /// Passed the limiter, rejected by the validator
    ValidationFailed,
}

/// Per-caller tally.
#[derive(Debug, Default, Clone, Copy)]
struct CallerTally {
    sent: usize,
    let_through: usize,
}

/// Collects outcomes and timings for one simulation run.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    started: Option<Instant>,
    elapsed: Option<Duration>,
    by_outcome: HashMap<Outcome, usize>,
    by_caller: HashMap<String, CallerTally>,
    samples: Vec<Duration>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.elapsed = self.started.map(|s| s.elapsed());
    }

    /// Record one submission for `caller`.
    pub fn record(&mut self, outcome: Outcome, caller: &str, latency: Duration) {
        *self.by_outcome.entry(outcome).or_default() += 1;

        let tally = self.by_caller.entry(caller.to_owned()).or_default();
        tally.sent += 1;
        if outcome != Outcome::RateLimited {
            tally.let_through += 1;
        }

        self.samples.push(latency);
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.samples.len()
    }

    pub fn unique_callers(&self) -> usize {
        self.by_caller.len()
    }

    /// Most submissions any single caller got past the limiter.
    pub fn max_let_through_per_caller(&self) -> usize {
        self.by_caller
            .values()
            .map(|t| t.let_through)
            .max()
            .unwrap_or(0)
    }

    /// Share of submissions that were not delivered.
    pub fn block_rate(&self) -> f64 {
        match self.total_requests() {
            0 => 0.0,
            total => 1.0 - self.count(Outcome::Allowed) as f64 / total as f64,
        }
    }

    fn median_latency(&self) -> Duration {
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        sorted.get(sorted.len() / 2).copied().unwrap_or_default()
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            rate_limited: self.count(Outcome::RateLimited),
            validation_failed: self.count(Outcome::ValidationFailed),
            block_rate: self.block_rate(),
            unique_callers: self.unique_callers(),
            max_let_through_per_caller: self.max_let_through_per_caller(),
            median_latency: self.median_latency(),
            elapsed: self.elapsed.unwrap_or_default(),
        }
    }
}

/// Summary of a simulation run.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub validation_failed: usize,
    pub block_rate: f64,
    pub unique_callers: usize,
    pub max_let_through_per_caller: usize,
    pub median_latency: Duration,
    pub elapsed: Duration,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} submissions from {} callers in {:?}",
            self.total_requests, self.unique_callers, self.elapsed
        )?;
        writeln!(
            f,
            "  delivered {} / limited {} / invalid {}",
            self.allowed, self.rate_limited, self.validation_failed
        )?;
        writeln!(
            f,
            "  blocked {:.1}%, worst caller got {} through",
            self.block_rate * 100.0,
            self.max_let_through_per_caller
        )?;
        write!(f, "  median check {:?}", self.median_latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tallies_per_caller() {
        let mut metrics = AttackMetrics::new();
        metrics.start();
        metrics.record(Outcome::Allowed, "a", Duration::from_micros(10));
        metrics.record(Outcome::ValidationFailed, "a", Duration::from_micros(10));
        metrics.record(Outcome::RateLimited, "a", Duration::from_micros(10));
        metrics.record(Outcome::Allowed, "b", Duration::from_micros(10));
        metrics.finish();

        let report = metrics.report();
        assert_eq!(report.total_requests, 4);
        assert_eq!(report.unique_callers, 2);
        assert_eq!(report.max_let_through_per_caller, 2);
        assert!((report.block_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_run() {
        let report = AttackMetrics::new().report();
        assert_eq!(report.block_rate, 0.0);
        assert_eq!(report.median_latency, Duration::ZERO);
    }
}
