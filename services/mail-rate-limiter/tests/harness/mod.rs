// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for mail endpoint abuse simulation.
//!
//! This module provides utilities for replaying abusive submission
//! patterns against the limiter and validator.

pub mod attacks;
pub mod generators;
pub mod metrics;
