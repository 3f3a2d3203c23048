// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

#![allow(dead_code)]

use mail_rate_limiter::validator::MailRequest;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Generate a pool of distinct user agent strings.
pub fn generate_user_agents(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/{}.{}",
                100 + i / 10,
                i % 10
            )
        })
        .collect()
}

/// A submission that passes validation.
pub fn valid_submission(i: usize) -> MailRequest {
    MailRequest {
        name: Some(format!("Sender {i}")),
        email: Some(format!("sender{i}@example.com")),
        subject: Some("Project enquiry".to_string()),
        message: Some("Hello, I would like to know more about your work.".to_string()),
    }
}

/// Submissions that each fail at least one field rule.
pub fn generate_invalid_submissions() -> Vec<MailRequest> {
    let valid = valid_submission(0);
    vec![
        MailRequest::default(),
        MailRequest {
            email: None,
            ..valid.clone()
        },
        MailRequest {
            email: Some("not-an-email".to_string()),
            ..valid.clone()
        },
        MailRequest {
            name: Some("Al".to_string()),
            ..valid.clone()
        },
        MailRequest {
            subject: Some("x".repeat(101)),
            ..valid.clone()
        },
        MailRequest {
            message: Some("too short".to_string()),
            ..valid.clone()
        },
        MailRequest {
            message: Some("spam ".repeat(300)),
            ..valid.clone()
        },
        MailRequest {
            name: Some("     ".to_string()),
            ..valid
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_user_agents() {
        let agents = generate_user_agents(50);
        let unique: std::collections::HashSet<_> = agents.iter().collect();
        assert_eq!(unique.len(), 50);
    }
}
