// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound delivery of contact form submissions.

use crate::config::MailConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// A validated submission ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Delivery acknowledgement, returned to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailReceipt {
    pub status: u16,
    pub message: String,
}

/// Delivery failure carrying the status the relay reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct MailError {
    pub status: u16,
    pub message: String,
}

impl MailError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Delivers contact form submissions.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &MailMessage) -> Result<MailReceipt, MailError>;
}

/// Mailer that only records submissions in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &MailMessage) -> Result<MailReceipt, MailError> {
        info!(
            from = %mail.email,
            name = %mail.name,
            subject = %mail.subject,
            length = mail.message.chars().count(),
            "Contact form submission received"
        );
        Ok(MailReceipt {
            status: 200,
            message: "Mail sent successfully".to_string(),
        })
    }
}

/// Mailer that POSTs submissions as JSON to a relay endpoint.
#[derive(Debug, Clone)]
pub struct WebhookMailer {
    client: Client,
    endpoint: Url,
}

impl WebhookMailer {
    pub fn new(config: &MailConfig, endpoint: &str) -> Result<Self, MailError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| MailError::new(500, format!("Invalid mail relay URL: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(MailError::new(
                500,
                format!("Invalid mail relay URL: {endpoint}"),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MailError::new(500, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, mail: &MailMessage) -> Result<MailReceipt, MailError> {
        debug!(endpoint = %self.endpoint, "Relaying contact form submission");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(mail)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Mail relay unreachable");
                let status = if e.is_timeout() { 504 } else { 502 };
                MailError::new(status, "Mail relay unavailable")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Mail relay rejected submission");
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Mail delivery failed")
                    .to_string()
            } else {
                body
            };
            return Err(MailError::new(status.as_u16(), message));
        }

        // Relays that answer with their own receipt are passed through.
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MailReceipt>(&text).unwrap_or_else(|_| MailReceipt {
            status: status.as_u16(),
            message: "Mail sent successfully".to_string(),
        }))
    }
}
