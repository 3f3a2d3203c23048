// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form validator.
//!
//! Every field is checked and every failure reported, so the client can fix
//! the whole form in one round trip. Values are trimmed before checking.

use crate::config::ValidationConfig;
use crate::mailer::MailMessage;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// A contact form submission as received on the wire.
#[derive(Debug, Clone, Default)]
pub struct MailRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl MailRequest {
    /// Read the form fields out of any JSON body.
    ///
    /// Numbers and booleans are taken as their text form. Missing fields,
    /// `null`, arrays, objects and non-object bodies all count as absent,
    /// so the validator reports them instead of the body being rejected.
    pub fn from_json(body: &Value) -> Self {
        let field = |name: &str| match body.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };

        Self {
            name: field("name"),
            email: field("email"),
            subject: field("subject"),
            message: field("message"),
        }
    }
}

/// A form field, named the way error messages refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "Name"),
            Self::Email => write!(f, "Email"),
            Self::Subject => write!(f, "Subject"),
            Self::Message => write!(f, "Message"),
        }
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(Field),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: Field, max: usize },

    #[error("Invalid email format")]
    InvalidEmail,
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::Required(field) => *field,
            Self::TooShort { field, .. } | Self::TooLong { field, .. } => *field,
            Self::InvalidEmail => Field::Email,
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Submission is valid; fields are trimmed
    Valid(MailMessage),
    /// Submission is invalid, with one entry per failing field
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    /// Error messages in field order.
    pub fn messages(&self) -> Vec<String> {
        self.errors().iter().map(ToString::to_string).collect()
    }
}

/// Contact form validator.
pub struct MailValidator {
    config: ValidationConfig,
}

impl MailValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a complete submission.
    pub fn validate(&self, request: &MailRequest) -> ValidationResult {
        let mut errors = Vec::new();

        let name = self.check_length(
            Field::Name,
            request.name.as_deref(),
            self.config.name_min,
            self.config.name_max,
            &mut errors,
        );
        let email = self.check_email(request.email.as_deref(), &mut errors);
        let subject = self.check_length(
            Field::Subject,
            request.subject.as_deref(),
            self.config.subject_min,
            self.config.subject_max,
            &mut errors,
        );
        let message = self.check_length(
            Field::Message,
            request.message.as_deref(),
            self.config.message_min,
            self.config.message_max,
            &mut errors,
        );

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
                ValidationResult::Valid(MailMessage {
                    name,
                    email,
                    subject,
                    message,
                })
            }
            _ => {
                debug!(errors = ?errors, "Submission invalid");
                ValidationResult::Invalid(errors)
            }
        }
    }

    fn check_length(
        &self,
        field: Field,
        value: Option<&str>,
        min: usize,
        max: usize,
        errors: &mut Vec<ValidationError>,
    ) -> Option<String> {
        let value = required(field, value, errors)?;
        let len = value.chars().count();
        if len < min {
            errors.push(ValidationError::TooShort { field, min });
            return None;
        }
        if len > max {
            errors.push(ValidationError::TooLong { field, max });
            return None;
        }
        Some(value.to_string())
    }

    fn check_email(&self, value: Option<&str>, errors: &mut Vec<ValidationError>) -> Option<String> {
        let value = required(Field::Email, value, errors)?;
        if !is_valid_email(value) {
            errors.push(ValidationError::InvalidEmail);
            return None;
        }
        Some(value.to_string())
    }
}

fn required<'a>(
    field: Field,
    value: Option<&'a str>,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(ValidationError::Required(field));
            None
        }
    }
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain whose labels are non-empty and hyphen-bounded correctly.
fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || local.starts_with('.') || local.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}
