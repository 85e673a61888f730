//! Input validation and sanitization.
//!
//! Every form the gateway accepts passes through here before it reaches the
//! backend.

use serde::Deserialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::content::NewContactSubmission;

/// Validation error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// Input exceeds maximum allowed length.
    #[error("{field} exceeds maximum length ({max} characters, got {actual})")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
        /// Actual input length.
        actual: usize,
    },

    /// Not an e-mail address.
    #[error("Invalid email address")]
    InvalidEmail,
}

/// Size limits per input type.
pub mod limits {
    /// Maximum name length.
    pub const MAX_NAME_LENGTH: usize = 200;

    /// Maximum e-mail length (RFC 5321 path limit).
    pub const MAX_EMAIL_LENGTH: usize = 320;

    /// Maximum company name length.
    pub const MAX_COMPANY_LENGTH: usize = 200;

    /// Maximum contact message length.
    pub const MAX_MESSAGE_LENGTH: usize = 5000;

    /// Maximum password length accepted before hitting the provider.
    pub const MAX_PASSWORD_LENGTH: usize = 1024;

    /// Maximum config file size (1MB).
    pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
}

/// Contact form as posted by the site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    /// Sender name.
    #[serde(default)]
    pub name: String,
    /// Sender e-mail.
    #[serde(default)]
    pub email: String,
    /// Sender company.
    #[serde(default)]
    pub company: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: String,
}

/// Strip control characters (except newlines/tabs), normalize to NFKC and
/// trim.
///
/// # Errors
///
/// Returns `ValidationError::TooLong` if the result exceeds `max_len`
/// characters.
pub fn sanitize_text(
    field: &'static str,
    input: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect();

    let normalized: String = sanitized.nfkc().collect();
    let trimmed = normalized.trim();

    let actual = trimmed.chars().count();
    if actual > max_len {
        return Err(ValidationError::TooLong {
            field,
            max: max_len,
            actual,
        });
    }
    Ok(trimmed.to_string())
}

fn required(field: &'static str, input: &str, max_len: usize) -> Result<String, ValidationError> {
    let value = sanitize_text(field, input, max_len)?;
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value)
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no
/// whitespace.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Validate an e-mail field.
///
/// # Errors
///
/// Returns `Required`, `TooLong` or `InvalidEmail`.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let email = required("email", input, limits::MAX_EMAIL_LENGTH)?;
    if !is_plausible_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

/// Validate a contact form into a row ready for insertion.
///
/// # Errors
///
/// Returns the first field that fails.
pub fn validate_contact(form: &ContactForm) -> Result<NewContactSubmission, ValidationError> {
    let name = required("name", &form.name, limits::MAX_NAME_LENGTH)?;
    let email = validate_email(&form.email)?;
    let company = match form.company.as_deref() {
        Some(c) => Some(sanitize_text("company", c, limits::MAX_COMPANY_LENGTH)?)
            .filter(|c| !c.is_empty()),
        None => None,
    };
    let message = required("message", &form.message, limits::MAX_MESSAGE_LENGTH)?;

    Ok(NewContactSubmission {
        name,
        email,
        company,
        message,
    })
}

/// Validate sign-in/sign-up credentials. The password is checked for
/// presence and size only; strength rules belong to the auth provider.
///
/// # Errors
///
/// Returns `Required`, `TooLong` or `InvalidEmail`.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, ValidationError> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    let actual = password.chars().count();
    if actual > limits::MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password",
            max: limits::MAX_PASSWORD_LENGTH,
            actual,
        });
    }
    Ok(email)
}
