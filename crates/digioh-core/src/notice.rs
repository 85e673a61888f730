//! User-facing notices (the site's toast messages).

use serde::Serialize;

use crate::error::{AuthError, FetchError};

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    /// Informational / success.
    Default,
    /// Failure.
    Destructive,
}

/// A title plus description shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Headline.
    pub title: String,
    /// Detail line.
    pub description: String,
    /// Severity.
    pub variant: NoticeVariant,
}

impl Notice {
    /// Success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    /// Failure notice.
    #[must_use]
    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    /// Sign-in succeeded.
    #[must_use]
    pub fn signed_in() -> Self {
        Self::success("Welcome back!", "You have been successfully logged in.")
    }

    /// Sign-in failed.
    #[must_use]
    pub fn sign_in_failed(err: &AuthError) -> Self {
        Self::failure("Login Failed", err.to_string())
    }

    /// Sign-up accepted.
    #[must_use]
    pub fn signed_up() -> Self {
        Self::success(
            "Account Created!",
            "Please check your email to confirm your account.",
        )
    }

    /// Sign-up failed.
    #[must_use]
    pub fn sign_up_failed(err: &AuthError) -> Self {
        Self::failure("Signup Failed", err.to_string())
    }

    /// Signed out.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::success("Signed out", "You have been signed out.")
    }

    /// Contact form stored.
    #[must_use]
    pub fn message_sent() -> Self {
        Self::success("Message Sent!", "We'll get back to you within 24 hours.")
    }

    /// Contact form not stored.
    #[must_use]
    pub fn message_failed() -> Self {
        Self::failure("Error", "Failed to send message. Please try again.")
    }

    /// A content section could not be loaded.
    #[must_use]
    pub fn load_failed(what: &str, err: &FetchError) -> Self {
        Self::failure(format!("Failed to load {what}"), err.to_string())
    }

    /// Whether this notice reports a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.variant, NoticeVariant::Destructive)
    }
}
