use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Normalized, case-insensitive subject identifier (an email address).
///
/// Normalization happens once, here: the value is trimmed and lower-cased so
/// cache keys and store keys always compare consistently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectEmail(String);

impl SubjectEmail {
    /// Creates a normalized subject identifier.
    ///
    /// The value is echoed back in a response header, so whitespace and
    /// control characters are rejected.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "subject email must not be empty".to_owned(),
            ));
        }

        if normalized
            .chars()
            .any(|character| character.is_whitespace() || character.is_control())
        {
            return Err(AppError::Validation(format!(
                "subject email '{}' contains whitespace or control characters",
                normalized.escape_debug()
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized email.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SubjectEmail {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for SubjectEmail {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectEmail> for String {
    fn from(value: SubjectEmail) -> Self {
        value.0
    }
}

/// Request context handed to the role lookup service.
///
/// The subject was already authenticated upstream; this type only carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedRequestContext {
    subject: Option<String>,
    correlation_id: String,
}

impl AuthenticatedRequestContext {
    /// Creates a request context from the upstream-verified subject.
    #[must_use]
    pub fn new(subject: Option<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            subject,
            correlation_id: correlation_id.into(),
        }
    }

    /// Returns the raw subject claim, if the request carried one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the correlation identifier used in logs.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        self.correlation_id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthenticatedRequestContext, SubjectEmail};

    #[test]
    fn subject_email_is_trimmed_and_lower_cased() {
        let subject = SubjectEmail::new("  Alice@Example.COM ");
        assert!(subject.is_ok());
        assert_eq!(
            subject.map(String::from).unwrap_or_default(),
            "alice@example.com"
        );
    }

    #[test]
    fn subject_email_rejects_blank_values() {
        assert!(SubjectEmail::new("   ").is_err());
    }

    #[test]
    fn subject_email_rejects_embedded_whitespace() {
        assert!(SubjectEmail::new("alice @example.com").is_err());
        assert!(SubjectEmail::new("alice@example.com\r\nx-user-roles: admin").is_err());
    }

    #[test]
    fn subject_email_deserializes_through_normalization() {
        let parsed = serde_json::from_str::<SubjectEmail>("\"Bob@Example.com\"");
        assert_eq!(
            parsed.map(String::from).unwrap_or_default(),
            "bob@example.com"
        );
    }

    #[test]
    fn request_context_exposes_subject_and_correlation_id() {
        let context =
            AuthenticatedRequestContext::new(Some("alice@example.com".to_owned()), "req-1");
        assert_eq!(context.subject(), Some("alice@example.com"));
        assert_eq!(context.correlation_id(), "req-1");
    }
}
