//! Role names and role sets resolved for a subject.
//!
//! Role names are opaque and flat: no hierarchy, no wildcard, no implied
//! grants. They travel to the gateway as a comma-separated header value, so a
//! name can never contain the separator or whitespace.

use std::fmt::{Display, Formatter};

use rolegate_core::headers::ROLE_SEPARATOR;
use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 128;

/// Validated opaque role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        if trimmed.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if trimmed.chars().any(|character| {
            character == ROLE_SEPARATOR || character.is_whitespace() || character.is_control()
        }) {
            return Err(AppError::Validation(format!(
                "role name '{}' must not contain whitespace, control characters or '{ROLE_SEPARATOR}'",
                trimmed.escape_debug()
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Set of role names granted to one subject.
///
/// Membership is what matters; equality ignores order. The first-seen order
/// is kept so header output follows the order the store returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RoleSet(Vec<RoleName>);

impl RoleSet {
    /// Creates a role set, dropping duplicate names.
    pub fn new<I, S>(names: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles: Vec<RoleName> = Vec::new();
        for name in names {
            let role = RoleName::new(name)?;
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        Ok(Self(roles))
    }

    /// Renders the comma-separated wire form, without spaces.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        self.iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>()
            .join(&ROLE_SEPARATOR.to_string())
    }

    /// Returns whether the set grants the named role.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|value| value.as_str() == role)
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates roles in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &RoleName> {
        self.0.iter()
    }

    /// Returns role names as owned strings in first-seen order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|role| role.as_str().to_owned()).collect()
    }
}

impl PartialEq for RoleSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|role| other.0.contains(role))
    }
}

impl Eq for RoleSet {}

impl TryFrom<Vec<String>> for RoleSet {
    type Error = AppError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleSet> for Vec<String> {
    fn from(value: RoleSet) -> Self {
        value.0.into_iter().map(String::from).collect()
    }
}
