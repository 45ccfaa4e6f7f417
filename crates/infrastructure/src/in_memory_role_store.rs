use std::collections::HashMap;

use async_trait::async_trait;
use rolegate_application::RoleStore;
use rolegate_core::{AppError, AppResult, SubjectEmail};
use rolegate_domain::RoleSet;

/// In-memory role store seeded once at startup.
///
/// Keys are normalized through [`SubjectEmail`], so seeding `Alice@Example.com`
/// and looking up `alice@example.com` hit the same row.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleStore {
    roles: HashMap<SubjectEmail, RoleSet>,
}

impl InMemoryRoleStore {
    /// Creates a store from `(email, roles)` seed rows.
    ///
    /// Rows whose emails collide after normalization are rejected instead of
    /// silently overwriting each other.
    pub fn new<I, E, R, S>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (E, R)>,
        E: AsRef<str>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = HashMap::new();
        for (email, names) in entries {
            let subject = SubjectEmail::new(email)?;
            let role_set = RoleSet::new(names)?;
            if roles.insert(subject.clone(), role_set).is_some() {
                return Err(AppError::Validation(format!(
                    "duplicate role store seed entry for '{subject}'"
                )));
            }
        }

        Ok(Self { roles })
    }

    /// Creates a store from a JSON object mapping email to a role array.
    pub fn from_json(document: &str) -> AppResult<Self> {
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(document)
            .map_err(|error| AppError::Validation(format!("invalid role seed document: {error}")))?;

        Self::new(entries)
    }

    /// Iterates the seeded rows in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&SubjectEmail, &RoleSet)> {
        self.roles.iter()
    }

    /// Returns the number of seeded subjects.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.roles.len()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn lookup_roles(&self, subject: &SubjectEmail) -> AppResult<RoleSet> {
        self.roles
            .get(subject)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no roles found for user: {subject}")))
    }
}

#[cfg(test)]
mod tests {
    use rolegate_application::RoleStore;
    use rolegate_core::{AppError, SubjectEmail};

    use super::InMemoryRoleStore;

    fn subject(value: &str) -> SubjectEmail {
        match SubjectEmail::new(value) {
            Ok(subject) => subject,
            Err(error) => panic!("invalid test subject: {error}"),
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let store = InMemoryRoleStore::new([(
            "Test.User-CM@Example.com",
            ["user", "customer-manager"],
        )]);
        assert!(store.is_ok());
        let store = store.unwrap_or_default();

        let roles = store.lookup_roles(&subject("test.user-cm@example.com")).await;
        assert_eq!(
            roles.map(|roles| roles.to_header_value()).unwrap_or_default(),
            "user,customer-manager"
        );
    }

    #[tokio::test]
    async fn unknown_subject_is_not_found() {
        let store = InMemoryRoleStore::new([("alice@example.com", ["user"])]).unwrap_or_default();

        let result = store.lookup_roles(&subject("ghost@example.com")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn seed_rejects_entries_colliding_after_normalization() {
        let store = InMemoryRoleStore::new([
            ("alice@example.com", vec!["user"]),
            ("ALICE@example.com", vec!["admin"]),
        ]);
        assert!(matches!(store, Err(AppError::Validation(_))));
    }

    #[test]
    fn seed_document_is_parsed_from_json() {
        let store = InMemoryRoleStore::from_json(
            r#"{"admin.user@example.com": ["user", "admin"], "test.user@example.com": ["user"]}"#,
        );
        let store = store.unwrap_or_default();
        assert_eq!(store.subject_count(), 2);
        assert!(store.entries().any(|(subject, roles)| {
            subject.as_str() == "admin.user@example.com" && roles.contains("admin")
        }));

        assert!(InMemoryRoleStore::from_json(r#"["not", "an", "object"]"#).is_err());
        assert!(InMemoryRoleStore::from_json(r#"{"a@example.com": ["bad role"]}"#).is_err());
    }
}
