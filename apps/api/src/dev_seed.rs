use rolegate_core::AppResult;
use rolegate_infrastructure::InMemoryRoleStore;

/// Test users known to the local identity provider realm.
const DEV_SEED_USERS: [(&str, &[&str]); 6] = [
    ("test.user-vrfd@example.com", &["verified-user"]),
    ("test.user@example.com", &["user"]),
    ("test.user-cm@example.com", &["user", "customer-manager"]),
    ("test.user-pm@example.com", &["user", "product-manager"]),
    (
        "test.user-pcm@example.com",
        &["user", "product-category-manager"],
    ),
    ("admin.user@example.com", &["user", "admin"]),
];

/// Builds the in-memory store used when no seed file is configured.
pub fn development_role_store() -> AppResult<InMemoryRoleStore> {
    InMemoryRoleStore::new(
        DEV_SEED_USERS
            .iter()
            .map(|(email, roles)| (*email, roles.iter().copied())),
    )
}
