use async_trait::async_trait;

use rolegate_application::RoleStore;
use rolegate_core::{AppError, AppResult, SubjectEmail};
use rolegate_domain::RoleSet;

use sqlx::{FromRow, PgPool};
use tracing::warn;

/// PostgreSQL-backed role store: one point lookup by primary key.
#[derive(Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the role row for one subject.
    pub async fn upsert_roles(&self, subject: &SubjectEmail, roles: &RoleSet) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (email, roles, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (email) DO UPDATE
            SET roles = EXCLUDED.roles,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(subject.as_str())
        .bind(roles.names())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::StoreUnavailable(format!(
                "failed to save roles for user '{subject}': {error}"
            ))
        })?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct UserRolesRow {
    roles: Vec<String>,
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn lookup_roles(&self, subject: &SubjectEmail) -> AppResult<RoleSet> {
        let row = sqlx::query_as::<_, UserRolesRow>(
            r#"
            SELECT roles
            FROM user_roles
            WHERE email = $1
            "#,
        )
        .bind(subject.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            warn!(subject = %subject, error = %error, "role store query failed");
            AppError::StoreUnavailable(format!("failed to load roles for user '{subject}': {error}"))
        })?;

        let Some(row) = row else {
            return Err(AppError::NotFound(format!(
                "no roles found for user: {subject}"
            )));
        };

        RoleSet::new(row.roles).map_err(|error| {
            AppError::Internal(format!(
                "stored roles for user '{subject}' are invalid: {}",
                error.message()
            ))
        })
    }
}
