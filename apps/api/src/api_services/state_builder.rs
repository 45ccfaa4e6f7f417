use std::path::Path;
use std::sync::Arc;

use rolegate_application::{
    RoleCache, RoleCacheBackend, RoleLookupConfig, RoleLookupService, RoleStore,
};
use rolegate_core::AppError;
use rolegate_infrastructure::{
    InMemoryRoleCache, InMemoryRoleStore, PostgresRoleStore, RedisRoleCache,
};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, RoleCacheConfig, RoleStoreConfig};
use crate::dev_seed;
use crate::state::AppState;

use super::database::connect_and_migrate;
use super::redis::build_redis_client;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let store = build_role_store(&config.role_store).await?;
    let mut role_lookup_service = RoleLookupService::new(
        store,
        RoleLookupConfig {
            cache_ttl: config.cache_ttl,
            store_timeout: config.store_timeout,
        },
    );

    if let Some(backend) = build_role_cache_backend(&config.role_cache)? {
        let cache = RoleCache::new(backend);
        // An unreachable cache at startup is not fatal; lookups degrade to the store.
        if !cache.health().await {
            warn!(
                backend = config.role_cache.label(),
                "role cache is unreachable at startup"
            );
        }
        role_lookup_service = role_lookup_service.with_cache(cache);
    }

    Ok(AppState {
        role_lookup_service,
    })
}

async fn build_role_store(config: &RoleStoreConfig) -> Result<Arc<dyn RoleStore>, AppError> {
    match config {
        RoleStoreConfig::Memory {
            seed_file: Some(path),
        } => {
            let store = load_seed_file(path)?;
            info!(
                subjects = store.subject_count(),
                seed_file = %path.display(),
                "in-memory role store seeded from file"
            );
            Ok(Arc::new(store))
        }
        RoleStoreConfig::Memory { seed_file: None } => {
            let store = dev_seed::development_role_store()?;
            warn!(
                subjects = store.subject_count(),
                "in-memory role store seeded with development users"
            );
            Ok(Arc::new(store))
        }
        RoleStoreConfig::Postgres {
            database_url,
            seed_file,
        } => {
            let pool = connect_and_migrate(database_url).await?;
            let store = PostgresRoleStore::new(pool);
            if let Some(path) = seed_file {
                let seed = load_seed_file(path)?;
                for (subject, roles) in seed.entries() {
                    store.upsert_roles(subject, roles).await?;
                }
                info!(
                    subjects = seed.subject_count(),
                    seed_file = %path.display(),
                    "role seed upserted into postgres"
                );
            }
            Ok(Arc::new(store))
        }
    }
}

fn load_seed_file(path: &Path) -> Result<InMemoryRoleStore, AppError> {
    let document = std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!(
            "failed to read ROLE_SEED_FILE '{}': {error}",
            path.display()
        ))
    })?;
    InMemoryRoleStore::from_json(&document)
}

fn build_role_cache_backend(
    config: &RoleCacheConfig,
) -> Result<Option<Arc<dyn RoleCacheBackend>>, AppError> {
    match config {
        RoleCacheConfig::Redis {
            redis_url,
            operation_timeout,
        } => {
            let client = build_redis_client(redis_url)?;
            Ok(Some(Arc::new(RedisRoleCache::new(
                client,
                *operation_timeout,
            ))))
        }
        RoleCacheConfig::Memory { max_entries } => {
            Ok(Some(Arc::new(InMemoryRoleCache::new(*max_entries))))
        }
        RoleCacheConfig::Disabled => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rolegate_application::RoleStore;
    use rolegate_core::{AppError, SubjectEmail};

    use super::{build_role_store, load_seed_file};
    use crate::api_config::RoleStoreConfig;

    fn write_seed(name: &str, document: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("rolegate-{}-{name}.json", std::process::id()));
        if let Err(error) = std::fs::write(&path, document) {
            panic!("failed to write test seed file: {error}");
        }
        path
    }

    #[tokio::test]
    async fn memory_store_reads_seed_file() {
        let path = write_seed(
            "memory",
            r#"{"Ops.Lead@Example.com": ["user", "customer-manager"]}"#,
        );

        let store = build_role_store(&RoleStoreConfig::Memory {
            seed_file: Some(path.clone()),
        })
        .await;
        let _ = std::fs::remove_file(&path);

        let store = match store {
            Ok(store) => store,
            Err(error) => panic!("seeded store should build: {error}"),
        };
        let subject = match SubjectEmail::new("ops.lead@example.com") {
            Ok(subject) => subject,
            Err(error) => panic!("invalid test subject: {error}"),
        };
        assert_eq!(
            store
                .lookup_roles(&subject)
                .await
                .map(|roles| roles.to_header_value())
                .ok(),
            Some("user,customer-manager".to_owned())
        );
    }

    #[test]
    fn unreadable_or_invalid_seed_is_a_validation_error() {
        let missing = std::env::temp_dir().join("rolegate-seed-that-does-not-exist.json");
        assert!(matches!(
            load_seed_file(&missing),
            Err(AppError::Validation(_))
        ));

        let path = write_seed("invalid", r#"{"a@example.com": ["bad role"]}"#);
        let result = load_seed_file(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
