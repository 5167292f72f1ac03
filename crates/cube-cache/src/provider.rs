//! Opens the cache backend named in configuration.

use std::sync::Arc;

use tracing::info;

use cube_core::config::CacheConfig;
use cube_core::error::AppError;
use cube_core::result::AppResult;
use cube_core::traits::cache::CacheProvider;

/// Connects to the backend selected by `config.provider` ("memory" or
/// "redis"). Backends compiled out by features count as unknown.
pub async fn connect(config: &CacheConfig) -> AppResult<Arc<dyn CacheProvider>> {
    match config.provider.as_str() {
        #[cfg(feature = "redis-backend")]
        "redis" => {
            let client = crate::redis::RedisClient::connect(&config.redis).await?;
            info!(ttl = config.default_ttl_seconds, "Using Redis session cache");
            Ok(Arc::new(crate::redis::RedisCacheProvider::new(
                client,
                config.default_ttl_seconds,
            )))
        }
        #[cfg(feature = "memory")]
        "memory" => {
            info!(
                max_capacity = config.memory.max_capacity,
                ttl = config.default_ttl_seconds,
                "Using in-memory session cache"
            );
            Ok(Arc::new(crate::memory::MemoryCacheProvider::new(
                &config.memory,
                config.default_ttl_seconds,
            )))
        }
        other => Err(AppError::configuration(format!(
            "Unknown cache provider: '{other}'. Supported: memory, redis"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use cube_core::error::ErrorKind;

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = CacheConfig {
            provider: "memcached".to_string(),
            ..CacheConfig::default()
        };
        let err = connect(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("memcached"));
    }

    #[tokio::test]
    async fn test_memory_backend_is_usable() {
        let cache = connect(&CacheConfig::default()).await.unwrap();
        cache.set_default("session:abc:Admin", "{}").await.unwrap();
        assert!(cache.exists("session:abc:Admin").await.unwrap());
        assert_eq!(cache.delete_pattern("session:abc:*").await.unwrap(), 1);
        assert!(cache.health_check().await.unwrap());
    }
}
