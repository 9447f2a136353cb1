//! Redis cache backend
//!
//! A single `deadpool-redis` pool shared by every caller. The pool opens
//! connections lazily and replaces broken ones on the next checkout, so a
//! Redis restart heals without any retry loop here.

use ::redis::AsyncCommands;
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use std::time::Duration;

use super::{CacheBackend, CacheConfig, CacheError};

/// Redis-backed [`CacheBackend`]
pub struct RedisBackend {
    /// Connection pool
    pool: Pool,
    /// Redis URL, for logs
    url: String,
}

impl RedisBackend {
    /// Build the pool; no connection is opened until the first call
    pub fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let timeout = Some(config.op_timeout());
        let pool = PoolConfig::from_url(&config.url)
            .builder()
            .map_err(|e| CacheError::Unavailable(format!("Failed to create pool builder: {e}")))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| {
                CacheError::Unavailable(format!("Failed to create Redis connection pool: {e}"))
            })?;

        Ok(Self {
            pool,
            url: config.url.clone(),
        })
    }

    /// Redis URL this backend points at
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Unavailable(format!("Failed to get connection: {e}")))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Command(format!("Failed to get from cache: {e}")))?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::Command(format!("Failed to set cache: {e}")))?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        let reply: String = ::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Command(format!("Failed to ping Redis: {e}")))?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Command(format!("Unexpected PING reply: {reply}")))
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    async fn shutdown(&self) {
        self.pool.close();
    }
}
