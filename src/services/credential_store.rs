use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;
use secrecy::ExposeSecret;
use tokio::sync::RwLock;

use crate::config::redis::{CredentialStoreBackend, CredentialStoreSettings};
use crate::models::credentials::{CredentialSet, CredentialStoreError};

/// Per-session storage of OAuth credentials, keyed by the session cookie value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<CredentialSet>, CredentialStoreError>;

    async fn put(&self, session_id: &str, credentials: &CredentialSet) -> Result<(), CredentialStoreError>;

    async fn clear(&self, session_id: &str) -> Result<(), CredentialStoreError>;
}

pub fn build_credential_store(
    settings: &CredentialStoreSettings,
    ttl: Duration,
) -> Result<Arc<dyn CredentialStore>, CredentialStoreError> {
    match settings.backend {
        CredentialStoreBackend::Memory => {
            tracing::info!("Using in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new(ttl)))
        }
        CredentialStoreBackend::Redis => {
            let redis_settings = settings.redis.as_ref().ok_or_else(|| {
                CredentialStoreError::Misconfigured("redis backend selected without redis settings".to_string())
            })?;
            let client = redis::Client::open(redis_settings.get_redis_url().expose_secret())?;
            tracing::info!("Using Redis credential store at {}:{}", redis_settings.host, redis_settings.port);
            Ok(Arc::new(RedisCredentialStore::new(client, ttl)))
        }
    }
}

/// Process-local store; entries expire after `ttl` and are lost on restart.
pub struct InMemoryCredentialStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, (CredentialSet, Instant)>>,
}

impl InMemoryCredentialStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, session_id: &str) -> Result<Option<CredentialSet>, CredentialStoreError> {
        {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                Some((credentials, stored_at)) if stored_at.elapsed() < self.ttl => {
                    return Ok(Some(credentials.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired entry
        self.entries.write().await.remove(session_id);
        Ok(None)
    }

    async fn put(&self, session_id: &str, credentials: &CredentialSet) -> Result<(), CredentialStoreError> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < self.ttl);
        entries.insert(session_id.to_string(), (credentials.clone(), Instant::now()));
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), CredentialStoreError> {
        self.entries.write().await.remove(session_id);
        Ok(())
    }
}

/// Credentials serialized as JSON under `credentials:session:<id>` with a TTL.
pub struct RedisCredentialStore {
    client: redis::Client,
    ttl_secs: usize,
}

impl RedisCredentialStore {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self {
            client,
            ttl_secs: ttl.as_secs().max(1) as usize,
        }
    }

    fn key(session_id: &str) -> String {
        format!("credentials:session:{}", session_id)
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get(&self, session_id: &str) -> Result<Option<CredentialSet>, CredentialStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(Self::key(session_id)).await?;

        match stored {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, session_id: &str, credentials: &CredentialSet) -> Result<(), CredentialStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json_str = serde_json::to_string(credentials)?;

        let _: () = conn.set_ex(Self::key(session_id), json_str, self.ttl_secs).await?;
        tracing::debug!("Stored credentials for session");
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), CredentialStoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::key(session_id)).await?;
        Ok(())
    }
}
