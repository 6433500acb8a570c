//! Access-token acquisition and caching.
//!
//! The cache store is treated as an external key/value service shared by
//! every request handler. Entries are superseded, never mutated; writes
//! are last-write-wins per key. Two callers racing past an expired entry
//! may both perform a token exchange; both end up with valid tokens, so
//! the race is tolerated instead of locked away.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{MailerError, MailerResult};
use crate::jwt::{self, SigningKey};

/// Safety margin before a cached token's expiry. Absorbs clock skew and
/// in-flight request latency so a token never expires mid-request.
pub const EXPIRY_MARGIN_MS: i64 = 30_000;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// A bearer token persisted in the cache store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    pub access_token: String,
    /// Expiry as epoch milliseconds.
    pub expires_at: i64,
}

impl CachedToken {
    /// Whether the token is still usable at `now_ms`, margin included.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.expires_at > now_ms + EXPIRY_MARGIN_MS
    }
}

/// Milliseconds since the UNIX epoch.
pub(crate) fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Shared key/value store with per-entry expiry.
///
/// Implementations self-evict entries after `ttl_secs`, so a stale token
/// disappears from the store around the time it stops being valid.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> MailerResult<Option<CachedToken>>;
    async fn put(&self, key: &str, token: &CachedToken, ttl_secs: u64) -> MailerResult<()>;
}

/// Redis-backed token store. Values are JSON, TTL is enforced by Redis.
pub struct RedisTokenStore {
    conn: ConnectionManager,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn get(&self, key: &str) -> MailerResult<Option<CachedToken>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, token: &CachedToken, ttl_secs: u64) -> MailerResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(token)?;
        redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}

/// In-process token store for tests and single-node deployments.
///
/// Not a substitute for a shared store when multiple instances serve
/// traffic: each process would hold its own cache and refresh
/// independently.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

#[derive(Clone)]
struct MemoryEntry {
    token: CachedToken,
    evict_at: Instant,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> MailerResult<Option<CachedToken>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.evict_at > Instant::now())
            .map(|entry| entry.token.clone()))
    }

    async fn put(&self, key: &str, token: &CachedToken, ttl_secs: u64) -> MailerResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                token: token.clone(),
                evict_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }
}

/// Response from the OAuth2 token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

/// Amortizes JWT signing and the token-exchange round-trip across
/// requests via the shared [`TokenStore`].
pub struct TokenBroker {
    cache_prefix: String,
    store: Arc<dyn TokenStore>,
    client: Client,
    signing_key: SigningKey,
    issuer: String,
    scope: String,
    token_url: String,
    subject: Option<String>,
}

impl TokenBroker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache_prefix: impl Into<String>,
        store: Arc<dyn TokenStore>,
        client: Client,
        signing_key: SigningKey,
        issuer: impl Into<String>,
        scope: impl Into<String>,
        token_url: impl Into<String>,
        subject: Option<String>,
    ) -> Self {
        Self {
            cache_prefix: cache_prefix.into(),
            store,
            client,
            signing_key,
            issuer: issuer.into(),
            scope: scope.into(),
            token_url: token_url.into(),
            subject,
        }
    }

    /// Cache key scoped to the signing identity, so distinct identities
    /// never collide. Delegated subjects get their own entries.
    pub fn cache_key(&self) -> String {
        let identity = self.subject.as_deref().unwrap_or(&self.issuer);
        format!("{}:{}", self.cache_prefix, identity)
    }

    /// Return a valid bearer token, exchanging a fresh assertion only when
    /// the cached entry is missing or inside the expiry margin.
    pub async fn access_token(&self) -> MailerResult<String> {
        let key = self.cache_key();

        match self.store.get(&key).await {
            Ok(Some(cached)) if cached.is_fresh(epoch_ms()) => {
                debug!(cache_key = %key, "using cached access token");
                return Ok(cached.access_token);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(cache_key = %key, error = %e, "token store read failed, exchanging directly");
            }
        }

        let token = self.exchange().await?;
        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: epoch_ms() + (token.expires_in as i64) * 1000,
        };

        // The exchanged token is already in hand; a store failure costs a
        // future cache hit, not this request.
        if let Err(e) = self.store.put(&key, &cached, token.expires_in).await {
            warn!(cache_key = %key, error = %e, "failed to cache access token");
        }

        Ok(token.access_token)
    }

    /// Sign a fresh assertion and exchange it at the token endpoint.
    async fn exchange(&self) -> MailerResult<TokenResponse> {
        let assertion = jwt::generate(
            &self.issuer,
            &self.signing_key,
            &self.scope,
            &self.token_url,
            self.subject.as_deref(),
        )?;

        debug!(issuer = %self.issuer, "exchanging JWT assertion for access token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::Timeout(format!("token exchange: {}", e))
                } else {
                    MailerError::TokenExchange {
                        status: None,
                        body: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::TokenExchange {
                status: Some(status.as_u16()),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| MailerError::TokenExchange {
                status: Some(status.as_u16()),
                body: format!("unparseable token response: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: i64) -> CachedToken {
        CachedToken {
            access_token: "ya29.test".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_freshness_respects_margin() {
        let now = epoch_ms();
        assert!(token(now + 40_000).is_fresh(now));
        assert!(!token(now + 10_000).is_fresh(now));
        assert!(!token(now + EXPIRY_MARGIN_MS).is_fresh(now));
        assert!(!token(now - 1_000).is_fresh(now));
    }

    #[test]
    fn test_cached_token_wire_format() {
        let value = serde_json::to_value(token(1_700_000_000_000)).unwrap();
        assert_eq!(value["accessToken"], "ya29.test");
        assert_eq!(value["expiresAt"], 1_700_000_000_000i64);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        let cached = token(epoch_ms() + 60_000);

        store.put("gmail-sa:svc@x", &cached, 60).await.unwrap();
        let loaded = store.get("gmail-sa:svc@x").await.unwrap();
        assert_eq!(loaded, Some(cached));
    }

    #[tokio::test]
    async fn test_memory_store_misses_unknown_key() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("gmail-sa:unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_evicts_after_ttl() {
        let store = MemoryTokenStore::new();
        let cached = token(epoch_ms() + 60_000);

        store.put("gmail-sa:svc@x", &cached, 0).await.unwrap();
        assert_eq!(store.get("gmail-sa:svc@x").await.unwrap(), None);
    }
}
