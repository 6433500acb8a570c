//! Gmail API provider using OAuth2 with a pre-authorized refresh token.
//!
//! Simpler than the Service Account setup and works with any Gmail
//! account: no JWT signing, just a refresh-token grant against the token
//! endpoint. The access token is cached in-process only; this variant
//! does not use the shared token store.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{MailerError, MailerResult};
use crate::message;
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use crate::provider::gmail::{fetch_message_details, send_raw, DEFAULT_TIMEOUT, GMAIL_API_URL, TOKEN_URL};
use crate::provider::EmailProvider;
use crate::token::{epoch_ms, CachedToken};

/// Gmail OAuth2 provider configuration.
#[derive(Debug, Clone)]
pub struct GmailOAuth2Config {
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Pre-authorized refresh token with the gmail.send scope
    pub refresh_token: String,
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Gmail API base URL
    pub api_url: String,
    /// Timeout applied to every outbound call
    pub timeout: Duration,
}

impl GmailOAuth2Config {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            token_url: TOKEN_URL.to_string(),
            api_url: GMAIL_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Token response from the OAuth2 refresh grant.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: u64,
}

/// Gmail API provider using a user-consented refresh token.
pub struct GmailOAuth2Provider {
    config: GmailOAuth2Config,
    client: Client,
    /// Cached access token with expiry
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl GmailOAuth2Provider {
    pub fn new(config: GmailOAuth2Config) -> MailerResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailerError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a valid access token, refreshing if necessary.
    async fn access_token(&self) -> MailerResult<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh(epoch_ms()) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self.refresh_access_token().await?;

        let cached = CachedToken {
            access_token: token.access_token.clone(),
            expires_at: epoch_ms() + (token.expires_in as i64) * 1000,
        };
        *self.token_cache.write().await = Some(cached);

        Ok(token.access_token)
    }

    /// Exchange the refresh token for a fresh access token.
    async fn refresh_access_token(&self) -> MailerResult<RefreshResponse> {
        debug!("refreshing Gmail OAuth2 access token");

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::Timeout(format!("token refresh: {}", e))
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
            .json::<RefreshResponse>()
            .await
            .map_err(|e| MailerError::TokenExchange {
                status: Some(status.as_u16()),
                body: format!("unparseable token response: {}", e),
            })
    }
}

#[async_trait]
impl EmailProvider for GmailOAuth2Provider {
    async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult> {
        let access_token = self.access_token().await?;
        let composed = message::compose(request);

        debug!(
            to = %request.to,
            subject = %request.subject,
            "sending email via Gmail OAuth2"
        );

        send_raw(&self.client, &self.config.api_url, &access_token, composed.raw()).await
    }

    async fn get_message_details(&self, message_id: &str) -> MailerResult<MessageDetails> {
        let access_token = self.access_token().await?;
        fetch_message_details(&self.client, &self.config.api_url, &access_token, message_id).await
    }

    async fn health_check(&self) -> MailerResult<()> {
        self.access_token().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gmail-oauth2"
    }
}
