//! Webhook-forwarding provider.
//!
//! Relays the logical send request as JSON to an externally configured
//! URL and trusts its JSON response for the returned identifiers. The
//! response contract is validated strictly: a forwarder that answers
//! 200 with an empty or malformed body is a misconfiguration the caller
//! needs to see, not a successful send.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{MailerError, MailerResult};
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use crate::provider::{transport_error, EmailProvider};

/// Webhook provider configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// URL the send request is forwarded to.
    pub url: String,
    /// Timeout applied to the forwarded call.
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: super::gmail::DEFAULT_TIMEOUT,
        }
    }
}

/// Provider that forwards sends to a configured webhook.
pub struct WebhookProvider {
    config: WebhookConfig,
    client: Client,
}

impl WebhookProvider {
    pub fn new(config: WebhookConfig) -> MailerResult<Self> {
        if config.url.trim().is_empty() {
            return Err(MailerError::Config("webhook URL is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Validate the forwarder's response body against the expected
    /// `{id, threadId}` contract.
    fn parse_response(body: &str) -> MailerResult<SendResult> {
        if body.trim().is_empty() {
            return Err(MailerError::EmptyResponse);
        }

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|_| MailerError::invalid_response("response body is not JSON", body))?;

        let message_id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| MailerError::invalid_response("missing field `id`", body))?;
        let thread_id = value
            .get("threadId")
            .and_then(|v| v.as_str())
            .ok_or_else(|| MailerError::invalid_response("missing field `threadId`", body))?;

        Ok(SendResult {
            message_id: message_id.to_string(),
            thread_id: Some(thread_id.to_string()),
        })
    }
}

#[async_trait]
impl EmailProvider for WebhookProvider {
    async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult> {
        debug!(
            to = %request.to,
            url = %self.config.url,
            "forwarding email to webhook"
        );

        let response = self
            .client
            .post(&self.config.url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "webhook rejected the send");
            return Err(MailerError::Transport {
                status: Some(status.as_u16()),
                body,
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        Self::parse_response(&body)
    }

    async fn get_message_details(&self, _message_id: &str) -> MailerResult<MessageDetails> {
        Err(MailerError::Unsupported {
            provider: "webhook",
            operation: "message details lookup",
        })
    }

    async fn health_check(&self) -> MailerResult<()> {
        // Nothing to probe without sending; configuration was validated at
        // construction time
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
