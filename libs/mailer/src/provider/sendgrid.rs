//! SendGrid email provider implementation.
//!
//! A static API token and the v3 JSON schema; no JWT or token exchange
//! involved. Message details lookup is not part of SendGrid's send API
//! and is reported as unsupported.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{MailerError, MailerResult};
use crate::message::SELF_SENDER;
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use crate::provider::{transport_error, EmailProvider};

/// SendGrid API configuration.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// SendGrid API key.
    pub api_key: String,
    /// Default sender email address.
    pub from_email: String,
    /// Sender name.
    pub from_name: Option<String>,
    /// SendGrid API base URL (defaults to production).
    pub api_url: String,
    /// Timeout applied to every outbound call.
    pub timeout: Duration,
}

impl SendGridConfig {
    /// Create a new SendGrid configuration.
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            from_name: None,
            api_url: "https://api.sendgrid.com/v3".to_string(),
            timeout: super::gmail::DEFAULT_TIMEOUT,
        }
    }
}

/// SendGrid email provider.
pub struct SendGridProvider {
    config: SendGridConfig,
    client: Client,
}

impl SendGridProvider {
    /// Create a new SendGrid provider.
    pub fn new(config: SendGridConfig) -> MailerResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

// SendGrid API request/response structures

#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<EmailAddress>,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<EmailAddress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl EmailAddress {
    fn bare(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SendGridError {
    errors: Vec<SendGridErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Fields are populated by deserialization from the SendGrid API
struct SendGridErrorDetail {
    message: String,
    field: Option<String>,
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult> {
        let from_email = match request.from.as_deref() {
            Some(from) if from != SELF_SENDER => from,
            _ => self.config.from_email.as_str(),
        };

        let content_type = if request.is_html {
            "text/html"
        } else {
            "text/plain"
        };

        let payload = SendGridRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress::bare(&request.to)],
                cc: request.cc.iter().map(|a| EmailAddress::bare(a)).collect(),
                bcc: request.bcc.iter().map(|a| EmailAddress::bare(a)).collect(),
            }],
            from: EmailAddress {
                email: from_email.to_string(),
                name: self.config.from_name.clone(),
            },
            reply_to: request.reply_to.as_deref().map(EmailAddress::bare),
            subject: request.subject.clone(),
            content: vec![Content {
                content_type: content_type.to_string(),
                value: request.content.clone(),
            }],
        };

        debug!(
            to = %request.to,
            subject = %request.subject,
            cc_count = request.cc.len(),
            bcc_count = request.bcc.len(),
            "Sending email via SendGrid"
        );

        let response = self
            .client
            .post(format!("{}/mail/send", self.config.api_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if status.is_success() {
            info!(
                to = %request.to,
                message_id = ?message_id,
                "Email sent successfully via SendGrid"
            );
            Ok(SendResult {
                message_id: message_id.unwrap_or_default(),
                thread_id: None,
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                to = %request.to,
                status = %status,
                error = %error_body,
                "Failed to send email via SendGrid"
            );

            // Try to parse the structured error response
            let message = if let Ok(sg_error) = serde_json::from_str::<SendGridError>(&error_body) {
                sg_error
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                error_body
            };

            Err(MailerError::Transport {
                status: Some(status.as_u16()),
                body: message,
            })
        }
    }

    async fn get_message_details(&self, _message_id: &str) -> MailerResult<MessageDetails> {
        Err(MailerError::Unsupported {
            provider: "sendgrid",
            operation: "message details lookup",
        })
    }

    async fn health_check(&self) -> MailerResult<()> {
        // SendGrid has no dedicated health endpoint; validate the key shape
        if self.config.api_key.starts_with("SG.") {
            Ok(())
        } else {
            Err(MailerError::Config(
                "Invalid SendGrid API key format".to_string(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "sendgrid"
    }
}
