//! Email provider adapters.
//!
//! Each adapter implements the same capability interface and is selected
//! at configuration time; callers never branch on the concrete type.

pub mod gmail;
pub mod gmail_oauth2;
pub mod mock;
pub mod sendgrid;
pub mod webhook;

pub use gmail::{GmailConfig, GmailProvider, ServiceAccountKey};
pub use gmail_oauth2::{GmailOAuth2Config, GmailOAuth2Provider};
pub use mock::MockProvider;
pub use sendgrid::{SendGridConfig, SendGridProvider};
pub use webhook::{WebhookConfig, WebhookProvider};

use crate::error::{MailerError, MailerResult};
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use async_trait::async_trait;

/// Capability interface implemented by every provider adapter.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email.
    async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult>;

    /// Look up a previously sent message. Providers without the capability
    /// fail with an unsupported-operation error.
    async fn get_message_details(&self, message_id: &str) -> MailerResult<MessageDetails>;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> MailerResult<()>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;
}

/// Map a send-path network failure, keeping timeouts distinct so callers
/// can treat them as retriable.
pub(crate) fn transport_error(err: reqwest::Error) -> MailerError {
    if err.is_timeout() {
        MailerError::Timeout(err.to_string())
    } else {
        MailerError::Transport {
            status: None,
            body: err.to_string(),
        }
    }
}
