//! High-level email service: the single entry point the routing layer
//! consumes.
//!
//! Within one request the steps run strictly in order: validate, then
//! compose/authenticate/send inside the provider, then record the
//! outcome. The delivery-log write is best-effort; its failure is
//! reported in the logs but never affects the primary result.

use std::sync::Arc;
use tracing::{info, warn};

use crate::delivery_log::{DeliveryEntry, DeliveryLog};
use crate::error::{MailerError, MailerResult};
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use crate::provider::EmailProvider;

/// Email service wiring one provider adapter to the delivery log.
#[derive(Clone)]
pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
    delivery_log: Arc<dyn DeliveryLog>,
}

impl EmailService {
    pub fn new(provider: Arc<dyn EmailProvider>, delivery_log: Arc<dyn DeliveryLog>) -> Self {
        Self {
            provider,
            delivery_log,
        }
    }

    /// Send an email through the configured provider and record the
    /// attempt.
    pub async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult> {
        if request.to.trim().is_empty() {
            return Err(MailerError::InvalidRequest(
                "recipient address is required".to_string(),
            ));
        }

        let result = self.provider.send_email(request).await;

        let entry = match &result {
            Ok(sent) => {
                info!(
                    to = %request.to,
                    provider = self.provider.name(),
                    message_id = %sent.message_id,
                    "email sent"
                );
                DeliveryEntry::sent(request, self.provider.name(), &sent.message_id)
            }
            Err(err) => {
                warn!(
                    to = %request.to,
                    provider = self.provider.name(),
                    error = %err,
                    "email send failed"
                );
                DeliveryEntry::failed(request, self.provider.name(), &err.to_string())
            }
        };

        if let Err(log_err) = self.delivery_log.record(entry).await {
            warn!(error = %log_err, "failed to record delivery log entry");
        }

        result
    }

    /// Look up a previously sent message with the configured provider.
    pub async fn get_message_details(&self, message_id: &str) -> MailerResult<MessageDetails> {
        self.provider.get_message_details(message_id).await
    }

    /// Most recent delivery-log entries, newest first.
    pub async fn recent_deliveries(&self, limit: usize) -> MailerResult<Vec<DeliveryEntry>> {
        self.delivery_log.recent(limit).await
    }

    /// Readiness of the configured provider.
    pub async fn health_check(&self) -> MailerResult<()> {
        self.provider.health_check().await
    }

    /// Name of the configured provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
