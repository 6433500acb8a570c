//! Mock email provider for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{MailerError, MailerResult};
use crate::models::{MessageDetails, SendEmailRequest, SendResult};
use crate::provider::EmailProvider;

/// Mock provider that captures sent emails.
pub struct MockProvider {
    sent_emails: Arc<Mutex<Vec<SendEmailRequest>>>,
    should_fail: bool,
    failure_message: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
            failure_message: None,
        }
    }

    /// Create a mock provider that always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
            failure_message: Some(message.into()),
        }
    }

    /// Get all sent emails.
    pub async fn sent_emails(&self) -> Vec<SendEmailRequest> {
        self.sent_emails.lock().await.clone()
    }

    /// Get the count of sent emails.
    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    /// Check if an email was sent to a specific address.
    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == email)
    }

    /// Clear all sent emails.
    pub async fn clear(&self) {
        self.sent_emails.lock().await.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockProvider {
    async fn send_email(&self, request: &SendEmailRequest) -> MailerResult<SendResult> {
        if self.should_fail {
            let message = self
                .failure_message
                .clone()
                .unwrap_or_else(|| "Mock failure".to_string());
            return Err(MailerError::Transport {
                status: None,
                body: message,
            });
        }

        let mut sent = self.sent_emails.lock().await;
        sent.push(request.clone());
        let id = format!("mock-{}", sent.len());

        Ok(SendResult {
            message_id: id.clone(),
            thread_id: Some(id),
        })
    }

    async fn get_message_details(&self, message_id: &str) -> MailerResult<MessageDetails> {
        Ok(MessageDetails {
            id: message_id.to_string(),
            thread_id: message_id.to_string(),
            label_ids: vec!["SENT".to_string()],
            snippet: None,
        })
    }

    async fn health_check(&self) -> MailerResult<()> {
        if self.should_fail {
            return Err(MailerError::Transport {
                status: None,
                body: "Mock health check failed".to_string(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_captures_emails() {
        let provider = MockProvider::new();

        let email = SendEmailRequest::new("test@example.com", "Test Subject", "Test body");
        let result = provider.send_email(&email).await.unwrap();
        assert_eq!(result.message_id, "mock-1");

        let sent = provider.sent_emails().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "test@example.com");
    }

    #[tokio::test]
    async fn test_mock_provider_fails() {
        let provider = MockProvider::failing("Simulated failure");

        let email = SendEmailRequest::new("test@example.com", "Test Subject", "Test body");
        let result = provider.send_email(&email).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Simulated failure"));
    }

    #[tokio::test]
    async fn test_mock_provider_was_sent_to() {
        let provider = MockProvider::new();

        let email = SendEmailRequest::new("user@example.com", "Test", "Body");
        provider.send_email(&email).await.unwrap();

        assert!(provider.was_sent_to("user@example.com").await);
        assert!(!provider.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn test_mock_provider_clear() {
        let provider = MockProvider::new();

        let email = SendEmailRequest::new("user@example.com", "Test", "Body");
        provider.send_email(&email).await.unwrap();
        assert_eq!(provider.sent_count().await, 1);

        provider.clear().await;
        assert_eq!(provider.sent_count().await, 0);
    }
}
