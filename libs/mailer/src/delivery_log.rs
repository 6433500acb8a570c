//! Delivery log: best-effort record of send attempts.
//!
//! The log store proper (relational, paginated) lives outside this
//! library; the trait here is its interface boundary. Recording is a side
//! call: a failing log collaborator must never fail the send it is
//! logging.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::MailerResult;
use crate::models::SendEmailRequest;

/// Outcome of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Email was accepted by the provider.
    Sent,
    /// Email sending failed.
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One recorded send attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEntry {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub provider: String,
    pub status: DeliveryStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DeliveryEntry {
    /// Entry for a send the provider accepted.
    pub fn sent(request: &SendEmailRequest, provider: &str, message_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: request.to.clone(),
            subject: request.subject.clone(),
            provider: provider.to_string(),
            status: DeliveryStatus::Sent,
            provider_message_id: Some(message_id.to_string()),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Entry for a send that failed.
    pub fn failed(request: &SendEmailRequest, provider: &str, error: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            to: request.to.clone(),
            subject: request.subject.clone(),
            provider: provider.to_string(),
            status: DeliveryStatus::Failed,
            provider_message_id: None,
            error_message: Some(error.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// Interface to the external delivery-log collaborator.
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Record one send attempt.
    async fn record(&self, entry: DeliveryEntry) -> MailerResult<()>;

    /// Most recent entries, newest first.
    async fn recent(&self, limit: usize) -> MailerResult<Vec<DeliveryEntry>>;
}

/// In-memory delivery log for tests and single-node deployments.
#[derive(Clone, Default)]
pub struct InMemoryDeliveryLog {
    entries: Arc<RwLock<Vec<DeliveryEntry>>>,
}

impl InMemoryDeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn record(&self, entry: DeliveryEntry) -> MailerResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> MailerResult<Vec<DeliveryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
