//! Mailer
//!
//! Sends email through one of several interchangeable providers and
//! records a delivery log. The heavy lifting is service-to-service
//! authentication: a JWT assertion signed with a Service Account key is
//! exchanged for a bearer token, which is cached in a shared key/value
//! store so signing and the exchange round-trip are amortized across
//! requests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   EmailService   │  ← single entry point for the routing layer
//! └────────┬─────────┘
//!          │ compose → authenticate → send
//! ┌────────▼─────────┐      ┌───────────────┐
//! │  EmailProvider   │──────│  TokenBroker  │  ← JWT sign + exchange
//! │ gmail / oauth2 / │      └───────┬───────┘
//! │ sendgrid/webhook │              │
//! └────────┬─────────┘      ┌───────▼───────┐
//!          │                │  TokenStore   │  ← Redis / in-memory
//! ┌────────▼─────────┐      └───────────────┘
//! │   DeliveryLog    │  ← best-effort record of every attempt
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mailer::{
//!     config, delivery_log::InMemoryDeliveryLog, models::SendEmailRequest,
//!     service::EmailService, token::MemoryTokenStore,
//! };
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryTokenStore::new());
//! let provider = config::provider_from_env(store)?;
//! let service = EmailService::new(provider, Arc::new(InMemoryDeliveryLog::new()));
//!
//! let result = service
//!     .send_email(&SendEmailRequest::new("a@example.com", "Hi", "Hello"))
//!     .await?;
//! ```

pub mod config;
pub mod delivery_log;
pub mod encoding;
pub mod error;
pub mod jwt;
pub mod message;
pub mod models;
pub mod provider;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use config::ProviderKind;
pub use delivery_log::{DeliveryEntry, DeliveryLog, DeliveryStatus, InMemoryDeliveryLog};
pub use error::{KeyFormatError, MailerError, MailerResult};
pub use models::{MessageDetails, SendEmailRequest, SendResult};
pub use provider::EmailProvider;
pub use service::EmailService;
pub use token::{CachedToken, MemoryTokenStore, RedisTokenStore, TokenBroker, TokenStore};
