//! Application state management.
//!
//! The state is cloned for each handler; both members are cheap Arc
//! clones underneath.

use mailer::EmailService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// The email service the routing layer delegates to
    pub service: EmailService,
}
