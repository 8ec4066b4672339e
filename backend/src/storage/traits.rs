//! # Storage Traits
//!
//! Storage abstractions used by the domain layer.

use anyhow::Result;
use shared::AuthSession;

/// Durable home of the persisted auth session
pub trait SessionStorage: Send + Sync {
    /// Load the stored session, `None` when nothing has been stored yet
    fn load_session(&self) -> Result<Option<AuthSession>>;

    /// Replace the stored session
    fn save_session(&self, session: &AuthSession) -> Result<()>;
}
