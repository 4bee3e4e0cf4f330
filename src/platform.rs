//! Platform engine interface.
//!
//! The embedding platform exposes a session service the core can call through. The
//! core keeps no session state of its own.

pub type UserId = u32;
pub type SessionId = u64;

/// Session service provided by the embedding platform
pub trait PlatformEngine: Send + Sync {
    /// Connect `user_id` and return the platform's session id.
    fn connect(&self, user_id: UserId) -> SessionId;

    fn disconnect(&self, user_id: UserId);
}
