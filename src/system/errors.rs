//! System-level error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::SpawnError;
use crate::mailbox::MailboxError;

/// Errors raised by [`crate::system::ActorSystem`] operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SystemError {
    /// Registration under a name that is already taken. Registration is
    /// atomic; the existing binding is untouched.
    #[error("name already registered: {name}")]
    NameTaken { name: String },

    /// No binding under the given name.
    #[error("name not registered: {name}")]
    NameNotFound { name: String },

    /// Configuration validation failure.
    #[error("invalid system configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Spawning the actor failed.
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Supervision configuration was rejected.
    #[error(transparent)]
    Supervisor(#[from] crate::supervisor::SupervisorError),

    /// Delivery failure while talking to a system actor.
    #[error("delivery failed: {0}")]
    Delivery(#[from] MailboxError),
}

impl SystemError {
    /// Returns `true` for name-service conflicts.
    pub fn is_name_taken(&self) -> bool {
        matches!(self, SystemError::NameTaken { .. })
    }
}
