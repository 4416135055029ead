//! Error types for supervision operations.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::mailbox::MailboxError;
use crate::util::ActorId;

/// Errors surfaced by the supervision API.
///
/// Policy violations (invalid configuration symbols) are raised
/// synchronously to the caller; the rest travel back over the operation's
/// reply channel.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SupervisorError {
    /// A supervision operation reached an actor that is not running in
    /// supervisor mode.
    #[error("target actor is not a supervisor")]
    NotASupervisor,

    /// No child with the given identity is registered.
    #[error("child not found: {id}")]
    ChildNotFound { id: ActorId },

    /// Rejected configuration: unknown strategy/policy symbol or
    /// unenforceable intensity bounds.
    #[error("invalid supervisor configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The restart budget was exhausted; the supervisor shuts down.
    #[error("restart limit exceeded: {max_restarts} restarts in {max_seconds}s")]
    RestartLimitExceeded { max_restarts: u32, max_seconds: f64 },

    /// The operation could not be delivered to the supervisor.
    #[error("delivery to supervisor failed: {0}")]
    Delivery(#[from] MailboxError),

    /// The supervisor terminated before answering.
    #[error("supervisor closed before replying")]
    NoReply,
}

impl SupervisorError {
    /// Returns `true` for errors that end the supervisor rather than the
    /// single operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SupervisorError::RestartLimitExceeded { .. }
                | SupervisorError::InvalidConfiguration { .. }
        )
    }

    /// Returns `true` if the error names a missing child.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SupervisorError::ChildNotFound { .. })
    }
}
