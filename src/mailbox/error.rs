//! Delivery-error taxonomy for mailbox operations.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors surfaced to the sender on failed delivery.
///
/// Delivery errors never affect the target actor; they are returned to
/// whoever attempted the send.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The mailbox has been closed; the actor is gone. Dangling links
    /// surface this on every send.
    #[error("mailbox closed")]
    Closed,

    /// The mailbox is at capacity and the send policy is fail-fast.
    #[error("mailbox full (capacity {capacity})")]
    Full { capacity: usize },

    /// The mailbox stayed full past the configured send deadline.
    #[error("send deadline expired after {after:?}")]
    SendTimeout { after: Duration },

    /// The remote transport could not forward the envelope.
    #[error("remote transport unavailable: {reason}")]
    RemoteUnavailable { reason: String },
}

impl MailboxError {
    /// Returns `true` if the target mailbox no longer exists.
    pub fn is_closed(&self) -> bool {
        matches!(self, MailboxError::Closed)
    }

    /// Returns `true` for capacity-related failures that may succeed on
    /// retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MailboxError::Full { .. } | MailboxError::SendTimeout { .. }
        )
    }
}

/// Non-blocking receive outcome when the queue yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// The mailbox is currently empty.
    Empty,

    /// All senders are gone and the queue is drained.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_classification() {
        assert!(MailboxError::Closed.is_closed());
        assert!(!MailboxError::Closed.is_retryable());
    }

    #[test]
    fn test_full_classification() {
        let err = MailboxError::Full { capacity: 32 };

        assert!(!err.is_closed());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn test_timeout_classification() {
        let err = MailboxError::SendTimeout {
            after: Duration::from_secs(5),
        };

        assert!(err.is_retryable());
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn test_remote_unavailable_display() {
        let err = MailboxError::RemoteUnavailable {
            reason: "connection refused".into(),
        };

        assert!(err.to_string().contains("connection refused"));
    }
}
