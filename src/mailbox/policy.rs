//! Full-mailbox handling for bounded delivery.
//!
//! When a bounded mailbox is at capacity the configured policy decides
//! whether the sender waits, waits up to a deadline, or fails fast.

// Layer 1: Standard library imports
use std::fmt;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::sync::mpsc;
use tokio::time;

// Layer 3: Internal module imports
use super::error::MailboxError;
use crate::message::{Envelope, Message};

/// Default deadline for [`SendPolicy::BlockFor`].
pub const DEFAULT_SEND_DEADLINE: Duration = Duration::from_secs(5);

/// Sender-side policy for a full mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicy {
    /// Wait indefinitely for space.
    Block,

    /// Wait up to the deadline, then surface `SendTimeout`.
    BlockFor(Duration),

    /// Fail immediately with `Full`.
    Fail,
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self::BlockFor(DEFAULT_SEND_DEADLINE)
    }
}

impl fmt::Display for SendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::BlockFor(deadline) => write!(f, "block for {deadline:?}"),
            Self::Fail => write!(f, "fail fast"),
        }
    }
}

impl SendPolicy {
    /// Deliver one envelope under this policy.
    ///
    /// # Errors
    ///
    /// - `MailboxError::Closed` when the receiver is gone, under any policy.
    /// - `MailboxError::Full` when full and the policy is [`SendPolicy::Fail`].
    /// - `MailboxError::SendTimeout` when the deadline of
    ///   [`SendPolicy::BlockFor`] expires before space frees up.
    pub(crate) async fn apply<M: Message>(
        &self,
        sender: &mpsc::Sender<Envelope<M>>,
        envelope: Envelope<M>,
        capacity: usize,
    ) -> Result<(), MailboxError> {
        match self {
            Self::Block => sender
                .send(envelope)
                .await
                .map_err(|_| MailboxError::Closed),

            Self::BlockFor(deadline) => match time::timeout(*deadline, sender.send(envelope)).await
            {
                Ok(Ok(())) => Ok(()),
                Ok(Err(_)) => Err(MailboxError::Closed),
                Err(_) => Err(MailboxError::SendTimeout { after: *deadline }),
            },

            Self::Fail => sender.try_send(envelope).map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => MailboxError::Full { capacity },
                mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
            }),
        }
    }
}
