// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::error::{MailboxError, TryRecvError};
use super::policy::SendPolicy;
use crate::message::{Envelope, Message};

/// Default mailbox capacity.
pub const DEFAULT_CAPACITY: usize = 32;

/// Bounded FIFO queue backing one actor.
///
/// The receiving half is owned by the actor's runtime and is the only
/// write path into the actor: every input arrives as an [`Envelope`]
/// through the paired [`MailboxSender`]. Messages from any one sender are
/// delivered in send order; no order is guaranteed across senders.
///
/// # Example
///
/// ```rust
/// use warden_rt::mailbox::Mailbox;
/// use warden_rt::message::Envelope;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut mailbox, sender) = Mailbox::<String>::new(8);
///
/// sender.send(Envelope::User("hello".into())).await.unwrap();
/// assert!(matches!(mailbox.recv().await, Some(Envelope::User(m)) if m == "hello"));
/// # }
/// ```
pub struct Mailbox<M: Message> {
    receiver: mpsc::Receiver<Envelope<M>>,
    capacity: usize,
}

/// Sending half of a [`Mailbox`], cheap to clone.
#[derive(Clone)]
pub struct MailboxSender<M: Message> {
    sender: mpsc::Sender<Envelope<M>>,
    capacity: usize,
    policy: SendPolicy,
}

impl<M: Message> Mailbox<M> {
    /// Create a bounded mailbox with the default send policy.
    pub fn new(capacity: usize) -> (Self, MailboxSender<M>) {
        Self::with_policy(capacity, SendPolicy::default())
    }

    /// Create a bounded mailbox with an explicit full-mailbox policy.
    pub fn with_policy(capacity: usize, policy: SendPolicy) -> (Self, MailboxSender<M>) {
        let (sender, receiver) = mpsc::channel(capacity);

        let mailbox = Self { receiver, capacity };
        let sender = MailboxSender {
            sender,
            capacity,
            policy,
        };

        (mailbox, sender)
    }

    /// Await the next envelope. `None` means every sender is gone.
    pub async fn recv(&mut self) -> Option<Envelope<M>> {
        self.receiver.recv().await
    }

    /// Dequeue without waiting.
    pub fn try_recv(&mut self) -> Result<Envelope<M>, TryRecvError> {
        self.receiver.try_recv().map_err(|err| match err {
            mpsc::error::TryRecvError::Empty => TryRecvError::Empty,
            mpsc::error::TryRecvError::Disconnected => TryRecvError::Closed,
        })
    }

    /// Close the queue: further sends fail with `Closed`, already queued
    /// envelopes stay readable.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<M: Message> MailboxSender<M> {
    /// Deliver one envelope under the mailbox's send policy.
    ///
    /// # Errors
    ///
    /// `Closed` on a dangling mailbox; `Full` or `SendTimeout` when the
    /// queue stays at capacity, depending on the [`SendPolicy`].
    pub async fn send(&self, envelope: Envelope<M>) -> Result<(), MailboxError> {
        self.policy
            .apply(&self.sender, envelope, self.capacity)
            .await
    }

    /// Fail-fast delivery regardless of the configured policy.
    pub fn try_send(&self, envelope: Envelope<M>) -> Result<(), MailboxError> {
        self.sender.try_send(envelope).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })
    }

    /// Whether the receiving half is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_receive_order() {
        let (mut mailbox, sender) = Mailbox::<String>::new(8);

        for i in 0..4 {
            sender.send(Envelope::User(format!("m{i}"))).await.unwrap();
        }

        for i in 0..4 {
            match mailbox.recv().await {
                Some(Envelope::User(m)) => assert_eq!(m, format!("m{i}")),
                other => panic!("unexpected envelope: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_capacity_enforced_with_fail_policy() {
        let (mut _mailbox, sender) = Mailbox::<String>::with_policy(2, SendPolicy::Fail);

        sender.send(Envelope::User("1".into())).await.unwrap();
        sender.send(Envelope::User("2".into())).await.unwrap();

        let result = sender.send(Envelope::User("3".into())).await;
        assert_eq!(result, Err(MailboxError::Full { capacity: 2 }));
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let (mut mailbox, _sender) = Mailbox::<String>::new(4);

        assert_eq!(mailbox.try_recv().err(), Some(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_closed_mailbox_rejects_sends() {
        let (mailbox, sender) = Mailbox::<String>::new(4);
        drop(mailbox);

        let result = sender.send(Envelope::User("late".into())).await;
        assert_eq!(result, Err(MailboxError::Closed));
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn test_close_drains_queued_messages() {
        let (mut mailbox, sender) = Mailbox::<String>::new(4);

        sender.send(Envelope::User("queued".into())).await.unwrap();
        mailbox.close();

        assert!(sender.try_send(Envelope::User("late".into())).is_err());
        assert!(matches!(
            mailbox.recv().await,
            Some(Envelope::User(m)) if m == "queued"
        ));
        assert!(mailbox.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_multiple_senders() {
        let (mut mailbox, sender) = Mailbox::<String>::new(8);
        let sender2 = sender.clone();

        sender.send(Envelope::User("a".into())).await.unwrap();
        sender2.send(Envelope::User("b".into())).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..2 {
            if let Some(Envelope::User(m)) = mailbox.recv().await {
                seen.push(m);
            }
        }
        seen.sort();
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_default_capacity_constant() {
        assert_eq!(DEFAULT_CAPACITY, 32);
    }
}
