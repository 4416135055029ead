// Layer 1: Standard library imports
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::remote::RemoteSender;
use crate::actor::PeerRole;
use crate::mailbox::{MailboxError, MailboxSender};
use crate::message::{Envelope, ExitNotice, ExitReason, Message, StateUpdate};
use crate::util::{ActorId, HostId};

/// Where a link's envelopes go.
#[derive(Clone)]
pub(crate) enum Transport<M: Message> {
    /// A mailbox in this process.
    Local(MailboxSender<M>),

    /// A mailbox owned by another host, reached through the remote
    /// transport collaborator.
    Remote(Arc<dyn RemoteSender<M>>),
}

struct LinkInner<M: Message> {
    id: ActorId,
    tag: Option<String>,
    host: HostId,
    // Swapped on restart so outstanding clones keep addressing the actor.
    slot: RwLock<Transport<M>>,
}

/// Addressable handle to an actor's mailbox.
///
/// A link is a two-level handle: an immutable identity (actor id, owning
/// host, optional symbolic tag) around a swappable transport slot. Two
/// links are equal iff they address the same mailbox; equality and
/// hashing ignore the transport, so a link survives the restart of its
/// actor unchanged.
///
/// Links are cheap to clone and live independently of the actor; sending
/// through a link whose actor is gone surfaces [`MailboxError::Closed`].
pub struct Link<M: Message> {
    inner: Arc<LinkInner<M>>,
}

impl<M: Message> Link<M> {
    /// Create a link to a local mailbox.
    pub(crate) fn local(id: ActorId, tag: Option<String>, sender: MailboxSender<M>) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                id,
                tag,
                host: HostId::local(),
                slot: RwLock::new(Transport::Local(sender)),
            }),
        }
    }

    /// Create a link to a mailbox owned by another host.
    ///
    /// Used by the remote-transport collaborator when it re-materializes
    /// a transported link.
    pub fn remote(id: ActorId, tag: Option<String>, transport: Arc<dyn RemoteSender<M>>) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                id,
                tag,
                host: transport.host(),
                slot: RwLock::new(Transport::Remote(transport)),
            }),
        }
    }

    /// Identity of the addressed actor. Stable across restarts.
    pub fn id(&self) -> ActorId {
        self.inner.id
    }

    /// Optional symbolic channel tag.
    pub fn tag(&self) -> Option<&str> {
        self.inner.tag.as_deref()
    }

    /// Host owning the addressed mailbox.
    pub fn host(&self) -> HostId {
        self.inner.host
    }

    /// Whether the mailbox lives in this process.
    pub fn is_local(&self) -> bool {
        matches!(*self.inner.slot.read(), Transport::Local(_))
    }

    /// Deliver a user payload.
    ///
    /// Buffered, non-blocking up to the mailbox's send policy.
    ///
    /// # Errors
    ///
    /// `MailboxError::Closed` when the actor is gone, `Full`/`SendTimeout`
    /// under capacity pressure, `RemoteUnavailable` for remote links.
    pub async fn send(&self, payload: M) -> Result<(), MailboxError> {
        self.send_envelope(Envelope::User(payload)).await
    }

    /// Deliver a raw envelope.
    pub async fn send_envelope(&self, envelope: Envelope<M>) -> Result<(), MailboxError> {
        // Clone the transport out of the slot; the lock is never held
        // across an await point.
        let transport = self.inner.slot.read().clone();
        match transport {
            Transport::Local(sender) => sender.send(envelope).await,
            Transport::Remote(remote) => remote.forward(envelope).await,
        }
    }

    /// Fail-fast delivery of a user payload.
    pub fn try_send(&self, payload: M) -> Result<(), MailboxError> {
        let transport = self.inner.slot.read().clone();
        match transport {
            Transport::Local(sender) => sender.try_send(Envelope::User(payload)),
            Transport::Remote(_) => Err(MailboxError::RemoteUnavailable {
                reason: "try_send is not supported on remote links".into(),
            }),
        }
    }

    /// Request out-of-band termination with the given reason.
    ///
    /// The target finishes its current behavior invocation, then shuts
    /// down and notifies its connection set; there is no mid-behavior
    /// preemption. Encoded as a self-addressed exit notice, which the
    /// runtime always honors regardless of mode.
    pub async fn exit(&self, reason: ExitReason) -> Result<(), MailboxError> {
        let notice = ExitNotice::new(self.inner.id, reason);
        self.send_envelope(Envelope::Exit(notice)).await
    }

    /// Add `peer` to the target's connection set under the given role.
    pub async fn connect(&self, peer: Link<M>, role: PeerRole) -> Result<(), MailboxError> {
        self.send_envelope(Envelope::Connect {
            peer,
            role,
            remove: false,
        })
        .await
    }

    /// Remove `peer` from the target's connection set.
    pub async fn disconnect(&self, peer: Link<M>) -> Result<(), MailboxError> {
        self.send_envelope(Envelope::Connect {
            peer,
            role: PeerRole::Peer,
            remove: true,
        })
        .await
    }

    /// Mutate a permitted field of the target's state (mode, name, or
    /// behavior).
    pub async fn update(&self, update: StateUpdate<M>) -> Result<(), MailboxError> {
        self.send_envelope(Envelope::Update(update)).await
    }

    /// Swap the transport slot to a fresh mailbox.
    ///
    /// Restart preserves identity: every outstanding clone of this link
    /// now addresses the new mailbox.
    pub(crate) fn rebind(&self, sender: MailboxSender<M>) {
        *self.inner.slot.write() = Transport::Local(sender);
    }
}

impl<M: Message> Clone for Link<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Message> PartialEq for Link<M> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl<M: Message> Eq for Link<M> {}

impl<M: Message> Hash for Link<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl<M: Message> fmt::Debug for Link<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("id", &self.inner.id)
            .field("tag", &self.inner.tag)
            .field("local", &self.is_local())
            .finish()
    }
}

impl<M: Message> fmt::Display for Link<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.tag {
            Some(tag) => write!(f, "{tag}@{}", self.inner.id),
            None => write!(f, "{}", self.inner.id),
        }
    }
}
