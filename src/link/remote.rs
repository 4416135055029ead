//! Remote transport contract.
//!
//! Distribution across processes is an external collaborator; the runtime
//! only fixes the interface it must satisfy.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::mailbox::MailboxError;
use crate::message::{Envelope, Message};
use crate::util::HostId;

/// Forwarding half of a remote link.
///
/// Implementations carry envelopes to a mailbox owned by another host.
/// The contract a transport must honor:
///
/// - **Copy-on-send**: a payload crossing the host boundary is a copy;
///   the receiving side must never observe sender-side mutation. Payloads
///   are `Clone`, so the transport serializes or clones before handing
///   the envelope off.
/// - **Link re-materialization**: a locally-owned link transported through
///   a remote link arrives as a remote link dereferencing the same
///   mailbox (same `ActorId`, same owning host).
/// - **Delivery failures** surface as
///   [`MailboxError::RemoteUnavailable`]; they are reported to the sender
///   and never affect the target.
#[async_trait]
pub trait RemoteSender<M: Message>: Send + Sync {
    /// The host owning the target mailbox.
    fn host(&self) -> HostId;

    /// Forward one envelope to the remote mailbox.
    async fn forward(&self, envelope: Envelope<M>) -> Result<(), MailboxError>;
}
