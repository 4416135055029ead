//! Per-actor state, owned exclusively by the runtime that drains the
//! mailbox.
//!
//! The context is handed to the behavior as an explicit `&mut` parameter
//! during dispatch; there is no ambient per-task state and no way for
//! another actor to reach it.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::link::Link;
use crate::message::Message;
use crate::util::ActorId;

/// Execution mode of an actor.
///
/// `Supervisor` switches the runtime's reaction to `Exit` notices from
/// "terminate with the same reason" to the supervision logic. Further
/// modes are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorMode {
    /// Plain actor: peer exits propagate, control messages are generic.
    #[default]
    Default,

    /// Supervisor: child exits feed the restart logic instead of
    /// terminating the actor.
    Supervisor,
}

/// Role of a peer inside an actor's connection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerRole {
    /// Mutually connected actor; exits propagate between the two.
    Peer,

    /// Observer that is notified of exits but does not propagate them.
    Monitor,

    /// The owning supervisor. Its exit tears the actor down; exits of
    /// other peers are left for the supervisor to handle.
    Parent,
}

/// One entry of an actor's connection set.
#[derive(Debug, Clone)]
pub struct PeerEntry<M: Message> {
    /// Handle to the peer's mailbox.
    pub link: Link<M>,

    /// How exits interact with this peer.
    pub role: PeerRole,
}

/// State owned by one actor runtime instance.
///
/// Holds the actor's own link, the current behavior mode, the connection
/// set notified on exit, and the last value the behavior produced. The
/// runtime mutates it only between message dispatches.
pub struct ActorContext<M: Message> {
    id: ActorId,
    link: Link<M>,
    name: Option<String>,
    mode: ActorMode,
    conn: Vec<PeerEntry<M>>,
    result: Option<M>,
    started_at: DateTime<Utc>,
}

impl<M: Message> ActorContext<M> {
    /// Create a fresh context for a newly spawned actor.
    pub fn new(link: Link<M>, name: Option<String>, mode: ActorMode) -> Self {
        Self {
            id: link.id(),
            link,
            name,
            mode,
            conn: Vec::new(),
            result: None,
            started_at: Utc::now(),
        }
    }

    /// The actor's own id.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// The actor's own link; clone it to hand out an address.
    pub fn link(&self) -> &Link<M> {
        &self.link
    }

    /// Optional symbolic name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Current execution mode.
    pub fn mode(&self) -> ActorMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: ActorMode) {
        self.mode = mode;
    }

    /// Last value produced by the behavior, if any.
    pub fn result(&self) -> Option<&M> {
        self.result.as_ref()
    }

    pub(crate) fn set_result(&mut self, value: M) {
        self.result = Some(value);
    }

    pub(crate) fn result_cloned(&self) -> Option<M> {
        self.result.clone()
    }

    /// When the actor started (current incarnation).
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The connection set: peers notified when this actor exits.
    pub fn conn(&self) -> &[PeerEntry<M>] {
        &self.conn
    }

    /// Link to the owning supervisor, if this actor is supervised.
    pub fn parent(&self) -> Option<&Link<M>> {
        self.conn
            .iter()
            .find(|entry| entry.role == PeerRole::Parent)
            .map(|entry| &entry.link)
    }

    /// Role of the given peer inside the connection set, if present.
    pub fn peer_role(&self, id: ActorId) -> Option<PeerRole> {
        self.conn
            .iter()
            .find(|entry| entry.link.id() == id)
            .map(|entry| entry.role)
    }

    /// Add a peer, or update its role when already connected.
    ///
    /// A peer appears at most once regardless of how many times it
    /// connects.
    pub(crate) fn connect(&mut self, link: Link<M>, role: PeerRole) {
        match self.conn.iter_mut().find(|e| e.link.id() == link.id()) {
            Some(entry) => entry.role = role,
            None => self.conn.push(PeerEntry { link, role }),
        }
    }

    /// Remove a peer from the connection set.
    pub(crate) fn disconnect(&mut self, id: ActorId) {
        self.conn.retain(|entry| entry.link.id() != id);
    }
}

impl<M: Message> fmt::Debug for ActorContext<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("conn", &self.conn.len())
            .finish_non_exhaustive()
    }
}
