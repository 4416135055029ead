// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::traits::Message;
use crate::actor::{ActorMode, BoxedBehavior, PeerRole};
use crate::link::Link;
use crate::supervisor::{ChildInfo, ChildSpec, ChildTally, SupervisorError, TaskHandle, TaskSpec};
use crate::util::{ActorId, MessageId};

/// Why an actor terminated.
///
/// `Normal`, `Shutdown` and `TimedOut` form the "clean" set: a transient
/// child exiting with one of them is not restarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// The behavior ran to completion.
    Normal,

    /// Deliberate stop, usually ordered by a supervisor.
    Shutdown,

    /// A supervised task hit its monitoring deadline.
    TimedOut,

    /// The behavior failed; carries the failure description.
    Failure(String),
}

impl ExitReason {
    /// Whether transient children treat this reason as a clean exit.
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            ExitReason::Normal | ExitReason::Shutdown | ExitReason::TimedOut
        )
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Normal => write!(f, "normal"),
            ExitReason::Shutdown => write!(f, "shutdown"),
            ExitReason::TimedOut => write!(f, "timed_out"),
            ExitReason::Failure(cause) => write!(f, "failure: {cause}"),
        }
    }
}

/// Exit notification delivered to an actor's connection set.
///
/// `from` names the terminated actor (or supervised task). A notice whose
/// `from` equals the *receiver* is an exit request: the runtime honors it
/// unconditionally, which is how `Link::exit` and the supervisor's
/// over-budget self-shutdown are expressed.
#[derive(Debug, Clone)]
pub struct ExitNotice<M: Message> {
    /// Identity of the exited actor or task.
    pub from: ActorId,

    /// Why it terminated.
    pub reason: ExitReason,

    /// Human-readable context, if any.
    pub detail: Option<String>,

    /// The actor's last computed result, captured at termination.
    pub result: Option<M>,
}

impl<M: Message> ExitNotice<M> {
    /// Notice with no detail and no captured state.
    pub fn new(from: ActorId, reason: ExitReason) -> Self {
        Self {
            from,
            reason,
            detail: None,
            result: None,
        }
    }

    /// Attach human-readable context.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the captured state.
    pub fn with_result(mut self, result: Option<M>) -> Self {
        self.result = result;
        self
    }
}

/// Permitted targets of an `Update` control message.
pub enum StateUpdate<M: Message> {
    /// Switch the actor's execution mode.
    Mode(ActorMode),

    /// Set or clear the symbolic name.
    Name(Option<String>),

    /// Swap the behavior; takes effect from the next dispatch.
    Behavior(BoxedBehavior<M>),
}

impl<M: Message> StateUpdate<M> {
    /// Convenience constructor boxing any behavior value.
    pub fn behavior(behavior: impl crate::actor::Behavior<M>) -> Self {
        Self::Behavior(Box::new(behavior))
    }
}

impl<M: Message> fmt::Debug for StateUpdate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateUpdate::Mode(mode) => f.debug_tuple("Mode").field(mode).finish(),
            StateUpdate::Name(name) => f.debug_tuple("Name").field(name).finish(),
            StateUpdate::Behavior(_) => write!(f, "Behavior(..)"),
        }
    }
}

/// Everything that can land in a mailbox.
///
/// User payloads and control messages share one FIFO queue; the runtime
/// matches on the tag before any user behavior runs. The supervision
/// operations carry `oneshot` reply channels so callers get an answer (or
/// an error when the target is not a supervisor) without occupying the
/// user payload type.
pub enum Envelope<M: Message> {
    /// Plain payload for the behavior.
    User(M),

    /// Payload expecting a correlated [`Envelope::Response`].
    Request {
        /// Where to deliver the response.
        reply_to: Link<M>,
        /// Fresh correlation identity for causal pairing.
        correlation: MessageId,
        /// The payload handed to the behavior.
        payload: M,
    },

    /// Reply to a [`Envelope::Request`] with the same correlation id.
    Response {
        /// Correlation identity copied from the request.
        correlation: MessageId,
        /// The behavior's produced value.
        payload: M,
    },

    /// Exit notification or (when self-addressed) exit request.
    Exit(ExitNotice<M>),

    /// Add or remove a peer in the connection set.
    Connect {
        /// The peer to (dis)connect.
        peer: Link<M>,
        /// Role the peer takes; ignored on removal.
        role: PeerRole,
        /// `true` removes the peer instead of adding it.
        remove: bool,
    },

    /// Mutate a permitted state field.
    Update(StateUpdate<M>),

    /// Supervisor: spawn and register a new actor child.
    StartChild {
        /// How to create (and re-create) the child.
        spec: ChildSpec<M>,
        /// Answers with the child's link.
        reply: oneshot::Sender<Result<Link<M>, SupervisorError>>,
    },

    /// Supervisor: schedule and monitor a one-shot task child.
    StartTask {
        /// The task callable and its monitoring parameters.
        spec: TaskSpec,
        /// Answers with the task handle.
        reply: oneshot::Sender<Result<TaskHandle, SupervisorError>>,
    },

    /// Supervisor: register an already running actor as a child.
    Supervise {
        /// The caller's own link.
        child: Link<M>,
        /// Restart configuration for the caller.
        spec: ChildSpec<M>,
        /// Acknowledgement channel.
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },

    /// Supervisor: remove a child without terminating it.
    Delete {
        /// Identity of the child to remove (a link's id, or a task
        /// handle's id).
        child: ActorId,
        /// Acknowledgement channel.
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },

    /// Supervisor: remove a child and shut it down with
    /// [`ExitReason::Shutdown`].
    Terminate {
        /// Identity of the child to remove and stop.
        child: ActorId,
        /// Acknowledgement channel.
        reply: oneshot::Sender<Result<(), SupervisorError>>,
    },

    /// Supervisor: enumerate children.
    Which {
        /// Answers with one entry per child.
        reply: oneshot::Sender<Result<Vec<ChildInfo<M>>, SupervisorError>>,
    },

    /// Supervisor: tally children by policy and kind.
    Count {
        /// Answers with the tally.
        reply: oneshot::Sender<Result<ChildTally, SupervisorError>>,
    },
}

impl<M: Message> Envelope<M> {
    /// Tag name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::User(_) => "user",
            Envelope::Request { .. } => "request",
            Envelope::Response { .. } => "response",
            Envelope::Exit(_) => "exit",
            Envelope::Connect { .. } => "connect",
            Envelope::Update(_) => "update",
            Envelope::StartChild { .. } => "start_child",
            Envelope::StartTask { .. } => "start_task",
            Envelope::Supervise { .. } => "supervise",
            Envelope::Delete { .. } => "delete",
            Envelope::Terminate { .. } => "terminate",
            Envelope::Which { .. } => "which",
            Envelope::Count { .. } => "count",
        }
    }

    /// Whether this envelope is one of the supervision operations.
    pub fn is_supervision(&self) -> bool {
        matches!(
            self,
            Envelope::StartChild { .. }
                | Envelope::StartTask { .. }
                | Envelope::Supervise { .. }
                | Envelope::Delete { .. }
                | Envelope::Terminate { .. }
                | Envelope::Which { .. }
                | Envelope::Count { .. }
        )
    }
}

impl<M: Message> fmt::Debug for Envelope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Envelope::User(payload) => f.debug_tuple("User").field(payload).finish(),
            Envelope::Request {
                correlation,
                payload,
                ..
            } => f
                .debug_struct("Request")
                .field("correlation", correlation)
                .field("payload", payload)
                .finish_non_exhaustive(),
            Envelope::Response {
                correlation,
                payload,
            } => f
                .debug_struct("Response")
                .field("correlation", correlation)
                .field("payload", payload)
                .finish(),
            Envelope::Exit(notice) => f.debug_tuple("Exit").field(notice).finish(),
            Envelope::Connect { peer, role, remove } => f
                .debug_struct("Connect")
                .field("peer", &peer.id())
                .field("role", role)
                .field("remove", remove)
                .finish(),
            Envelope::Update(update) => f.debug_tuple("Update").field(update).finish(),
            other => write!(f, "{}(..)", other.kind()),
        }
    }
}
