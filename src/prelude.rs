//! Convenience re-exports of the common surface.
//!
//! ```rust
//! use warden_rt::prelude::*;
//! ```

pub use crate::actor::{
    spawn, ActorContext, ActorMode, Behavior, BehaviorError, PeerRole, SpawnError, SpawnOptions,
};
pub use crate::link::{Link, RemoteSender};
pub use crate::mailbox::{Mailbox, MailboxError, SendPolicy};
pub use crate::message::{Envelope, ExitNotice, ExitReason, Message, StateUpdate};
pub use crate::request::{receive, request, request_later, CommError, ReplyHandle};
pub use crate::supervisor::{
    count_children, delete_child, start_actor, start_task, supervise, terminate_child,
    unsupervise, which_children, ChildInfo, ChildKind, ChildSpec, ChildTally, RestartPolicy,
    Strategy, SupervisorConfig, SupervisorError, TaskHandle, TaskSpec,
};
pub use crate::system::{ActorSystem, SystemConfig, SystemError};
pub use crate::util::{ActorId, HostId, MessageId};
