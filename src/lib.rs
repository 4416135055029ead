//! # warden-rt - Actor Runtime with Hierarchical Supervision
//!
//! A lightweight actor runtime: actors are independently scheduled units
//! of work with a private bounded mailbox, a swappable behavior, and
//! optional local state, communicating only by asynchronous message
//! passing over addressable [`Link`]s. Supervisors are specialised actors
//! that own child actors and tasks and restart or terminate them under a
//! declared strategy when they fail.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use warden_rt::prelude::*;
//!
//! // A behavior is a callable plus captured state.
//! fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
//!     Ok(msg)
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let system: ActorSystem<String> = ActorSystem::new(SystemConfig::default()).unwrap();
//!
//!     // A supervisor restarting failed children one at a time.
//!     let sv = system
//!         .supervisor(SupervisorConfig::new(Strategy::OneForOne))
//!         .unwrap();
//!
//!     // A permanent child: restarted whatever the exit reason.
//!     let worker = start_actor(&sv, ChildSpec::new(|| echo, RestartPolicy::Permanent))
//!         .await
//!         .unwrap();
//!
//!     // Synchronous request/reply over the child's link.
//!     let answer = request(&worker, "ping".to_string(), Some(Duration::from_secs(1)))
//!         .await
//!         .unwrap();
//!     assert_eq!(answer, "ping");
//! }
//! ```
//!
//! # Execution model
//!
//! - Each actor runs as one tokio task draining its mailbox; only that
//!   task touches the actor's [`actor::ActorContext`], and only between
//!   message dispatches. Behaviors never see another actor's state.
//! - Delivery is FIFO per (sender, receiver) pair; control messages share
//!   the queue with user messages, there is no priority lane.
//! - A behavior failure becomes an [`message::ExitNotice`] to every peer
//!   in the actor's connection set; it is never silently swallowed.
//! - Restarting a supervised actor preserves its link: the transport slot
//!   inside the existing [`Link`] is rebound to the fresh mailbox.
//!
//! # Module Organization
//!
//! - [`link`] - Addressable handles to mailboxes, and the remote
//!   transport contract
//! - [`mailbox`] - Bounded FIFO queues with configurable full-mailbox
//!   policies
//! - [`message`] - The `Message` trait and the tagged envelope
//! - [`actor`] - Behavior, per-actor state, spawn, and the runtime loop
//! - [`request`] - Request/reply with correlation matching
//! - [`supervisor`] - Strategies, restart intensity, child lifecycle
//! - [`system`] - `ActorSystem` defaults and the name service
//! - [`util`] - Identifier newtypes
//!
//! # Out of scope
//!
//! Distribution across hosts is an external collaborator; this crate
//! fixes only the [`link::RemoteSender`] contract (copy-on-send for
//! payloads, link re-materialization). Actor state is not persisted, and
//! scheduling fairness is whatever tokio provides.

pub mod actor;
pub mod link;
pub mod mailbox;
pub mod message;
pub mod prelude;
pub mod request;
pub mod supervisor;
pub mod system;
pub mod util;

// Re-export commonly used types
pub use actor::{spawn, ActorContext, ActorMode, Behavior, BehaviorError, SpawnOptions};
pub use link::{Link, RemoteSender};
pub use mailbox::{Mailbox, MailboxError, SendPolicy};
pub use message::{Envelope, ExitNotice, ExitReason, Message, StateUpdate};
pub use request::{request, request_later, CommError, ReplyHandle};
pub use supervisor::{
    count_children, delete_child, start_actor, start_task, supervise, terminate_child,
    unsupervise, which_children, ChildInfo, ChildKind, ChildSpec, ChildTally, RestartPolicy,
    Strategy, SupervisorConfig, SupervisorError, TaskHandle, TaskSpec,
};
pub use system::{ActorSystem, SystemConfig, SystemError};
pub use util::{ActorId, HostId, MessageId};
