//! Hierarchical supervision.
//!
//! A supervisor is a specialised actor that owns a list of child actors
//! and tasks and restarts or terminates them according to a declared
//! policy when they fail.
//!
//! # Strategies
//!
//! - **OneForOne**: restart only the failed child. For independent
//!   children.
//! - **OneForAll**: shut down every other child, then restart all in
//!   start order. For children that share state.
//! - **RestForOne**: shut down the failed child's younger siblings, then
//!   restart the failed child and those siblings in order. For startup
//!   dependencies.
//!
//! # Restart policies
//!
//! - **Permanent**: always restart.
//! - **Transient**: restart only on unclean exits; `normal`, `shutdown`
//!   and `timed_out` stay down.
//! - **Temporary**: never restart.
//!
//! # Restart intensity
//!
//! More than `max_restarts` restarts within `max_seconds` shut the
//! supervisor (and thereby its children) down; persistent failure is
//! escalated rather than looped on.
//!
//! Restarting an actor child preserves its link: the link's transport
//! slot is rebound to the fresh mailbox, so outstanding references keep
//! working.

pub mod api;
pub mod error;
pub(crate) mod node;
pub(crate) mod task;
pub mod types;
pub mod window;

pub use api::{
    count_children, delete_child, start_actor, start_task, supervise, terminate_child,
    unsupervise, which_children,
};
pub use error::SupervisorError;
pub use types::{
    BehaviorFactory, ChildInfo, ChildKind, ChildSpec, ChildTally, RestartPolicy, Strategy,
    SupervisorConfig, TaskFactory, TaskFuture, TaskHandle, TaskSpec, DEFAULT_MAX_RESTARTS,
    DEFAULT_MAX_SECONDS, DEFAULT_TASK_POLL_INTERVAL, DEFAULT_TASK_TIMEOUT,
};
pub use window::RestartWindow;
