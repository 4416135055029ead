//! Actor execution: behavior, per-actor state, and the runtime loop.
//!
//! An actor is an independently scheduled unit of work with a private
//! mailbox, a behavior, and optional local state. The runtime owns the
//! [`ActorContext`] exclusively and dispatches one envelope at a time;
//! all cross-actor effects go through links.

pub mod behavior;
pub mod context;
pub mod runtime;

pub use behavior::{Behavior, BehaviorError, BoxedBehavior};
pub use context::{ActorContext, ActorMode, PeerEntry, PeerRole};
pub use runtime::{spawn, SpawnError, SpawnOptions};
