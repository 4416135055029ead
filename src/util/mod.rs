//! Utility types and helpers for the actor runtime

pub mod ids;

pub use ids::{ActorId, HostId, MessageId};
