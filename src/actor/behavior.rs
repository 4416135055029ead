//! Behavior abstraction: the actor's reaction to a message.
//!
//! A behavior is a callable value plus whatever state it closed over. The
//! runtime invokes it once per dispatched payload and records the produced
//! value as the actor's current result. Behaviors can be swapped at
//! runtime through an `Update` control message.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use thiserror::Error;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::Message;

/// Failure raised inside a behavior invocation.
///
/// A behavior failure is never swallowed: the runtime turns it into an
/// `Exit` notice with `ExitReason::Failure` delivered to every connected
/// peer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BehaviorError(pub String);

impl BehaviorError {
    /// Create a behavior error from any displayable cause.
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

impl From<&str> for BehaviorError {
    fn from(cause: &str) -> Self {
        Self(cause.to_owned())
    }
}

impl From<String> for BehaviorError {
    fn from(cause: String) -> Self {
        Self(cause)
    }
}

/// The actor's reaction to an incoming payload.
///
/// Implementations receive exclusive access to the actor's context for the
/// duration of one dispatch; cross-actor effects go through links, never
/// through shared state. The produced value becomes the actor's `result`
/// and, for a `Request`, the payload of the matching `Response`.
///
/// Any `FnMut(&mut ActorContext<M>, M) -> Result<M, BehaviorError>`
/// closure is a behavior, which covers the common callable-plus-captured-
/// arguments case:
///
/// ```rust
/// use warden_rt::actor::{ActorContext, Behavior, BehaviorError};
///
/// let prefix = String::from("echo: ");
/// let behavior = move |_ctx: &mut ActorContext<String>, msg: String| -> Result<String, BehaviorError> {
///     Ok(format!("{prefix}{msg}"))
/// };
///
/// fn assert_behavior<B: Behavior<String>>(_: &B) {}
/// assert_behavior(&behavior);
/// ```
#[async_trait]
pub trait Behavior<M: Message>: Send + 'static {
    /// Apply the behavior to one payload.
    async fn handle(&mut self, ctx: &mut ActorContext<M>, msg: M) -> Result<M, BehaviorError>;
}

/// Owned, swappable behavior as stored in the actor state.
pub type BoxedBehavior<M> = Box<dyn Behavior<M>>;

#[async_trait]
impl<M, F> Behavior<M> for F
where
    M: Message,
    F: FnMut(&mut ActorContext<M>, M) -> Result<M, BehaviorError> + Send + 'static,
{
    async fn handle(&mut self, ctx: &mut ActorContext<M>, msg: M) -> Result<M, BehaviorError> {
        self(ctx, msg)
    }
}
