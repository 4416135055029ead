//! Message trait and the tagged envelope.
//!
//! Everything delivered to an actor is an [`Envelope`]: either a user
//! payload or one of the control kinds (exit, connect, update, and the
//! supervision operations). Dispatchers match on the tag before any user
//! behavior runs.

pub mod envelope;
pub mod traits;

pub use envelope::{Envelope, ExitNotice, ExitReason, StateUpdate};
pub use traits::Message;
