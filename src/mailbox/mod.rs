//! Bounded FIFO mailboxes backing actors.
//!
//! A mailbox is the only way to deliver input to an actor. Delivery is
//! buffered and bounded; the sender-side [`SendPolicy`] decides what a
//! full queue means (wait, wait with a deadline, or fail fast).

pub mod bounded;
pub mod error;
pub mod policy;

pub use bounded::{Mailbox, MailboxSender, DEFAULT_CAPACITY};
pub use error::{MailboxError, TryRecvError};
pub use policy::{SendPolicy, DEFAULT_SEND_DEADLINE};
