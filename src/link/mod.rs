//! Addressable links to actor mailboxes.
//!
//! A [`Link`] is the opaque address of an actor: immutable identity, a
//! swappable transport slot underneath (so supervisors can rebind it on
//! restart), and equality that identifies the mailbox. The
//! [`RemoteSender`] trait is the contract a distribution layer implements
//! to carry envelopes across hosts.

pub mod handle;
pub mod remote;

pub use handle::Link;
pub use remote::RemoteSender;
