//! Request/reply built on `send`.
//!
//! A request carries a fresh correlation identity and a link to a
//! single-slot reply inbox created for that one exchange; the caller
//! never blocks on its own main mailbox, so behaviors are free to issue
//! requests to other actors mid-dispatch. Matching is causal: a response
//! counts only if it carries the request's correlation id. Anything else
//! reaching the reply slot goes to the dead-letter sink (a traced
//! discard).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;
use tokio::time::{self, Instant};
use tracing::trace;

// Layer 3: Internal module imports
use crate::link::Link;
use crate::mailbox::{Mailbox, MailboxError, SendPolicy};
use crate::message::{Envelope, Message};
use crate::util::{ActorId, MessageId};

/// Errors surfaced by the blocking communication primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommError {
    /// The deadline expired before a matching response arrived. The
    /// caller's mailbox contents are untouched.
    #[error("no response within {after:?}")]
    Timeout { after: Duration },

    /// The request could not be delivered.
    #[error("request delivery failed: {0}")]
    Delivery(#[from] MailboxError),

    /// The target terminated before producing a response.
    #[error("actor terminated before replying")]
    Terminated,
}

/// Pending reply of one in-flight request.
///
/// Produced by [`request_later`]; await the payload with
/// [`ReplyHandle::receive`].
pub struct ReplyHandle<M: Message> {
    correlation: MessageId,
    inbox: Mailbox<M>,
}

impl<M: Message> ReplyHandle<M> {
    /// Correlation identity of the request this handle waits for.
    pub fn correlation(&self) -> MessageId {
        self.correlation
    }

    /// Await the matching response.
    ///
    /// `None` means no deadline. Envelopes that are not the matching
    /// response are discarded to the dead-letter sink.
    ///
    /// # Errors
    ///
    /// `CommError::Timeout` on deadline expiry, `CommError::Terminated`
    /// when the target went away before replying.
    pub async fn receive(mut self, timeout: Option<Duration>) -> Result<M, CommError> {
        let deadline = timeout.map(|after| (after, Instant::now() + after));

        loop {
            let envelope = match deadline {
                Some((after, at)) => match time::timeout_at(at, self.inbox.recv()).await {
                    Ok(envelope) => envelope,
                    Err(_) => return Err(CommError::Timeout { after }),
                },
                None => self.inbox.recv().await,
            };

            let Some(envelope) = envelope else {
                // Reply sender dropped without responding: the target is
                // gone.
                return Err(CommError::Terminated);
            };

            match envelope {
                Envelope::Response {
                    correlation,
                    payload,
                } if correlation == self.correlation => return Ok(payload),
                other => {
                    trace!(kind = other.kind(), "unmatched envelope discarded from reply slot");
                }
            }
        }
    }
}

/// Send a request and return a handle to await the reply later.
///
/// The asynchronous half of the request/reply pair: `send` now, `receive`
/// when the caller is ready.
///
/// # Errors
///
/// Delivery errors of the underlying `send`.
pub async fn request_later<M: Message>(
    link: &Link<M>,
    payload: M,
) -> Result<ReplyHandle<M>, CommError> {
    let correlation = MessageId::new();

    // Single-slot inbox dedicated to this exchange.
    let (inbox, sender) = Mailbox::with_policy(1, SendPolicy::Fail);
    let reply_to = Link::local(ActorId::new(), None, sender);

    link.send_envelope(Envelope::Request {
        reply_to,
        correlation,
        payload,
    })
    .await?;

    Ok(ReplyHandle { correlation, inbox })
}

/// Send a request and block the caller until the response or the
/// deadline.
///
/// # Errors
///
/// `CommError::Timeout` on deadline expiry, `CommError::Terminated` when
/// the target exits first, delivery errors otherwise.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use warden_rt::actor::{spawn, ActorContext, BehaviorError, SpawnOptions};
/// use warden_rt::request::request;
///
/// fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
///     Ok(msg)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let link = spawn(echo, SpawnOptions::default()).unwrap();
///
/// let answer = request(&link, "ping".to_string(), Some(Duration::from_secs(1)))
///     .await
///     .unwrap();
/// assert_eq!(answer, "ping");
/// # }
/// ```
pub async fn request<M: Message>(
    link: &Link<M>,
    payload: M,
    timeout: Option<Duration>,
) -> Result<M, CommError> {
    request_later(link, payload).await?.receive(timeout).await
}

/// Await a pending reply; free-function form of [`ReplyHandle::receive`].
pub async fn receive<M: Message>(
    handle: ReplyHandle<M>,
    timeout: Option<Duration>,
) -> Result<M, CommError> {
    handle.receive(timeout).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::actor::{spawn, ActorContext, BehaviorError, SpawnOptions};

    fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
        Ok(msg)
    }

    #[tokio::test]
    async fn test_request_round_trip() {
        let link = spawn(echo, SpawnOptions::default()).unwrap();

        let answer = request(&link, "ping".to_string(), Some(Duration::from_secs(1)))
            .await
            .unwrap();

        assert_eq!(answer, "ping");
    }

    #[tokio::test]
    async fn test_request_later_then_receive() {
        let link = spawn(echo, SpawnOptions::default()).unwrap();

        let pending = request_later(&link, "deferred".to_string()).await.unwrap();
        let answer = receive(pending, Some(Duration::from_secs(1))).await.unwrap();

        assert_eq!(answer, "deferred");
    }

    #[tokio::test]
    async fn test_concurrent_requests_match_causally() {
        let link = spawn(echo, SpawnOptions::default()).unwrap();

        let first = request_later(&link, "one".to_string()).await.unwrap();
        let second = request_later(&link, "two".to_string()).await.unwrap();

        // Receive out of order; correlation keeps the pairing straight.
        assert_eq!(
            second.receive(Some(Duration::from_secs(1))).await.unwrap(),
            "two"
        );
        assert_eq!(
            first.receive(Some(Duration::from_secs(1))).await.unwrap(),
            "one"
        );
    }

    #[tokio::test]
    async fn test_timeout_on_silent_target() {
        // A mailbox we hold open but never serve.
        let (_silent, sender) = Mailbox::new(8);
        let link = Link::local(ActorId::new(), None, sender);

        let result = request(&link, "anyone?".to_string(), Some(Duration::from_millis(50))).await;

        assert_eq!(
            result,
            Err(CommError::Timeout {
                after: Duration::from_millis(50)
            })
        );
    }

    #[tokio::test]
    async fn test_terminated_target_detected() {
        let (silent, sender) = Mailbox::new(8);
        let link = Link::local(ActorId::new(), None, sender);

        let pending = request_later(&link, "doomed".to_string()).await.unwrap();
        // Dropping the mailbox drops the queued request and with it the
        // reply sender.
        drop(silent);

        assert_eq!(
            pending.receive(Some(Duration::from_secs(1))).await,
            Err(CommError::Terminated)
        );
    }

    #[tokio::test]
    async fn test_request_to_dangling_link_fails_delivery() {
        let (mailbox, sender) = Mailbox::new(8);
        let link: Link<String> = Link::local(ActorId::new(), None, sender);
        drop(mailbox);

        let result = request(&link, "gone".to_string(), None).await;

        assert_eq!(result, Err(CommError::Delivery(MailboxError::Closed)));
    }

    #[tokio::test]
    async fn test_unmatched_response_discarded() {
        let (mut target, sender) = Mailbox::new(8);
        let link = Link::local(ActorId::new(), None, sender);

        let pending = request_later(&link, "q".to_string()).await.unwrap();

        // Answer with a bogus correlation id.
        let reply_to = match target.recv().await {
            Some(Envelope::Request { reply_to, .. }) => reply_to,
            other => panic!("expected request, got {other:?}"),
        };
        reply_to
            .send_envelope(Envelope::Response {
                correlation: MessageId::new(),
                payload: "impostor".to_string(),
            })
            .await
            .unwrap();

        let result = pending.receive(Some(Duration::from_millis(80))).await;
        assert!(matches!(result, Err(CommError::Timeout { .. })));
    }
}
