//! The loop that drives one actor.
//!
//! Spawning creates a bounded mailbox, wraps it in a [`Link`], and runs
//! the dispatch loop as a tokio task. The runtime owns the actor state
//! exclusively; every observation or mutation from outside goes through
//! messages.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;
use tracing::{debug, trace, warn};

// Layer 3: Internal module imports
use super::behavior::{Behavior, BehaviorError, BoxedBehavior};
use super::context::{ActorContext, ActorMode, PeerRole};
use crate::link::Link;
use crate::mailbox::{Mailbox, SendPolicy, DEFAULT_CAPACITY};
use crate::message::{Envelope, ExitNotice, ExitReason, Message, StateUpdate};
use crate::supervisor::node::SupervisorNode;
use crate::supervisor::{SupervisorConfig, SupervisorError};
use crate::util::ActorId;

/// Errors raised synchronously by `spawn`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// `SpawnOptions::remote` was requested but no distribution
    /// transport exists in this build; remote actors are created by the
    /// distribution collaborator.
    #[error("remote spawn requires a distribution transport")]
    RemoteUnsupported,

    /// A mailbox needs room for at least one envelope.
    #[error("mailbox capacity must be at least 1")]
    ZeroMailboxCapacity,
}

/// Options recognised by [`spawn`].
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    /// Symbolic name, also used as the link's tag.
    pub name: Option<String>,

    /// Execution mode; `Supervisor` is normally set through
    /// [`crate::system::ActorSystem::supervisor`].
    pub mode: ActorMode,

    /// Mailbox capacity (default 32).
    pub mailbox_capacity: usize,

    /// Full-mailbox policy for senders.
    pub send_policy: SendPolicy,

    /// Ask the distribution collaborator for a remote actor.
    pub remote: bool,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            name: None,
            mode: ActorMode::Default,
            mailbox_capacity: DEFAULT_CAPACITY,
            send_policy: SendPolicy::default(),
            remote: false,
        }
    }
}

impl SpawnOptions {
    /// Builder method: symbolic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method: execution mode.
    pub fn with_mode(mut self, mode: ActorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder method: mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Builder method: full-mailbox policy.
    pub fn with_send_policy(mut self, policy: SendPolicy) -> Self {
        self.send_policy = policy;
        self
    }
}

/// Start a new actor and return the link to its mailbox.
///
/// Must be called from within a tokio runtime. The behavior runs once per
/// dispatched payload; its produced value becomes the actor's result and,
/// for requests, the response payload.
///
/// # Errors
///
/// `SpawnError::RemoteUnsupported` when `opts.remote` is set,
/// `SpawnError::ZeroMailboxCapacity` for an empty mailbox.
///
/// # Example
///
/// ```rust
/// use warden_rt::actor::{spawn, ActorContext, BehaviorError, SpawnOptions};
///
/// fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
///     Ok(msg)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let echo = spawn(echo, SpawnOptions::default()).unwrap();
///
/// echo.send("ping".to_string()).await.unwrap();
/// # }
/// ```
pub fn spawn<M: Message>(
    behavior: impl Behavior<M>,
    opts: SpawnOptions,
) -> Result<Link<M>, SpawnError> {
    let node = match opts.mode {
        ActorMode::Supervisor => Some(SupervisorNode::new(SupervisorConfig::default())),
        ActorMode::Default => None,
    };
    spawn_with_node(Box::new(behavior), opts, node)
}

/// Start a supervisor actor with the given configuration.
pub(crate) fn spawn_supervisor<M: Message>(
    config: SupervisorConfig,
    opts: SpawnOptions,
) -> Result<Link<M>, SpawnError> {
    // Supervisors serve control messages; user payloads echo through.
    let behavior = |_: &mut ActorContext<M>, msg: M| -> Result<M, BehaviorError> { Ok(msg) };
    let opts = opts.with_mode(ActorMode::Supervisor);
    spawn_with_node(Box::new(behavior), opts, Some(SupervisorNode::new(config)))
}

fn spawn_with_node<M: Message>(
    behavior: BoxedBehavior<M>,
    opts: SpawnOptions,
    node: Option<SupervisorNode<M>>,
) -> Result<Link<M>, SpawnError> {
    if opts.remote {
        return Err(SpawnError::RemoteUnsupported);
    }
    if opts.mailbox_capacity == 0 {
        return Err(SpawnError::ZeroMailboxCapacity);
    }

    let (mailbox, sender) = Mailbox::with_policy(opts.mailbox_capacity, opts.send_policy);
    let link = Link::local(ActorId::new(), opts.name.clone(), sender);
    launch(link.clone(), mailbox, behavior, opts.name, opts.mode, None, node);
    Ok(link)
}

/// Spawn an actor child on behalf of a supervisor.
///
/// The child starts with the supervisor as the parent entry of its
/// connection set, so it reports its exits back from the first dispatch.
pub(crate) fn spawn_child<M: Message>(
    behavior: BoxedBehavior<M>,
    capacity: usize,
    parent: Link<M>,
) -> Link<M> {
    let (mailbox, sender) = Mailbox::new(capacity);
    let link = Link::local(ActorId::new(), None, sender);
    launch(
        link.clone(),
        mailbox,
        behavior,
        None,
        ActorMode::Default,
        Some(parent),
        None,
    );
    link
}

/// Restart an actor child in place: bind the existing link to a fresh
/// mailbox and run a new incarnation behind it.
pub(crate) fn respawn_child<M: Message>(
    link: &Link<M>,
    behavior: BoxedBehavior<M>,
    capacity: usize,
    parent: Link<M>,
) {
    let (mailbox, sender) = Mailbox::new(capacity);
    link.rebind(sender);
    launch(
        link.clone(),
        mailbox,
        behavior,
        link.tag().map(str::to_owned),
        ActorMode::Default,
        Some(parent),
        None,
    );
}

fn launch<M: Message>(
    link: Link<M>,
    mailbox: Mailbox<M>,
    behavior: BoxedBehavior<M>,
    name: Option<String>,
    mode: ActorMode,
    parent: Option<Link<M>>,
    node: Option<SupervisorNode<M>>,
) {
    let mut ctx = ActorContext::new(link, name, mode);
    if let Some(parent) = parent {
        ctx.connect(parent, PeerRole::Parent);
    }

    let runtime = ActorRuntime {
        ctx,
        behavior,
        mailbox,
        node,
    };
    tokio::spawn(runtime.run());
}

struct ActorRuntime<M: Message> {
    ctx: ActorContext<M>,
    behavior: BoxedBehavior<M>,
    mailbox: Mailbox<M>,
    node: Option<SupervisorNode<M>>,
}

impl<M: Message> ActorRuntime<M> {
    async fn run(mut self) {
        trace!(actor = %self.ctx.id(), mode = ?self.ctx.mode(), "actor started");

        let exit = loop {
            let Some(envelope) = self.mailbox.recv().await else {
                // Every sender dropped; nothing can reach this actor again.
                break self.notice(ExitReason::Normal);
            };
            trace!(actor = %self.ctx.id(), kind = envelope.kind(), "dispatch");

            match envelope {
                Envelope::User(payload) => {
                    match self.behavior.handle(&mut self.ctx, payload).await {
                        Ok(value) => self.ctx.set_result(value),
                        Err(err) => break self.failure(err),
                    }
                }

                Envelope::Request {
                    reply_to,
                    correlation,
                    payload,
                } => match self.behavior.handle(&mut self.ctx, payload).await {
                    Ok(value) => {
                        self.ctx.set_result(value.clone());
                        let response = Envelope::Response {
                            correlation,
                            payload: value,
                        };
                        if reply_to.send_envelope(response).await.is_err() {
                            debug!(actor = %self.ctx.id(), "requester gone, response dropped");
                        }
                    }
                    Err(err) => break self.failure(err),
                },

                Envelope::Response { .. } => {
                    // Dead-letter sink: responses are matched in reply
                    // slots, never in the main mailbox.
                    trace!(actor = %self.ctx.id(), "stray response discarded");
                }

                Envelope::Connect { peer, role, remove } => {
                    if remove {
                        self.ctx.disconnect(peer.id());
                    } else {
                        self.ctx.connect(peer, role);
                    }
                }

                Envelope::Update(update) => self.apply_update(update),

                Envelope::Exit(incoming) => {
                    if let Some(reason) = self.handle_exit(incoming).await {
                        break self.notice(reason);
                    }
                }

                Envelope::StartChild { spec, reply } => {
                    let result = match self.node.as_mut() {
                        Some(node) => node.start_child(spec, &mut self.ctx).await,
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::StartTask { spec, reply } => {
                    let result = match self.node.as_mut() {
                        Some(node) => Ok(node.start_task(spec, &self.ctx)),
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::Supervise { child, spec, reply } => {
                    let result = match self.node.as_mut() {
                        Some(node) => node.supervise(child, spec, &mut self.ctx).await,
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::Delete { child, reply } => {
                    let result = match self.node.as_mut() {
                        Some(node) => node.delete_child(child, &mut self.ctx).await,
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::Terminate { child, reply } => {
                    let result = match self.node.as_mut() {
                        Some(node) => node.terminate_child(child, &mut self.ctx).await,
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::Which { reply } => {
                    let result = match self.node.as_ref() {
                        Some(node) => Ok(node.which()),
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }

                Envelope::Count { reply } => {
                    let result = match self.node.as_ref() {
                        Some(node) => Ok(node.count()),
                        None => Err(SupervisorError::NotASupervisor),
                    };
                    let _ = reply.send(result);
                }
            }
        };

        self.terminate(exit).await;
    }

    /// React to an exit envelope. `Some(reason)` terminates this actor.
    async fn handle_exit(&mut self, incoming: ExitNotice<M>) -> Option<ExitReason> {
        // A self-addressed notice is an exit request; it is honored
        // unconditionally, supervisor or not.
        if incoming.from == self.ctx.id() {
            return Some(incoming.reason);
        }

        if self.ctx.mode() == ActorMode::Supervisor {
            if let Some(node) = self.node.as_mut() {
                return match node.on_exit(incoming, &mut self.ctx).await {
                    Ok(()) => None,
                    Err(reason) => Some(reason),
                };
            }
        }

        match self.ctx.peer_role(incoming.from) {
            // The owning supervisor went down: cascade.
            Some(PeerRole::Parent) => Some(incoming.reason),

            // Supervised actors leave peer failures to the supervisor.
            Some(PeerRole::Peer) if self.ctx.parent().is_some() => {
                debug!(actor = %self.ctx.id(), peer = %incoming.from, "supervised, peer exit left to supervisor");
                None
            }

            // Default policy: terminate with the same reason.
            Some(PeerRole::Peer) => Some(incoming.reason),

            // Monitors observe, they do not propagate.
            Some(PeerRole::Monitor) => {
                debug!(actor = %self.ctx.id(), peer = %incoming.from, reason = %incoming.reason, "monitored peer exited");
                None
            }

            None => {
                trace!(actor = %self.ctx.id(), from = %incoming.from, "exit notice from unconnected sender ignored");
                None
            }
        }
    }

    fn apply_update(&mut self, update: StateUpdate<M>) {
        match update {
            StateUpdate::Mode(mode) => {
                self.ctx.set_mode(mode);
                match mode {
                    ActorMode::Supervisor => {
                        if self.node.is_none() {
                            self.node = Some(SupervisorNode::new(SupervisorConfig::default()));
                        }
                    }
                    ActorMode::Default => {
                        self.node = None;
                    }
                }
            }
            StateUpdate::Name(name) => self.ctx.set_name(name),
            StateUpdate::Behavior(behavior) => self.behavior = behavior,
        }
    }

    fn notice(&self, reason: ExitReason) -> ExitNotice<M> {
        ExitNotice::new(self.ctx.id(), reason).with_result(self.ctx.result_cloned())
    }

    fn failure(&self, err: BehaviorError) -> ExitNotice<M> {
        warn!(actor = %self.ctx.id(), error = %err, "behavior failed");
        self.notice(ExitReason::Failure(err.to_string()))
            .with_detail(format!("behavior failure in {}", M::MESSAGE_TYPE))
    }

    async fn terminate(mut self, notice: ExitNotice<M>) {
        debug!(actor = %self.ctx.id(), reason = %notice.reason, "actor terminating");

        if let Some(node) = self.node.as_mut() {
            node.teardown(&mut self.ctx).await;
        }
        self.mailbox.close();

        // Notify the connection set. Failures mean the peer is already
        // gone; nothing to do about that.
        let peers: Vec<_> = self.ctx.conn().to_vec();
        for entry in peers {
            if entry
                .link
                .send_envelope(Envelope::Exit(notice.clone()))
                .await
                .is_err()
            {
                trace!(actor = %self.ctx.id(), peer = %entry.link.id(), "exit notification undeliverable");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn echo_behavior(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
        Ok(msg)
    }

    fn echo() -> impl Behavior<String> {
        echo_behavior
    }

    #[tokio::test]
    async fn test_spawn_and_send() {
        let link = spawn(echo(), SpawnOptions::default()).unwrap();

        link.send("hello".to_string()).await.unwrap();
        sleep(Duration::from_millis(20)).await;
        assert!(link.send("again".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_remote_spawn_rejected() {
        let mut opts = SpawnOptions::default();
        opts.remote = true;

        let result = spawn(echo(), opts);
        assert_eq!(result.err(), Some(SpawnError::RemoteUnsupported));
    }

    #[tokio::test]
    async fn test_zero_capacity_rejected() {
        let result = spawn(echo(), SpawnOptions::default().with_mailbox_capacity(0));
        assert_eq!(result.err(), Some(SpawnError::ZeroMailboxCapacity));
    }

    #[tokio::test]
    async fn test_exit_request_closes_mailbox() {
        let link = spawn(echo(), SpawnOptions::default()).unwrap();

        link.exit(ExitReason::Shutdown).await.unwrap();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(
            link.send("late".to_string()).await,
            Err(crate::mailbox::MailboxError::Closed)
        );
    }

    #[tokio::test]
    async fn test_behavior_failure_notifies_connected_peer() {
        use crate::mailbox::Mailbox as RawMailbox;

        let failing = |_: &mut ActorContext<String>, _: String| -> Result<String, BehaviorError> {
            Err(BehaviorError::new("kaput"))
        };
        let link = spawn(failing, SpawnOptions::default()).unwrap();

        // Observer mailbox wired in as a monitor.
        let (mut observer, sender) = RawMailbox::new(8);
        let observer_link = Link::local(ActorId::new(), None, sender);
        link.connect(observer_link, PeerRole::Monitor).await.unwrap();

        link.send("trigger".to_string()).await.unwrap();

        match observer.recv().await {
            Some(Envelope::Exit(notice)) => {
                assert_eq!(notice.from, link.id());
                assert_eq!(notice.reason, ExitReason::Failure("kaput".into()));
            }
            other => panic!("expected exit notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_peer_exit_propagates_to_unsupervised() {
        let a = spawn(echo(), SpawnOptions::default()).unwrap();
        let b = spawn(echo(), SpawnOptions::default()).unwrap();

        // b treats a as a linked peer.
        b.connect(a.clone(), PeerRole::Peer).await.unwrap();

        // Terminating a notifies nobody (a has no conn), so emulate the
        // notification path directly: a's exit arrives at b.
        b.send_envelope(Envelope::Exit(ExitNotice::new(
            a.id(),
            ExitReason::Failure("peer died".into()),
        )))
        .await
        .unwrap();

        sleep(Duration::from_millis(50)).await;
        assert_eq!(
            b.send("late".to_string()).await,
            Err(crate::mailbox::MailboxError::Closed)
        );
    }

    #[tokio::test]
    async fn test_monitor_notice_does_not_propagate() {
        let a = spawn(echo(), SpawnOptions::default()).unwrap();
        let b = spawn(echo(), SpawnOptions::default()).unwrap();

        b.connect(a.clone(), PeerRole::Monitor).await.unwrap();
        b.send_envelope(Envelope::Exit(ExitNotice::new(
            a.id(),
            ExitReason::Failure("observed".into()),
        )))
        .await
        .unwrap();

        sleep(Duration::from_millis(50)).await;
        assert!(b.send("still alive".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_swaps_behavior() {
        use crate::request::request;

        let link = spawn(echo(), SpawnOptions::default()).unwrap();

        link.update(StateUpdate::behavior(
            |_: &mut ActorContext<String>, msg: String| -> Result<String, BehaviorError> {
                Ok(format!("v2:{msg}"))
            },
        ))
        .await
        .unwrap();

        let out = request(&link, "x".to_string(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(out, "v2:x");
    }

    #[tokio::test]
    async fn test_supervision_op_on_plain_actor_errors() {
        use tokio::sync::oneshot;

        let link = spawn(echo(), SpawnOptions::default()).unwrap();
        let (reply, rx) = oneshot::channel();

        link.send_envelope(Envelope::Which { reply }).await.unwrap();

        assert_eq!(rx.await.unwrap(), Err(SupervisorError::NotASupervisor));
    }
}
