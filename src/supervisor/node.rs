//! Supervisor state machine.
//!
//! A supervisor is an actor in supervisor mode; the runtime routes the
//! supervision envelopes and child exit notices here. The node owns the
//! child records, enforces the restart-intensity window, and applies the
//! configured strategy when a child goes down.

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use chrono::Utc;
use tracing::{debug, trace, warn};

// Layer 3: Internal module imports
use super::error::SupervisorError;
use super::task::{self, TaskRuntime};
use super::types::{
    ChildInfo, ChildKind, ChildSpec, ChildTally, RestartPolicy, Strategy, SupervisorConfig,
    TaskHandle, TaskSpec,
};
use super::window::RestartWindow;
use crate::actor::{runtime, ActorContext, PeerRole};
use crate::link::Link;
use crate::mailbox::DEFAULT_CAPACITY;
use crate::message::{ExitNotice, ExitReason, Message};
use crate::util::ActorId;

/// Live handle of one supervised child.
enum ChildHandle<M: Message> {
    Actor(Link<M>),
    Task(TaskRuntime),
}

/// How to re-create one supervised child.
enum StartSpec<M: Message> {
    Actor(ChildSpec<M>),
    Task(TaskSpec),
}

/// Record the supervisor keeps per child, in start order.
struct ChildRecord<M: Message> {
    id: ActorId,
    handle: ChildHandle<M>,
    start: StartSpec<M>,
}

impl<M: Message> ChildRecord<M> {
    fn restart_policy(&self) -> RestartPolicy {
        match &self.start {
            StartSpec::Actor(spec) => spec.restart,
            StartSpec::Task(spec) => spec.restart,
        }
    }

    fn kind(&self) -> ChildKind {
        match &self.handle {
            ChildHandle::Actor(_) => ChildKind::Actor,
            ChildHandle::Task(_) => ChildKind::Task,
        }
    }

    /// Whether a start spec exists to produce a new incarnation.
    fn has_start(&self) -> bool {
        match &self.start {
            StartSpec::Actor(spec) => spec.factory.is_some(),
            StartSpec::Task(_) => true,
        }
    }

    /// Whether a group restart re-creates this child. Temporary children
    /// and children without a start spec are dropped instead.
    fn group_restartable(&self) -> bool {
        self.has_start() && self.restart_policy() != RestartPolicy::Temporary
    }

    fn info(&self) -> ChildInfo<M> {
        ChildInfo {
            id: self.id,
            link: match &self.handle {
                ChildHandle::Actor(link) => Some(link.clone()),
                ChildHandle::Task(_) => None,
            },
            restart: self.restart_policy(),
            kind: self.kind(),
        }
    }
}

/// Behavior-owned state of a supervisor actor.
pub(crate) struct SupervisorNode<M: Message> {
    config: SupervisorConfig,
    children: Vec<ChildRecord<M>>,
    window: RestartWindow,
    // Exits the supervisor itself ordered; absorbed without a restart
    // decision when they come back.
    expected_exits: HashSet<ActorId>,
}

impl<M: Message> SupervisorNode<M> {
    pub(crate) fn new(config: SupervisorConfig) -> Self {
        let window = RestartWindow::new(config.max_restarts, config.max_seconds);
        Self {
            config,
            children: Vec::new(),
            window,
            expected_exits: HashSet::new(),
        }
    }

    /// Spawn a new actor child and register it.
    ///
    /// The child starts with this supervisor as its parent connection, and
    /// the supervisor adds the child's link to its own connection set.
    pub(crate) async fn start_child(
        &mut self,
        spec: ChildSpec<M>,
        ctx: &mut ActorContext<M>,
    ) -> Result<Link<M>, SupervisorError> {
        let Some(factory) = spec.factory.clone() else {
            return Err(SupervisorError::InvalidConfiguration {
                reason: "start_actor requires a behavior factory".into(),
            });
        };

        let capacity = spec.mailbox_capacity.unwrap_or(DEFAULT_CAPACITY);
        let link = runtime::spawn_child(factory(), capacity, ctx.link().clone());

        ctx.connect(link.clone(), PeerRole::Peer);
        self.children.push(ChildRecord {
            id: link.id(),
            handle: ChildHandle::Actor(link.clone()),
            start: StartSpec::Actor(spec),
        });

        debug!(supervisor = %ctx.id(), child = %link.id(), "actor child started");
        Ok(link)
    }

    /// Schedule a one-shot task child and register it.
    pub(crate) fn start_task(&mut self, spec: TaskSpec, ctx: &ActorContext<M>) -> TaskHandle {
        let id = ActorId::new();
        let runtime = task::schedule(id, &spec, ctx.link().clone());
        let handle = runtime.handle;

        self.children.push(ChildRecord {
            id,
            handle: ChildHandle::Task(runtime),
            start: StartSpec::Task(spec),
        });

        debug!(supervisor = %ctx.id(), task = %id, "task child started");
        handle
    }

    /// Register an already running actor as a child.
    ///
    /// Connects both sides: the child gets this supervisor as parent, the
    /// supervisor adds the child's link to its connection set. Registering
    /// a child twice updates its start spec.
    pub(crate) async fn supervise(
        &mut self,
        child: Link<M>,
        spec: ChildSpec<M>,
        ctx: &mut ActorContext<M>,
    ) -> Result<(), SupervisorError> {
        child
            .connect(ctx.link().clone(), PeerRole::Parent)
            .await
            .map_err(SupervisorError::Delivery)?;
        ctx.connect(child.clone(), PeerRole::Peer);

        if let Some(record) = self.children.iter_mut().find(|c| c.id == child.id()) {
            record.start = StartSpec::Actor(spec);
            return Ok(());
        }

        self.children.push(ChildRecord {
            id: child.id(),
            handle: ChildHandle::Actor(child.clone()),
            start: StartSpec::Actor(spec),
        });
        debug!(supervisor = %ctx.id(), child = %child.id(), "existing actor placed under supervision");
        Ok(())
    }

    /// Remove a child without terminating it.
    pub(crate) async fn delete_child(
        &mut self,
        child: ActorId,
        ctx: &mut ActorContext<M>,
    ) -> Result<(), SupervisorError> {
        let Some(idx) = self.children.iter().position(|c| c.id == child) else {
            return Err(SupervisorError::ChildNotFound { id: child });
        };

        let record = self.children.remove(idx);
        ctx.disconnect(child);

        match &record.handle {
            ChildHandle::Actor(link) => {
                // Symmetric removal: the child forgets its parent.
                if link.disconnect(ctx.link().clone()).await.is_err() {
                    trace!(child = %child, "child gone while removing parent entry");
                }
            }
            ChildHandle::Task(task) => task.abort(),
        }

        debug!(supervisor = %ctx.id(), child = %child, "child removed");
        Ok(())
    }

    /// Remove a child and shut it down with [`ExitReason::Shutdown`].
    pub(crate) async fn terminate_child(
        &mut self,
        child: ActorId,
        ctx: &mut ActorContext<M>,
    ) -> Result<(), SupervisorError> {
        let Some(idx) = self.children.iter().position(|c| c.id == child) else {
            return Err(SupervisorError::ChildNotFound { id: child });
        };

        let record = self.children.remove(idx);
        ctx.disconnect(child);

        match &record.handle {
            ChildHandle::Actor(link) => {
                self.expected_exits.insert(child);
                if link.exit(ExitReason::Shutdown).await.is_err() {
                    trace!(child = %child, "child already gone on terminate");
                }
            }
            ChildHandle::Task(task) => task.abort(),
        }

        debug!(supervisor = %ctx.id(), child = %child, "child terminated");
        Ok(())
    }

    /// One entry per child, in start order.
    pub(crate) fn which(&self) -> Vec<ChildInfo<M>> {
        self.children.iter().map(ChildRecord::info).collect()
    }

    /// Tally children by policy and kind.
    pub(crate) fn count(&self) -> ChildTally {
        let mut tally = ChildTally::default();
        for child in &self.children {
            tally.add(child.restart_policy(), child.kind());
        }
        tally
    }

    /// React to an exit notice.
    ///
    /// `Err(reason)` means the supervisor itself must terminate with that
    /// reason (parent teardown cascade, or restart budget exhausted).
    pub(crate) async fn on_exit(
        &mut self,
        notice: ExitNotice<M>,
        ctx: &mut ActorContext<M>,
    ) -> Result<(), ExitReason> {
        if self.expected_exits.remove(&notice.from) {
            trace!(supervisor = %ctx.id(), child = %notice.from, "expected exit absorbed");
            return Ok(());
        }

        // The supervisor can itself be supervised; its parent's exit
        // tears it down like any other actor.
        if ctx.peer_role(notice.from) == Some(PeerRole::Parent) {
            return Err(notice.reason);
        }

        let Some(idx) = self.children.iter().position(|c| c.id == notice.from) else {
            trace!(supervisor = %ctx.id(), from = %notice.from, "exit notice from unknown sender ignored");
            return Ok(());
        };

        let record = &self.children[idx];
        let policy = record.restart_policy();
        let should_start = policy.should_restart(&notice.reason) && record.has_start();
        debug!(
            supervisor = %ctx.id(),
            child = %notice.from,
            reason = %notice.reason,
            policy = %policy,
            restart = should_start,
            "child exited"
        );

        if !should_start {
            // The child stays down and is removed from the list.
            ctx.disconnect(notice.from);
            self.children.remove(idx);
            return Ok(());
        }

        if !self.window.note(Utc::now()) {
            let over = SupervisorError::RestartLimitExceeded {
                max_restarts: self.config.max_restarts,
                max_seconds: self.config.max_seconds,
            };
            warn!(supervisor = %ctx.id(), error = %over, "shutting down");
            return Err(ExitReason::Shutdown);
        }

        match self.config.strategy {
            Strategy::OneForOne => self.restart_at(idx, ctx),
            Strategy::OneForAll => self.rolling_restart(0, idx, ctx).await,
            Strategy::RestForOne => self.rolling_restart(idx, idx, ctx).await,
        }
        Ok(())
    }

    /// Shut down the supervised subtree; called when the supervisor
    /// terminates for any reason.
    pub(crate) async fn teardown(&mut self, ctx: &mut ActorContext<M>) {
        debug!(supervisor = %ctx.id(), children = self.children.len(), "tearing down children");

        for record in self.children.iter().rev() {
            match &record.handle {
                ChildHandle::Actor(link) => {
                    if link.exit(ExitReason::Shutdown).await.is_err() {
                        trace!(child = %record.id, "child already gone at teardown");
                    }
                }
                ChildHandle::Task(task) => task.abort(),
            }
        }
        self.children.clear();
    }

    /// Re-create the child at `idx` behind its existing identity.
    fn restart_at(&mut self, idx: usize, ctx: &mut ActorContext<M>) {
        let record = &mut self.children[idx];
        match (&mut record.handle, &record.start) {
            (ChildHandle::Actor(link), StartSpec::Actor(spec)) => {
                if let Some(factory) = spec.factory.clone() {
                    let capacity = spec.mailbox_capacity.unwrap_or(DEFAULT_CAPACITY);
                    runtime::respawn_child(link, factory(), capacity, ctx.link().clone());
                    ctx.connect(link.clone(), PeerRole::Peer);
                    debug!(supervisor = %ctx.id(), child = %record.id, "actor child restarted");
                }
            }
            (ChildHandle::Task(old), StartSpec::Task(spec)) => {
                old.abort();
                *old = task::schedule(record.id, spec, ctx.link().clone());
                debug!(supervisor = %ctx.id(), task = %record.id, "task child rescheduled");
            }
            _ => {}
        }
    }

    /// Shut down and restart children at positions ≥ `from_idx`, keeping
    /// start order. `failed_idx` is already down and only restarted.
    async fn rolling_restart(
        &mut self,
        from_idx: usize,
        failed_idx: usize,
        ctx: &mut ActorContext<M>,
    ) {
        // Stop the siblings that are still up.
        for i in from_idx..self.children.len() {
            if i == failed_idx {
                continue;
            }
            let record = &self.children[i];
            match &record.handle {
                ChildHandle::Actor(link) => {
                    self.expected_exits.insert(record.id);
                    if link.exit(ExitReason::Shutdown).await.is_err() {
                        trace!(child = %record.id, "sibling already gone in group restart");
                    }
                }
                ChildHandle::Task(task) => task.abort(),
            }
        }

        // Restart in start order; drop what cannot come back.
        let mut dropped: Vec<ActorId> = Vec::new();
        for i in from_idx..self.children.len() {
            if self.children[i].group_restartable() {
                self.restart_at(i, ctx);
            } else {
                dropped.push(self.children[i].id);
            }
        }
        for id in &dropped {
            ctx.disconnect(*id);
        }
        self.children.retain(|c| !dropped.contains(&c.id));
    }
}
