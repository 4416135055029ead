//! Type definitions for the supervision subsystem: strategies, restart
//! policies, child specifications, and introspection records.

// Layer 1: Standard library imports
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::SupervisorError;
use crate::actor::{Behavior, BehaviorError, BoxedBehavior};
use crate::link::Link;
use crate::message::{ExitReason, Message};
use crate::util::ActorId;

/// Default restart-intensity bound: restarts in the window.
pub const DEFAULT_MAX_RESTARTS: u32 = 3;

/// Default restart-intensity window in seconds.
pub const DEFAULT_MAX_SECONDS: f64 = 5.0;

/// Default deadline for supervised tasks.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval for task monitoring.
pub const DEFAULT_TASK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Restart strategy over siblings.
///
/// Decides which children are affected when one of them fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Restart only the failed child.
    #[default]
    OneForOne,

    /// Shut down every other child, then restart all in start order.
    OneForAll,

    /// Shut down the failed child's younger siblings, then restart the
    /// failed child and those siblings in start order.
    RestForOne,
}

impl FromStr for Strategy {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_for_one" => Ok(Strategy::OneForOne),
            "one_for_all" => Ok(Strategy::OneForAll),
            "rest_for_one" => Ok(Strategy::RestForOne),
            other => Err(SupervisorError::InvalidConfiguration {
                reason: format!("unknown strategy '{other}'"),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::OneForOne => write!(f, "one_for_one"),
            Strategy::OneForAll => write!(f, "one_for_all"),
            Strategy::RestForOne => write!(f, "rest_for_one"),
        }
    }
}

/// Per-child restart rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Always restart, whatever the exit reason.
    Permanent,

    /// Restart only on unclean exits (not normal/shutdown/timed_out).
    #[default]
    Transient,

    /// Never restart.
    Temporary,
}

impl RestartPolicy {
    /// Whether a child under this policy is restarted after exiting with
    /// `reason`.
    pub fn should_restart(&self, reason: &ExitReason) -> bool {
        match self {
            RestartPolicy::Permanent => true,
            RestartPolicy::Transient => !reason.is_clean(),
            RestartPolicy::Temporary => false,
        }
    }
}

impl FromStr for RestartPolicy {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "permanent" => Ok(RestartPolicy::Permanent),
            "transient" => Ok(RestartPolicy::Transient),
            "temporary" => Ok(RestartPolicy::Temporary),
            other => Err(SupervisorError::InvalidConfiguration {
                reason: format!("unknown restart policy '{other}'"),
            }),
        }
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartPolicy::Permanent => write!(f, "permanent"),
            RestartPolicy::Transient => write!(f, "transient"),
            RestartPolicy::Temporary => write!(f, "temporary"),
        }
    }
}

/// Supervisor configuration: strategy plus restart-intensity bounds.
///
/// # Example
///
/// ```rust
/// use warden_rt::supervisor::{Strategy, SupervisorConfig};
///
/// let config = SupervisorConfig::new(Strategy::OneForAll)
///     .with_max_restarts(5)
///     .with_max_seconds(10.0);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorConfig {
    /// Restart strategy over siblings.
    pub strategy: Strategy,

    /// Restarts tolerated inside the window before the supervisor gives
    /// up and shuts itself down.
    pub max_restarts: u32,

    /// Window length in seconds.
    pub max_seconds: f64,

    /// Optional symbolic name for registration.
    pub name: Option<String>,
}

impl SupervisorConfig {
    /// Configuration with default intensity bounds (3 restarts in 5 s).
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_restarts: DEFAULT_MAX_RESTARTS,
            max_seconds: DEFAULT_MAX_SECONDS,
            name: None,
        }
    }

    /// Builder method: restart budget.
    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Builder method: window length in seconds.
    pub fn with_max_seconds(mut self, max_seconds: f64) -> Self {
        self.max_seconds = max_seconds;
        self
    }

    /// Builder method: symbolic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reject configurations the restart limiter cannot enforce.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.max_restarts == 0 {
            return Err(SupervisorError::InvalidConfiguration {
                reason: "max_restarts must be at least 1".into(),
            });
        }
        if !self.max_seconds.is_finite() || self.max_seconds <= 0.0 {
            return Err(SupervisorError::InvalidConfiguration {
                reason: format!("max_seconds must be positive, got {}", self.max_seconds),
            });
        }
        Ok(())
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::new(Strategy::OneForOne)
    }
}

/// Factory producing a fresh behavior for each (re)start of a child.
pub type BehaviorFactory<M> = Arc<dyn Fn() -> BoxedBehavior<M> + Send + Sync>;

/// Specification of an actor child: how to create it and when to restart
/// it.
#[derive(Clone)]
pub struct ChildSpec<M: Message> {
    /// Produces the behavior for every incarnation of the child. Absent
    /// for children registered without a start spec, which therefore
    /// cannot be restarted.
    pub factory: Option<BehaviorFactory<M>>,

    /// When to restart the child.
    pub restart: RestartPolicy,

    /// Mailbox capacity override; the system default applies when absent.
    pub mailbox_capacity: Option<usize>,
}

impl<M: Message> ChildSpec<M> {
    /// Spec from any behavior-producing closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use warden_rt::actor::{ActorContext, BehaviorError};
    /// use warden_rt::supervisor::{ChildSpec, RestartPolicy};
    ///
    /// fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
    ///     Ok(msg)
    /// }
    ///
    /// let spec = ChildSpec::new(|| echo, RestartPolicy::Permanent);
    /// assert_eq!(spec.restart, RestartPolicy::Permanent);
    /// ```
    pub fn new<B, F>(factory: F, restart: RestartPolicy) -> Self
    where
        B: Behavior<M>,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self {
            factory: Some(Arc::new(move || Box::new(factory()) as BoxedBehavior<M>)),
            restart,
            mailbox_capacity: None,
        }
    }

    /// Spec without a start factory.
    ///
    /// Used when an already running actor places itself under
    /// supervision without telling the supervisor how to re-create it;
    /// such a child stays down once it exits.
    pub fn opaque(restart: RestartPolicy) -> Self {
        Self {
            factory: None,
            restart,
            mailbox_capacity: None,
        }
    }

    /// Builder method: mailbox capacity for the child.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }
}

impl<M: Message> fmt::Debug for ChildSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSpec")
            .field("restart", &self.restart)
            .field("mailbox_capacity", &self.mailbox_capacity)
            .finish_non_exhaustive()
    }
}

/// Future run by a supervised task.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), BehaviorError>> + Send>>;

/// Factory producing the task future for each (re)schedule.
pub type TaskFactory = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Specification of a one-shot task child and its monitoring bounds.
///
/// The monitor polls the task every `poll_interval` until it finishes or
/// `timeout` elapses, then reports exactly one exit to the supervisor.
#[derive(Clone)]
pub struct TaskSpec {
    /// Produces the future for every incarnation of the task.
    pub factory: TaskFactory,

    /// When to re-schedule the task.
    pub restart: RestartPolicy,

    /// Monitoring deadline; hitting it aborts the task with `TimedOut`.
    pub timeout: Duration,

    /// Poll interval of the monitor.
    pub poll_interval: Duration,
}

impl TaskSpec {
    /// Spec from any future-producing closure.
    pub fn new<Fut, F>(factory: F, restart: RestartPolicy) -> Self
    where
        Fut: Future<Output = Result<(), BehaviorError>> + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(move || Box::pin(factory()) as TaskFuture),
            restart,
            timeout: DEFAULT_TASK_TIMEOUT,
            poll_interval: DEFAULT_TASK_POLL_INTERVAL,
        }
    }

    /// Builder method: monitoring deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method: monitor poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("restart", &self.restart)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

/// Handle to a supervised task.
///
/// Tasks have no mailbox; the handle carries the identity under which the
/// supervisor tracks the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    /// Identity of the task in the supervisor's child list.
    pub id: ActorId,
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task@{}", self.id)
    }
}

/// Kind of a supervised child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildKind {
    /// A mailbox-driven actor.
    Actor,

    /// A one-shot monitored task.
    Task,
}

/// Introspection record returned by `which_children`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildInfo<M: Message> {
    /// Identity of the child.
    pub id: ActorId,

    /// The child's link; `None` for tasks.
    pub link: Option<Link<M>>,

    /// Configured restart policy.
    pub restart: RestartPolicy,

    /// Actor or task.
    pub kind: ChildKind,
}

/// Tally returned by `count_children`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChildTally {
    /// All children.
    pub total: usize,

    /// Children with `RestartPolicy::Permanent`.
    pub permanent: usize,

    /// Children with `RestartPolicy::Transient`.
    pub transient: usize,

    /// Children with `RestartPolicy::Temporary`.
    pub temporary: usize,

    /// Actor children.
    pub actors: usize,

    /// Task children.
    pub tasks: usize,
}

impl ChildTally {
    /// Account for one child.
    pub(crate) fn add(&mut self, restart: RestartPolicy, kind: ChildKind) {
        self.total += 1;
        match restart {
            RestartPolicy::Permanent => self.permanent += 1,
            RestartPolicy::Transient => self.transient += 1,
            RestartPolicy::Temporary => self.temporary += 1,
        }
        match kind {
            ChildKind::Actor => self.actors += 1,
            ChildKind::Task => self.tasks += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("one_for_one".parse::<Strategy>(), Ok(Strategy::OneForOne));
        assert_eq!("one_for_all".parse::<Strategy>(), Ok(Strategy::OneForAll));
        assert_eq!("rest_for_one".parse::<Strategy>(), Ok(Strategy::RestForOne));
        assert!("one_for_some".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_restart_policy_parsing() {
        assert_eq!(
            "permanent".parse::<RestartPolicy>(),
            Ok(RestartPolicy::Permanent)
        );
        assert_eq!(
            "transient".parse::<RestartPolicy>(),
            Ok(RestartPolicy::Transient)
        );
        assert_eq!(
            "temporary".parse::<RestartPolicy>(),
            Ok(RestartPolicy::Temporary)
        );
        assert!("sometimes".parse::<RestartPolicy>().is_err());
    }

    #[test]
    fn test_permanent_always_restarts() {
        let policy = RestartPolicy::Permanent;

        assert!(policy.should_restart(&ExitReason::Normal));
        assert!(policy.should_restart(&ExitReason::Shutdown));
        assert!(policy.should_restart(&ExitReason::TimedOut));
        assert!(policy.should_restart(&ExitReason::Failure("err".into())));
    }

    #[test]
    fn test_transient_restarts_on_unclean_only() {
        let policy = RestartPolicy::Transient;

        assert!(!policy.should_restart(&ExitReason::Normal));
        assert!(!policy.should_restart(&ExitReason::Shutdown));
        assert!(!policy.should_restart(&ExitReason::TimedOut));
        assert!(policy.should_restart(&ExitReason::Failure("err".into())));
    }

    #[test]
    fn test_temporary_never_restarts() {
        let policy = RestartPolicy::Temporary;

        assert!(!policy.should_restart(&ExitReason::Normal));
        assert!(!policy.should_restart(&ExitReason::Failure("err".into())));
    }

    #[test]
    fn test_config_defaults() {
        let config = SupervisorConfig::default();

        assert_eq!(config.strategy, Strategy::OneForOne);
        assert_eq!(config.max_restarts, DEFAULT_MAX_RESTARTS);
        assert_eq!(config.max_seconds, DEFAULT_MAX_SECONDS);
        assert!(config.name.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_restarts() {
        let config = SupervisorConfig::default().with_max_restarts(0);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_bad_window() {
        assert!(SupervisorConfig::default()
            .with_max_seconds(0.0)
            .validate()
            .is_err());
        assert!(SupervisorConfig::default()
            .with_max_seconds(f64::NAN)
            .validate()
            .is_err());
        assert!(SupervisorConfig::default()
            .with_max_seconds(-1.0)
            .validate()
            .is_err());
    }

    fn echo(
        _: &mut crate::actor::ActorContext<String>,
        msg: String,
    ) -> Result<String, BehaviorError> {
        Ok(msg)
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_child_spec_produces_fresh_behaviors() {
        let spec: ChildSpec<String> = ChildSpec::new(|| echo, RestartPolicy::Permanent);

        let factory = spec.factory.as_ref().unwrap();
        let _first = factory();
        let _second = factory();
    }

    #[test]
    fn test_opaque_spec_has_no_factory() {
        let spec: ChildSpec<String> = ChildSpec::opaque(RestartPolicy::Transient);

        assert!(spec.factory.is_none());
        assert_eq!(spec.restart, RestartPolicy::Transient);
    }

    #[test]
    fn test_task_spec_defaults() {
        let spec = TaskSpec::new(|| async { Ok::<(), BehaviorError>(()) }, RestartPolicy::Transient);

        assert_eq!(spec.timeout, DEFAULT_TASK_TIMEOUT);
        assert_eq!(spec.poll_interval, DEFAULT_TASK_POLL_INTERVAL);
    }

    #[test]
    fn test_tally_accounting() {
        let mut tally = ChildTally::default();

        tally.add(RestartPolicy::Permanent, ChildKind::Actor);
        tally.add(RestartPolicy::Transient, ChildKind::Task);
        tally.add(RestartPolicy::Temporary, ChildKind::Actor);

        assert_eq!(tally.total, 3);
        assert_eq!(tally.permanent, 1);
        assert_eq!(tally.transient, 1);
        assert_eq!(tally.temporary, 1);
        assert_eq!(tally.actors, 2);
        assert_eq!(tally.tasks, 1);
    }
}
