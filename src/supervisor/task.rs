//! One-shot task children and their poll-based monitor.
//!
//! A task has no mailbox; the supervisor schedules its future on the
//! runtime and watches it through a poller. The poller checks the task at
//! the configured interval until it stops running or the deadline passes,
//! then reports exactly one exit notice to the supervisor.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant};
use tracing::trace;

// Layer 3: Internal module imports
use super::types::{TaskHandle, TaskSpec};
use crate::actor::BehaviorError;
use crate::link::Link;
use crate::message::{Envelope, ExitNotice, ExitReason, Message};
use crate::util::ActorId;

/// Runtime handles of a scheduled task child.
pub(crate) struct TaskRuntime {
    pub(crate) handle: TaskHandle,
    task_abort: AbortHandle,
    monitor_abort: AbortHandle,
}

impl TaskRuntime {
    /// Stop both the task and its monitor without reporting an exit.
    pub(crate) fn abort(&self) {
        self.monitor_abort.abort();
        self.task_abort.abort();
    }
}

/// Schedule the task future under `id` and start its monitor.
///
/// The monitor reports the task's exit to `supervisor` as a regular exit
/// notice, so the restart decision runs through the same path as actor
/// exits.
pub(crate) fn schedule<M: Message>(id: ActorId, spec: &TaskSpec, supervisor: Link<M>) -> TaskRuntime {
    let task: JoinHandle<Result<(), BehaviorError>> = tokio::spawn((spec.factory)());
    let task_abort = task.abort_handle();

    let monitor = tokio::spawn(monitor(
        id,
        task,
        spec.timeout,
        spec.poll_interval,
        supervisor,
    ));
    let monitor_abort = monitor.abort_handle();

    TaskRuntime {
        handle: TaskHandle { id },
        task_abort,
        monitor_abort,
    }
}

/// Watch one task until completion or deadline, then notify the
/// supervisor once.
async fn monitor<M: Message>(
    id: ActorId,
    mut task: JoinHandle<Result<(), BehaviorError>>,
    timeout: std::time::Duration,
    poll_interval: std::time::Duration,
    supervisor: Link<M>,
) {
    let started = Instant::now();

    let reason = loop {
        if task.is_finished() {
            break match (&mut task).await {
                Ok(Ok(())) => ExitReason::Normal,
                Ok(Err(err)) => ExitReason::Failure(err.to_string()),
                Err(join_err) => ExitReason::Failure(format!("task aborted: {join_err}")),
            };
        }
        if started.elapsed() >= timeout {
            task.abort();
            break ExitReason::TimedOut;
        }
        time::sleep(poll_interval).await;
    };

    let notice = ExitNotice::new(id, reason);
    if supervisor
        .send_envelope(Envelope::Exit(notice))
        .await
        .is_err()
    {
        trace!(task = %id, "supervisor gone, task exit dropped");
    }
}
