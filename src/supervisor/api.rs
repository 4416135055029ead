//! Public supervision surface.
//!
//! Every operation is a message to the supervisor's link carrying a
//! `oneshot` reply channel; reaching an actor that is not a supervisor
//! answers with [`SupervisorError::NotASupervisor`].

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::error::SupervisorError;
use super::types::{ChildInfo, ChildSpec, ChildTally, TaskHandle, TaskSpec};
use crate::link::Link;
use crate::message::{Envelope, Message};
use crate::util::ActorId;

/// Spawn a new actor child under `sv` and return its link.
///
/// The spec's factory creates the child now and again on every restart;
/// the returned link stays valid across restarts.
///
/// # Errors
///
/// `InvalidConfiguration` for a spec without a factory, `NotASupervisor`,
/// or delivery failures.
///
/// # Example
///
/// ```rust
/// use warden_rt::actor::{ActorContext, BehaviorError};
/// use warden_rt::supervisor::{start_actor, ChildSpec, RestartPolicy, SupervisorConfig};
/// use warden_rt::system::{ActorSystem, SystemConfig};
///
/// fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
///     Ok(msg)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let system: ActorSystem<String> = ActorSystem::new(SystemConfig::default()).unwrap();
/// let sv = system.supervisor(SupervisorConfig::default()).unwrap();
///
/// let child = start_actor(&sv, ChildSpec::new(|| echo, RestartPolicy::Permanent))
///     .await
///     .unwrap();
/// child.send("hello".to_string()).await.unwrap();
/// # }
/// ```
pub async fn start_actor<M: Message>(
    sv: &Link<M>,
    spec: ChildSpec<M>,
) -> Result<Link<M>, SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::StartChild { spec, reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Schedule a one-shot task child under `sv`, monitored with the spec's
/// `timeout` and `poll_interval`.
///
/// The monitor reports `Normal`, `Failure`, or `TimedOut` to the
/// supervisor; `TimedOut` counts as a clean exit for transient tasks.
pub async fn start_task<M: Message>(
    sv: &Link<M>,
    spec: TaskSpec,
) -> Result<TaskHandle, SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::StartTask { spec, reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Place the calling actor under supervision.
///
/// `caller` registers itself as a child of `sv`; the spec tells the
/// supervisor how (and whether) to re-create it. Use
/// [`ChildSpec::opaque`] when the behavior cannot be re-created, in
/// which case the child stays down after an exit.
pub async fn supervise<M: Message>(
    sv: &Link<M>,
    caller: &Link<M>,
    spec: ChildSpec<M>,
) -> Result<(), SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::Supervise {
        child: caller.clone(),
        spec,
        reply,
    })
    .await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Remove the calling actor from supervision without stopping it.
pub async fn unsupervise<M: Message>(sv: &Link<M>, caller: &Link<M>) -> Result<(), SupervisorError> {
    delete_child(sv, caller.id()).await
}

/// Remove a child without terminating it.
pub async fn delete_child<M: Message>(sv: &Link<M>, child: ActorId) -> Result<(), SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::Delete { child, reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Remove a child and shut it down with reason `Shutdown`.
pub async fn terminate_child<M: Message>(
    sv: &Link<M>,
    child: ActorId,
) -> Result<(), SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::Terminate { child, reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Enumerate the supervisor's children in start order.
pub async fn which_children<M: Message>(sv: &Link<M>) -> Result<Vec<ChildInfo<M>>, SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::Which { reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}

/// Tally the supervisor's children by restart policy and kind.
pub async fn count_children<M: Message>(sv: &Link<M>) -> Result<ChildTally, SupervisorError> {
    let (reply, rx) = oneshot::channel();
    sv.send_envelope(Envelope::Count { reply }).await?;
    rx.await.map_err(|_| SupervisorError::NoReply)?
}
