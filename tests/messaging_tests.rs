//! Messaging integration tests.
//!
//! End-to-end coverage of the communication layer:
//!
//! 1. **Ordering** - FIFO delivery per sender, control and user messages
//!    sharing one queue
//! 2. **Request/reply** - causal pairing by correlation id, timeouts that
//!    leave the target's mailbox untouched
//! 3. **Links and exits** - identity semantics, out-of-band termination,
//!    dangling links, mutual peer links
//! 4. **Name service** - atomic register/whereis through the system

#![allow(clippy::expect_used, clippy::panic)]

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::time::sleep;

// Layer 3: Internal module imports
use warden_rt::actor::{spawn, ActorContext, Behavior, BehaviorError, PeerRole, SpawnOptions};
use warden_rt::mailbox::MailboxError;
use warden_rt::message::ExitReason;
use warden_rt::request::{request, request_later, CommError};
use warden_rt::system::{ActorSystem, SystemConfig};

const ASK: Option<Duration> = Some(Duration::from_secs(2));

fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
    Ok(msg)
}

fn echo_or_crash(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
    if msg == "crash" {
        Err(BehaviorError::new("crash requested"))
    } else {
        Ok(msg)
    }
}

/// Remembers every payload; "dump" answers with the order seen.
fn accumulator() -> impl Behavior<String> {
    let mut seen: Vec<String> = Vec::new();
    move |_: &mut ActorContext<String>, msg: String| -> Result<String, BehaviorError> {
        if msg == "dump" {
            Ok(seen.join(","))
        } else {
            seen.push(msg.clone());
            Ok(msg)
        }
    }
}

// ============================================================================
// TEST GROUP 1: Ordering
// ============================================================================

#[tokio::test]
async fn messages_from_one_sender_arrive_in_send_order() {
    let link = spawn(accumulator(), SpawnOptions::default()).expect("spawn");

    for i in 0..8 {
        link.send(format!("m{i}")).await.expect("send");
    }

    let dump = request(&link, "dump".to_string(), ASK).await.expect("dump");
    assert_eq!(dump, "m0,m1,m2,m3,m4,m5,m6,m7");
}

#[tokio::test]
async fn control_messages_share_the_queue() {
    let link = spawn(accumulator(), SpawnOptions::default()).expect("spawn");

    link.send("before".to_string()).await.expect("send");
    // A connect between two user messages must not reorder them.
    let peer = spawn(echo, SpawnOptions::default()).expect("peer");
    link.connect(peer, PeerRole::Monitor).await.expect("connect");
    link.send("after".to_string()).await.expect("send");

    let dump = request(&link, "dump".to_string(), ASK).await.expect("dump");
    assert_eq!(dump, "before,after");
}

// ============================================================================
// TEST GROUP 2: Request/reply
// ============================================================================

#[tokio::test]
async fn concurrent_requests_pair_by_correlation() {
    let link = spawn(echo, SpawnOptions::default()).expect("spawn");

    let first = request_later(&link, "one".to_string()).await.expect("send");
    let second = request_later(&link, "two".to_string()).await.expect("send");
    let third = request_later(&link, "three".to_string()).await.expect("send");

    // Await in reverse; pairing is causal, not positional.
    assert_eq!(third.receive(ASK).await.expect("three"), "three");
    assert_eq!(first.receive(ASK).await.expect("one"), "one");
    assert_eq!(second.receive(ASK).await.expect("two"), "two");
}

/// Takes 200ms per message; used to outlast caller deadlines.
struct SlowEcho;

#[async_trait]
impl Behavior<String> for SlowEcho {
    async fn handle(
        &mut self,
        _ctx: &mut ActorContext<String>,
        msg: String,
    ) -> Result<String, BehaviorError> {
        sleep(Duration::from_millis(200)).await;
        Ok(msg)
    }
}

#[tokio::test]
async fn request_timeout_leaves_mailbox_contents_intact() {
    let link = spawn(SlowEcho, SpawnOptions::default()).expect("spawn");

    // The caller gives up long before the actor answers.
    let result = request(&link, "first".to_string(), Some(Duration::from_millis(30))).await;
    assert!(matches!(result, Err(CommError::Timeout { .. })));

    // The timed-out request stayed queued: the actor still works through
    // it (the stale response goes to the dead-letter sink) and then
    // serves the next caller.
    let answer = request(&link, "second".to_string(), ASK).await.expect("second");
    assert_eq!(answer, "second");
}

#[tokio::test]
async fn request_to_terminated_actor_is_distinguishable() {
    let link = spawn(echo_or_crash, SpawnOptions::default()).expect("spawn");

    link.send("crash".to_string()).await.expect("send");
    sleep(Duration::from_millis(80)).await;

    let result = request(&link, "anyone?".to_string(), ASK).await;
    assert!(result.is_err()); // delivery fails against the closed mailbox
}

// ============================================================================
// TEST GROUP 3: Links and exits
// ============================================================================

#[tokio::test]
async fn link_identity_survives_clone() {
    let link = spawn(echo, SpawnOptions::default()).expect("spawn");
    let clone = link.clone();

    assert_eq!(link, clone);
    assert_eq!(link.id(), clone.id());
    assert!(link.is_local());
}

#[tokio::test]
async fn exit_request_stops_the_actor_after_current_message() {
    let link = spawn(accumulator(), SpawnOptions::default()).expect("spawn");

    link.send("first".to_string()).await.expect("send");
    link.exit(ExitReason::Shutdown).await.expect("exit");
    sleep(Duration::from_millis(80)).await;

    // The mailbox is closed; the link dangles.
    assert_eq!(
        link.send("late".to_string()).await,
        Err(MailboxError::Closed)
    );
}

#[tokio::test]
async fn mutual_peer_links_propagate_failure() {
    let a = spawn(echo_or_crash, SpawnOptions::default()).expect("a");
    let b = spawn(echo_or_crash, SpawnOptions::default()).expect("b");

    // Bidirectional link: each holds the other in its connection set.
    a.connect(b.clone(), PeerRole::Peer).await.expect("connect");
    b.connect(a.clone(), PeerRole::Peer).await.expect("connect");

    b.send("crash".to_string()).await.expect("deliver crash");
    sleep(Duration::from_millis(120)).await;

    // b's failure took a down with it.
    assert_eq!(
        a.send("anyone?".to_string()).await,
        Err(MailboxError::Closed)
    );
}

#[tokio::test]
async fn monitor_survives_observed_exit() {
    let observed = spawn(echo_or_crash, SpawnOptions::default()).expect("observed");
    let monitor = spawn(echo, SpawnOptions::default()).expect("monitor");

    // The observed actor notifies the monitor; the monitor holds the
    // observed as Monitor so the notice does not propagate.
    observed
        .connect(monitor.clone(), PeerRole::Peer)
        .await
        .expect("connect");
    monitor
        .connect(observed.clone(), PeerRole::Monitor)
        .await
        .expect("connect");

    observed.send("crash".to_string()).await.expect("crash");
    sleep(Duration::from_millis(120)).await;

    assert_eq!(
        request(&monitor, "still here".to_string(), ASK).await,
        Ok("still here".to_string())
    );
}

// ============================================================================
// TEST GROUP 4: Name service
// ============================================================================

#[tokio::test]
async fn registered_name_resolves_to_working_link() {
    let system: ActorSystem<String> = ActorSystem::new(SystemConfig::default()).expect("system");

    let link = system
        .spawn(echo, system.spawn_options().with_name("echoer"))
        .expect("spawn");

    let resolved = system.whereis("echoer").expect("whereis");
    assert_eq!(resolved, link);

    let answer = request(&resolved, "via name".to_string(), ASK)
        .await
        .expect("request");
    assert_eq!(answer, "via name");
}

#[tokio::test]
async fn whereis_after_unregister_is_empty() {
    let system: ActorSystem<String> = ActorSystem::new(SystemConfig::default()).expect("system");
    let link = system.spawn(echo, system.spawn_options()).expect("spawn");

    system.register("short-lived", link).expect("register");
    system.unregister("short-lived").expect("unregister");

    assert!(system.whereis("short-lived").is_none());
}
