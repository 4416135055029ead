// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::LazyLock;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for actors and supervised tasks.
///
/// A link carries the `ActorId` of the mailbox it addresses; the id stays
/// stable across restarts, so outstanding links keep working after the
/// supervisor rebinds the transport.
///
/// # Example
/// ```rust
/// use warden_rt::util::ActorId;
///
/// let id1 = ActorId::new();
/// let id2 = ActorId::new();
/// assert_ne!(id1, id2); // Globally unique
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random ActorId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create ActorId from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation identity pairing a `Request` with its `Response`.
///
/// Every in-flight request carries a fresh `MessageId`; the responder
/// copies it into the reply so the caller matches causally rather than
/// positionally.
///
/// # Example
/// ```rust
/// use warden_rt::util::MessageId;
///
/// let id = MessageId::new();
/// println!("correlation: {id}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a new random MessageId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create MessageId from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static LOCAL_HOST: LazyLock<Uuid> = LazyLock::new(Uuid::new_v4);

/// Identity of the host (process) that owns a mailbox.
///
/// Links record the owning host so callers can tell local handles from
/// remote ones. The local host id is generated once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(Uuid);

impl HostId {
    /// The id of the current process.
    pub fn local() -> Self {
        Self(*LOCAL_HOST)
    }

    /// Create HostId from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this id names the current process.
    pub fn is_local(&self) -> bool {
        self.0 == *LOCAL_HOST
    }
}

impl Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
