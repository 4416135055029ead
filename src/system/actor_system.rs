// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::SystemError;
use crate::actor::{runtime, Behavior, SpawnOptions};
use crate::link::Link;
use crate::message::Message;
use crate::supervisor::SupervisorConfig;

/// Entry point of the runtime: spawning plus the name service.
///
/// The system is cheap to clone and share. The name service is a
/// concurrent map name → link; lookup and registration are atomic, and
/// re-registering an existing name fails without touching the existing
/// binding.
///
/// # Example
///
/// ```rust
/// use warden_rt::actor::{ActorContext, BehaviorError, SpawnOptions};
/// use warden_rt::system::{ActorSystem, SystemConfig};
///
/// fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
///     Ok(msg)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let system: ActorSystem<String> = ActorSystem::new(SystemConfig::default()).unwrap();
///
/// let link = system
///     .spawn(echo, system.spawn_options().with_name("echo"))
///     .unwrap();
///
/// assert_eq!(system.whereis("echo"), Some(link));
/// # }
/// ```
pub struct ActorSystem<M: Message> {
    inner: Arc<SystemInner<M>>,
}

struct SystemInner<M: Message> {
    config: SystemConfig,
    names: DashMap<String, Link<M>>,
}

impl<M: Message> ActorSystem<M> {
    /// Create a system with the given defaults.
    ///
    /// # Errors
    ///
    /// `SystemError::InvalidConfig` when the configuration fails
    /// validation.
    pub fn new(config: SystemConfig) -> Result<Self, SystemError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(SystemInner {
                config,
                names: DashMap::new(),
            }),
        })
    }

    /// The system's configured defaults.
    pub fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    /// Spawn options seeded with this system's defaults.
    pub fn spawn_options(&self) -> SpawnOptions {
        SpawnOptions::default()
            .with_mailbox_capacity(self.inner.config.mailbox_capacity)
            .with_send_policy(self.inner.config.send_policy)
    }

    /// Spawn an actor; a named actor is registered atomically.
    ///
    /// # Errors
    ///
    /// `SystemError::NameTaken` when the requested name is bound (nothing
    /// is spawned in that case), or the underlying spawn error.
    pub fn spawn(
        &self,
        behavior: impl Behavior<M>,
        opts: SpawnOptions,
    ) -> Result<Link<M>, SystemError> {
        match opts.name.clone() {
            Some(name) => match self.inner.names.entry(name.clone()) {
                Entry::Occupied(_) => Err(SystemError::NameTaken { name }),
                Entry::Vacant(slot) => {
                    let link = runtime::spawn(behavior, opts)?;
                    slot.insert(link.clone());
                    debug!(name = %name, actor = %link.id(), "actor spawned and registered");
                    Ok(link)
                }
            },
            None => Ok(runtime::spawn(behavior, opts)?),
        }
    }

    /// Start a supervisor actor; a named supervisor is registered
    /// atomically.
    ///
    /// # Errors
    ///
    /// `SystemError::Supervisor` for an invalid configuration,
    /// `SystemError::NameTaken` for a name conflict.
    pub fn supervisor(&self, config: SupervisorConfig) -> Result<Link<M>, SystemError> {
        config.validate()?;

        let mut opts = self.spawn_options();
        opts.name = config.name.clone();

        match config.name.clone() {
            Some(name) => match self.inner.names.entry(name.clone()) {
                Entry::Occupied(_) => Err(SystemError::NameTaken { name }),
                Entry::Vacant(slot) => {
                    let link = runtime::spawn_supervisor(config, opts)?;
                    slot.insert(link.clone());
                    debug!(name = %name, supervisor = %link.id(), "supervisor spawned and registered");
                    Ok(link)
                }
            },
            None => Ok(runtime::spawn_supervisor(config, opts)?),
        }
    }

    /// Bind `name` to `link`.
    ///
    /// # Errors
    ///
    /// `SystemError::NameTaken` when the name is already bound.
    pub fn register(&self, name: impl Into<String>, link: Link<M>) -> Result<(), SystemError> {
        let name = name.into();
        match self.inner.names.entry(name.clone()) {
            Entry::Occupied(_) => Err(SystemError::NameTaken { name }),
            Entry::Vacant(slot) => {
                slot.insert(link);
                Ok(())
            }
        }
    }

    /// Look up the link bound to `name`.
    pub fn whereis(&self, name: &str) -> Option<Link<M>> {
        self.inner.names.get(name).map(|entry| entry.value().clone())
    }

    /// Drop the binding for `name`.
    ///
    /// # Errors
    ///
    /// `SystemError::NameNotFound` when nothing is bound.
    pub fn unregister(&self, name: &str) -> Result<(), SystemError> {
        self.inner
            .names
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SystemError::NameNotFound {
                name: name.to_owned(),
            })
    }

    /// Number of registered names.
    pub fn registered_count(&self) -> usize {
        self.inner.names.len()
    }
}

impl<M: Message> Clone for ActorSystem<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Message> fmt::Debug for ActorSystem<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSystem")
            .field("config", &self.inner.config)
            .field("registered", &self.inner.names.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actor::{ActorContext, BehaviorError};
    use crate::request::request;
    use crate::supervisor::{Strategy, SupervisorError};
    use std::time::Duration;

    fn echo(_: &mut ActorContext<String>, msg: String) -> Result<String, BehaviorError> {
        Ok(msg)
    }

    fn system() -> ActorSystem<String> {
        ActorSystem::new(SystemConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_spawn_and_request() {
        let system = system();
        let link = system.spawn(echo, system.spawn_options()).unwrap();

        let answer = request(&link, "ping".to_string(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(answer, "ping");
    }

    #[tokio::test]
    async fn test_register_then_whereis() {
        let system = system();
        let link = system.spawn(echo, system.spawn_options()).unwrap();

        system.register("echo-service", link.clone()).unwrap();

        assert_eq!(system.whereis("echo-service"), Some(link));
        assert_eq!(system.whereis("unknown"), None);
    }

    #[tokio::test]
    async fn test_reregistration_fails_atomically() {
        let system = system();
        let first = system.spawn(echo, system.spawn_options()).unwrap();
        let second = system.spawn(echo, system.spawn_options()).unwrap();

        system.register("svc", first.clone()).unwrap();
        let err = system.register("svc", second).unwrap_err();

        assert!(err.is_name_taken());
        // Existing binding untouched.
        assert_eq!(system.whereis("svc"), Some(first));
    }

    #[tokio::test]
    async fn test_named_spawn_auto_registers() {
        let system = system();
        let link = system
            .spawn(echo, system.spawn_options().with_name("worker"))
            .unwrap();

        assert_eq!(system.whereis("worker"), Some(link));

        // A second spawn under the same name is rejected without
        // spawning.
        let err = system
            .spawn(echo, system.spawn_options().with_name("worker"))
            .unwrap_err();
        assert!(err.is_name_taken());
    }

    #[tokio::test]
    async fn test_unregister() {
        let system = system();
        let link = system.spawn(echo, system.spawn_options()).unwrap();

        system.register("gone-soon", link).unwrap();
        system.unregister("gone-soon").unwrap();

        assert_eq!(system.whereis("gone-soon"), None);
        assert!(system.unregister("gone-soon").is_err());
    }

    #[tokio::test]
    async fn test_supervisor_with_invalid_config_rejected() {
        let system = system();
        let config = SupervisorConfig::new(Strategy::OneForOne).with_max_restarts(0);

        let err = system.supervisor(config).unwrap_err();
        assert!(matches!(
            err,
            SystemError::Supervisor(SupervisorError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_named_supervisor_registered() {
        let system = system();
        let config = SupervisorConfig::new(Strategy::OneForOne).with_name("root-sv");

        let sv = system.supervisor(config).unwrap();
        assert_eq!(system.whereis("root-sv"), Some(sv));
    }

    #[tokio::test]
    async fn test_invalid_system_config_rejected() {
        let result: Result<ActorSystem<String>, _> =
            ActorSystem::new(SystemConfig::default().with_mailbox_capacity(0));

        assert!(result.is_err());
    }
}
