//! System-level configuration.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none for this module)

// Layer 3: Internal module imports
use super::errors::SystemError;
use crate::mailbox::{SendPolicy, DEFAULT_CAPACITY};

/// Defaults an [`crate::system::ActorSystem`] applies to spawned actors.
///
/// # Example
///
/// ```rust
/// use warden_rt::system::SystemConfig;
///
/// let config = SystemConfig::default().with_mailbox_capacity(64);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    /// Default mailbox capacity for spawned actors.
    pub mailbox_capacity: usize,

    /// Default full-mailbox policy for spawned actors.
    pub send_policy: SendPolicy,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_CAPACITY,
            send_policy: SendPolicy::default(),
        }
    }
}

impl SystemConfig {
    /// Builder method: default mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Builder method: default full-mailbox policy.
    pub fn with_send_policy(mut self, policy: SendPolicy) -> Self {
        self.send_policy = policy;
        self
    }

    /// Reject configurations that cannot back a mailbox.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.mailbox_capacity == 0 {
            return Err(SystemError::InvalidConfig {
                reason: "mailbox_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SystemConfig::default();

        assert_eq!(config.mailbox_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.send_policy, SendPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SystemConfig::default().with_mailbox_capacity(0);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_chaining() {
        let config = SystemConfig::default()
            .with_mailbox_capacity(128)
            .with_send_policy(SendPolicy::Fail);

        assert_eq!(config.mailbox_capacity, 128);
        assert_eq!(config.send_policy, SendPolicy::Fail);
    }
}
