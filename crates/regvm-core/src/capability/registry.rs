//! Capability Registry
//!
//! Keeps the set of granted capabilities.
//! Behavior: default deny-all; checks fail-closed.

use std::collections::HashSet;

use crate::config::VmConfig;
use crate::error::{VmError, VmResult};
use super::capability::Capability;

/// Registry consulted by the syscall dispatcher before any guarded effect.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    granted: HashSet<Capability>,
}

impl CapabilityRegistry {
    /// New registry denies everything by default
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants named by the configuration.
    pub fn from_config(config: &VmConfig) -> Self {
        let mut registry = Self::new();
        if config.allow_file_io {
            registry.grant(Capability::FileRead);
            registry.grant(Capability::FileWrite);
        }
        if config.allow_host_exec {
            registry.grant(Capability::HostExec);
        }
        registry
    }

    pub fn grant(&mut self, cap: Capability) {
        self.granted.insert(cap);
    }

    pub fn revoke(&mut self, cap: Capability) {
        self.granted.remove(&cap);
    }

    pub fn is_granted(&self, cap: Capability) -> bool {
        self.granted.contains(&cap)
    }

    /// Fail-closed if `cap` was not granted
    pub fn check(&self, cap: Capability) -> VmResult<()> {
        if self.is_granted(cap) {
            Ok(())
        } else {
            Err(VmError::CapabilityDenied(cap.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_denies_exec_only() {
        let registry = CapabilityRegistry::from_config(&VmConfig::default());
        assert!(registry.check(Capability::FileRead).is_ok());
        assert!(registry.check(Capability::FileWrite).is_ok());
        assert!(matches!(
            registry.check(Capability::HostExec),
            Err(VmError::CapabilityDenied("host-exec"))
        ));
    }

    #[test]
    fn grant_and_revoke() {
        let mut registry = CapabilityRegistry::new();
        registry.grant(Capability::HostExec);
        assert!(registry.is_granted(Capability::HostExec));
        registry.revoke(Capability::HostExec);
        assert!(registry.check(Capability::HostExec).is_err());
    }
}
