//! RegVM Configuration
//!
//! Defines runtime limits and host grants for the register machine.
//! Configuration specifies constraints only; enforcement is handled by the VM.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{VmError, VmResult};

/// What the outer loop does when nested label invocation exceeds
/// `max_label_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecursionPolicy {
    /// Abandon the current step and run the loop again without advancing.
    #[default]
    Resume,
    /// Treat the overflow as a fatal error.
    Fail,
}

/// VM Configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Number of memory cells addressable through `dp`
    pub memory_size: usize,

    /// Maximum number of nested label frames
    pub max_label_depth: usize,

    /// Draw budget for the random non-zero memory cell syscall
    pub random_cell_attempts: u32,

    pub recursion_policy: RecursionPolicy,

    /// Grant host code execution (syscall 30). Unsafe; off by default.
    pub allow_host_exec: bool,

    /// Grant file reads and writes (syscall 25)
    pub allow_file_io: bool,

    /// Seed for the random source; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// Dump machine state after every step
    pub trace: bool,

    /// Pause after each traced step, in milliseconds
    pub trace_delay_ms: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            memory_size: 50,
            max_label_depth: 1000,
            random_cell_attempts: 100,
            recursion_policy: RecursionPolicy::Resume,
            allow_host_exec: false,
            allow_file_io: true,
            seed: None,
            trace: false,
            trace_delay_ms: 100,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> VmResult<Self> {
        let config: VmConfig =
            toml::from_str(text).map_err(|e| VmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> VmResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject limits the engine cannot run with.
    pub fn validate(&self) -> VmResult<()> {
        if self.memory_size == 0 {
            return Err(VmError::Config("memory_size must be at least 1".into()));
        }
        if self.max_label_depth == 0 {
            return Err(VmError::Config("max_label_depth must be at least 1".into()));
        }
        if self.random_cell_attempts == 0 {
            return Err(VmError::Config(
                "random_cell_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
