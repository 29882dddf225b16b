//! Capability identifiers
//!
//! Host effects a program may only perform once the embedder grants them.

use std::fmt;

/// Capability identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read a file into `frr` (syscall 25, mode `r`)
    FileRead,
    /// Write `ar3` to a file (syscall 25, mode `w`)
    FileWrite,
    /// Run `ar1` as host code (syscall 30). Unsafe: arbitrary code execution.
    HostExec,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::FileRead => "file-read",
            Capability::FileWrite => "file-write",
            Capability::HostExec => "host-exec",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
