//! Host crate: OS integration for the register VM
//!
//! `SystemHost` backs the syscall table with the real console, filesystem
//! and shell. Capability checks have already happened in the engine by the
//! time any of these methods run.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

pub use regvm_core::Host;

/// Console, filesystem and shell of the current process
#[derive(Debug, Default, Clone)]
pub struct SystemHost {
    reading: Arc<AtomicBool>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set while the host is blocked on a console read. An interrupt
    /// handler cannot wait for the next step boundary in that state.
    pub fn reading_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reading)
    }
}

impl Host for SystemHost {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.write(prompt)?;
        let mut line = String::new();
        self.reading.store(true, Ordering::SeqCst);
        let read = io::stdin().lock().read_line(&mut line);
        self.reading.store(false, Ordering::SeqCst);
        if read? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_line_ending(line)))
    }

    fn read_file(&mut self, path: &str) -> io::Result<String> {
        debug!(path, "read file");
        fs::read_to_string(path)
    }

    fn write_file(&mut self, path: &str, contents: &str) -> io::Result<()> {
        debug!(path, bytes = contents.len(), "write file");
        fs::write(path, contents)
    }

    fn execute(&mut self, code: &str) -> io::Result<()> {
        let status = shell(code).status()?;
        if !status.success() {
            warn!(code, %status, "host command exited unsuccessfully");
        }
        Ok(())
    }
}

#[cfg(windows)]
fn shell(code: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", code]);
    cmd
}

#[cfg(not(windows))]
fn shell(code: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", code]);
    cmd
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings_stripped() {
        assert_eq!(strip_line_ending("abc\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc\r\n".to_string()), "abc");
        assert_eq!(strip_line_ending("abc".to_string()), "abc");
        assert_eq!(strip_line_ending(" x \n".to_string()), " x ");
    }

    #[test]
    fn reading_flag_shared_and_clear_at_rest() {
        let host = SystemHost::new();
        let handle = host.reading_handle();
        assert!(!handle.load(Ordering::SeqCst));
        host.reading.store(true, Ordering::SeqCst);
        assert!(handle.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut host = SystemHost::new();
        let err = host
            .read_file("/definitely/not/here/regvm.txt")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
