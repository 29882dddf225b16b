//! Label Invoker
//!
//! A label body runs as a side-effecting expansion: each line goes through
//! the same `execute` path as the main sequence, without touching the
//! program counter. Nested invocations push frames onto a bounded stack
//! instead of recursing on the host stack.

use std::sync::Arc;

use tracing::debug;

use crate::error::{VmError, VmResult};
use crate::host::Host;

use super::vm::{Flow, StepOutcome, VirtualMachine};

/// One active label invocation
#[derive(Debug)]
struct LabelFrame {
    body: Arc<[String]>,
    next: usize,
}

impl<H: Host> VirtualMachine<H> {
    /// Run label `name`, and every label it invokes, to completion.
    /// Returns `Halted` if a body halted the machine and `Interrupted` if the
    /// interrupt flag was raised between body lines.
    pub(super) fn invoke_label(&mut self, name: &str) -> VmResult<Option<StepOutcome>> {
        let limit = self.config.max_label_depth;
        let mut frames: Vec<LabelFrame> = Vec::new();
        frames.push(self.enter(name)?);

        while let Some(frame) = frames.last_mut() {
            if self.interrupted() {
                debug!(label = name, "label expansion interrupted");
                return Ok(Some(StepOutcome::Interrupted));
            }
            let Some(line) = frame.body.get(frame.next).cloned() else {
                frames.pop();
                continue;
            };
            frame.next += 1;

            match self.execute(&line)? {
                Flow::Continue => {}
                Flow::Halt(status) => return Ok(Some(StepOutcome::Halted(status))),
                Flow::Invoke(label) => {
                    if frames.len() >= limit {
                        return Err(VmError::RecursionLimit { depth: limit });
                    }
                    frames.push(self.enter(&label)?);
                }
            }
        }

        Ok(None)
    }

    fn enter(&self, name: &str) -> VmResult<LabelFrame> {
        let body = self
            .program
            .label(name)
            .ok_or_else(|| VmError::UnknownLabel(name.to_string()))?;
        debug!(label = name, lines = body.len(), "enter label");
        Ok(LabelFrame { body, next: 0 })
    }
}
