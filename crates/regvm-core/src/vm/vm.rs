//! Virtual Machine Core
//!
//! Defines the register machine and its fetch/decode/execute loop over the
//! main instruction sequence. The VM owns the program counter; labels and
//! syscalls are dispatched from here into `labels.rs` and `syscall.rs`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, enabled, info, warn, Level};

use crate::capability::{Capability, CapabilityRegistry};
use crate::config::{RecursionPolicy, VmConfig};
use crate::error::{Fault, VmError, VmResult};
use crate::host::Host;
use crate::isa::{Instruction, OpCode};
use crate::loader::Program;
use crate::random::{RandomSource, RngSource};

use super::memory::Variables;
use super::registers::Register;
use super::state::MachineState;
use super::value::Value;

/// What executing one instruction asks of its caller
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Continue,
    /// Run the named label body before the step completes
    Invoke(String),
    Halt(i32),
}

/// Result of a single `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction ran and the program counter moved to the next line
    Advanced,
    /// The instruction (or a label body it invoked) assigned the counter
    Jumped,
    /// Label nesting hit `max_label_depth`; the step was abandoned and the
    /// counter left where it was
    RecursionLimit { depth: usize },
    /// Explicit termination with an exit status
    Halted(i32),
    /// The interrupt flag was seen inside a label expansion and the rest of
    /// the step was skipped
    Interrupted,
}

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Halted(i32),
    Interrupted,
}

/// Register Virtual Machine
pub struct VirtualMachine<H: Host> {
    pub(super) config: VmConfig,
    pub(super) program: Program,
    pub(super) state: MachineState,
    pub(super) host: H,
    pub(super) capabilities: CapabilityRegistry,
    pub(super) random: Box<dyn RandomSource>,
    interrupt: Arc<AtomicBool>,
    jumped: bool,
}

impl<H: Host> VirtualMachine<H> {
    /// Create a new VM instance. `args` are bound as `arg1`, `arg2`, ...
    pub fn new<I, S>(config: VmConfig, program: Program, host: H, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VirtualMachine {
            state: MachineState::new(config.memory_size, Variables::from_args(args)),
            capabilities: CapabilityRegistry::from_config(&config),
            random: Box::new(RngSource::from_seed(config.seed)),
            interrupt: Arc::new(AtomicBool::new(false)),
            jumped: false,
            program,
            host,
            config,
        }
    }

    /// Replace the random source used by the randomness syscalls.
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn grant_capability(&mut self, cap: Capability) {
        self.capabilities.grant(cap);
    }

    pub fn revoke_capability(&mut self, cap: Capability) {
        self.capabilities.revoke(cap);
    }

    /// Flag checked between steps; setting it ends `run` with
    /// `Exit::Interrupted`.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Step until halt, fault or interrupt.
    pub fn run(&mut self) -> Result<Exit, Fault> {
        loop {
            if self.interrupted() {
                info!(pc = self.state.pc, "interrupted");
                return Ok(Exit::Interrupted);
            }
            match self.step()? {
                StepOutcome::Halted(status) => {
                    info!(status, "halted");
                    return Ok(Exit::Halted(status));
                }
                StepOutcome::Interrupted => {
                    info!(pc = self.state.pc, "interrupted inside label");
                    return Ok(Exit::Interrupted);
                }
                _ => {}
            }
        }
    }

    /// Execute the instruction at the program counter.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        let pc = self.state.pc;
        let outcome = match self.step_inner() {
            Ok(outcome) => outcome,
            Err(VmError::RecursionLimit { depth })
                if self.config.recursion_policy == RecursionPolicy::Resume =>
            {
                warn!(line = pc + 1, depth, "label recursion limit reached, step abandoned");
                StepOutcome::RecursionLimit { depth }
            }
            Err(error) => return Err(Fault::at_pc(pc, error)),
        };

        if self.config.trace {
            self.trace(pc);
        }
        Ok(outcome)
    }

    fn step_inner(&mut self) -> VmResult<StepOutcome> {
        let dp = self.state.register(Register::Dp).to_int()?;
        self.state.set_register(Register::Dp, Value::Int(dp));

        let pc = self.state.pc;
        let line = self
            .program
            .fetch(pc)
            .ok_or(VmError::PcOutOfBounds {
                pc,
                len: self.program.len(),
            })?
            .to_string();

        self.jumped = false;
        match self.execute(&line)? {
            Flow::Continue => {}
            Flow::Invoke(label) => {
                if let Some(outcome) = self.invoke_label(&label)? {
                    return Ok(outcome);
                }
            }
            Flow::Halt(status) => return Ok(StepOutcome::Halted(status)),
        }

        if self.jumped {
            Ok(StepOutcome::Jumped)
        } else {
            self.state.pc += 1;
            Ok(StepOutcome::Advanced)
        }
    }

    /// Decode and execute one instruction. Shared by the main loop and the
    /// label invoker; label invocation is handed back as `Flow::Invoke`.
    pub(crate) fn execute(&mut self, line: &str) -> VmResult<Flow> {
        let ins = Instruction::parse(line)?;

        match ins.opcode {
            OpCode::Nop => {}

            OpCode::Mov => {
                let dest = Self::require_register(&ins, "tried to move a value into a non register")?;
                let value = self.state.resolve(ins.operand(1)?);
                self.state.set_register(dest, value);
            }

            OpCode::Var => {
                let name = ins.operand(0)?.to_string();
                let value = self.state.resolve(ins.operand(1)?);
                self.state.variables.define(name, value);
            }

            // Arithmetic on a non-register destination is silently ignored,
            // unlike mov/cmp/load/store which fail.
            OpCode::Add | OpCode::Sub | OpCode::Mul => {
                if let Some(dest) = Register::from_name(ins.operand(0)?) {
                    let rhs = self.state.resolve(ins.operand(1)?);
                    let lhs = self.state.register(dest);
                    let result = match ins.opcode {
                        OpCode::Add => lhs.add(&rhs),
                        OpCode::Sub => lhs.sub(&rhs),
                        _ => lhs.mul(&rhs),
                    }?;
                    self.state.set_register(dest, result);
                }
            }

            OpCode::Div => {
                let divisor = self.state.resolve(ins.operand(1)?);
                if divisor.is_zero() {
                    return Err(VmError::DivisionByZero);
                }
                if let Some(dest) = Register::from_name(ins.operand(0)?) {
                    let result = self.state.register(dest).div(&divisor)?;
                    self.state.set_register(dest, result);
                }
            }

            OpCode::Inc | OpCode::Dec => {
                if let Some(dest) = Register::from_name(ins.operand(0)?) {
                    let current = self.state.register(dest);
                    let result = if ins.opcode == OpCode::Inc {
                        current.add(&Value::Int(1))
                    } else {
                        current.sub(&Value::Int(1))
                    }?;
                    self.state.set_register(dest, result);
                }
            }

            OpCode::Int => {
                if let Some(dest) = Register::from_name(ins.operand(0)?) {
                    let value = self.state.register(dest).to_int()?;
                    self.state.set_register(dest, Value::Int(value));
                }
            }

            OpCode::Flt => {
                let dest = Self::require_register(&ins, "tried to convert a non register")?;
                let value = self.state.register(dest).to_float()?;
                self.state.set_register(dest, Value::Float(value));
            }

            OpCode::Str => {
                let dest = Self::require_register(&ins, "tried to convert a non register")?;
                let value = self.state.register(dest).to_text();
                self.state.set_register(dest, Value::Text(value));
            }

            OpCode::Cmp => {
                let dest = Self::require_register(&ins, "trying to compare with a non register")?;
                let rhs = self.state.resolve(ins.operand(1)?);
                let equal = *self.state.register(dest) == rhs;
                self.state.set_register(Register::Cr, Value::Bool(equal));
            }

            OpCode::Jmp => self.jump(ins.target(0)?)?,
            OpCode::Jt => {
                if self.flag() {
                    self.jump(ins.target(0)?)?;
                }
            }
            OpCode::Jf => {
                if !self.flag() {
                    self.jump(ins.target(0)?)?;
                }
            }

            OpCode::Load => {
                let dest = Self::require_register(&ins, "tried to load value into non register")?;
                let value = self.state.memory.load(self.dp()?)?;
                self.state.set_register(dest, value);
            }

            OpCode::Store => {
                let src = Self::require_register(&ins, "tried to store from a non register")?;
                let value = self.state.register(src).clone();
                let address = self.dp()?;
                self.state.memory.store(address, value)?;
            }

            OpCode::Jl => return Ok(Flow::Invoke(ins.operand(0)?.to_string())),
            OpCode::Jlt => {
                if self.flag() {
                    return Ok(Flow::Invoke(ins.operand(0)?.to_string()));
                }
            }
            OpCode::Jlf => {
                if !self.flag() {
                    return Ok(Flow::Invoke(ins.operand(0)?.to_string()));
                }
            }

            OpCode::Sys => return self.syscall(),
        }

        Ok(Flow::Continue)
    }

    fn require_register(ins: &Instruction, message: &str) -> VmResult<Register> {
        let token = ins.operand(0)?;
        Register::from_name(token)
            .ok_or_else(|| VmError::Register(format!("{message}: {token}")))
    }

    pub(super) fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    fn flag(&self) -> bool {
        self.state.register(Register::Cr).is_truthy()
    }

    fn dp(&self) -> VmResult<i64> {
        self.state.register(Register::Dp).to_int()
    }

    fn jump(&mut self, target: i64) -> VmResult<()> {
        let len = self.program.len();
        let pc = usize::try_from(target)
            .ok()
            .filter(|&t| t < len)
            .ok_or(VmError::JumpOutOfBounds { target, len })?;
        self.state.pc = pc;
        self.jumped = true;
        Ok(())
    }

    /// Dump state and pause, only when the trace target is enabled.
    fn trace(&self, pc: usize) {
        if !enabled!(target: "regvm::trace", Level::DEBUG) {
            return;
        }
        let instruction = self.program.fetch(pc).unwrap_or("<out of range>");
        debug!(
            target: "regvm::trace",
            "{}\nInstruction: {}\n{}\n{}",
            "-".repeat(40),
            instruction,
            self.state,
            "-".repeat(40)
        );
        if self.config.trace_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.trace_delay_ms));
        }
    }
}
