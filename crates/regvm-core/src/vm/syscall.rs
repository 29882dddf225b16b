//! Syscall Dispatcher
//!
//! `sys` reads a numeric code from `scr` and performs one host effect from
//! a fixed table. Arguments come from `ar1`..`ar5`; results land in `frr`.

use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::error::{VmError, VmResult};
use crate::host::Host;

use super::registers::Register;
use super::value::Value;
use super::vm::{Flow, VirtualMachine};

/// Syscall codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    /// Write `ar1` to the console, no newline
    Print = 10,
    /// Read a console line into `frr`, prompting with `ar1`
    Input = 15,
    /// Halt with status `int(frr)`
    Exit = 20,
    /// Read (`ar2 = "r"`) or write (`ar2 = "w"`) the file named by `ar1`
    File = 25,
    /// Run `ar1` as host code; requires `Capability::HostExec`
    Exec = 30,
    /// `frr` := random integer in `[ar1, ar2]`
    RandomInt = 35,
    /// `frr` := random choice among `ar1`..`ar5`
    Choice = 50,
    ResetRegisters = 55,
    ClearVariables = 60,
    /// Print `ar1` with the current line, halt with status 1
    Panic = 65,
    /// `frr` := program counter
    ProgramCounter = 70,
    /// `frr` := random non-zero memory cell
    RandomCell = 75,
}

impl Syscall {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10 => Some(Syscall::Print),
            15 => Some(Syscall::Input),
            20 => Some(Syscall::Exit),
            25 => Some(Syscall::File),
            30 => Some(Syscall::Exec),
            35 => Some(Syscall::RandomInt),
            50 => Some(Syscall::Choice),
            55 => Some(Syscall::ResetRegisters),
            60 => Some(Syscall::ClearVariables),
            65 => Some(Syscall::Panic),
            70 => Some(Syscall::ProgramCounter),
            75 => Some(Syscall::RandomCell),
            _ => None,
        }
    }

    /// Decode the selector register. Integers and integral floats select a
    /// code; text never does.
    pub fn from_selector(selector: &Value) -> VmResult<Self> {
        let code = match selector {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        };
        code.and_then(Self::from_code)
            .ok_or_else(|| VmError::UnknownSyscall(selector.to_string()))
    }
}

impl<H: Host> VirtualMachine<H> {
    pub(super) fn syscall(&mut self) -> VmResult<Flow> {
        let call = Syscall::from_selector(self.state.register(Register::Scr))?;
        debug!(?call, pc = self.state.pc, "syscall");

        match call {
            Syscall::Print => {
                let text = self.arg(Register::Ar1).to_text();
                self.host.write(&text)?;
            }

            Syscall::Input => {
                let prompt = self.arg(Register::Ar1).to_text();
                let line = self.host.read_line(&prompt)?.ok_or(VmError::EndOfInput)?;
                self.state.set_register(Register::Frr, Value::Text(line));
            }

            Syscall::Exit => {
                let raw = self.arg(Register::Frr).to_int()?;
                let status = i32::try_from(raw).map_err(|_| VmError::InvalidConversion {
                    value: raw.to_string(),
                    target: "exit status",
                })?;
                return Ok(Flow::Halt(status));
            }

            Syscall::File => self.file()?,

            Syscall::Exec => {
                self.capabilities.check(Capability::HostExec)?;
                let code = self.arg(Register::Ar1).to_text();
                warn!(code = %code, "executing host code");
                self.host.execute(&code)?;
            }

            Syscall::RandomInt => {
                let low = self.arg(Register::Ar1).to_int()?;
                let high = self.arg(Register::Ar2).to_int()?;
                if low > high {
                    return Err(VmError::EmptyRange { low, high });
                }
                let n = self.random.between(low, high);
                self.state.set_register(Register::Frr, Value::Int(n));
            }

            Syscall::Choice => {
                let pick = Register::ARGS[self.random.index(Register::ARGS.len())];
                let value = self.arg(pick).clone();
                self.state.set_register(Register::Frr, value);
            }

            Syscall::ResetRegisters => self.state.registers.reset(),
            Syscall::ClearVariables => self.state.variables.clear(),

            Syscall::Panic => {
                let message = self.arg(Register::Ar1).to_text();
                let line = self.state.pc + 1;
                info!(line, "program panic");
                self.host.write(&format!("on line {line}\n{message}\n"))?;
                return Ok(Flow::Halt(1));
            }

            Syscall::ProgramCounter => {
                let pc = self.state.pc as i64;
                self.state.set_register(Register::Frr, Value::Int(pc));
            }

            Syscall::RandomCell => self.random_cell()?,
        }

        Ok(Flow::Continue)
    }

    fn arg(&self, reg: Register) -> &Value {
        self.state.register(reg)
    }

    /// Mode is checked before the file is touched.
    fn file(&mut self) -> VmResult<()> {
        let path = self.arg(Register::Ar1).to_text().trim().to_string();
        let mode = self.arg(Register::Ar2).to_text().trim().to_string();

        match mode.as_str() {
            "r" => {
                self.capabilities.check(Capability::FileRead)?;
                let contents = self
                    .host
                    .read_file(&path)
                    .map_err(|e| VmError::File(format!("{path}: {e}")))?;
                self.state.set_register(Register::Frr, Value::Text(contents));
            }
            "w" => {
                self.capabilities.check(Capability::FileWrite)?;
                let contents = self.arg(Register::Ar3).to_text();
                self.host
                    .write_file(&path, &contents)
                    .map_err(|e| VmError::File(format!("{path}: {e}")))?;
            }
            other => {
                return Err(VmError::File(format!(
                    "invalid file mode {other:?}: only 'r' or 'w' supported"
                )))
            }
        }
        Ok(())
    }

    /// Every draw is written to `frr`, so a failed search leaves the last
    /// zero draw there.
    fn random_cell(&mut self) -> VmResult<()> {
        let attempts = self.config.random_cell_attempts;
        let len = self.state.memory.len();
        if len > 0 {
            for _ in 0..attempts {
                let at = self.random.index(len);
                let value = self.state.memory.cells()[at].clone();
                let found = !value.is_zero();
                self.state.set_register(Register::Frr, value);
                if found {
                    return Ok(());
                }
            }
        }
        Err(VmError::MemoryExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_decoding() {
        assert_eq!(Syscall::from_selector(&Value::Int(10)).unwrap(), Syscall::Print);
        assert_eq!(Syscall::from_selector(&Value::Float(75.0)).unwrap(), Syscall::RandomCell);
        assert!(matches!(
            Syscall::from_selector(&Value::from("10")),
            Err(VmError::UnknownSyscall(code)) if code == "10"
        ));
        assert!(Syscall::from_selector(&Value::Float(10.5)).is_err());
        assert!(Syscall::from_selector(&Value::Int(11)).is_err());
    }

    #[test]
    fn codes_match_discriminants() {
        for code in [10, 15, 20, 25, 30, 35, 50, 55, 60, 65, 70, 75] {
            let call = Syscall::from_code(code).expect("known code");
            assert_eq!(call as i64, code);
        }
    }
}
