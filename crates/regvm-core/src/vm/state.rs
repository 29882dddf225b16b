//! Machine State
//!
//! Registers, memory, variables and the program counter as one unit,
//! owned by the VM and lent out by `&mut` to opcode and syscall handlers.

use std::fmt;

use super::memory::{Memory, Variables};
use super::registers::{Register, RegisterBank};
use super::value::Value;

#[derive(Debug, Clone)]
pub struct MachineState {
    pub registers: RegisterBank,
    pub memory: Memory,
    pub variables: Variables,
    /// Index of the next main-sequence instruction
    pub pc: usize,
}

impl MachineState {
    pub fn new(memory_size: usize, variables: Variables) -> Self {
        MachineState {
            registers: RegisterBank::new(),
            memory: Memory::new(memory_size),
            variables,
            pc: 0,
        }
    }

    /// Resolve an operand token. Precedence: register, quoted text,
    /// variable, integer literal, raw text.
    pub fn resolve(&self, token: &str) -> Value {
        if let Some(reg) = Register::from_name(token) {
            return self.registers.get(reg).clone();
        }
        if let Some(text) = token
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            return Value::Text(text.to_string());
        }
        if let Some(value) = self.variables.get(token) {
            return value.clone();
        }
        match token.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(token.to_string()),
        }
    }

    pub fn register(&self, reg: Register) -> &Value {
        self.registers.get(reg)
    }

    pub fn set_register(&mut self, reg: Register, value: Value) {
        self.registers.set(reg, value);
    }
}

/// Multi-line dump used by the step trace. Zero memory cells are omitted.
impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PC: {}", self.pc)?;
        writeln!(f, "Registers:")?;
        for (reg, value) in self.registers.iter() {
            writeln!(f, "  {:>4}: {}", reg.name(), value)?;
        }
        if !self.variables.is_empty() {
            writeln!(f, "Variables:")?;
            for (name, value) in self.variables.sorted() {
                writeln!(f, "  {}: {}", name, value)?;
            }
        }
        write!(f, "Memory:")?;
        for (address, cell) in self.memory.cells().iter().enumerate() {
            if !cell.is_zero() {
                write!(f, "\n  [{}] {}", address, cell)?;
            }
        }
        Ok(())
    }
}
