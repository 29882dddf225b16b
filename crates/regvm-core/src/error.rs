//! RegVM Error Types
//!
//! Defines every error condition the engine can raise while loading or
//! running a program. All of them are fatal to a run except `RecursionLimit`,
//! which the outer loop may swallow depending on `RecursionPolicy`.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    // Register errors
    #[error("register error: {0}")]
    Register(String),

    // Bounds errors
    #[error("program counter {pc} out of bounds (program has {len} instructions)")]
    PcOutOfBounds { pc: usize, len: usize },
    #[error("jump target {target} out of bounds (program has {len} instructions)")]
    JumpOutOfBounds { target: i64, len: usize },
    #[error("memory address {address} out of bounds (memory has {len} cells)")]
    MemoryOutOfBounds { address: i64, len: usize },

    // Decoding errors
    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),
    #[error("{opcode} expects an operand at position {position}")]
    MissingOperand { opcode: &'static str, position: usize },
    #[error("invalid operand {operand:?}: {reason}")]
    InvalidOperand { operand: String, reason: &'static str },
    #[error("no closing quotation in {0:?}")]
    UnterminatedQuote(String),
    #[error("unknown label: {0}")]
    UnknownLabel(String),

    // Value errors
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operand types for {op}: {lhs} and {rhs}")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("cannot convert {value:?} to {target}")]
    InvalidConversion { value: String, target: &'static str },
    #[error("integer overflow in {0}")]
    Overflow(&'static str),

    // Syscall errors
    #[error("unknown syscall code: {0}")]
    UnknownSyscall(String),
    #[error("file error: {0}")]
    File(String),
    #[error("could not find non-zero memory value after {attempts} draws")]
    MemoryExhausted { attempts: u32 },
    #[error("empty range for random integer: {low} > {high}")]
    EmptyRange { low: i64, high: i64 },
    #[error("end of input")]
    EndOfInput,
    #[error("capability denied: {0}")]
    CapabilityDenied(&'static str),

    // Label nesting
    #[error("label recursion limit of {depth} frames exceeded")]
    RecursionLimit { depth: usize },

    // Loading and configuration
    #[error("source line {line}: {message}")]
    Load { line: usize, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),

    // IO boundary
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type VmResult<T> = Result<T, VmError>;

/// A fatal error together with the main-sequence line it happened on.
#[derive(Debug, Error)]
#[error("on line {line}: {error}")]
pub struct Fault {
    /// 1-based line within the main instruction sequence (`pc + 1`).
    pub line: usize,
    #[source]
    pub error: VmError,
}

impl Fault {
    pub fn at_pc(pc: usize, error: VmError) -> Self {
        Fault { line: pc + 1, error }
    }
}
