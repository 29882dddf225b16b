//! Instruction set: opcodes and line decoding.

pub mod instruction;
pub mod opcode;

pub use instruction::{split_operands, Instruction};
pub use opcode::OpCode;
