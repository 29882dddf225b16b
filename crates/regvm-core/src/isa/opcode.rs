//! Opcode Definitions
//!
//! The closed mnemonic set of the instruction language.
//! This file contains no execution semantics.

use std::fmt;

/// Instruction opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Data movement
    Mov,
    Var,
    Load,
    Store,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Inc,
    Dec,

    // Conversion
    Int,
    Flt,
    Str,

    // Comparison
    Cmp,

    // Control flow
    Jmp,
    Jt,
    Jf,

    // Labels
    Jl,
    Jlt,
    Jlf,

    // System
    Sys,
    Nop,
}

impl OpCode {
    pub const ALL: [OpCode; 22] = [
        OpCode::Mov,
        OpCode::Var,
        OpCode::Load,
        OpCode::Store,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Inc,
        OpCode::Dec,
        OpCode::Int,
        OpCode::Flt,
        OpCode::Str,
        OpCode::Cmp,
        OpCode::Jmp,
        OpCode::Jt,
        OpCode::Jf,
        OpCode::Jl,
        OpCode::Jlt,
        OpCode::Jlf,
        OpCode::Sys,
        OpCode::Nop,
    ];

    /// Convert a mnemonic to an opcode. Matching is exact and case-sensitive.
    pub fn from_mnemonic(token: &str) -> Option<Self> {
        match token {
            "mov" => Some(OpCode::Mov),
            "var" => Some(OpCode::Var),
            "load" => Some(OpCode::Load),
            "store" => Some(OpCode::Store),
            "add" => Some(OpCode::Add),
            "sub" => Some(OpCode::Sub),
            "mul" => Some(OpCode::Mul),
            "div" => Some(OpCode::Div),
            "inc" => Some(OpCode::Inc),
            "dec" => Some(OpCode::Dec),
            "int" => Some(OpCode::Int),
            "flt" => Some(OpCode::Flt),
            "str" => Some(OpCode::Str),
            "cmp" => Some(OpCode::Cmp),
            "jmp" => Some(OpCode::Jmp),
            "jt" => Some(OpCode::Jt),
            "jf" => Some(OpCode::Jf),
            "jl" => Some(OpCode::Jl),
            "jlt" => Some(OpCode::Jlt),
            "jlf" => Some(OpCode::Jlf),
            "sys" => Some(OpCode::Sys),
            "nop" => Some(OpCode::Nop),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Mov => "mov",
            OpCode::Var => "var",
            OpCode::Load => "load",
            OpCode::Store => "store",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Inc => "inc",
            OpCode::Dec => "dec",
            OpCode::Int => "int",
            OpCode::Flt => "flt",
            OpCode::Str => "str",
            OpCode::Cmp => "cmp",
            OpCode::Jmp => "jmp",
            OpCode::Jt => "jt",
            OpCode::Jf => "jf",
            OpCode::Jl => "jl",
            OpCode::Jlt => "jlt",
            OpCode::Jlf => "jlf",
            OpCode::Sys => "sys",
            OpCode::Nop => "nop",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
