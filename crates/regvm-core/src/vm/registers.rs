//! Register Bank
//!
//! The fixed, closed set of named register slots. Names outside this set
//! are never registers; the bank cannot grow or shrink.

use std::fmt;

use super::value::Value;

/// Register names. The discriminant is the register's slot in the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    // General purpose
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,

    // Syscall arguments
    Ar1 = 5,
    Ar2 = 6,
    Ar3 = 7,
    Ar4 = 8,
    Ar5 = 9,

    /// Syscall return / result slot
    Frr = 10,
    /// Syscall selector
    Scr = 11,
    /// Comparison flag
    Cr = 12,
    /// Memory data pointer
    Dp = 13,
}

impl Register {
    pub const ALL: [Register; 14] = [
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::Frr,
        Register::Scr,
        Register::Ar1,
        Register::Ar2,
        Register::Ar3,
        Register::Ar4,
        Register::Ar5,
        Register::Cr,
        Register::Dp,
    ];

    /// The five syscall argument registers, in order.
    pub const ARGS: [Register; 5] = [
        Register::Ar1,
        Register::Ar2,
        Register::Ar3,
        Register::Ar4,
        Register::Ar5,
    ];

    /// Look up a register by its source name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "r1" => Some(Register::R1),
            "r2" => Some(Register::R2),
            "r3" => Some(Register::R3),
            "r4" => Some(Register::R4),
            "r5" => Some(Register::R5),
            "ar1" => Some(Register::Ar1),
            "ar2" => Some(Register::Ar2),
            "ar3" => Some(Register::Ar3),
            "ar4" => Some(Register::Ar4),
            "ar5" => Some(Register::Ar5),
            "frr" => Some(Register::Frr),
            "scr" => Some(Register::Scr),
            "cr" => Some(Register::Cr),
            "dp" => Some(Register::Dp),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::R1 => "r1",
            Register::R2 => "r2",
            Register::R3 => "r3",
            Register::R4 => "r4",
            Register::R5 => "r5",
            Register::Ar1 => "ar1",
            Register::Ar2 => "ar2",
            Register::Ar3 => "ar3",
            Register::Ar4 => "ar4",
            Register::Ar5 => "ar5",
            Register::Frr => "frr",
            Register::Scr => "scr",
            Register::Cr => "cr",
            Register::Dp => "dp",
        }
    }

    /// Value the register holds at startup and after a reset.
    pub fn initial_value(self) -> Value {
        match self {
            Register::Cr => Value::Bool(false),
            _ => Value::Int(0),
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Register storage, one slot per `Register`
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterBank {
    slots: [Value; 14],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        let mut slots: [Value; 14] = Default::default();
        for reg in Register::ALL {
            slots[reg.slot()] = reg.initial_value();
        }
        RegisterBank { slots }
    }

    pub fn get(&self, reg: Register) -> &Value {
        &self.slots[reg.slot()]
    }

    pub fn set(&mut self, reg: Register, value: Value) {
        self.slots[reg.slot()] = value;
    }

    /// Restore every register to its initial value.
    pub fn reset(&mut self) {
        *self = RegisterBank::new();
    }

    /// Registers in display order with their current values.
    pub fn iter(&self) -> impl Iterator<Item = (Register, &Value)> + '_ {
        Register::ALL.into_iter().map(move |reg| (reg, self.get(reg)))
    }
}
