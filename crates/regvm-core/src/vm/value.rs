//! Runtime Value Representation
//!
//! The closed scalar union held by registers, memory cells and variables,
//! with the coercions and arithmetic the opcodes are defined in terms of.

use std::fmt;

use crate::error::{VmError, VmResult};

/// Largest text, in bytes, that repetition may produce
pub const MAX_TEXT_LEN: usize = 1 << 26;

/// Runtime value
///
/// Equality is strict: values of different variants never compare equal,
/// so `Int(1) != Float(1.0)` and `Bool(true) != Int(1)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

/// Numeric view used by arithmetic; booleans count as 0 and 1.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::Bool(_) => "bool",
        }
    }

    fn numeric(&self) -> Option<Num> {
        match self {
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Bool(b) => Some(Num::Int(*b as i64)),
            Value::Float(f) => Some(Num::Float(*f)),
            Value::Text(_) => None,
        }
    }

    /// Truthiness used by the conditional opcodes when reading `cr`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    /// Numeric zero in any of its forms: `0`, `0.0`, `false`.
    pub fn is_zero(&self) -> bool {
        match self.numeric() {
            Some(Num::Int(i)) => i == 0,
            Some(Num::Float(f)) => f == 0.0,
            None => false,
        }
    }

    /// Integer conversion: floats truncate toward zero, text is parsed.
    pub fn to_int(&self) -> VmResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(*b as i64),
            Value::Float(f) => {
                let t = f.trunc();
                if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
                    Ok(t as i64)
                } else {
                    Err(self.conversion_error("int"))
                }
            }
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.conversion_error("int")),
        }
    }

    pub fn to_float(&self) -> VmResult<f64> {
        match self {
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.conversion_error("float")),
            other => Ok(other.numeric().map(Num::as_f64).unwrap_or_default()),
        }
    }

    /// Text conversion, identical to what the console prints.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn conversion_error(&self, target: &'static str) -> VmError {
        VmError::InvalidConversion {
            value: self.to_string(),
            target,
        }
    }

    fn mismatch(&self, op: &'static str, rhs: &Value) -> VmError {
        VmError::TypeMismatch {
            op,
            lhs: self.type_name(),
            rhs: rhs.type_name(),
        }
    }

    fn arith(
        &self,
        rhs: &Value,
        op: &'static str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> VmResult<Value> {
        match (self.numeric(), rhs.numeric()) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                int_op(a, b).map(Value::Int).ok_or(VmError::Overflow(op))
            }
            (Some(a), Some(b)) => Ok(Value::Float(float_op(a.as_f64(), b.as_f64()))),
            _ => Err(self.mismatch(op, rhs)),
        }
    }

    pub fn add(&self, rhs: &Value) -> VmResult<Value> {
        match (self, rhs) {
            (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),
            _ => self.arith(rhs, "add", i64::checked_add, |a, b| a + b),
        }
    }

    pub fn sub(&self, rhs: &Value) -> VmResult<Value> {
        self.arith(rhs, "sub", i64::checked_sub, |a, b| a - b)
    }

    /// Multiplication; text times an integer repeats the text.
    pub fn mul(&self, rhs: &Value) -> VmResult<Value> {
        match (self, rhs) {
            (Value::Text(s), count @ (Value::Int(_) | Value::Bool(_)))
            | (count @ (Value::Int(_) | Value::Bool(_)), Value::Text(s)) => {
                let n = usize::try_from(count.to_int()?.max(0))
                    .map_err(|_| VmError::Overflow("mul"))?;
                match s.len().checked_mul(n) {
                    Some(len) if len <= MAX_TEXT_LEN => Ok(Value::Text(s.repeat(n))),
                    _ => Err(VmError::Overflow("mul")),
                }
            }
            _ => self.arith(rhs, "mul", i64::checked_mul, |a, b| a * b),
        }
    }

    /// True division; the result is always a float.
    pub fn div(&self, rhs: &Value) -> VmResult<Value> {
        match (self.numeric(), rhs.numeric()) {
            (Some(_), Some(_)) if rhs.is_zero() => Err(VmError::DivisionByZero),
            (Some(a), Some(b)) => Ok(Value::Float(a.as_f64() / b.as_f64())),
            _ => Err(self.mismatch("div", rhs)),
        }
    }
}

/// Floats keep a fractional part (`5.0`) and switch to exponent form
/// outside `[1e-4, 1e16)`, with a signed two-digit exponent (`1e+16`).
fn format_float(f: f64, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.is_nan() {
        return out.write_str("nan");
    }
    if f.is_infinite() {
        return out.write_str(if f > 0.0 { "inf" } else { "-inf" });
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{f:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return write!(out, "{mantissa}e{sign}{digits:0>2}");
    }
    let plain = f.to_string();
    if plain.contains('.') {
        out.write_str(&plain)
    } else {
        write!(out, "{plain}.0")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => format_float(*x, f),
            Value::Text(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
