//! Instruction Decoding
//!
//! Splits one instruction line into its opcode and raw operand tokens.
//! Operands stay unresolved here; resolution needs machine state.

use crate::error::{VmError, VmResult};
use super::opcode::OpCode;

/// Decoded instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operands: Vec<String>,
}

impl Instruction {
    /// Decode `opcode[ws]operand[,operand]*`.
    pub fn parse(line: &str) -> VmResult<Self> {
        let line = line.trim();
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((op, rest)) => (op, rest),
            None => (line, ""),
        };
        let opcode = OpCode::from_mnemonic(mnemonic)
            .ok_or_else(|| VmError::UnknownOpcode(mnemonic.to_string()))?;
        Ok(Instruction {
            opcode,
            operands: split_operands(rest)?,
        })
    }

    /// Raw operand token at `position`.
    pub fn operand(&self, position: usize) -> VmResult<&str> {
        self.operands
            .get(position)
            .map(String::as_str)
            .ok_or(VmError::MissingOperand {
                opcode: self.opcode.mnemonic(),
                position,
            })
    }

    /// Jump target operand: an integer literal, never resolved.
    pub fn target(&self, position: usize) -> VmResult<i64> {
        let token = self.operand(position)?;
        token.parse::<i64>().map_err(|_| VmError::InvalidOperand {
            operand: token.to_string(),
            reason: "jump target must be an integer",
        })
    }
}

/// Split on commas that are outside double quotes. Tokens are trimmed,
/// empty tokens are dropped, and quotes are kept in the token.
pub fn split_operands(text: &str) -> VmResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' if !quoted => {
                push_token(&mut tokens, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if quoted {
        return Err(VmError::UnterminatedQuote(text.trim().to_string()));
    }
    push_token(&mut tokens, &current);
    Ok(tokens)
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let token = raw.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}
