//! VM Memory Model
//!
//! The flat memory array addressed through `dp`, and the named variable
//! table seeded from invocation arguments.

use std::collections::HashMap;

use crate::error::{VmError, VmResult};
use super::value::Value;

/// Fixed-size memory, default-initialized to integer zero
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<Value>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Memory {
            cells: vec![Value::Int(0); size],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, address: i64) -> VmResult<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
            .ok_or(VmError::MemoryOutOfBounds {
                address,
                len: self.cells.len(),
            })
    }

    pub fn load(&self, address: i64) -> VmResult<Value> {
        let i = self.index(address)?;
        Ok(self.cells[i].clone())
    }

    pub fn store(&mut self, address: i64, value: Value) -> VmResult<()> {
        let i = self.index(address)?;
        self.cells[i] = value;
        Ok(())
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }
}

/// Named variables; any name, any value type
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind positional arguments as `arg1`, `arg2`, ... (text values).
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = args
            .into_iter()
            .enumerate()
            .map(|(i, arg)| (format!("arg{}", i + 1), Value::Text(arg.into())))
            .collect();
        Variables { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Define or overwrite a variable; the old value's type does not matter.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variables sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_bounds() {
        let mut mem = Memory::new(4);
        assert!(mem.store(3, Value::Int(9)).is_ok());
        assert_eq!(mem.load(3).unwrap(), Value::Int(9));
        assert!(matches!(
            mem.load(4),
            Err(VmError::MemoryOutOfBounds { address: 4, len: 4 })
        ));
        assert!(matches!(
            mem.store(-1, Value::Int(1)),
            Err(VmError::MemoryOutOfBounds { address: -1, .. })
        ));
    }

    #[test]
    fn args_seed_variables() {
        let vars = Variables::from_args(["a", "b"]);
        assert_eq!(vars.get("arg1"), Some(&Value::from("a")));
        assert_eq!(vars.get("arg2"), Some(&Value::from("b")));
        assert_eq!(vars.get("arg3"), None);
    }
}
