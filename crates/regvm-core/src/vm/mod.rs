pub mod memory;
pub mod registers;
pub mod state;
pub mod syscall;
pub mod value;
pub mod vm;

mod labels;

pub use memory::{Memory, Variables};
pub use registers::{Register, RegisterBank};
pub use state::MachineState;
pub use syscall::Syscall;
pub use value::Value;
pub use vm::{Exit, StepOutcome, VirtualMachine};
