//! RegVM - Core Library
//!
//! A small register machine for line-oriented assembly programs: named
//! registers, a flat memory array, variables, label expansion and a fixed
//! syscall table. Host effects go through the `Host` trait.

pub mod capability;
pub mod config;
pub mod error;
pub mod host;
pub mod isa;
pub mod loader;
pub mod random;
pub mod vm;

// Re-export commonly used types
pub use capability::{Capability, CapabilityRegistry};
pub use config::{RecursionPolicy, VmConfig};
pub use error::{Fault, VmError, VmResult};
pub use host::{Host, MemoryHost};
pub use isa::{Instruction, OpCode};
pub use loader::{Program, SourceLoader};
pub use random::{RandomSource, RngSource};
pub use vm::{Exit, Register, StepOutcome, Syscall, Value, VirtualMachine};

#[cfg(test)]
mod tests {
	use super::*;

	fn vm(source: &str) -> VirtualMachine<MemoryHost> {
		let program = Program::from_source(source).expect("program loads");
		VirtualMachine::new(VmConfig::new(), program, MemoryHost::new(), Vec::<String>::new())
	}

	#[test]
	fn prints_incremented_register() {
		let mut vm = vm("mov r1, 5\ninc r1\nmov ar1, r1\nmov scr, 10\nsys\nmov scr, 20\nsys\n");
		assert_eq!(vm.run().expect("run failed"), Exit::Halted(0));
		assert_eq!(vm.host().output, "6");
	}

	#[test]
	fn exit_status_from_frr() {
		let mut vm = vm("mov frr, \"3\"\nmov scr, 20\nsys\n");
		assert_eq!(vm.run().expect("run failed"), Exit::Halted(3));
	}

	#[test]
	fn running_off_the_end_is_a_fault() {
		let mut vm = vm("nop\nnop\n");
		let fault = vm.run().unwrap_err();
		assert_eq!(fault.line, 3);
		assert!(matches!(fault.error, VmError::PcOutOfBounds { pc: 2, len: 2 }));
	}

	#[test]
	fn countdown_loop() {
		let src = "\
			mov r1, 3\n\
			dec r1          ; 1\n\
			cmp r1, 0\n\
			jf 1\n\
			mov ar1, \"done\"\n\
			mov scr, 10\n\
			sys\n\
			mov scr, 20\n\
			sys\n";
		let mut vm = vm(src);
		assert_eq!(vm.run().expect("run failed"), Exit::Halted(0));
		assert_eq!(vm.state().register(Register::R1), &Value::Int(0));
		assert_eq!(vm.host().output, "done");
	}

	#[test]
	fn interrupt_stops_run() {
		let mut vm = vm("jmp 0\n");
		vm.interrupt_handle().store(true, std::sync::atomic::Ordering::SeqCst);
		assert_eq!(vm.run().expect("run failed"), Exit::Interrupted);
	}
}
