//! Engine property tests
//!
//! 1. Straight-line instructions advance the program counter by exactly one
//! 2. `cmp` against an integer literal is integer equality
//! 3. Integer addition matches checked i64 addition, overflow included
//! 4. Any in-range memory cell holds what was stored there
//! 5. A fixed seed makes the randomness syscalls reproducible

use proptest::prelude::*;
use regvm_core::{
    MemoryHost, Program, Register, StepOutcome, Value, VirtualMachine, VmConfig, VmError,
};

// ── Test harness ─────────────────────────────────────────────────────────────

fn machine(config: VmConfig, source: &str) -> VirtualMachine<MemoryHost> {
    let program = Program::from_source(source).expect("program loads");
    VirtualMachine::new(config, program, MemoryHost::new(), Vec::<String>::new())
}

fn run_lines(vm: &mut VirtualMachine<MemoryHost>) -> Value {
    for _ in 0..vm.program().len() {
        vm.step().expect("step failed");
    }
    vm.state().register(Register::Frr).clone()
}

/// Instructions that never jump, invoke or fail on integer registers.
fn straight_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1000i64..1000).prop_map(|n| format!("mov r1, {n}")),
        (-1000i64..1000).prop_map(|n| format!("add r2, {n}")),
        (-1000i64..1000).prop_map(|n| format!("sub r3, {n}")),
        Just("inc r4".to_string()),
        Just("dec r5".to_string()),
        Just("mul r2, 1".to_string()),
        (0u8..5, -1000i64..1000).prop_map(|(v, n)| format!("var v{v}, {n}")),
        (-3i64..3).prop_map(|n| format!("cmp r1, {n}")),
        Just("nop".to_string()),
        Just("; comment only".to_string()),
    ]
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_pc_advances_by_one(lines in proptest::collection::vec(straight_line(), 1..40)) {
        let source = lines.join("\n");
        let mut vm = machine(VmConfig::new(), &source);
        let len = vm.program().len();
        for expected in 1..=len {
            prop_assert_eq!(vm.step().expect("step failed"), StepOutcome::Advanced);
            prop_assert_eq!(vm.state().pc, expected);
        }
        let fault = vm.step().unwrap_err();
        let out_of_bounds = matches!(fault.error, VmError::PcOutOfBounds { .. });
        prop_assert!(out_of_bounds);
    }

    #[test]
    fn prop_cmp_is_integer_equality(a in any::<i64>(), b in any::<i64>()) {
        let mut vm = machine(VmConfig::new(), &format!("mov r1, {a}\ncmp r1, {b}\n"));
        run_lines(&mut vm);
        prop_assert_eq!(vm.state().register(Register::Cr), &Value::Bool(a == b));
    }

    #[test]
    fn prop_add_matches_checked_i64(a in any::<i64>(), b in any::<i64>()) {
        let mut vm = machine(VmConfig::new(), &format!("mov r1, {a}\nadd r1, {b}\n"));
        vm.step().expect("mov failed");
        match (vm.step(), a.checked_add(b)) {
            (Ok(_), Some(sum)) => {
                prop_assert_eq!(vm.state().register(Register::R1), &Value::Int(sum));
            }
            (Err(fault), None) => {
                let overflow = matches!(fault.error, VmError::Overflow("add"));
                prop_assert!(overflow);
            }
            (result, expected) => {
                prop_assert!(false, "add {} {}: got {:?}, expected {:?}", a, b, result, expected);
            }
        }
    }

    #[test]
    fn prop_memory_cell_holds_stored_value(address in 0usize..50, value in any::<i64>()) {
        let source = format!("mov dp, {address}\nmov r1, {value}\nstore r1\nload r2\n");
        let mut vm = machine(VmConfig::new(), &source);
        run_lines(&mut vm);
        prop_assert_eq!(vm.state().register(Register::R2), &Value::Int(value));
        prop_assert_eq!(vm.state().memory.load(address as i64).unwrap(), Value::Int(value));
    }

    #[test]
    fn prop_seeded_random_is_reproducible(seed in any::<u64>(), low in -500i64..0, high in 0i64..500) {
        let source = format!("mov ar1, {low}\nmov ar2, {high}\nmov scr, 35\nsys\n");
        let config = VmConfig { seed: Some(seed), ..VmConfig::default() };
        let first = run_lines(&mut machine(config.clone(), &source));
        let second = run_lines(&mut machine(config, &source));
        prop_assert_eq!(&first, &second);
        let n = first.to_int().unwrap();
        prop_assert!((low..=high).contains(&n));
    }
}
