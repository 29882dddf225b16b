//! RegVM - CLI
//!
//! Loads a source file and runs it on the system host.

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use regvm_core::{Exit, SourceLoader, VirtualMachine, VmConfig};
use regvm_host::SystemHost;

/// regvm - run a register machine assembly program
#[derive(Parser, Debug)]
#[command(name = "regvm", version, about)]
struct Cli {
    /// Source file to run
    file: PathBuf,

    /// Dump machine state after every step
    #[arg(long)]
    debug: bool,

    /// Allow syscall 30 to run shell commands
    #[arg(long)]
    allow_exec: bool,

    /// Seed for the randomness syscalls
    #[arg(long)]
    seed: Option<u64>,

    /// Number of memory cells
    #[arg(long)]
    memory_size: Option<usize>,

    /// TOML file with engine settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Program arguments, bound as arg1, arg2, ...
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    fn vm_config(&self) -> Result<VmConfig> {
        let mut config = match &self.config {
            Some(path) => VmConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => VmConfig::new(),
        };
        if self.debug {
            config.trace = true;
        }
        if self.allow_exec {
            config.allow_host_exec = true;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(size) = self.memory_size {
            config.memory_size = size;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "warn,regvm=debug,regvm_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let config = cli.vm_config()?;
    let program = SourceLoader::load_file(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    debug!(file = %cli.file.display(), ?config, "starting");

    let host = SystemHost::new();
    let reading = host.reading_handle();
    let mut vm = VirtualMachine::new(config, program, host, cli.args);
    install_interrupt(vm.interrupt_handle(), reading)?;

    match vm.run() {
        Ok(Exit::Halted(code)) => Ok(code),
        Ok(Exit::Interrupted) => Ok(0),
        Err(fault) => {
            eprintln!("{fault}");
            Ok(1)
        }
    }
}

/// Ctrl-C raises the VM's interrupt flag, which stops the run at the next
/// step or label line. The process exits at once when the host is blocked
/// on console input or the flag was already raised.
fn install_interrupt(flag: Arc<AtomicBool>, reading: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        if exit_now(&flag, &reading) {
            process::exit(0);
        }
    })
    .context("failed to install Ctrl-C handler")
}

fn exit_now(flag: &AtomicBool, reading: &AtomicBool) -> bool {
    let repeated = flag.swap(true, Ordering::SeqCst);
    repeated || reading.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_trailing_args() {
        let cli = Cli::try_parse_from([
            "regvm", "prog.asm", "--seed", "7", "--memory-size", "8", "one", "--two",
        ])
        .expect("parse");
        assert_eq!(cli.file, PathBuf::from("prog.asm"));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.args, ["one", "--two"]);

        let config = cli.vm_config().expect("config");
        assert_eq!(config.memory_size, 8);
        assert_eq!(config.seed, Some(7));
        assert!(!config.allow_host_exec);
    }

    #[test]
    fn zero_memory_rejected() {
        let cli = Cli::try_parse_from(["regvm", "p.asm", "--memory-size", "0"]).expect("parse");
        assert!(cli.vm_config().is_err());
    }

    #[test]
    fn interrupt_during_console_read_exits_at_once() {
        let flag = AtomicBool::new(false);
        let reading = AtomicBool::new(true);
        assert!(exit_now(&flag, &reading));
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn interrupt_while_stepping_waits_for_the_vm() {
        let flag = AtomicBool::new(false);
        let reading = AtomicBool::new(false);
        assert!(!exit_now(&flag, &reading));
        assert!(flag.load(Ordering::SeqCst));
        assert!(exit_now(&flag, &reading));
    }

    #[test]
    fn file_required() {
        assert!(Cli::try_parse_from(["regvm"]).is_err());
    }
}
