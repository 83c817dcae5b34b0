// src/process.rs

//! The process adapter: execute a shell command and read back its exit
//! status and output. Shared by the VCS dispatch (git/hg) and the compiler
//! invocation, since both are "run a process, inspect exit code and text."

use std::path::Path;

use crate::error::Result;

/// The result of running an external process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Executes external commands. The real implementation shells out via
/// `std::process::Command`; tests substitute a scripted runner so the
/// resolver, cloner, and VCS dispatch are all testable without a real git,
/// hg, or compiler binary present.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;
}

/// Runs the real binaries found on `PATH`.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        let output = std::process::Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
