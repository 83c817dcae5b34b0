// src/compiler.rs

//! The compiler collaborator: invoke it as a process and classify its
//! outcome into one of three [`Action`] variants. The compiler itself is an
//! external collaborator (§1); this module owns only the invocation and the
//! diagnostic-matching regex.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{NawabsError, Result};
use crate::model::Action;
use crate::process::ProcessRunner;

/// Matches nim's "cannot open file" diagnostic, capturing the unresolved
/// module reference.
fn missing_file_pattern() -> Regex {
    Regex::new(r#"(?i)cannot open file:?\s*'?"?([\w./\\-]+)"?'?"#).unwrap()
}

/// Strip a single trailing extension (e.g. `.nim`) from a matched filename,
/// per the contract's "path is a filename with extension stripped."
fn strip_extension(raw: &str) -> String {
    let path = Path::new(raw);
    match (path.parent(), path.file_stem()) {
        (Some(parent), Some(stem)) if !parent.as_os_str().is_empty() => {
            parent.join(stem).to_string_lossy().to_string()
        }
        (_, Some(stem)) => stem.to_string_lossy().to_string(),
        _ => raw.to_string(),
    }
}

/// Resolve `compiler_exe` against `PATH`, surfacing a clear error up front
/// rather than a raw spawn failure from the process runner.
pub fn resolve_compiler(compiler_exe: &str) -> Result<String> {
    which::which(compiler_exe)
        .map(|path| path.to_string_lossy().to_string())
        .map_err(|_| NawabsError::CompilerNotFound(compiler_exe.to_string()))
}

/// Build the full command line for one tinker-loop iteration: `compile_args`
/// followed by a `--path:"<entry>"` for every entry in `path`, in order.
pub fn full_command_line(compile_args: &str, path: &[String]) -> String {
    let mut cmd = compile_args.to_string();
    for entry in path {
        cmd.push_str(&format!(" --path:\"{entry}\""));
    }
    cmd
}

/// Invoke the compiler with the given command line, executed from `cwd`,
/// and classify the result.
pub fn call_compiler(
    runner: &dyn ProcessRunner,
    compiler_exe: &str,
    command_line: &str,
    cwd: &Path,
) -> Result<Action> {
    let args: Vec<&str> = command_line.split_whitespace().collect();
    let output = runner.run(compiler_exe, &args, cwd)?;

    if output.success {
        return Ok(Action::Success);
    }

    let combined = format!("{}\n{}", output.stdout, output.stderr);
    if let Some(caps) = missing_file_pattern().captures(&combined) {
        let file = strip_extension(&caps[1]);
        debug!(file, "compiler reported missing file");
        return Ok(Action::FileMissing(file));
    }

    Ok(Action::Failure(combined.trim().to_string()))
}
