// src/resolver.rs

//! The tinkering resolver: the central feedback loop. Invokes the compiler,
//! and on a missing-file diagnostic maps the file to a package via the
//! catalog, acquires it, grows the search path by the resolved directory,
//! and retries — up to a bounded iteration count.
//!
//! The loop's `path` list is threaded as an explicit parameter to every
//! compiler invocation rather than via a mutated process working directory;
//! this keeps the "scoped current-directory" concern trivially satisfied
//! (there is nothing ambient to restore) while preserving the loop's
//! externally observable behavior.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::catalog::{determine_candidates, select};
use crate::cloner::{clone_rec, CloneOutcome};
use crate::compiler::{call_compiler, full_command_line};
use crate::config::Config;
use crate::error::{NawabsError, Result};
use crate::locator::find_project;
use crate::model::{Action, Package, Project, SOURCE_EXT};
use crate::process::ProcessRunner;
use crate::prompt::Prompter;
use crate::recipe::{self, Recipe};

/// Iteration cap: exceeding this without success is `ResolverTimeout`.
const MAX_ITERATIONS: u32 = 300;

/// Split a missing-file reference (extension already stripped) on both path
/// separators into search terms, in order.
fn split_terms(file: &str) -> Vec<String> {
    file.split(['/', '\\']).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// The last path-separated segment of a missing-file reference.
fn basename_of(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// Locate `file` inside `project`'s tree: walk recursively collecting every
/// directory containing a file whose name is `basename(file) + ".<ext>"`,
/// and pick the shallowest match (ties: first encountered). Falls back to
/// the project root if nothing matches.
fn locate_missing_file(project_root: &Path, file: &str) -> PathBuf {
    let target_name = format!("{}.{}", basename_of(file), SOURCE_EXT);

    let mut best: Option<(usize, PathBuf)> = None;
    for entry in WalkDir::new(project_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str() != Some(target_name.as_str()) {
            continue;
        }
        let Some(dir) = entry.path().parent() else { continue };
        let depth = dir.components().count();
        match &best {
            Some((best_depth, _)) if depth >= *best_depth => {}
            _ => best = Some((depth, dir.to_path_buf())),
        }
    }

    best.map(|(_, dir)| dir).unwrap_or_else(|| project_root.to_path_buf())
}

/// Canonicalize for a stable, comparable string; falls back to the
/// as-given path if canonicalization fails (e.g. under a scripted test
/// fixture that never actually created the directory).
fn canonical_string(dir: &Path) -> String {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()).display().to_string()
}

/// Resolve a missing-file reference to the dependency project that should
/// provide it: an already-present project matching the file's basename, or
/// a catalog lookup followed by acquisition.
fn acquire_dependency(
    config: &Config,
    catalog: &[Package],
    runner: &dyn ProcessRunner,
    prompter: &dyn Prompter,
    file: &str,
) -> Result<Project> {
    if let Some(existing) = find_project(&config.workspace_root, basename_of(file)) {
        return Ok(existing);
    }

    let terms = split_terms(file);
    let term_refs: Vec<&str> = terms.iter().map(String::as_str).collect();
    let candidates = determine_candidates(catalog, &term_refs);
    if candidates.is_empty() {
        return Err(NawabsError::Unresolved(file.to_string()));
    }

    let Some(package) = select(&candidates, file, prompter, config.interactive)? else {
        return Err(NawabsError::UserAbort("Aborted".to_string()));
    };

    match clone_rec(config, catalog, runner, prompter, &package.name, 1)? {
        CloneOutcome::Aborted => Err(NawabsError::UserAbort("Aborted".to_string())),
        CloneOutcome::AlreadyPresent(p) | CloneOutcome::Cloned(p) => Ok(p),
    }
}

/// Run the tinker loop for `project`, starting from `compile_args` (the
/// backend flag, the disable-default-paths flag, and the main source file,
/// as produced by the assembler) and growing the search path as missing
/// files are resolved.
pub fn tinker(
    config: &Config,
    catalog: &[Package],
    runner: &dyn ProcessRunner,
    prompter: &dyn Prompter,
    project: &Project,
    compile_args: &str,
) -> Result<()> {
    let mut path: Vec<String> = Vec::new();
    let project_path = project.path();

    for iteration in 1..=MAX_ITERATIONS {
        let command_line = full_command_line(compile_args, &path);
        debug!(iteration, %command_line, "tinker iteration");

        match call_compiler(runner, &config.compiler_exe, &command_line, &project_path)? {
            Action::Success => {
                if config.recipes_enabled {
                    recipe::write(
                        config,
                        &Recipe {
                            project_identity: project.name.clone(),
                            command_line,
                            path_list: path,
                        },
                    )?;
                }
                info!(project = %project.name, iteration, "build succeeded");
                return Ok(());
            }
            Action::Failure(message) => {
                return Err(NawabsError::CompileHardFailure { message, command: command_line });
            }
            Action::FileMissing(file) => {
                let dep_project = acquire_dependency(config, catalog, runner, prompter, &file)?;

                let located = locate_missing_file(&dep_project.path(), &file);
                let located = canonical_string(&located);

                if path.contains(&located) {
                    return Err(NawabsError::ResolverStuck { path: located });
                }

                debug!(file, dir = %located, "resolved missing file to search path entry");
                path.push(located);
            }
        }
    }

    Err(NawabsError::ResolverTimeout(MAX_ITERATIONS))
}
