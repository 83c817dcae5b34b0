// src/recipe.rs

//! Recipe capture and replay: persists the exact command line and resolved
//! search path from a successful tinker run, keyed by project name, so a
//! later `update`/`pinned` invocation can reproduce the build with no
//! resolution at all.
//!
//! Serialization is a small key/value text file, deliberately simple and
//! line-oriented rather than JSON/TOML, since it only ever needs to be
//! written once and replayed verbatim.

use std::path::PathBuf;

use tracing::info;

use crate::compiler::call_compiler;
use crate::config::Config;
use crate::error::{NawabsError, Result};
use crate::model::{Action, Project};
use crate::process::ProcessRunner;

/// Reserved key holding the exact command that last succeeded, in addition
/// to the normal `command` key — kept distinct per the contract's "write a
/// 'last command' key/value pair under a fixed reserved key."
const LAST_COMMAND_KEY: &str = "last_command";

/// A persisted `(project_identity, command_line, path_list)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub project_identity: String,
    pub command_line: String,
    pub path_list: Vec<String>,
}

fn recipe_path(config: &Config, project_identity: &str) -> PathBuf {
    config.recipes_dir().join(format!("{project_identity}.recipe"))
}

/// Escape a value for the key/value format: newlines would break the
/// line-oriented parser, so collapse them to spaces (a command line never
/// legitimately needs an embedded newline).
fn escape(value: &str) -> String {
    value.replace('\n', " ")
}

/// Write `recipe` to its deterministic path, creating the recipes directory
/// if needed.
pub fn write(config: &Config, recipe: &Recipe) -> Result<()> {
    std::fs::create_dir_all(config.recipes_dir())?;

    let mut out = String::new();
    out.push_str(&format!("project={}\n", escape(&recipe.project_identity)));
    out.push_str(&format!("command={}\n", escape(&recipe.command_line)));
    for path in &recipe.path_list {
        out.push_str(&format!("path={}\n", escape(path)));
    }
    out.push_str(&format!("{LAST_COMMAND_KEY}={}\n", escape(&recipe.command_line)));

    let path = recipe_path(config, &recipe.project_identity);
    std::fs::write(&path, out)?;
    info!(path = %path.display(), "wrote recipe");
    Ok(())
}

/// Read back a previously written recipe. `NoRecipe` if the file is absent.
pub fn read(config: &Config, project_identity: &str) -> Result<Recipe> {
    let path = recipe_path(config, project_identity);
    if !path.is_file() {
        return Err(NawabsError::NoRecipe(project_identity.to_string()));
    }

    let text = std::fs::read_to_string(&path)?;
    let mut project = None;
    let mut command_line = None;
    let mut path_list = Vec::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else { continue };
        match key {
            "project" => project = Some(value.to_string()),
            "command" => command_line = Some(value.to_string()),
            "path" => path_list.push(value.to_string()),
            _ => {} // includes the reserved last-command key; not needed on read
        }
    }

    Ok(Recipe {
        project_identity: project.unwrap_or_else(|| project_identity.to_string()),
        command_line: command_line.ok_or_else(|| NawabsError::other(format!("recipe {project_identity} missing command")))?,
        path_list,
    })
}

/// Replay a captured recipe for `project`: re-execute its exact command line
/// with no catalog lookup, ranking, or cloning performed.
pub fn replay(config: &Config, runner: &dyn ProcessRunner, project: &Project) -> Result<Action> {
    let recipe = read(config, &project.name)?;
    call_compiler(runner, &config.compiler_exe, &recipe.command_line, &project.path())
}
