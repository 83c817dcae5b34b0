// src/commands.rs

//! One `cmd_*` function per CLI subcommand. Each owns wiring together the
//! library modules (config, catalog, locator, cloner, assembler, resolver,
//! recipe, vcs) and converts the library's typed [`NawabsError`] into an
//! `anyhow::Result` with whatever extra context is useful at this boundary.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::assembler;
use crate::catalog;
use crate::cloner::{clone_rec, CloneOutcome};
use crate::config::{Config, RECIPES_DIR};
use crate::error::NawabsError;
use crate::locator::find_project;
use crate::model::Action;
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::prompt::{Prompter, StdinPrompter};
use crate::recipe;
use crate::refresh::ScriptRefresh;
use crate::resolver;
use crate::vcs;

fn prompter_for(config: &Config) -> Box<dyn Prompter> {
    if config.interactive {
        Box::new(StdinPrompter)
    } else {
        Box::new(crate::prompt::NonInteractivePrompter)
    }
}

fn runner() -> impl ProcessRunner {
    SystemProcessRunner
}

/// Create the reserved workspace directory layout at `workspace` (defaulting
/// to the current directory) if it is not already one.
pub fn cmd_init(workspace: Option<PathBuf>) -> Result<()> {
    let root = match workspace {
        Some(dir) => dir,
        None => std::env::current_dir().context("reading current directory")?,
    };
    std::fs::create_dir_all(&root)?;

    let recipes_root = root.join(RECIPES_DIR);
    std::fs::create_dir_all(recipes_root.join("config"))?;
    std::fs::create_dir_all(recipes_root.join("packages"))?;
    std::fs::create_dir_all(recipes_root.join("recipes"))?;

    info!(workspace = %root.display(), "initialized workspace");
    println!("initialized workspace at {}", root.display());
    Ok(())
}

/// Re-run the catalog root script and report the resulting catalog size.
pub fn cmd_refresh(config: &Config) -> Result<()> {
    ScriptRefresh.refresh(&config.workspace_root).context("running refresh script")?;
    let loaded = catalog::load(config, &ScriptRefresh)?;
    println!("catalog refreshed: {} packages", loaded.len());
    Ok(())
}

/// Print packages whose name or a tag contains any of `terms`
/// (case-insensitive); prints the whole catalog when `terms` is empty.
pub fn cmd_search(config: &Config, terms: &[String]) -> Result<()> {
    let loaded = catalog::load(config, &ScriptRefresh)?;

    let matches = |pkg: &crate::model::Package| {
        if terms.is_empty() {
            return true;
        }
        terms.iter().any(|term| {
            let term = term.to_lowercase();
            pkg.name.to_lowercase().contains(&term)
                || pkg.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
        })
    };

    for pkg in loaded.iter().filter(|p| matches(p)) {
        println!("{} - {}", pkg.name, pkg.description);
    }
    Ok(())
}

/// Print every package in the catalog.
pub fn cmd_list(config: &Config) -> Result<()> {
    cmd_search(config, &[])
}

/// Acquire a single package (by catalog name or bare URL) at the workspace root.
pub fn cmd_clone(config: &Config, name_or_url: &str) -> Result<()> {
    let loaded = catalog::load(config, &ScriptRefresh)?;
    let process_runner = runner();
    let prompter = prompter_for(config);

    match clone_rec(config, &loaded, &process_runner, prompter.as_ref(), name_or_url, 0)? {
        CloneOutcome::Aborted => bail!("clone aborted by user"),
        CloneOutcome::AlreadyPresent(project) => {
            println!("{} already present at {}", project.name, project.path().display());
        }
        CloneOutcome::Cloned(project) => {
            println!("cloned {} into {}", project.name, project.path().display());
        }
    }
    report_foreign_deps(config);
    Ok(())
}

/// Replace the leading backend token (`c`, `cpp`, `js`, …) of an assembled
/// command line with the one the user asked for on the command line; the
/// assembler otherwise derives it from the project's own manifest.
fn override_backend(cmd: &str, backend: &str) -> String {
    let trimmed = cmd.trim_start();
    match trimmed.split_once(char::is_whitespace) {
        Some((_first, rest)) => format!(" {backend} {rest}"),
        None => format!(" {backend}"),
    }
}

fn locate_or_bail(config: &Config, name: &str) -> Result<crate::model::Project> {
    find_project(&config.workspace_root, name)
        .ok_or_else(|| anyhow!("no project named `{name}` found in the workspace"))
}

/// `<backend> <name>`: replay a captured recipe if one exists and recipes are
/// enabled, falling back to the full tinker loop when none is captured yet.
pub fn cmd_build(config: &Config, backend: &str, name: &str) -> Result<()> {
    let project = locate_or_bail(config, name)?;
    let process_runner = runner();

    if config.recipes_enabled {
        match recipe::replay(config, &process_runner, &project) {
            Ok(Action::Success) => {
                println!("{name} built from recipe");
                return Ok(());
            }
            Ok(other) => {
                info!(?other, "recipe replay did not succeed, falling back to tinker");
            }
            Err(NawabsError::NoRecipe(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    tinker_build(config, &process_runner, backend, name, &project)
}

/// `tinker <backend> <name>`: always run the full resolver, ignoring any
/// captured recipe.
pub fn cmd_tinker(config: &Config, backend: &str, name: &str) -> Result<()> {
    let project = locate_or_bail(config, name)?;
    let process_runner = runner();
    tinker_build(config, &process_runner, backend, name, &project)
}

fn tinker_build(
    config: &Config,
    process_runner: &dyn ProcessRunner,
    backend: &str,
    name: &str,
    project: &crate::model::Project,
) -> Result<()> {
    let loaded = catalog::load(config, &ScriptRefresh)?;
    let prompter = prompter_for(config);

    let (cmd, _paths) = assembler::build_cmd(config, project)?;
    let cmd = override_backend(&cmd, backend);

    resolver::tinker(config, &loaded, process_runner, prompter.as_ref(), project, &cmd)
        .with_context(|| format!("building `{name}`"))?;

    report_foreign_deps(config);
    println!("{name} built successfully");
    Ok(())
}

/// `update <name>` / `pinned <name>`: replay a captured recipe verbatim, with
/// no resolution performed.
pub fn cmd_replay(config: &Config, name: &str) -> Result<()> {
    let project = locate_or_bail(config, name)?;
    let process_runner = runner();

    match recipe::replay(config, &process_runner, &project)? {
        Action::Success => {
            println!("{name} replayed successfully");
            Ok(())
        }
        Action::Failure(message) => Err(anyhow!("replay of `{name}` failed: {message}")),
        Action::FileMissing(file) => {
            Err(anyhow!("replay of `{name}` failed: missing file `{file}` (recipe is stale)"))
        }
    }
}

fn report_foreign_deps(config: &Config) {
    let deps = config.foreign_deps();
    if !deps.is_empty() {
        println!("foreign dependencies reported by acquired projects:");
        for dep in deps {
            println!("  - {dep}");
        }
    }
}

/// `vcs::update_everything` wired for completeness; not currently reachable
/// from a dedicated subcommand (the CLI surface only replays captured
/// recipes), but exercised directly by `vcs`'s own tests.
#[allow(dead_code)]
fn cmd_update_everything(config: &Config) -> Result<()> {
    let process_runner = runner();
    let prompter = prompter_for(config);
    vcs::update_everything(&process_runner, config, prompter.as_ref())?;
    Ok(())
}
