// src/cli.rs

//! Argument and subcommand structs only. Dispatch lives in `main.rs`; the
//! actual work of each subcommand lives in `commands.rs`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nawabs", version, about = "Workspace-oriented package and build orchestrator")]
pub struct Cli {
    /// Override workspace discovery instead of walking upward from the current directory.
    #[arg(long = "workspace", global = true, value_name = "dir")]
    pub workspace: Option<PathBuf>,

    /// Compiler executable to invoke in place of the configured default.
    #[arg(long = "nimExe", global = true, value_name = "path")]
    pub nim_exe: Option<String>,

    /// Rewrite `git://` package URLs to `https://` before cloning.
    #[arg(long = "cloneUsingHttps", global = true)]
    pub clone_using_https: bool,

    /// Disable recipe capture on a successful build.
    #[arg(long = "norecipes", global = true)]
    pub norecipes: bool,

    /// Disable interactive prompts; ambiguity becomes a hard error.
    #[arg(long = "non-interactive", global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create workspace scaffolding (the reserved recipes directory and its subdirectories).
    Init,

    /// Re-run the catalog root script and reload the package catalog.
    Refresh,

    /// Search the catalog for packages matching the given terms.
    Search {
        /// Terms to match against package names and tags; all packages if empty.
        terms: Vec<String>,
    },

    /// List every package in the catalog.
    List,

    /// Acquire a single package at the workspace root.
    Clone {
        /// Catalog name or bare URL.
        name: String,
    },

    /// Force the tinkering resolver, ignoring any captured recipe.
    Tinker {
        /// Compiler backend (e.g. `c`, `cpp`, `js`).
        backend: String,
        /// Project name.
        name: String,
    },

    /// Replay a captured recipe for a project with no resolution performed.
    Update {
        /// Project name.
        name: String,
    },

    /// Alias for `update`: replay a captured recipe verbatim.
    Pinned {
        /// Project name.
        name: String,
    },

    /// `<backend> <name>`: assemble and run a build, falling back to the
    /// tinker loop when no recipe has been captured yet.
    #[command(external_subcommand)]
    Build(Vec<String>),
}
