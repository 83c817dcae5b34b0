// src/config.rs

//! Workspace discovery and the merged configuration record threaded through
//! every component.
//!
//! Precedence, low to high: built-in defaults, a user-level
//! `<config_dir>/nawabs/config.toml`, an optional `nawabs.toml` alongside the
//! discovered workspace root, then CLI flags.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{NawabsError, Result};

/// Name of the workspace's reserved directory: catalog shards, the refresh
/// script, and captured recipes all live under it.
pub const RECIPES_DIR: &str = ".nawabs";

/// Dependency-install policy controlling how the cloner reacts to a
/// dependency that is not yet present in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallPolicy {
    #[default]
    Normal,
    /// Acquiring any dependency is forbidden; a required-but-missing
    /// dependency is a `PolicyViolation`.
    NoDeps,
    /// Only resolve dependencies; do not build.
    Only,
    /// Confirm with the user before each acquisition.
    Ask,
}

impl std::str::FromStr for InstallPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "normal" => Ok(InstallPolicy::Normal),
            "none" => Ok(InstallPolicy::NoDeps),
            "only" => Ok(InstallPolicy::Only),
            "ask" => Ok(InstallPolicy::Ask),
            other => Err(format!("unknown install policy: {other}")),
        }
    }
}

/// On-disk config file, loaded from `<workspace>/nawabs.toml` if present.
/// Every field is optional: the file may be entirely absent, or override
/// only a subset of the built-in defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    deps_dir: Option<PathBuf>,
    clone_using_https: Option<bool>,
    recipes_enabled: Option<bool>,
    interactive: Option<bool>,
    install_policy: Option<String>,
    compiler_exe: Option<String>,
}

/// The merged configuration record threaded through every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace_root: PathBuf,
    pub deps_dir: Option<PathBuf>,
    pub prefer_https: bool,
    pub recipes_enabled: bool,
    pub interactive: bool,
    pub install_policy: InstallPolicy,
    pub compiler_exe: String,
    /// Foreign (system-level) dependencies discovered across the run,
    /// surfaced verbatim to the user at the end. Interior mutability because
    /// components hold `&Config` while appending to it as they walk the
    /// dependency tree.
    foreign_deps: RefCell<Vec<String>>,
}

/// CLI-level overrides, applied last (highest precedence).
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub workspace: Option<PathBuf>,
    pub compiler_exe: Option<String>,
    pub clone_using_https: bool,
    pub norecipes: bool,
    pub non_interactive: bool,
}

impl Config {
    /// Discover the workspace from `start` and build a `Config` by layering
    /// the user-level config file, then `nawabs.toml`, over built-in
    /// defaults, then `overrides` over that.
    pub fn discover(start: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let workspace_root = match &overrides.workspace {
            Some(dir) => dir.clone(),
            None => discover_workspace(start).ok_or(NawabsError::WorkspaceNotFound)?,
        };

        let file = merge_config_files(load_user_config_file()?, load_config_file(&workspace_root)?);

        let mut cfg = Config {
            workspace_root,
            deps_dir: file.deps_dir,
            prefer_https: file.clone_using_https.unwrap_or(false),
            recipes_enabled: file.recipes_enabled.unwrap_or(true),
            interactive: file.interactive.unwrap_or(true),
            install_policy: file
                .install_policy
                .as_deref()
                .map(|s| s.parse().unwrap_or_default())
                .unwrap_or_default(),
            compiler_exe: file.compiler_exe.unwrap_or_else(|| "nim".to_string()),
            foreign_deps: RefCell::new(Vec::new()),
        };

        if let Some(exe) = overrides.compiler_exe {
            cfg.compiler_exe = exe;
        }
        if overrides.clone_using_https {
            cfg.prefer_https = true;
        }
        if overrides.norecipes {
            cfg.recipes_enabled = false;
        }
        if overrides.non_interactive {
            cfg.interactive = false;
        }

        Ok(cfg)
    }

    /// Path to `<workspace>/<RECIPES_DIR>`.
    pub fn recipes_root(&self) -> PathBuf {
        self.workspace_root.join(RECIPES_DIR)
    }

    /// Path to the directory scanned for catalog manifest shards.
    pub fn packages_dir(&self) -> PathBuf {
        self.recipes_root().join("packages")
    }

    /// Path to the directory recipes are written to and read from.
    pub fn recipes_dir(&self) -> PathBuf {
        self.recipes_root().join("recipes")
    }

    /// Path to the refresh script run by the catalog loader's fallback.
    pub fn refresh_script(&self) -> PathBuf {
        self.recipes_root().join("config").join("roots.nims")
    }

    /// Effective directory new top-level dependencies are placed in when no
    /// explicit `deps_dir` is configured: the workspace root itself.
    pub fn default_deps_root(&self) -> PathBuf {
        self.deps_dir.clone().unwrap_or_else(|| self.workspace_root.clone())
    }

    /// Record a foreign dependency string surfaced by some project's info.
    pub fn record_foreign_dep(&self, dep: impl Into<String>) {
        self.foreign_deps.borrow_mut().push(dep.into());
    }

    /// Snapshot of foreign deps accumulated so far.
    pub fn foreign_deps(&self) -> Vec<String> {
        self.foreign_deps.borrow().clone()
    }
}

/// Walk upward from `start` until a directory containing `RECIPES_DIR` is
/// found. Returns `None` if the filesystem root is reached without a match.
pub fn discover_workspace(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(RECIPES_DIR).is_dir() {
            debug!(workspace = %dir.display(), "discovered workspace");
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn load_config_file(workspace_root: &Path) -> Result<ConfigFile> {
    let path = workspace_root.join("nawabs.toml");
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let text = std::fs::read_to_string(&path)?;
    toml::from_str(&text).map_err(|e| NawabsError::other(format!("invalid {}: {e}", path.display())))
}

/// Lowest-precedence config layer: `<user config dir>/nawabs/config.toml`,
/// e.g. `~/.config/nawabs/config.toml` on Linux. Absent `dirs::config_dir()`
/// or an absent file are both the empty default, same as the workspace file.
fn load_user_config_file() -> Result<ConfigFile> {
    let Some(dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = dir.join("nawabs").join("config.toml");
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let text = std::fs::read_to_string(&path)?;
    toml::from_str(&text).map_err(|e| NawabsError::other(format!("invalid {}: {e}", path.display())))
}

/// Merge two config-file layers, `override_` taking precedence field by field.
fn merge_config_files(base: ConfigFile, override_: ConfigFile) -> ConfigFile {
    ConfigFile {
        deps_dir: override_.deps_dir.or(base.deps_dir),
        clone_using_https: override_.clone_using_https.or(base.clone_using_https),
        recipes_enabled: override_.recipes_enabled.or(base.recipes_enabled),
        interactive: override_.interactive.or(base.interactive),
        install_policy: override_.install_policy.or(base.install_policy),
        compiler_exe: override_.compiler_exe.or(base.compiler_exe),
    }
}
