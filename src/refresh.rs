// src/refresh.rs

//! The "run refresh script" capability.
//!
//! Scripted configuration refresh is an external collaborator: the real
//! implementation shells out to the workspace's `config/roots.nims` script.
//! Abstracting it behind a trait keeps the catalog loader's one-shot-retry
//! logic (see [`crate::catalog::loader`]) testable without a real script or
//! compiler toolchain on the test machine.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::Result;

/// Re-runs the catalog root script that populates `packages/*.json`.
pub trait RefreshCapability {
    /// Run the refresh script. Returns `Ok(())` even if the script produced
    /// no new manifests; the caller (the catalog loader) decides whether an
    /// empty result warrants a retry.
    fn refresh(&self, workspace_root: &Path) -> Result<()>;
}

/// Default implementation: runs `<workspace>/.nawabs/config/roots.nims`
/// through a shell, the same way the compiler and VCS adapters invoke
/// external processes.
pub struct ScriptRefresh;

impl RefreshCapability for ScriptRefresh {
    fn refresh(&self, workspace_root: &Path) -> Result<()> {
        let script = workspace_root.join(crate::config::RECIPES_DIR).join("config").join("roots.nims");
        if !script.is_file() {
            debug!(script = %script.display(), "no refresh script present, skipping");
            return Ok(());
        }

        debug!(script = %script.display(), "running refresh script");
        let output = Command::new("sh").arg(&script).current_dir(workspace_root).output()?;

        if !output.status.success() {
            warn!(
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "refresh script exited non-zero"
            );
        }
        Ok(())
    }
}

/// Scripted implementation for tests: runs a closure instead of a real
/// script, letting a test simulate "refresh created one shard" without a
/// shell or filesystem script.
pub struct ScriptedRefresh<F: Fn(&Path) -> Result<()>> {
    pub f: F,
}

impl<F: Fn(&Path) -> Result<()>> RefreshCapability for ScriptedRefresh<F> {
    fn refresh(&self, workspace_root: &Path) -> Result<()> {
        (self.f)(workspace_root)
    }
}
