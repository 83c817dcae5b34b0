// src/vcs.rs

//! The process/VCS adapter: URL normalization, git/hg protocol dispatch,
//! clone, and pull, all via subprocess invocation.
//!
//! Shelling out mirrors the teacher's build-phase execution: a thin
//! `ProcessRunner` trait stands in for `std::process::Command` so tests can
//! script outcomes without a real git/hg binary or network access.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use url::Url;

use crate::config::{Config, InstallPolicy};
use crate::error::{NawabsError, Result};
use crate::locator::immediate_subdirs;
use crate::model::{is_grouping_folder, Project};
use crate::process::ProcessRunner;
use crate::prompt::{PromptOutcome, Prompter};

const MAX_PULL_RETRIES: u32 = 3;

/// Which VCS a URL was identified as speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    Git,
    Hg,
}

/// Normalize a repository URL before probing it:
/// - `git://` rewritten to `https://` when `prefer_https` is set (done on the
///   raw string: swapping a non-special scheme for a special one isn't a
///   `Url::set_scheme` the `url` crate allows).
/// - A trailing slash on a `github.com` path is dropped (avoids a known
///   `ls-remote` failure mode), via `url::Url` so the rest of the URL is
///   parsed and re-serialized rather than patched by hand.
pub fn normalize_url(url: &str, prefer_https: bool) -> String {
    let rewritten = if prefer_https {
        url.strip_prefix("git://").map(|rest| format!("https://{rest}")).unwrap_or_else(|| url.to_string())
    } else {
        url.to_string()
    };

    let Ok(mut parsed) = Url::parse(&rewritten) else {
        return rewritten;
    };

    if parsed.host_str() == Some("github.com") {
        let path = parsed.path().to_string();
        if path.len() > 1 && path.ends_with('/') {
            parsed.set_path(path.trim_end_matches('/'));
        }
    }
    parsed.to_string()
}

/// Probe a URL with `git ls-remote`, then `hg identify`, to decide which VCS
/// owns it. Fatal `UnknownVcs` if neither succeeds.
pub fn probe(runner: &dyn ProcessRunner, url: &str, scratch_dir: &Path) -> Result<Vcs> {
    if runner.run("git", &["ls-remote", url], scratch_dir)?.success {
        return Ok(Vcs::Git);
    }
    if runner.run("hg", &["identify", url], scratch_dir)?.success {
        return Ok(Vcs::Hg);
    }
    Err(NawabsError::UnknownVcs(url.to_string()))
}

/// Normalize, probe, and clone `url` into `<into_dir>/<target_name>`.
pub fn clone_url(
    runner: &dyn ProcessRunner,
    url: &str,
    into_dir: &Path,
    target_name: &str,
    prefer_https: bool,
) -> Result<()> {
    let url = normalize_url(url, prefer_https);
    let vcs = probe(runner, &url, into_dir)?;

    info!(%url, ?vcs, target = %target_name, "cloning package");
    let output = match vcs {
        Vcs::Git => runner.run("git", &["clone", &url, target_name], into_dir)?,
        Vcs::Hg => runner.run("hg", &["clone", &url, target_name], into_dir)?,
    };

    if !output.success {
        return Err(NawabsError::other(format!("clone of {url} failed: {}", output.stderr)));
    }
    Ok(())
}

/// Pull updates for a single project checkout. Under git, skips the pull if
/// the working tree has unstaged changes. Under hg, pulls unconditionally —
/// the source's own asymmetry here is treated as intentional (see
/// DESIGN.md), though a caller may symmetrize it by checking status first.
/// Retries a bounded number of times on transient failure.
pub fn update(runner: &dyn ProcessRunner, project_path: &Path) -> Result<()> {
    if project_path.join(".git").is_dir() {
        let status = runner.run("git", &["status", "--porcelain"], project_path)?;
        if !status.success {
            return Err(NawabsError::other(format!("git status failed in {}", project_path.display())));
        }
        if !status.stdout.trim().is_empty() {
            warn!(path = %project_path.display(), "unstaged changes present, skipping pull");
            return Ok(());
        }
        return pull_with_retry(runner, "git", project_path);
    }

    if project_path.join(".hg").is_dir() {
        return pull_with_retry(runner, "hg", project_path);
    }

    Ok(())
}

fn pull_with_retry(runner: &dyn ProcessRunner, program: &str, project_path: &Path) -> Result<()> {
    let mut last_err = None;
    for attempt in 1..=MAX_PULL_RETRIES {
        match runner.run(program, &["pull"], project_path) {
            Ok(output) if output.success => return Ok(()),
            Ok(output) => last_err = Some(output.stderr),
            Err(e) => last_err = Some(e.to_string()),
        }
        warn!(attempt, program, path = %project_path.display(), "pull failed, retrying");
    }
    Err(NawabsError::other(format!(
        "pull failed after {MAX_PULL_RETRIES} attempts in {}: {}",
        project_path.display(),
        last_err.unwrap_or_default()
    )))
}

/// Recursively collect every project (non-grouping directory, skipping the
/// recipes directory) under `root`, descending into grouping folders, for
/// `update_everything`.
fn collect_all_projects(root: &Path) -> Vec<Project> {
    let mut found = Vec::new();
    for dir in immediate_subdirs(root) {
        let basename = dir.file_name().unwrap().to_string_lossy().to_string();
        if is_grouping_folder(&basename) {
            found.extend(collect_all_projects(&dir));
        } else {
            found.push(Project::new(basename, root.to_path_buf()));
        }
    }
    found
}

/// Walk every project in the workspace (recursing into grouping folders per
/// the locator's convention) and pull updates for each. Under the `ask`
/// policy, confirms with the user before each project; failures on
/// individual projects are logged and do not abort the walk.
pub fn update_everything(
    runner: &dyn ProcessRunner,
    config: &Config,
    prompter: &dyn Prompter,
) -> Result<()> {
    for project in collect_all_projects(&config.workspace_root) {
        if config.install_policy == InstallPolicy::Ask {
            let question = format!("update `{}`? [y/n]", project.name);
            let validate = |s: &str| matches!(s, "y" | "n" | "Y" | "N");
            match prompter.ask(&question, &validate)? {
                PromptOutcome::Abort => return Err(NawabsError::UserAbort("update_everything".to_string())),
                PromptOutcome::Answer(a) if a.eq_ignore_ascii_case("n") => continue,
                PromptOutcome::Answer(_) => {}
            }
        }

        if let Err(e) = update(runner, &project.path()) {
            warn!(project = %project.name, error = %e, "update failed, continuing");
        }
    }
    Ok(())
}

/// A project's on-disk path as seen from the workspace root, used by
/// callers that only have a [`PathBuf`] and not a [`Project`] value.
pub fn project_vcs_dir(path: &Path) -> Option<PathBuf> {
    if path.join(".git").is_dir() {
        Some(path.join(".git"))
    } else if path.join(".hg").is_dir() {
        Some(path.join(".hg"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::process::CommandOutput;
    use crate::prompt::NonInteractivePrompter;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Scripted runner: maps `(program, args.join(" "))` to a canned output.
    struct ScriptedRunner {
        responses: RefCell<HashMap<String, CommandOutput>>,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<(&str, CommandOutput)>) -> Self {
            Self {
                responses: RefCell::new(responses.into_iter().map(|(k, v)| (k.to_string(), v)).collect()),
            }
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput> {
            let key = format!("{program} {}", args.join(" "));
            Ok(self
                .responses
                .borrow()
                .get(&key)
                .cloned()
                .unwrap_or(CommandOutput { success: false, stdout: String::new(), stderr: "unscripted".into() }))
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput { success: true, stdout: stdout.to_string(), stderr: String::new() }
    }

    fn fail() -> CommandOutput {
        CommandOutput { success: false, stdout: String::new(), stderr: "nope".to_string() }
    }

    #[test]
    fn normalize_rewrites_git_scheme_and_drops_trailing_slash() {
        let normalized = normalize_url("git://github.com/x/y/", true);
        assert_eq!(normalized, "https://github.com/x/y");
    }

    #[test]
    fn normalize_leaves_git_scheme_when_https_not_preferred() {
        assert_eq!(normalize_url("git://github.com/x/y", false), "git://github.com/x/y");
    }

    #[test]
    fn probe_falls_back_to_hg_when_git_fails() {
        let runner = ScriptedRunner::new(vec![
            ("git ls-remote hg://srv/repo", fail()),
            ("hg identify hg://srv/repo", ok("")),
        ]);
        let vcs = probe(&runner, "hg://srv/repo", Path::new(".")).unwrap();
        assert_eq!(vcs, Vcs::Hg);
    }

    #[test]
    fn probe_errors_when_neither_vcs_recognizes_the_url() {
        let runner = ScriptedRunner::new(vec![]);
        let err = probe(&runner, "ftp://nope", Path::new(".")).unwrap_err();
        assert!(matches!(err, NawabsError::UnknownVcs(_)));
    }

    #[test]
    fn update_skips_pull_when_working_tree_dirty() {
        let ws = TempDir::new().unwrap();
        std::fs::create_dir_all(ws.path().join(".git")).unwrap();

        let runner = ScriptedRunner::new(vec![("git status --porcelain", ok(" M file.nim\n"))]);
        assert!(update(&runner, ws.path()).is_ok());
    }

    #[test]
    fn update_pulls_when_working_tree_clean() {
        let ws = TempDir::new().unwrap();
        std::fs::create_dir_all(ws.path().join(".git")).unwrap();

        let runner = ScriptedRunner::new(vec![
            ("git status --porcelain", ok("")),
            ("git pull", ok("")),
        ]);
        assert!(update(&runner, ws.path()).is_ok());
    }

    #[test]
    fn update_everything_recurses_into_grouping_folders() {
        let ws = TempDir::new().unwrap();
        std::fs::create_dir_all(ws.path().join(crate::config::RECIPES_DIR)).unwrap();
        std::fs::create_dir_all(ws.path().join("foo")).unwrap();
        std::fs::create_dir_all(ws.path().join("group_").join("bar")).unwrap();

        let cfg = Config::discover(ws.path(), ConfigOverrides::default()).unwrap();
        // Neither "foo" nor "bar" has a .git/.hg dir, so `update` is a no-op
        // for both; this only exercises that the walk reaches both.
        let runner = ScriptedRunner::new(vec![]);
        assert!(update_everything(&runner, &cfg, &NonInteractivePrompter).is_ok());
    }
}
