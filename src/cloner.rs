// src/cloner.rs

//! Recursively acquires a package and everything its project-info declares,
//! applying a placement policy (workspace root, deps directory, interactive
//! prompt, or forbidden). Depth capped at 10, matching the assembler's cap.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{Config, InstallPolicy, RECIPES_DIR};
use crate::error::{NawabsError, Result};
use crate::locator::find_project;
use crate::model::{is_grouping_folder, Package, Project};
use crate::project_info;
use crate::prompt::{PromptOutcome, Prompter};
use crate::process::ProcessRunner;
use crate::vcs::clone_url;

/// Recursion depth above which the cloner fatals with `RecursionBound`.
pub const MAX_DEPTH: u32 = 10;

/// Outcome of a single [`clone_rec`] call.
#[derive(Debug, Clone)]
pub enum CloneOutcome {
    /// The project already existed on disk; its requirements were still
    /// walked in case some of them are missing.
    AlreadyPresent(Project),
    /// The project was freshly cloned.
    Cloned(Project),
    /// The user aborted an interactive placement prompt. The caller decides
    /// whether this is fatal (the tinker loop's `install_dep` path treats it
    /// as `UserAbort`; other callers may tolerate it).
    Aborted,
}

impl CloneOutcome {
    pub fn already_present(&self) -> bool {
        matches!(self, CloneOutcome::AlreadyPresent(_))
    }

    pub fn project(&self) -> Option<&Project> {
        match self {
            CloneOutcome::AlreadyPresent(p) | CloneOutcome::Cloned(p) => Some(p),
            CloneOutcome::Aborted => None,
        }
    }
}

fn resolve_package_ref<'a>(catalog: &'a [Package], package_ref: &str) -> Result<Package> {
    if package_ref.contains("://") {
        return Ok(Package::from_url(package_ref));
    }
    catalog
        .iter()
        .find(|p| p.name_eq(package_ref))
        .cloned()
        .ok_or_else(|| NawabsError::Unresolved(package_ref.to_string()))
}

/// Prompt for a placement directory under the interactive policy branch of
/// step 2 in the contract. Returns `None` on abort.
fn prompt_for_placement(
    config: &Config,
    prompter: &dyn Prompter,
) -> Result<Option<PathBuf>> {
    let question = "place dependency where? [workspace/./<group_name>_/abort]";
    let validate = |s: &str| {
        matches!(s, "workspace" | "w" | "ws" | "_" | "" | ".")
            || (is_grouping_folder(s) && s != RECIPES_DIR)
    };

    match prompter.ask(question, &validate)? {
        PromptOutcome::Abort => Ok(None),
        PromptOutcome::Answer(answer) => {
            let dir = match answer.as_str() {
                "workspace" | "w" | "ws" | "_" | "" => config.workspace_root.clone(),
                "." => std::env::current_dir()?,
                group => {
                    let path = config.workspace_root.join(group);
                    std::fs::create_dir_all(&path)?;
                    path
                }
            };
            Ok(Some(dir))
        }
    }
}

/// Decide where to place a freshly-acquired dependency, per the placement
/// policy in contract step 2. Returns `None` on interactive abort.
fn placement_dir(
    config: &Config,
    depth: u32,
    prompter: &dyn Prompter,
) -> Result<Option<PathBuf>> {
    if depth == 0 {
        return Ok(Some(std::env::current_dir()?));
    }

    if config.install_policy == InstallPolicy::NoDeps {
        return Err(NawabsError::PolicyViolation("dependency required under no-deps policy".to_string()));
    }

    if let Some(deps_dir) = &config.deps_dir {
        std::fs::create_dir_all(deps_dir)?;
        return Ok(Some(deps_dir.clone()));
    }

    if !config.interactive {
        return Ok(Some(config.workspace_root.clone()));
    }

    prompt_for_placement(config, prompter)
}

/// Recursively acquire `package_ref` (a catalog name or a bare URL) and its
/// transitive requirements.
pub fn clone_rec(
    config: &Config,
    catalog: &[Package],
    runner: &dyn ProcessRunner,
    prompter: &dyn Prompter,
    package_ref: &str,
    depth: u32,
) -> Result<CloneOutcome> {
    if depth > MAX_DEPTH {
        return Err(NawabsError::RecursionBound {
            package: package_ref.to_string(),
            depth,
            limit: MAX_DEPTH,
        });
    }

    let package = resolve_package_ref(catalog, package_ref)?;

    let outcome = if let Some(existing) = find_project(&config.workspace_root, &package.name) {
        debug!(package = %package.name, "already present, descending into its requirements");
        CloneOutcome::AlreadyPresent(existing)
    } else {
        let Some(target_dir) = placement_dir(config, depth, prompter)? else {
            return Ok(CloneOutcome::Aborted);
        };

        clone_url(runner, &package.url, &target_dir, &package.name, config.prefer_https)?;
        info!(package = %package.name, dir = %target_dir.display(), "cloned package");
        CloneOutcome::Cloned(Project::new(package.name.clone(), target_dir))
    };

    let Some(project) = outcome.project() else {
        return Ok(outcome);
    };

    let info = project_info::read(&project.path());
    for dep in &info.foreign_deps {
        config.record_foreign_dep(dep.clone());
    }

    for requirement in &info.requires {
        match clone_rec(config, catalog, runner, prompter, requirement, depth + 1)? {
            CloneOutcome::Aborted => return Ok(CloneOutcome::Aborted),
            _ => continue,
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::model::DownloadMethod;
    use crate::prompt::{NonInteractivePrompter, ScriptedPrompter};
    use crate::process::CommandOutput;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    struct FakeRunner;

    impl ProcessRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
            match (program, args.first().copied()) {
                ("git", Some("ls-remote")) => Ok(CommandOutput { success: true, stdout: String::new(), stderr: String::new() }),
                ("git", Some("clone")) => {
                    let target = cwd.join(args[2]);
                    std::fs::create_dir_all(&target)?;
                    Ok(CommandOutput { success: true, stdout: String::new(), stderr: String::new() })
                }
                _ => Ok(CommandOutput { success: false, stdout: String::new(), stderr: "unscripted".into() }),
            }
        }
    }

    fn pkg(name: &str, url: &str) -> Package {
        Package {
            name: name.to_string(),
            url: url.to_string(),
            download_method: DownloadMethod::Git,
            license: "MIT".to_string(),
            description: String::new(),
            tags: BTreeSet::new(),
            version: None,
            dvcs_tag: None,
            web: None,
        }
    }

    fn workspace() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(crate::config::RECIPES_DIR)).unwrap();
        let cfg = Config::discover(dir.path(), ConfigOverrides::default()).unwrap();
        (dir, cfg)
    }

    #[test]
    fn clones_a_package_at_depth_zero_into_cwd() {
        let (ws, cfg) = workspace();
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];

        let original_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(ws.path()).unwrap();
        let result = clone_rec(&cfg, &catalog, &FakeRunner, &NonInteractivePrompter, "libfoo", 0);
        std::env::set_current_dir(original_cwd).unwrap();

        let outcome = result.unwrap();
        assert!(!outcome.already_present());
        assert!(ws.path().join("libfoo").is_dir());
    }

    #[test]
    fn already_present_project_is_not_recloned() {
        let (ws, cfg) = workspace();
        std::fs::create_dir_all(ws.path().join("libfoo")).unwrap();
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];

        let outcome = clone_rec(&cfg, &catalog, &FakeRunner, &NonInteractivePrompter, "libfoo", 1).unwrap();
        assert!(outcome.already_present());
    }

    #[test]
    fn unresolved_name_is_an_error() {
        let (_ws, cfg) = workspace();
        let err = clone_rec(&cfg, &[], &FakeRunner, &NonInteractivePrompter, "nope", 0).unwrap_err();
        assert!(matches!(err, NawabsError::Unresolved(_)));
    }

    #[test]
    fn depth_above_bound_is_recursion_bound_error() {
        let (_ws, cfg) = workspace();
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];
        let err = clone_rec(&cfg, &catalog, &FakeRunner, &NonInteractivePrompter, "libfoo", MAX_DEPTH + 1)
            .unwrap_err();
        assert!(matches!(err, NawabsError::RecursionBound { .. }));
    }

    #[test]
    fn no_deps_policy_forbids_recursive_acquisition() {
        let (_ws, mut cfg) = workspace();
        cfg.install_policy = InstallPolicy::NoDeps;
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];

        let err = clone_rec(&cfg, &catalog, &FakeRunner, &NonInteractivePrompter, "libfoo", 1).unwrap_err();
        assert!(matches!(err, NawabsError::PolicyViolation(_)));
    }

    #[test]
    fn non_interactive_recursive_clone_lands_in_workspace_root() {
        let (ws, cfg) = workspace();
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];

        let outcome = clone_rec(&cfg, &catalog, &FakeRunner, &NonInteractivePrompter, "libfoo", 1).unwrap();
        assert_eq!(outcome.project().unwrap().subdir, ws.path());
    }

    #[test]
    fn interactive_abort_on_placement_yields_aborted_outcome() {
        let (_ws, mut cfg) = workspace();
        cfg.interactive = true;
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];
        let prompter = ScriptedPrompter::new(["abort"]);

        let outcome = clone_rec(&cfg, &catalog, &FakeRunner, &prompter, "libfoo", 1).unwrap();
        assert!(matches!(outcome, CloneOutcome::Aborted));
    }

    #[test]
    fn interactive_grouping_folder_answer_clones_inside_it() {
        let (ws, mut cfg) = workspace();
        cfg.interactive = true;
        let catalog = vec![pkg("libfoo", "git://h/libfoo")];
        let prompter = ScriptedPrompter::new(["vendor_"]);

        let outcome = clone_rec(&cfg, &catalog, &FakeRunner, &prompter, "libfoo", 1).unwrap();
        assert_eq!(outcome.project().unwrap().subdir, ws.path().join("vendor_"));
    }

    #[test]
    fn url_reference_synthesizes_a_package_name() {
        let (ws, cfg) = workspace();
        let outcome =
            clone_rec(&cfg, &[], &FakeRunner, &NonInteractivePrompter, "git://h/libbar", 1).unwrap();
        assert_eq!(outcome.project().unwrap().name, "libbar");
        assert!(ws.path().join("libbar").is_dir());
    }
}
