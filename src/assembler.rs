// src/assembler.rs

//! Produces a deterministic compiler command line for a package by walking
//! its declared requirements and appending `--path:` entries for each
//! resolved dependency.

use crate::cloner::MAX_DEPTH;
use crate::config::Config;
use crate::error::{NawabsError, Result};
use crate::locator::find_project;
use crate::model::{requirement_name, Project};
use crate::project_info;

/// The flag the compiler takes to disable its own default package-path
/// discovery, so every search path comes from the explicit `--path:` list
/// this assembler builds.
const DISABLE_DEFAULT_PATHS_FLAG: &str = "--noNimblePath";

/// Build the full compiler command line and the ordered list of resolved
/// dependency paths for `project`.
pub fn build_cmd(config: &Config, project: &Project) -> Result<(String, Vec<String>)> {
    let mut paths = Vec::new();
    let cmd = assemble(config, project, 0, &mut paths)?;
    Ok((cmd, paths))
}

fn assemble(config: &Config, project: &Project, depth: u32, paths: &mut Vec<String>) -> Result<String> {
    if depth > MAX_DEPTH {
        return Err(NawabsError::RecursionBound { package: project.name.clone(), depth, limit: MAX_DEPTH });
    }

    let info = project_info::read(&project.path());
    let mut cmd = String::new();

    if depth == 0 {
        let backend = info.backend.clone().unwrap_or_else(|| "c".to_string());
        cmd.push_str(&format!(" {backend} {DISABLE_DEFAULT_PATHS_FLAG}"));
    } else {
        let dep_path = project.path();
        paths.push(dep_path.display().to_string());
        cmd.push_str(&format!(" --path:\"{}\"", dep_path.display()));
    }

    for requirement in &info.requires {
        if let Some(dep_project) = find_project(&config.workspace_root, &requirement_name(requirement)) {
            cmd.push_str(&assemble(config, &dep_project, depth + 1, paths)?);
        }
    }

    if depth == 0 {
        let main_file = find_main_file(project)
            .ok_or_else(|| NawabsError::other(format!("no main source file found for `{}`", project.name)))?;
        cmd.push(' ');
        cmd.push_str(&main_file);
    }

    Ok(cmd)
}

/// `<name>.nim` at the project root, falling back to the single `*.nim`
/// file there if exactly one exists.
pub fn find_main_file(project: &Project) -> Option<String> {
    let root = project.path();
    let named = root.join(format!("{}.nim", project.name));
    if named.is_file() {
        return Some(named.display().to_string());
    }

    let candidates: Vec<_> = std::fs::read_dir(&root)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "nim"))
        .collect();

    match candidates.len() {
        1 => Some(candidates[0].display().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(crate::config::RECIPES_DIR)).unwrap();
        let cfg = Config::discover(dir.path(), ConfigOverrides::default()).unwrap();
        (dir, cfg)
    }

    #[test]
    fn root_call_emits_backend_flag_and_main_file() {
        let (ws, cfg) = workspace();
        std::fs::create_dir_all(ws.path().join("myapp")).unwrap();
        std::fs::write(ws.path().join("myapp").join("myapp.nim"), "# main\n").unwrap();

        let project = Project::new("myapp", ws.path());
        let (cmd, paths) = build_cmd(&cfg, &project).unwrap();

        assert!(cmd.contains(" c "));
        assert!(cmd.contains(DISABLE_DEFAULT_PATHS_FLAG));
        assert!(cmd.trim_end().ends_with("myapp.nim"));
        assert!(paths.is_empty());
    }

    #[test]
    fn resolved_requirement_contributes_a_path_entry() {
        let (ws, cfg) = workspace();
        std::fs::create_dir_all(ws.path().join("myapp")).unwrap();
        std::fs::write(ws.path().join("myapp").join("myapp.nim"), "# main\n").unwrap();
        std::fs::write(ws.path().join("myapp").join("myapp.nimble"), "requires \"libfoo\"\n").unwrap();
        std::fs::create_dir_all(ws.path().join("libfoo")).unwrap();

        let project = Project::new("myapp", ws.path());
        let (cmd, paths) = build_cmd(&cfg, &project).unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("libfoo"));
        assert!(cmd.contains("--path:"));
    }

    #[test]
    fn unresolved_requirement_contributes_no_path_entry() {
        let (ws, cfg) = workspace();
        std::fs::create_dir_all(ws.path().join("myapp")).unwrap();
        std::fs::write(ws.path().join("myapp").join("myapp.nim"), "# main\n").unwrap();
        std::fs::write(ws.path().join("myapp").join("myapp.nimble"), "requires \"notyetcloned\"\n").unwrap();

        let project = Project::new("myapp", ws.path());
        let (_, paths) = build_cmd(&cfg, &project).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn missing_main_file_is_fatal() {
        let (ws, cfg) = workspace();
        std::fs::create_dir_all(ws.path().join("myapp")).unwrap();

        let project = Project::new("myapp", ws.path());
        assert!(build_cmd(&cfg, &project).is_err());
    }

    #[test]
    fn depth_above_bound_is_recursion_bound_error() {
        let (ws, cfg) = workspace();
        let project = Project::new("myapp", ws.path());
        let mut paths = Vec::new();
        let err = assemble(&cfg, &project, MAX_DEPTH + 1, &mut paths).unwrap_err();
        assert!(matches!(err, NawabsError::RecursionBound { .. }));
    }
}
