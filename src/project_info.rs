// src/project_info.rs

//! The project-info reader: an external collaborator whose real contract is
//! "read a project's own manifest and report backend/requires/foreign-deps."
//! Version resolution and build-file layout are explicitly out of scope
//! (§1), so this default reader is deliberately best-effort: a missing or
//! malformed manifest yields an empty [`ProjectInfo`], not an error.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::model::ProjectInfo;

/// `requires "name >= 1.0"` / `requires "name"` — capture the quoted body.
fn requires_pattern() -> Regex {
    Regex::new(r#"^requires\s+"([^"]+)""#).unwrap()
}

/// `foreignDep "libssl-dev"` — a system-level dependency this tool never
/// resolves itself, surfaced to the user verbatim.
fn foreign_dep_pattern() -> Regex {
    Regex::new(r#"^foreignDep\s+"([^"]+)""#).unwrap()
}

/// `key = "value"` or `key = value` — capture the key and raw value.
fn assignment_pattern() -> Regex {
    Regex::new(r#"^(\w+)\s*=\s*"?([^"]*)"?\s*$"#).unwrap()
}

/// Strip a version constraint (`>=`, `<=`, `==`, `>`, `<`) from a `requires`
/// body, leaving just the package name or URL.
fn strip_version_constraint(body: &str) -> String {
    let ops = [">=", "<=", "==", ">", "<"];
    for op in ops {
        if let Some(pos) = body.find(op) {
            return body[..pos].trim().to_string();
        }
    }
    body.trim().to_string()
}

/// Locate the manifest for `project_path`: `<name>.nimble`, falling back to
/// the single `*.nimble` file at the project root if there is exactly one.
fn find_manifest(project_path: &Path) -> Option<std::path::PathBuf> {
    let name = project_path.file_name()?.to_string_lossy().to_string();
    let named = project_path.join(format!("{name}.nimble"));
    if named.is_file() {
        return Some(named);
    }

    let candidates: Vec<_> = std::fs::read_dir(project_path)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "nimble"))
        .collect();

    match candidates.len() {
        1 => Some(candidates[0].clone()),
        _ => None,
    }
}

/// Read `project_path`'s manifest. Best effort: a missing manifest, an
/// unreadable file, or a line that doesn't parse as either a `requires`
/// statement or a `key = value` assignment is simply skipped, never fatal.
pub fn read(project_path: &Path) -> ProjectInfo {
    let mut info = ProjectInfo::default();

    let Some(manifest) = find_manifest(project_path) else {
        debug!(path = %project_path.display(), "no manifest found, using empty project info");
        return info;
    };

    let Ok(text) = std::fs::read_to_string(&manifest) else {
        return info;
    };

    let requires_re = requires_pattern();
    let foreign_dep_re = foreign_dep_pattern();
    let assignment_re = assignment_pattern();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(caps) = requires_re.captures(line) {
            info.requires.push(strip_version_constraint(&caps[1]));
            continue;
        }

        if let Some(caps) = foreign_dep_re.captures(line) {
            info.foreign_deps.push(caps[1].to_string());
            continue;
        }

        if let Some(caps) = assignment_re.captures(line) {
            let key = &caps[1];
            let value = caps[2].trim().to_string();
            match key {
                "backend" => info.backend = Some(value),
                "bin" | "srcDir" => {} // out of scope
                _ => {}
            }
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, project_name: &str, body: &str) {
        std::fs::write(dir.join(format!("{project_name}.nimble")), body).unwrap();
    }

    #[test]
    fn parses_backend_and_requires() {
        let project = TempDir::new().unwrap();
        write_manifest(
            project.path(),
            project.path().file_name().unwrap().to_str().unwrap(),
            "backend = \"cpp\"\nrequires \"libfoo >= 1.0\"\nrequires \"libbar\"\n",
        );

        let info = read(project.path());
        assert_eq!(info.backend.as_deref(), Some("cpp"));
        assert_eq!(info.requires, vec!["libfoo", "libbar"]);
    }

    #[test]
    fn parses_foreign_deps() {
        let project = TempDir::new().unwrap();
        write_manifest(
            project.path(),
            project.path().file_name().unwrap().to_str().unwrap(),
            "requires \"libfoo\"\nforeignDep \"libssl-dev\"\nforeignDep \"libsqlite3-dev\"\n",
        );

        let info = read(project.path());
        assert_eq!(info.foreign_deps, vec!["libssl-dev", "libsqlite3-dev"]);
    }

    #[test]
    fn missing_manifest_yields_empty_info_not_an_error() {
        let project = TempDir::new().unwrap();
        let info = read(project.path());
        assert_eq!(info, ProjectInfo::default());
    }

    #[test]
    fn falls_back_to_sole_nimble_file_when_name_mismatched() {
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join("other.nimble"), "requires \"libfoo\"\n").unwrap();

        let info = read(project.path());
        assert_eq!(info.requires, vec!["libfoo"]);
    }

    #[test]
    fn unparseable_lines_are_skipped_not_fatal() {
        let project = TempDir::new().unwrap();
        write_manifest(
            project.path(),
            project.path().file_name().unwrap().to_str().unwrap(),
            "### comment\ngarbage line with no structure\nbackend = \"js\"\n",
        );

        let info = read(project.path());
        assert_eq!(info.backend.as_deref(), Some("js"));
    }
}
