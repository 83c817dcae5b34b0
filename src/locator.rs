// src/locator.rs

//! Finds a previously cloned project inside the workspace using the
//! convention-based directory layout: subdirectories ending in `_` are
//! "grouping folders" searched recursively, after all immediate non-grouping
//! matches at the current level have been considered.

use std::path::Path;

use walkdir::WalkDir;

use crate::config::RECIPES_DIR;
use crate::model::{is_grouping_folder, Project};

/// Immediate subdirectories of `dir`, excluding the reserved recipes
/// directory, sorted by name for deterministic traversal order.
pub(crate) fn immediate_subdirs(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut dirs: Vec<_> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|path| path.file_name().and_then(|n| n.to_str()) != Some(RECIPES_DIR))
        .collect();
    dirs.sort();
    dirs
}

/// Walk `root` for a project directory named `name` (case-insensitive,
/// Unicode-aware). Direct children take precedence over matches nested
/// inside grouping folders at the same level; recursion descends only into
/// grouping folders.
pub fn find_project(root: &Path, name: &str) -> Option<Project> {
    let target = name.to_lowercase();
    let subdirs = immediate_subdirs(root);

    let mut grouping_folders = Vec::new();
    for dir in &subdirs {
        let basename = dir.file_name().unwrap().to_string_lossy().to_string();
        if is_grouping_folder(&basename) {
            grouping_folders.push(dir.clone());
            continue;
        }
        if basename.to_lowercase() == target {
            return Some(Project::new(basename, root.to_path_buf()));
        }
    }

    for group_dir in grouping_folders {
        if let Some(found) = find_project(&group_dir, name) {
            return Some(found);
        }
    }

    None
}
