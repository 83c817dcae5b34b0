// src/model.rs

//! Core value types shared by every component: catalog packages, materialized
//! projects, per-project build info, and the compiler's outcome signal.
//!
//! None of these types carry pointers to one another. The catalog is an
//! ordered collection of immutable [`Package`] values looked up by lowercased
//! name; projects are located by filesystem convention, not held in memory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A single entry in the package catalog.
///
/// Identity is `name`, compared case-insensitively. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub url: String,
    pub download_method: DownloadMethod,
    pub license: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub version: Option<String>,
    pub dvcs_tag: Option<String>,
    pub web: Option<String>,
}

impl Package {
    /// Case-insensitive name comparison, used for catalog identity and lookups.
    pub fn name_eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }

    /// Build a minimal package record for a bare URL reference, as used when
    /// a user passes a URL instead of a catalog name to the cloner. The name
    /// is synthesized from the URL's filename component.
    pub fn from_url(url: &str) -> Self {
        let name = url_filename_component(url);
        Self {
            name,
            url: url.to_string(),
            download_method: DownloadMethod::guess(url),
            license: String::new(),
            description: String::new(),
            tags: BTreeSet::new(),
            version: None,
            dvcs_tag: None,
            web: None,
        }
    }
}

/// The name a requirement token resolves to for lookup purposes: if it's a
/// bare URL, the synthesized filename component; otherwise the token itself.
pub fn requirement_name(requirement: &str) -> String {
    if requirement.contains("://") {
        url_filename_component(requirement)
    } else {
        requirement.to_string()
    }
}

/// Derive the filename-like component of a URL, stripping a trailing `.git`
/// and any trailing slash, for use as a synthesized package name.
fn url_filename_component(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// How a package's repository is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMethod {
    Git,
    Hg,
}

impl DownloadMethod {
    /// Best-effort guess from a bare URL, used only when synthesizing a
    /// [`Package`] from a URL reference rather than a catalog lookup; the
    /// real dispatch happens via the protocol probe in [`crate::vcs`].
    fn guess(url: &str) -> Self {
        if url.starts_with("hg://") || url.contains("hg.") {
            DownloadMethod::Hg
        } else {
            DownloadMethod::Git
        }
    }
}

impl std::str::FromStr for DownloadMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "git" => Ok(DownloadMethod::Git),
            "hg" => Ok(DownloadMethod::Hg),
            other => Err(format!("unknown download method: {other}")),
        }
    }
}

/// A materialized checkout on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub subdir: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, subdir: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), subdir: subdir.into() }
    }

    /// Full path: `subdir / name`.
    pub fn path(&self) -> PathBuf {
        self.subdir.join(&self.name)
    }

    pub fn exists(&self) -> bool {
        self.path().is_dir()
    }
}

/// Per-build info derived by querying a project's own manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Compiler sub-command hint; empty means "use the default backend".
    pub backend: Option<String>,
    /// Ordered list of required package names or URLs, as declared by the project.
    pub requires: Vec<String>,
    /// Opaque system-level dependency strings, surfaced to the user verbatim.
    pub foreign_deps: Vec<String>,
}

/// The compiler's outcome for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Success,
    Failure(String),
    /// `path` is a filename (extension stripped) the compiler reported as unresolved.
    FileMissing(String),
}

/// The three ordered buckets produced by the candidate ranker: exact name
/// match, substring-of-name match, and tag match, each a list of packages in
/// catalog order.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub exact: Vec<Package>,
    pub substring: Vec<Package>,
    pub tag: Vec<Package>,
}

impl CandidateSet {
    /// Walk buckets in priority order and return the first non-empty one.
    pub fn buckets(&self) -> [&[Package]; 3] {
        [&self.exact, &self.substring, &self.tag]
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.substring.is_empty() && self.tag.is_empty()
    }
}

/// The language's source file extension, used by main-file resolution and
/// the tinker loop's missing-file search.
pub const SOURCE_EXT: &str = "nim";

/// True if `name` ends with an underscore, marking it a grouping folder per
/// the project locator's directory-layout convention.
pub fn is_grouping_folder(name: &str) -> bool {
    name.ends_with('_')
}

/// Basename of a path, as a string, defaulting to the whole path if it has no
/// file-name component (e.g. `.` or `/`).
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
