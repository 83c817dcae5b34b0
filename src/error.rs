// src/error.rs

//! Error types for the nawabs workspace orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, NawabsError>;

/// Errors that can occur while resolving, cloning, or building a workspace project.
#[derive(Error, Debug)]
pub enum NawabsError {
    /// A catalog manifest was missing a required field, or the field had the wrong type.
    #[error("catalog corrupt: field `{field}` missing or malformed in {file}")]
    CatalogCorrupt { file: PathBuf, field: String },

    /// A package name did not resolve against the catalog.
    #[error("unresolved package: {0}")]
    Unresolved(String),

    /// Multiple candidates matched and interaction is disallowed.
    #[error("ambiguous package reference `{query}`: {count} candidates, non-interactive mode")]
    AmbiguousNonInteractive { query: String, count: usize },

    /// A dependency was required while the install policy forbids acquiring any.
    #[error("policy violation: dependency `{0}` required under no-deps policy")]
    PolicyViolation(String),

    /// A URL matched neither the git nor the hg probe.
    #[error("unable to identify VCS for url: {0}")]
    UnknownVcs(String),

    /// The compiler reported an error that was not a missing-file diagnostic.
    #[error("compile failed: {message}\nlast command: {command}")]
    CompileHardFailure { message: String, command: String },

    /// A resolved path was already present in the search path yet the file is still missing.
    #[error("resolver stuck: `{path}` already in --path and yet compilation failed")]
    ResolverStuck { path: String },

    /// The tinker loop exceeded its iteration cap without success.
    #[error("resolver timed out after {0} iterations: stopped unsuccessfully")]
    ResolverTimeout(u32),

    /// Recursion depth exceeded the bound in the cloner or assembler.
    #[error("recursion bound exceeded: depth {depth} > {limit} while processing `{package}`")]
    RecursionBound { package: String, depth: u32, limit: u32 },

    /// The user chose to abort an interactive prompt.
    #[error("aborted: {0}")]
    UserAbort(String),

    /// A replay was requested but no recipe file exists for the project.
    #[error("no recipe found for project `{0}`")]
    NoRecipe(String),

    /// No enclosing workspace could be found from the current directory.
    #[error("no workspace found: no enclosing directory contains a recipes directory")]
    WorkspaceNotFound,

    /// The configured compiler executable could not be found on PATH.
    #[error("compiler executable `{0}` not found on PATH")]
    CompilerNotFound(String),

    /// Catch-all for conditions not covered by a dedicated variant.
    #[error("{0}")]
    Other(String),

    /// I/O failure during filesystem or process operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog manifest JSON failed to parse.
    #[error("JSON error in {0}")]
    Json(#[source] serde_json::Error, PathBuf),
}

impl NawabsError {
    /// Construct an ad-hoc error with a message, mirroring the source's `error(msg)` convention.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_field_and_file() {
        let err = NawabsError::CatalogCorrupt {
            file: PathBuf::from("packages/foo.json"),
            field: "name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("name"));
        assert!(msg.contains("foo.json"));
    }

    #[test]
    fn resolver_timeout_reports_iteration_count() {
        let err = NawabsError::ResolverTimeout(300);
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NawabsError = io_err.into();
        assert!(matches!(err, NawabsError::Io(_)));
    }
}
