// src/catalog/mod.rs

//! The package catalog: merged JSON manifests, and candidate ranking over
//! them.
//!
//! ```ignore
//! use nawabs::catalog::{load, determine_candidates, select};
//!
//! let packages = load(&config, &refresh)?;
//! let candidates = determine_candidates(&packages, &["libfoo"]);
//! let winner = select(&candidates, &prompter, config.interactive)?;
//! ```

mod loader;
mod ranker;

pub use loader::load;
pub use ranker::{determine_candidates, select};
