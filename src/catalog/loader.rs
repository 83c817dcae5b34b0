// src/catalog/loader.rs

//! Reads every manifest shard in `<workspace>/.nawabs/packages/`, decodes
//! package records, and deduplicates by name.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{NawabsError, Result};
use crate::model::{DownloadMethod, Package};
use crate::refresh::RefreshCapability;

/// On-disk shape of a single catalog record, decoded with serde before being
/// converted to the domain type [`Package`]. Kept separate from `Package` so
/// malformed-field diagnostics can name the exact JSON key.
#[derive(Debug, Deserialize)]
struct PackageRecord {
    name: Option<serde_json::Value>,
    url: Option<serde_json::Value>,
    method: Option<serde_json::Value>,
    license: Option<serde_json::Value>,
    description: Option<serde_json::Value>,
    #[serde(default)]
    tags: Vec<String>,
    version: Option<String>,
    #[serde(rename = "dvcs-tag")]
    dvcs_tag: Option<String>,
    web: Option<String>,
}

fn required_string(file: &Path, field: &str, value: &Option<serde_json::Value>) -> Result<String> {
    match value {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        _ => Err(NawabsError::CatalogCorrupt { file: file.to_path_buf(), field: field.to_string() }),
    }
}

fn decode_record(file: &Path, record: PackageRecord) -> Result<Package> {
    let name = required_string(file, "name", &record.name)?;
    let url = required_string(file, "url", &record.url)?;
    let method_str = required_string(file, "method", &record.method)?;
    let license = required_string(file, "license", &record.license)?;
    let description = required_string(file, "description", &record.description)?;

    let download_method = method_str
        .parse::<DownloadMethod>()
        .map_err(|_| NawabsError::CatalogCorrupt { file: file.to_path_buf(), field: "method".to_string() })?;

    Ok(Package {
        name,
        url,
        download_method,
        license,
        description,
        tags: record.tags.into_iter().collect::<BTreeSet<_>>(),
        version: record.version,
        dvcs_tag: record.dvcs_tag,
        web: record.web,
    })
}

/// Decode every package record in a single manifest shard file.
fn load_shard(path: &Path) -> Result<Vec<Package>> {
    let text = std::fs::read_to_string(path)?;
    let raw: Vec<PackageRecord> =
        serde_json::from_str(&text).map_err(|e| NawabsError::Json(e, path.to_path_buf()))?;

    raw.into_iter().map(|record| decode_record(path, record)).collect()
}

/// Scan `<workspace>/.nawabs/packages/*.json`, decode every shard, and
/// deduplicate by name: a name already seen is silently skipped, giving
/// earlier files (in scan order) precedence.
fn scan_and_merge(packages_dir: &Path) -> Result<Vec<Package>> {
    if !packages_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut shard_paths: Vec<_> = std::fs::read_dir(packages_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    shard_paths.sort();

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for path in shard_paths {
        for package in load_shard(&path)? {
            let key = package.name.to_lowercase();
            if seen.insert(key) {
                merged.push(package);
            } else {
                debug!(name = %package.name, file = %path.display(), "duplicate package name, first occurrence wins");
            }
        }
    }
    Ok(merged)
}

/// Load the catalog, triggering a one-shot refresh if no manifest shards are
/// found. A second empty result after refresh is returned as-is, without
/// further retries.
pub fn load(config: &Config, refresh: &dyn RefreshCapability) -> Result<Vec<Package>> {
    let packages_dir = config.packages_dir();
    let mut catalog = scan_and_merge(&packages_dir)?;

    if catalog.is_empty() {
        info!("catalog empty, triggering refresh");
        refresh.refresh(&config.workspace_root)?;
        catalog = scan_and_merge(&packages_dir)?;
        if catalog.is_empty() {
            warn!("catalog still empty after refresh");
        }
    }

    Ok(catalog)
}
