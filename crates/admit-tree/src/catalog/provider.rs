use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::CatalogError;

/// Source of the newest catalog document.
///
/// Passed into the recommendation service at construction so callers decide where
/// the catalog lives; there is no process-wide connection.
pub trait CatalogProvider: Send + Sync {
    fn latest_document(&self) -> Result<Value, CatalogError>;
}

/// Fixed in-memory document.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    document: Value,
}

impl InMemoryCatalog {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn latest_document(&self) -> Result<Value, CatalogError> {
        ensure_populated(self.document.clone(), "in-memory catalog")
    }
}

/// Catalog snapshots exported as JSON files.
///
/// `path` may name a single snapshot or a directory of `*.json` snapshots, in which
/// case the one with the greatest file name is the newest.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn newest_snapshot(&self) -> Result<PathBuf, CatalogError> {
        let metadata = fs::metadata(&self.path).map_err(|err| io_error(&self.path, err))?;
        if !metadata.is_dir() {
            return Ok(self.path.clone());
        }

        let mut newest: Option<PathBuf> = None;
        for entry in fs::read_dir(&self.path).map_err(|err| io_error(&self.path, err))? {
            let candidate = entry.map_err(|err| io_error(&self.path, err))?.path();
            let is_json = candidate
                .extension()
                .map_or(false, |extension| extension.eq_ignore_ascii_case("json"));
            if !is_json || !candidate.is_file() {
                continue;
            }
            if newest
                .as_ref()
                .map_or(true, |current| candidate.file_name() > current.file_name())
            {
                newest = Some(candidate);
            }
        }

        newest.ok_or_else(|| {
            CatalogError::Empty(format!("no *.json snapshots in {}", self.path.display()))
        })
    }
}

impl CatalogProvider for JsonFileCatalog {
    fn latest_document(&self) -> Result<Value, CatalogError> {
        let snapshot = self.newest_snapshot()?;
        debug!(snapshot = %snapshot.display(), "loading catalog snapshot");

        let raw = fs::read_to_string(&snapshot).map_err(|err| io_error(&snapshot, err))?;
        let document: Value = serde_json::from_str(&raw).map_err(|err| {
            CatalogError::Malformed(format!("{}: {}", snapshot.display(), err))
        })?;

        ensure_populated(document, &snapshot.display().to_string())
    }
}

fn ensure_populated(document: Value, origin: &str) -> Result<Value, CatalogError> {
    match &document {
        Value::Null => Err(CatalogError::Empty(format!("{origin} holds no document"))),
        Value::Object(entries) if entries.is_empty() => {
            Err(CatalogError::Empty(format!("{origin} holds an empty document")))
        }
        _ => Ok(document),
    }
}

fn io_error(path: &Path, err: io::Error) -> CatalogError {
    let detail = format!("{}: {}", path.display(), err);
    match err.kind() {
        io::ErrorKind::PermissionDenied => CatalogError::Unauthorized(detail),
        _ => CatalogError::Unreachable(detail),
    }
}
