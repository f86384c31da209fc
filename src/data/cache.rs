use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DataSourceError;
use super::loader::load_file;
use super::model::SalesDataset;
use crate::config::SourceConfig;

/// Keeps the last loaded dataset so filter changes don't re-read the file.
/// Keyed on the source path and the [`SourceConfig`] it was read with, so a
/// different sheet, header offset or column mapping reloads.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    source: SourceConfig,
    dataset: Arc<SalesDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path` read with `source`, loading it
    /// on a miss. A failed load leaves the cache empty.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        source: &SourceConfig,
    ) -> Result<Arc<SalesDataset>, DataSourceError> {
        if let Some(entry) = &self.entry {
            if entry.path == path && entry.source == *source {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        self.entry = None;
        let dataset = Arc::new(load_file(path, source)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            source: source.clone(),
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    pub fn cached_path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|e| e.path.as_path())
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
