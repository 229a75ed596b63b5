use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use sha2::{Digest, Sha256};

use super::clean::clean;
use super::loader::{self, Format};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Where a dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A file on disk (the default dataset or one opened from the menu).
    Path(PathBuf),
    /// Bytes handed over by an upload; `name` only selects the format.
    Upload { name: String, bytes: Arc<[u8]> },
}

impl DataSource {
    pub fn upload(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        DataSource::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Identity used as the cache key.
    pub fn id(&self) -> SourceId {
        match self {
            DataSource::Path(p) => SourceId::Path(p.clone()),
            DataSource::Upload { name, bytes } => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                SourceId::Content {
                    format: Format::for_upload(name),
                    digest: format!("{:x}", hasher.finalize()),
                }
            }
        }
    }

    /// Load and clean.
    fn load(&self) -> Result<Dataset> {
        let raw = match self {
            DataSource::Path(p) => loader::load_file(p)?,
            DataSource::Upload { name, bytes } => loader::load_bytes(name, bytes)?,
        };
        Ok(clean(&raw))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Upload { name, bytes } => write!(f, "{name} ({} bytes)", bytes.len()),
        }
    }
}

/// Cache key: a file path, or the SHA-256 of uploaded content together
/// with the format it is parsed as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    Path(PathBuf),
    Content { format: Format, digest: String },
}

// ---------------------------------------------------------------------------
// Session cache
// ---------------------------------------------------------------------------

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Datasets discarded because another source was loaded.
    pub replacements: u64,
}

/// Holds the cleaned dataset of the current session, keyed by source.
///
/// Only one dataset is kept: loading a different source replaces it.
#[derive(Debug, Default)]
pub struct SessionCache {
    entry: Option<(SourceId, Arc<Dataset>)>,
    stats: CacheStats,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaned dataset for `source`, loading it on a miss.
    ///
    /// A failed load leaves the previous entry untouched.
    pub fn get_or_load(&mut self, source: &DataSource) -> Result<Arc<Dataset>> {
        let id = source.id();
        if let Some((cached_id, dataset)) = &self.entry {
            if *cached_id == id {
                self.stats.hits += 1;
                log::debug!("cache hit for {source}");
                return Ok(Arc::clone(dataset));
            }
        }

        self.stats.misses += 1;
        let dataset = Arc::new(source.load()?);
        log::info!(
            "loaded {} records with {} columns from {source}",
            dataset.len(),
            dataset.columns.len()
        );

        if self.entry.replace((id, Arc::clone(&dataset))).is_some() {
            self.stats.replacements += 1;
        }
        Ok(dataset)
    }

    /// The currently cached dataset, if any.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.entry.as_ref().map(|(_, ds)| Arc::clone(ds))
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Age,Gender,Self_Reported_Addiction_Level,Sleep_Hours\n\
                       25,Female,Low,7\n\
                       31,Male,High,-1\n";

    #[test]
    fn same_upload_hits_cache() {
        let mut cache = SessionCache::new();
        let src = DataSource::upload("a.csv", CSV.as_bytes().to_vec());

        let first = cache.get_or_load(&src).unwrap();
        let again = cache
            .get_or_load(&DataSource::upload("renamed.csv", CSV.as_bytes().to_vec()))
            .unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, replacements: 0 });
        assert_eq!(first.records[1].number("Sleep_Hours"), Some(0.0));
    }

    #[test]
    fn new_upload_replaces_previous_dataset() {
        let mut cache = SessionCache::new();
        cache
            .get_or_load(&DataSource::upload("a.csv", CSV.as_bytes().to_vec()))
            .unwrap();

        let other = format!("{CSV}40,Female,Severe,5\n");
        let ds = cache
            .get_or_load(&DataSource::upload("b.csv", other.into_bytes()))
            .unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(cache.current().unwrap().len(), 3);
        assert_eq!(cache.stats().replacements, 1);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut cache = SessionCache::new();
        cache
            .get_or_load(&DataSource::upload("a.csv", CSV.as_bytes().to_vec()))
            .unwrap();

        let missing = DataSource::Path(PathBuf::from("/nonexistent/mobile_addiction_data.csv"));
        assert!(cache.get_or_load(&missing).is_err());
        assert_eq!(cache.current().unwrap().len(), 2);
    }

    #[test]
    fn same_bytes_under_another_format_reload() {
        let json = r#"[{"Age": 22, "Gender": "Male", "Self_Reported_Addiction_Level": "High"}]"#;
        let mut cache = SessionCache::new();

        let as_csv = cache.get_or_load(&DataSource::upload("a.csv", json.as_bytes().to_vec()));
        assert!(as_csv.map_or(true, |ds| ds.is_empty()));

        let as_json = cache
            .get_or_load(&DataSource::upload("a.json", json.as_bytes().to_vec()))
            .unwrap();
        assert_eq!(as_json.len(), 1);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn path_sources_are_keyed_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = SessionCache::new();
        let src = DataSource::Path(path.clone());
        cache.get_or_load(&src).unwrap();
        cache.get_or_load(&src).unwrap();
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(src.id(), SourceId::Path(path));
    }
}
