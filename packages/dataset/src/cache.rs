//! Time-limited in-memory cache of the parsed dataset.
//!
//! The dataset is loaded on first use and shared as an [`Arc`] until it is
//! older than the configured TTL, at which point the next caller reloads it
//! from disk. A failed load leaves the cache empty so the following call
//! retries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crime_watch_config::DashboardConfig;

use crate::{Dataset, DatasetError, load_csv};

struct CachedDataset {
    loaded_at: Instant,
    dataset: Arc<Dataset>,
}

/// Shared, lazily reloaded dataset.
pub struct DatasetCache {
    path: PathBuf,
    ttl: Duration,
    /// Held while loading, so concurrent callers trigger a single reload.
    state: Mutex<Option<CachedDataset>>,
}

impl DatasetCache {
    /// Creates an empty cache for the CSV at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Creates a cache using the configured data path and TTL.
    #[must_use]
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.data_path.clone(), config.cache_ttl())
    }

    /// Path of the backing CSV.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached dataset, reloading it if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if a reload is needed and fails.
    pub fn get(&self) -> Result<Arc<Dataset>, DatasetError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = state.as_ref()
            && cached.loaded_at.elapsed() < self.ttl
        {
            return Ok(Arc::clone(&cached.dataset));
        }

        *state = None;
        log::debug!("Dataset cache miss, loading {}", self.path.display());

        let dataset = Arc::new(load_csv(&self.path)?);
        *state = Some(CachedDataset {
            loaded_at: Instant::now(),
            dataset: Arc::clone(&dataset),
        });

        Ok(dataset)
    }

    /// Drops the cached dataset so the next [`Self::get`] reloads it.
    pub fn invalidate(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
