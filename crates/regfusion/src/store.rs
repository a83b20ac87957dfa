//! Mapping table lookup and caching.
//!
//! Tables are addressed by [`MappingKey`] and resolved to files inside the
//! mapping directory. Loaded tables are immutable and handed out behind an
//! `Arc`, so a cached table can be shared by concurrent projections.

use lru::LruCache;
use nalgebra::Matrix3xX;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use neuro_io::read_mapping_table;
use regfusion_common::{MappingFamily, MappingKey};

use crate::config::RegFusionConfig;
use crate::error::{RegFusionError, Result};

/// World-space coordinates for every vertex of one hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingTable {
    key: MappingKey,
    path: PathBuf,
    coords: Matrix3xX<f64>,
}

impl MappingTable {
    /// Build a table from coordinates already in memory.
    pub fn new(key: MappingKey, path: impl Into<PathBuf>, coords: Matrix3xX<f64>) -> Self {
        Self {
            key,
            path: path.into(),
            coords,
        }
    }

    pub fn key(&self) -> MappingKey {
        self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `3 × vertices` world coordinates.
    pub fn coords(&self) -> &Matrix3xX<f64> {
        &self.coords
    }

    pub fn num_vertices(&self) -> usize {
        self.coords.ncols()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from memory.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Loads mapping tables from a directory, keeping recently used ones.
pub struct MappingStore {
    dir: PathBuf,
    vertex_count: usize,
    cache: Option<Mutex<LruCache<MappingKey, Arc<MappingTable>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MappingStore {
    /// `cache_entries == 0` disables caching.
    pub fn new(dir: impl Into<PathBuf>, vertex_count: usize, cache_entries: usize) -> Self {
        Self {
            dir: dir.into(),
            vertex_count,
            cache: NonZeroUsize::new(cache_entries).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RegFusionConfig) -> Self {
        Self::new(
            config.mapping_dir.clone(),
            config.vertex_count,
            config.mapping_cache_entries,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// File a table is read from.
    pub fn table_path(&self, key: MappingKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load one table, checking its vertex count.
    pub fn load(&self, key: MappingKey) -> Result<Arc<MappingTable>> {
        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(table) = cache.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "Mapping cache hit");
                return Ok(Arc::clone(table));
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let path = self.table_path(key);
        let coords = read_mapping_table(&path)?;
        if coords.ncols() != self.vertex_count {
            return Err(RegFusionError::VertexCount {
                path,
                expected: self.vertex_count,
                actual: coords.ncols(),
            });
        }

        info!(%key, path = %path.display(), vertices = coords.ncols(), "Loaded mapping table");
        let table = Arc::new(MappingTable::new(key, path, coords));

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.put(key, Arc::clone(&table));
        }
        Ok(table)
    }

    /// Load both hemisphere tables of a family, left first. Both are checked
    /// against the same vertex count, so they always line up.
    pub fn load_pair(&self, family: MappingFamily) -> Result<(Arc<MappingTable>, Arc<MappingTable>)> {
        let [lh_key, rh_key] = MappingKey::pair(family);
        Ok((self.load(lh_key)?, self.load(rh_key)?))
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self
            .cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
        }
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }
}
