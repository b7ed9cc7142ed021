//! Persistent metadata cache.
//!
//! Raw descriptors are stored in a JSON object keyed by `"name:version"`. The file
//! is loaded once when the cache is constructed and rewritten after every insert.
//! A missing or unreadable file starts an empty cache; entries never expire.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::utils::atomic_write;

/// Key/value store of raw descriptors.
#[derive(Debug)]
pub struct MetadataCache {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MetadataCache {
    /// Load the cache file at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                tracing::warn!(target: "fetch", "Ignoring corrupt metadata cache {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(target: "fetch", "Failed to load metadata cache from {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        tracing::debug!(target: "fetch", "Loaded {} cached descriptors from {}", entries.len(), path.display());

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// A cache that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn key(name: &str, version: &str) -> String {
        format!("{name}:{version}")
    }

    pub async fn get(&self, name: &str, version: &str) -> Option<String> {
        self.entries.lock().await.get(&Self::key(name, version)).cloned()
    }

    /// Store `raw` and flush the whole cache to disk.
    pub async fn put(&self, name: &str, version: &str, raw: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(Self::key(name, version), raw.to_string());
        if let Some(path) = &self.path {
            persist(path, &entries)?;
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let data = serde_json::to_vec_pretty(entries).context("Failed to serialize metadata cache")?;
    atomic_write(path, &data)
        .with_context(|| format!("Failed to write metadata cache {}", path.display()))
}
