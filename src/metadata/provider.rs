//! The metadata provider consumed by the resolver and the builder.
//!
//! Descriptors are looked up in this order, stopping at the first hit:
//!
//! 1. the descriptor inlined in the distribution index
//! 2. the cache, by short version label and then by full version label
//! 3. a live fetch at the full version label, then at the short one
//!
//! A live fetch is written to the cache under the full version label.

use anyhow::Result;
use std::future::Future;

use super::{CheckoutDescriptor, DescriptorFetcher, MetadataCache, PackageMetadata, RemoteFetcher};
use crate::config::BuildConfig;
use crate::core::DebforgeError;
use crate::distro::DistributionIndex;
use crate::metadata::parse_package_xml;

/// The known-package universe and its metadata.
pub trait PackageSource {
    /// Whether `name` belongs to the universe.
    fn contains(&self, name: &str) -> bool;

    /// Closest known name to an unknown `name`.
    fn suggest(&self, _name: &str) -> Option<String> {
        None
    }

    /// Repository and version labels of `name`.
    fn descriptor(&self, name: &str) -> Result<CheckoutDescriptor>;

    /// Parsed metadata of `name`.
    ///
    /// Fails with [`DebforgeError::FetchError`] when the descriptor cannot be
    /// retrieved and [`DebforgeError::InvalidPackage`] when it cannot be parsed.
    fn get_package(&self, name: &str) -> impl Future<Output = Result<PackageMetadata>>;
}

pub struct MetadataProvider<F = RemoteFetcher> {
    index: DistributionIndex,
    cache: MetadataCache,
    fetcher: F,
    use_cache: bool,
}

impl MetadataProvider<RemoteFetcher> {
    /// Provider over `index` backed by the configured cache file.
    pub fn from_config(index: DistributionIndex, config: &BuildConfig, use_cache: bool) -> Result<Self> {
        let cache = MetadataCache::load(config.cache_file()?);
        Ok(Self::new(index, cache, RemoteFetcher::new(config), use_cache))
    }
}

impl<F: DescriptorFetcher> MetadataProvider<F> {
    /// With `use_cache` unset cache reads are skipped; fetches are still stored.
    pub fn new(index: DistributionIndex, cache: MetadataCache, fetcher: F, use_cache: bool) -> Self {
        Self {
            index,
            cache,
            fetcher,
            use_cache,
        }
    }

    pub fn index(&self) -> &DistributionIndex {
        &self.index
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Raw descriptor of `name`.
    pub async fn raw_descriptor(&self, name: &str) -> Result<String> {
        let entry = self.index.require(name)?;
        if let Some(inline) = &entry.package_xml {
            return Ok(inline.clone());
        }

        let descriptor = self.index.checkout_descriptor(name)?;

        if self.use_cache {
            for label in [&descriptor.short_version, &descriptor.full_version] {
                if let Some(raw) = self.cache.get(name, label).await {
                    tracing::debug!(target: "fetch", "Cache hit for {name}:{label}");
                    return Ok(raw);
                }
            }
        }

        let labels = descriptor.fetch_labels();
        let mut last_error = None;
        for label in &labels {
            match self.fetcher.fetch(name, &descriptor.url, label).await {
                Ok(raw) => {
                    if let Err(e) = self.cache.put(name, &descriptor.full_version, &raw).await {
                        tracing::warn!(target: "fetch", "Failed to cache descriptor of {name}: {e:#}");
                    }
                    return Ok(raw);
                }
                Err(e) => {
                    tracing::debug!(target: "fetch", "Fetching {name} at {label} failed: {e:#}");
                    last_error = Some(e);
                }
            }
        }

        Err(DebforgeError::FetchError {
            package: name.to_string(),
            revisions: labels.iter().map(|l| (*l).to_string()).collect(),
            reason: last_error.map(|e| format!("{e:#}")).unwrap_or_default(),
        }
        .into())
    }
}

impl<F: DescriptorFetcher> PackageSource for MetadataProvider<F> {
    fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    fn suggest(&self, name: &str) -> Option<String> {
        self.index.suggest(name)
    }

    fn descriptor(&self, name: &str) -> Result<CheckoutDescriptor> {
        self.index.checkout_descriptor(name)
    }

    async fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        let raw = self.raw_descriptor(name).await?;
        parse_package_xml(name, &raw)
    }
}
