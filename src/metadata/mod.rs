//! Package metadata: descriptors, their cache and their retrieval.
//!
//! - [`parse`] - `package.xml` parsing into [`PackageMetadata`]
//! - [`cache`] - the persistent `"name:version"` → raw descriptor store
//! - [`fetch`] - live retrieval over raw HTTP with a version-control fallback
//! - [`provider`] - [`MetadataProvider`], combining index, cache and fetcher behind
//!   the [`PackageSource`] trait consumed by the resolver and the builder

pub mod cache;
pub mod fetch;
pub mod parse;
pub mod provider;

pub use cache::MetadataCache;
pub use fetch::{DescriptorFetcher, RemoteFetcher};
pub use parse::parse_package_xml;
pub use provider::{MetadataProvider, PackageSource};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::PackageName;

/// Where a package's sources live and which revision is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDescriptor {
    /// Release repository URL.
    pub url: String,
    /// Upstream version label; names an annotated tag when the release has one.
    pub short_version: String,
    /// Full version label, used as a ref when no tag matches the short one.
    pub full_version: String,
}

impl CheckoutDescriptor {
    /// Version labels to try when fetching a descriptor, full label first.
    #[must_use]
    pub fn fetch_labels(&self) -> Vec<&str> {
        if self.full_version == self.short_version {
            vec![self.full_version.as_str()]
        } else {
            vec![self.full_version.as_str(), self.short_version.as_str()]
        }
    }
}

/// Declared name and dependencies of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: PackageName,
    pub version: Option<String>,
    pub buildtool_depends: BTreeSet<PackageName>,
    pub build_depends: BTreeSet<PackageName>,
    pub run_depends: BTreeSet<PackageName>,
}

impl PackageMetadata {
    /// Union of build-tool, build and run dependencies.
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<PackageName> {
        self.buildtool_depends
            .iter()
            .chain(&self.build_depends)
            .chain(&self.run_depends)
            .cloned()
            .collect()
    }
}
