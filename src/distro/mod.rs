//! Distribution index: the known-package universe.
//!
//! The index is a YAML document, read from a local path or an http(s) URL, that
//! maps every package of a distribution to the release repository and version it
//! is built from:
//!
//! ```yaml
//! name: groovy
//! platform: quantal
//! packages:
//!   roscpp:
//!     url: https://github.com/ros-gbp/ros_comm-release.git
//!     version: 1.9.41-0
//!     short_version: 1.9.41
//! ```
//!
//! `short_version` defaults to the full version up to its last `-`. An entry may
//! carry its descriptor inline under `package_xml`, which is preferred over any
//! fetch.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::DebforgeError;
use crate::metadata::CheckoutDescriptor;

/// One package of the distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Release repository URL.
    pub url: String,

    /// Full (resolved) version label, e.g. `1.9.41-0`.
    pub version: String,

    /// Upstream version label, e.g. `1.9.41`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_version: Option<String>,

    /// Inline package descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_xml: Option<String>,
}

impl IndexEntry {
    /// The upstream version label, derived from the full label when not given.
    #[must_use]
    pub fn short_version(&self) -> &str {
        match &self.short_version {
            Some(short) => short,
            None => self.version.rsplit_once('-').map_or(self.version.as_str(), |(short, _)| short),
        }
    }
}

/// The packages of one distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionIndex {
    #[serde(default)]
    pub name: String,

    /// Target platform codename; overrides the configured one when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default)]
    pub packages: BTreeMap<String, IndexEntry>,
}

impl DistributionIndex {
    /// Load an index from a local path or an http(s) URL.
    pub async fn load(location: &str) -> Result<Self> {
        let content = if location.starts_with("http://") || location.starts_with("https://") {
            fetch_remote(location).await?
        } else {
            let path = crate::utils::resolve_path(location)?;
            read_local(&path).await?
        };
        Self::from_yaml(location, &content)
    }

    pub fn from_yaml(location: &str, content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            DebforgeError::IndexError {
                location: location.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&IndexEntry> {
        self.packages.get(name)
    }

    /// Entry for `name`, or [`DebforgeError::PackageNotFound`] with a suggestion.
    pub fn require(&self, name: &str) -> Result<&IndexEntry> {
        self.packages.get(name).ok_or_else(|| {
            DebforgeError::PackageNotFound {
                name: name.to_string(),
                suggestion: self.suggest(name),
            }
            .into()
        })
    }

    /// Repository and version labels needed to fetch `name`.
    pub fn checkout_descriptor(&self, name: &str) -> Result<CheckoutDescriptor> {
        let entry = self.require(name)?;
        Ok(CheckoutDescriptor {
            url: entry.url.clone(),
            short_version: entry.short_version().to_string(),
            full_version: entry.version.clone(),
        })
    }

    /// Closest known package name, if any is reasonably close.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.packages
            .keys()
            .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
            .filter(|(_, score)| *score >= 0.85)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}

async fn read_local(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        DebforgeError::IndexError {
            location: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

async fn fetch_remote(url: &str) -> Result<String> {
    tracing::debug!(target: "fetch", "Downloading distribution index from {url}");
    let index_error = |reason: String| DebforgeError::IndexError {
        location: url.to_string(),
        reason,
    };

    let response = reqwest::get(url).await.map_err(|e| index_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(index_error(format!("HTTP {}", response.status())).into());
    }
    Ok(response.text().await.map_err(|e| index_error(e.to_string()))?)
}
