//! Deterministic Debian naming for distribution packages.
//!
//! A package `roscpp` at full version `1.9.41-0` in distribution `groovy` targeting
//! the `quantal` platform maps to:
//!
//! | What | Value |
//! |------|-------|
//! | artifact name | `ros-groovy-roscpp` |
//! | installed version | `1.9.41-0quantal` |
//! | packaging tag | `debian/ros-groovy-roscpp_1.9.41-0_quantal` |
//! | artifact prefix | `ros-groovy-roscpp_1.9.41-0` |

use serde::{Deserialize, Serialize};

/// Naming rules for one distribution / target platform pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebianNaming {
    /// Distribution identifier (e.g. `groovy`).
    pub distro: String,
    /// Target platform codename appended to versions (e.g. `quantal`).
    pub platform: String,
}

impl DebianNaming {
    pub fn new(distro: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            distro: distro.into(),
            platform: platform.into(),
        }
    }

    /// Canonical artifact name for a package.
    #[must_use]
    pub fn artifact_name(&self, package: &str) -> String {
        format!("ros-{}-{}", self.distro, package.replace('_', "-"))
    }

    /// The version string the installed-package index reports once the artifact
    /// built from `full_version` is installed.
    #[must_use]
    pub fn installed_version(&self, full_version: &str) -> String {
        format!("{full_version}{}", self.platform)
    }

    /// Tag holding the Debian packaging metadata for a release.
    #[must_use]
    pub fn packaging_tag(&self, package: &str, full_version: &str) -> String {
        format!("debian/{}_{}_{}", self.artifact_name(package), full_version, self.platform)
    }

    /// File name prefix of the artifact produced by the toolchain.
    #[must_use]
    pub fn artifact_prefix(&self, package: &str, full_version: &str) -> String {
        format!("{}_{}", self.artifact_name(package), full_version)
    }
}
