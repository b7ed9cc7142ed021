//! In-memory [`PackageSource`] for resolver and builder tests.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::fixtures::package_xml;
use crate::core::DebforgeError;
use crate::metadata::{CheckoutDescriptor, PackageMetadata, PackageSource, parse_package_xml};

#[derive(Debug, Clone)]
enum Descriptor {
    Xml(String),
    Unreachable,
}

#[derive(Debug, Clone)]
struct MockPackage {
    full_version: String,
    descriptor: Descriptor,
}

/// A package universe defined in code.
///
/// Every package gets the checkout URL `file:///mock/<name>-release` and the full
/// version `1.0.0-0` unless overridden.
#[derive(Debug, Default)]
pub struct MockSource {
    packages: BTreeMap<String, MockPackage>,
    requests: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package depending on `deps`.
    pub fn package(mut self, name: &str, deps: &[&str]) -> Self {
        self.packages.insert(
            name.to_string(),
            MockPackage {
                full_version: "1.0.0-0".to_string(),
                descriptor: Descriptor::Xml(package_xml(name, "1.0.0", deps, &[])),
            },
        );
        self
    }

    /// Add a package whose descriptor does not parse.
    pub fn invalid(mut self, name: &str) -> Self {
        self.packages.insert(
            name.to_string(),
            MockPackage {
                full_version: "1.0.0-0".to_string(),
                descriptor: Descriptor::Xml("<package><version>1.0.0".to_string()),
            },
        );
        self
    }

    /// Add a package whose descriptor cannot be fetched.
    pub fn unreachable(mut self, name: &str) -> Self {
        self.packages.insert(
            name.to_string(),
            MockPackage {
                full_version: "1.0.0-0".to_string(),
                descriptor: Descriptor::Unreachable,
            },
        );
        self
    }

    /// Override the full version label of an already added package.
    pub fn version(mut self, name: &str, full_version: &str) -> Self {
        if let Some(package) = self.packages.get_mut(name) {
            package.full_version = full_version.to_string();
        }
        self
    }

    /// Names passed to `get_package`, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PackageSource for MockSource {
    fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    fn descriptor(&self, name: &str) -> Result<CheckoutDescriptor> {
        let package = self.packages.get(name).ok_or_else(|| DebforgeError::PackageNotFound {
            name: name.to_string(),
            suggestion: None,
        })?;
        let short_version = package
            .full_version
            .rsplit_once('-')
            .map_or(package.full_version.as_str(), |(short, _)| short)
            .to_string();
        Ok(CheckoutDescriptor {
            url: format!("file:///mock/{name}-release"),
            short_version,
            full_version: package.full_version.clone(),
        })
    }

    async fn get_package(&self, name: &str) -> Result<PackageMetadata> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(name.to_string());
        }
        let package = self.packages.get(name).ok_or_else(|| DebforgeError::PackageNotFound {
            name: name.to_string(),
            suggestion: None,
        })?;
        match &package.descriptor {
            Descriptor::Xml(xml) => parse_package_xml(name, xml),
            Descriptor::Unreachable => Err(DebforgeError::FetchError {
                package: name.to_string(),
                revisions: vec![package.full_version.clone()],
                reason: "unreachable".to_string(),
            }
            .into()),
        }
    }
}
