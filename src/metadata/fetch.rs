//! Live descriptor retrieval.
//!
//! [`RemoteFetcher`] first tries the hosting service's raw-file endpoint when the
//! repository URL matches a configured [`RawHost`], then falls back to exporting
//! the descriptor from the repository with git. Repeated fetches against the same
//! repository URL within a run are spaced by the configured politeness delay.

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::{BuildConfig, RawHost};
use crate::git::{parse_git_url, read_file_at_revision};

/// Retrieves the raw descriptor of a package at a version label.
pub trait DescriptorFetcher {
    fn fetch(&self, package: &str, url: &str, version: &str) -> impl Future<Output = Result<String>>;
}

/// Fetches descriptors over HTTP and git.
pub struct RemoteFetcher {
    client: reqwest::Client,
    raw_hosts: Vec<RawHost>,
    descriptor_path: String,
    descriptor_ref: String,
    delay: Duration,
    fetched_urls: Mutex<HashSet<String>>,
}

impl RemoteFetcher {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            raw_hosts: config.raw_hosts.clone(),
            descriptor_path: config.descriptor_path.clone(),
            descriptor_ref: config.descriptor_ref.clone(),
            delay: Duration::from_millis(config.fetch_delay_ms),
            fetched_urls: Mutex::new(HashSet::new()),
        }
    }

    /// Raw-file URL of the descriptor at `revision`, if `url` is on a known host.
    #[must_use]
    pub fn raw_url(&self, url: &str, revision: &str) -> Option<String> {
        let host = self.raw_hosts.iter().find(|host| url.starts_with(&host.prefix))?;
        let (owner, repo) = parse_git_url(url).ok()?;
        Some(
            host.template
                .replace("{owner}", &owner)
                .replace("{repo}", &repo)
                .replace("{rev}", revision)
                .replace("{path}", &self.descriptor_path),
        )
    }

    fn revision(&self, package: &str, version: &str) -> String {
        self.descriptor_ref.replace("{version}", version).replace("{package}", package)
    }

    async fn throttle(&self, url: &str) {
        let first = self.fetched_urls.lock().await.insert(url.to_string());
        if !first && !self.delay.is_zero() {
            tracing::debug!(target: "fetch", "Waiting {:?} before fetching from {url} again", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String> {
        let response = self.client.get(raw_url).send().await?;
        if !response.status().is_success() {
            bail!("HTTP {} for {raw_url}", response.status());
        }
        Ok(response.text().await?)
    }
}

impl DescriptorFetcher for RemoteFetcher {
    async fn fetch(&self, package: &str, url: &str, version: &str) -> Result<String> {
        self.throttle(url).await;
        let revision = self.revision(package, version);

        if let Some(raw_url) = self.raw_url(url, &revision) {
            tracing::debug!(target: "fetch", "Fetching {package} from {raw_url}");
            match self.fetch_raw(&raw_url).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    tracing::debug!(target: "fetch", "Raw fetch of {package} failed, exporting with git: {e}");
                }
            }
        }

        tracing::debug!(target: "fetch", "Exporting {} of {package} from {url} at {revision}", self.descriptor_path);
        read_file_at_revision(url, &revision, &self.descriptor_path).await
    }
}
