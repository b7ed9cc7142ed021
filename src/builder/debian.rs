//! Debian implementations of [`Toolchain`] and [`PackageIndex`].
//!
//! [`Debuild`] drives `debuild` and `dpkg-checkbuilddeps` in a checkout;
//! [`AptIndex`] queries `dpkg-query` and installs with `apt-get` and `dpkg`.

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::toolchain::{CommandOutput, PackageIndex, Toolchain};
use crate::core::DebforgeError;

const UNMET_MARKER: &str = "Unmet build dependencies:";

/// `debuild` based toolchain.
#[derive(Debug, Clone, Default)]
pub struct Debuild;

impl Toolchain for Debuild {
    async fn missing_build_dependencies(&self, dir: &Path) -> Result<Vec<String>> {
        let result = run(Command::new("dpkg-checkbuilddeps"), Some(dir)).await?;
        if result.success {
            return Ok(Vec::new());
        }
        let missing = parse_unmet_build_dependencies(&result.output);
        if missing.is_empty() {
            anyhow::bail!("dpkg-checkbuilddeps failed: {}", result.output.trim());
        }
        Ok(missing)
    }

    async fn clean(&self, dir: &Path) -> Result<CommandOutput> {
        let mut cmd = Command::new("debuild");
        cmd.arg("clean");
        run(cmd, Some(dir)).await
    }

    async fn build(&self, dir: &Path) -> Result<CommandOutput> {
        let mut cmd = Command::new("debuild");
        cmd.arg("binary");
        run(cmd, Some(dir)).await
    }
}

/// dpkg/apt backed package index.
#[derive(Debug, Clone)]
pub struct AptIndex {
    use_sudo: bool,
}

impl AptIndex {
    pub fn new(use_sudo: bool) -> Self {
        Self {
            use_sudo,
        }
    }

    fn privileged(&self, program: &str) -> Command {
        if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(program);
            cmd
        } else {
            Command::new(program)
        }
    }
}

impl PackageIndex for AptIndex {
    async fn installed_version(&self, name: &str) -> Result<Option<String>> {
        let mut cmd = Command::new("dpkg-query");
        cmd.args(["-W", "-f=${Status}\t${Version}", name]);
        let result = run(cmd, None).await?;
        if !result.success {
            return Ok(None);
        }
        Ok(parse_dpkg_status(&result.output))
    }

    async fn install_packages(&self, names: &[String]) -> Result<CommandOutput> {
        if names.is_empty() {
            return Ok(CommandOutput::ok());
        }
        let mut cmd = self.privileged("apt-get");
        cmd.args(["-y", "install"]).args(names);
        run(cmd, None).await
    }

    async fn artifact_dependencies(&self, artifact: &Path) -> Result<Vec<String>> {
        let mut cmd = Command::new("dpkg-deb");
        cmd.arg("-f").arg(artifact).arg("Depends");
        let result = run(cmd, None).await?;
        if !result.success {
            anyhow::bail!("dpkg-deb could not read {}: {}", artifact.display(), result.output.trim());
        }
        Ok(parse_depends_field(&result.output))
    }

    async fn install_artifact(&self, artifact: &Path) -> Result<CommandOutput> {
        let mut cmd = self.privileged("dpkg");
        cmd.arg("-i").arg(artifact);
        run(cmd, None).await
    }
}

/// Run `cmd` to completion, capturing stdout and stderr.
async fn run(mut cmd: Command, dir: Option<&Path>) -> Result<CommandOutput> {
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null());

    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    tracing::debug!(target: "toolchain", "Running {:?}", cmd.as_std());

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::from(DebforgeError::ToolNotFound {
                tool: program.clone(),
            })
        } else {
            anyhow::Error::from(e).context(format!("Failed to run {program}"))
        }
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        tracing::debug!(target: "toolchain", "{program} exited with {}", output.status);
    }

    Ok(CommandOutput {
        success: output.status.success(),
        output: combined,
    })
}

/// Drop version constraints, architecture lists and build profiles.
fn strip_constraints(text: &str) -> String {
    match Regex::new(r"\([^)]*\)|\[[^\]]*\]|<[^>]*>") {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Package name without an architecture qualifier.
fn package_name(token: &str) -> Option<String> {
    let name = token.trim().split(':').next()?.trim();
    (!name.is_empty() && !name.contains('|')).then(|| name.to_string())
}

/// Parse the package list of a `dpkg-checkbuilddeps` failure.
///
/// Version constraints are dropped and only the first of several alternatives
/// is kept.
pub fn parse_unmet_build_dependencies(output: &str) -> Vec<String> {
    let Some(line) = output.lines().find(|line| line.contains(UNMET_MARKER)) else {
        return Vec::new();
    };
    let Some((_, list)) = line.split_once(UNMET_MARKER) else {
        return Vec::new();
    };

    let stripped = strip_constraints(list);
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    let mut missing = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Some(name) = package_name(tokens[i]) {
            missing.push(name);
        }
        i += 1;
        // Skip the alternatives, including a dangling trailing `|`
        while i < tokens.len() && tokens[i] == "|" {
            i += 2;
        }
    }
    missing
}

/// Parse a `Depends` control field.
pub fn parse_depends_field(field: &str) -> Vec<String> {
    strip_constraints(field)
        .split(',')
        .filter_map(|group| group.split('|').next().and_then(package_name))
        .collect()
}

/// Installed version from `${Status}\t${Version}`.
fn parse_dpkg_status(output: &str) -> Option<String> {
    let (status, version) = output.trim().split_once('\t')?;
    if status.ends_with(" installed") && !version.trim().is_empty() {
        Some(version.trim().to_string())
    } else {
        None
    }
}
