//! Error handling for debforge
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** so callers can tell a recoverable condition from a
//!    fatal one (a malformed transitive dependency is skipped, a failed build is not)
//! 2. **User-friendly reports** naming the failing package, the failing stage and the
//!    captured diagnostic output
//!
//! # Error Categories
//!
//! - **Metadata**: [`DebforgeError::FetchError`], [`DebforgeError::InvalidPackage`],
//!   [`DebforgeError::PackageNotFound`], [`DebforgeError::IndexError`]
//! - **Ordering**: [`DebforgeError::CycleError`]
//! - **Checkout**: [`DebforgeError::CheckoutError`], [`DebforgeError::GitCommandError`],
//!   [`DebforgeError::GitNotFound`]
//! - **Build**: [`DebforgeError::BuildDependencyError`], [`DebforgeError::BuildError`],
//!   [`DebforgeError::ArtifactNotFound`], [`DebforgeError::InstallError`]
//!
//! Use [`user_friendly_error`] to convert any `anyhow::Error` into an [`ErrorContext`]
//! with a suggestion before printing it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use debforge::core::{DebforgeError, user_friendly_error};
//!
//! let error = DebforgeError::PackageNotFound {
//!     name: "roscpp".to_string(),
//!     suggestion: None,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// The toolchain or install step that failed; the other pipeline stages have
/// their own error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Clean,
    Build,
    ArtifactDependencies,
    Install,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "clean",
            Self::Build => "binary build",
            Self::ArtifactDependencies => "artifact dependencies",
            Self::Install => "install",
        };
        f.write_str(name)
    }
}

/// The main error type for debforge operations.
#[derive(Error, Debug, Clone)]
pub enum DebforgeError {
    /// Metadata or descriptor retrieval failed at every version label tried.
    #[error("Failed to fetch metadata for package '{package}' (tried: {})", .revisions.join(", "))]
    FetchError {
        package: String,
        revisions: Vec<String>,
        reason: String,
    },

    /// A descriptor was retrieved but could not be parsed.
    #[error("Invalid package descriptor for '{package}': {reason}")]
    InvalidPackage {
        package: String,
        reason: String,
    },

    #[error("Package '{name}' is not part of the distribution index")]
    PackageNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// The topological sort could not place every package.
    #[error("Circular dependencies exist among these packages:\n{}", format_residual(.residual))]
    CycleError {
        residual: BTreeMap<String, BTreeSet<String>>,
    },

    #[error("Could not check out '{package}' from {url} at '{revision}'")]
    CheckoutError {
        package: String,
        url: String,
        revision: String,
        reason: String,
    },

    #[error("Can't install build-dependencies of '{package}': {}", .missing.join(" "))]
    BuildDependencyError {
        package: String,
        missing: Vec<String>,
        output: String,
    },

    #[error("Error building '{package}' during {stage}")]
    BuildError {
        package: String,
        stage: BuildStage,
        output: String,
    },

    #[error("Can't find a built artifact for '{package}' matching {pattern}")]
    ArtifactNotFound {
        package: String,
        pattern: String,
    },

    #[error("Failed to install '{package}' during {stage}")]
    InstallError {
        package: String,
        stage: BuildStage,
        output: String,
    },

    #[error("Git operation failed: {operation}")]
    GitCommandError {
        operation: String,
        stderr: String,
    },

    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    #[error("Required tool '{tool}' is not installed or not found in PATH")]
    ToolNotFound {
        tool: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    #[error("Failed to load distribution index from {location}: {reason}")]
    IndexError {
        location: String,
        reason: String,
    },

    #[error("IO error: {message}")]
    IoError {
        message: String,
    },

    #[error("{message}")]
    Other {
        message: String,
    },
}

impl From<std::io::Error> for DebforgeError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            message: error.to_string(),
        }
    }
}

fn format_residual(residual: &BTreeMap<String, BTreeSet<String>>) -> String {
    residual
        .iter()
        .map(|(name, deps)| {
            let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
            format!("  {name} -> {{{}}}", deps.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl DebforgeError {
    /// Name of the package the error is attributed to, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::FetchError {
                package,
                ..
            }
            | Self::InvalidPackage {
                package,
                ..
            }
            | Self::CheckoutError {
                package,
                ..
            }
            | Self::BuildDependencyError {
                package,
                ..
            }
            | Self::BuildError {
                package,
                ..
            }
            | Self::ArtifactNotFound {
                package,
                ..
            }
            | Self::InstallError {
                package,
                ..
            } => Some(package),
            Self::PackageNotFound {
                name,
                ..
            } => Some(name),
            _ => None,
        }
    }
}

/// Error wrapper with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: DebforgeError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: DebforgeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion.
///
/// Typed [`DebforgeError`]s anywhere in the chain are recognized; everything
/// else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(err) = error.chain().find_map(|cause| cause.downcast_ref::<DebforgeError>()) {
        let mut ctx = create_error_context(err.clone());
        if ctx.details.is_none() {
            let chain = format_chain(&error);
            if !chain.is_empty() {
                ctx = ctx.with_details(chain);
            }
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(DebforgeError::IoError {
                message: io_error.to_string(),
            })
            .with_suggestion("Check ownership of the workspace and cache directories");
        }
    }

    let mut message = error.to_string();
    let chain = format_chain(&error);
    if !chain.is_empty() {
        message.push_str("\n\n");
        message.push_str(&chain);
    }

    ErrorContext::new(DebforgeError::Other {
        message,
    })
}

fn format_chain(error: &anyhow::Error) -> String {
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if chain.is_empty() {
        return String::new();
    }
    let mut out = String::from("Caused by:");
    for (i, cause) in chain.iter().enumerate() {
        out.push_str(&format!("\n  {}: {}", i + 1, cause));
    }
    out
}

fn create_error_context(error: DebforgeError) -> ErrorContext {
    match &error {
        DebforgeError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git (e.g. 'sudo apt-get install git') and make sure it is in PATH"),
        DebforgeError::ToolNotFound {
            tool,
        } => {
            let suggestion = format!("Install '{tool}' (e.g. 'sudo apt-get install devscripts dpkg-dev')");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DebforgeError::PackageNotFound {
            suggestion,
            ..
        } => {
            let suggestion = suggestion.as_ref().map_or_else(
                || "Check the package name against the distribution index".to_string(),
                |s| format!("Did you mean '{s}'?"),
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DebforgeError::FetchError {
            reason,
            ..
        } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check network access to the release repository, or rerun without --ignore-cache")
        }
        DebforgeError::InvalidPackage {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("The package.xml in the release repository is malformed; report it upstream"),
        DebforgeError::CycleError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the cycle in the package metadata; none of these packages can be ordered"),
        DebforgeError::CheckoutError {
            reason,
            ..
        } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Remove the repository from the workspace and retry")
        }
        DebforgeError::BuildDependencyError {
            output,
            ..
        } => {
            let details = output.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Install the missing build-dependencies manually with apt-get")
        }
        DebforgeError::BuildError {
            output,
            ..
        }
        | DebforgeError::InstallError {
            output,
            ..
        } => {
            let details = output.clone();
            ErrorContext::new(error).with_details(details)
        }
        DebforgeError::ArtifactNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the packaging tag produces a package with the expected name and version"),
        DebforgeError::GitCommandError {
            stderr,
            ..
        } => {
            let details = stderr.clone();
            ErrorContext::new(error).with_details(details)
        }
        DebforgeError::IndexError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass a valid distribution index with --index or set 'index' in the config file"),
        DebforgeError::ConfigError {
            ..
        } => ErrorContext::new(error).with_suggestion("Check the syntax of ~/.debforge/config.toml"),
        _ => ErrorContext::new(error),
    }
}
