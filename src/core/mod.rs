//! Core types shared across debforge
//!
//! - [`error`] - the error taxonomy ([`DebforgeError`]) and user-facing reports
//!   ([`ErrorContext`], [`user_friendly_error`])
//! - [`naming`] - deterministic Debian naming: canonical artifact names, required
//!   installed versions and packaging tags ([`DebianNaming`])

pub mod error;
pub mod naming;

pub use error::{BuildStage, DebforgeError, ErrorContext, user_friendly_error};
pub use naming::DebianNaming;

/// Name of a package within the distribution index namespace.
pub type PackageName = String;
