//! Global constants used throughout debforge.
//!
//! Default file names and politeness parameters shared by several
//! modules live here so the numbers are discoverable in one place.

/// Pause before every fetch against a repository URL already fetched in this run.
///
/// Remote hosting services rate-limit anonymous raw-file and clone requests.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 1000;

/// Default path of the package descriptor inside a release repository.
pub const DEFAULT_DESCRIPTOR_PATH: &str = "package.xml";

/// Default template for the ref a descriptor is read at; `{version}` is replaced
/// with the version label being tried and `{package}` with the package name.
pub const DEFAULT_DESCRIPTOR_REF: &str = "{version}";

/// Default distribution identifier.
pub const DEFAULT_DISTRO: &str = "groovy";

/// Default target platform codename.
pub const DEFAULT_PLATFORM: &str = "quantal";

/// Default workspace directory for checkouts.
pub const DEFAULT_WORKSPACE: &str = "./tmp_workspace";
