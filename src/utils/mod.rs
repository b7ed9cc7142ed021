//! Supporting utilities
//!
//! - [`fs`] - atomic writes and directory helpers
//! - [`platform`] - tool lookup and user path expansion
//! - [`progress`] - spinners for long-running toolchain steps

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, ensure_dir};
pub use platform::{command_exists, ensure_command, get_git_command, resolve_path};
pub use progress::ProgressBar;
