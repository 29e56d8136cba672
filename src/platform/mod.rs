//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{open_exclusive, open_log_file_secure_append, reset_permissions};

#[cfg(not(unix))]
pub use windows::{open_exclusive, open_log_file_secure_append, reset_permissions};
