//! Filesystem operations used by the bundle engine.

mod copy;
mod helpers;
mod lock;
mod relocate;
mod util;

pub use helpers::io_error_with_help;
pub use lock::probe_exclusive;
pub use relocate::{RenameRelocator, Relocator};
