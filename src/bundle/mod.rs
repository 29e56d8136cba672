//! Bundle discovery and move engine.
//!
//! A pass walks the inbox for manifests ([`scan`]), reads each manifest's
//! attachment list ([`manifest`]), resolves the bundle ([`resolve`]), checks
//! that every member can move ([`precheck`]) and moves them ([`execute`]).
//! Failures are remembered per bundle by [`tracker`].

pub mod execute;
pub mod manifest;
pub mod precheck;
pub mod resolve;
pub mod scan;
pub mod tracker;

pub use execute::{MoveOptions, MoveReport, execute_move};
pub use manifest::{parse_attachments, read_attachments};
pub use precheck::check_movable;
pub use resolve::{Bundle, Routes};
pub use scan::scan_manifests;
pub use tracker::{Attempt, FailureRecord, FailureTracker};

use chrono::TimeDelta;

/// Files whose names end with this (any case) are manifests.
pub const MANIFEST_SUFFIX: &str = ".xml";
/// Members whose names end with this (any case) go to the xml destination.
pub const ROUTE_SUFFIX: &str = ".xml";
/// Element naming one attachment; may appear at any depth.
pub const ATTACHMENT_ELEMENT: &[u8] = b"bifogadfil";
/// Child of the attachment element holding the file name.
pub const NAME_ELEMENT: &[u8] = b"filnamn";
/// How long a failing bundle keeps being retried after its first failure.
pub const RETRY_WINDOW: TimeDelta = TimeDelta::hours(24);
