//! Source checkout and tag publishing.
//!
//! Repository inspection (HEAD, local tag namespace) uses the gix library;
//! writes that must reach the remote go through the system git.

pub mod command;
mod tag;
mod workspace;

pub use tag::{GitTagPublisher, TagInfo, TagPublisher, classify_push_failure, prefixed};
pub use workspace::{Checkout, LocalCheckout, WorkspaceInfo, inspect, local_tag_exists};
