//! Media session lifecycle for the relaxation screen.
//!
//! This crate owns exactly one audio handle and one video handle per
//! session and keeps them consistent with the user's selection. It focuses
//! on:
//! - Single-owner handle slots: the old handle is released before a new one
//!   is installed.
//! - Remote URI resolution bounded by a timeout, failing to a fallback value
//!   instead of an error.
//! - Generation tokens per media kind, so a resolution that finishes after a
//!   newer selection is discarded.
//!
//! # Concurrency
//! Several selections may be in flight at once. Only the most recent one for
//! a media kind may mutate the session; older ones run to completion and
//! drop their result.

pub mod handle;
pub mod headless;
pub mod resolver;
pub mod session;

pub use handle::{HandleError, HandleSlot, MediaBackend, MediaHandle};
pub use resolver::{HttpUriResolver, UriResolver, resolve_uri};
pub use session::{MediaSession, PendingSwitch, SessionOptions};
