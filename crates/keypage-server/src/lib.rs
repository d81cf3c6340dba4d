#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for listing handlers.
pub const TRACING_TARGET_HANDLER: &str = "keypage_server::handler";

/// Tracing target for request extraction.
pub const TRACING_TARGET_EXTRACT: &str = "keypage_server::extract";

pub mod extract;
pub mod handler;

pub use crate::handler::{Error, ErrorKind, Result};
