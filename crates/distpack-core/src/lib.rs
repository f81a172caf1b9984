//! Core types and configuration for distpack.
//!
//! This crate defines the `distpack.toml` schema ([`DistpackConfig`]),
//! the `.distignore` loader ([`PatternSet::load`]), the path matcher used
//! to decide what is pruned from a release, and shared error types.

pub mod config;
pub mod error;
pub mod ignore;
pub mod patterns;

pub use config::{DistpackConfig, ReleaseConfig, ToolCommand, ToolsConfig};
pub use error::{Error, Result};
pub use ignore::PatternSet;
pub use patterns::{Pattern, matches};
