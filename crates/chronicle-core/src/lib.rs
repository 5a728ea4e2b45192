//! Chronicle Core - Shared foundations for changelog generation
//!
//! This crate provides the error taxonomy, configuration loading, package
//! manifest reading and the template rendering context used by the other
//! chronicle crates.

pub mod config;
pub mod context;
pub mod error;
pub mod manifest;

pub use context::{RenderContext, RepositoryInfo};
pub use error::{ChronicleError, Result};
pub use manifest::PackageManifest;
