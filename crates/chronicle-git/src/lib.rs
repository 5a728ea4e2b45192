//! Chronicle Git - Git history access for changelog generation
//!
//! This crate provides the repository operations the changelog generator
//! needs: commit history walks (optionally scoped to a directory), release
//! tag discovery and remote lookup.

mod commits;
mod remote;
mod repository;
mod tags;
pub mod types;

pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo};
