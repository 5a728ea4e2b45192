//! Shape of the config file; every key is optional

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::{
    DEFAULT_CHANGELOG_FILE, DEFAULT_RELEASE_COUNT, DEFAULT_REMOTE, DEFAULT_TAG_PREFIX,
};

/// Whole config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[changelog]`
    pub changelog: ChangelogConfig,

    /// `[git]`
    pub git: GitConfig,
}

/// Where the changelog lives and how much of it each run regenerates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Read and written unless `--in-file`/`--out-file` say otherwise
    pub file: PathBuf,

    /// Releases generated per run (0 = all)
    pub release_count: usize,

    /// Prefix of release tags (e.g. "v" for "v1.2.3")
    pub tag_prefix: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            release_count: DEFAULT_RELEASE_COUNT,
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

/// Repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Remote whose URL is used when no manifest declares a repository
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.changelog.file, PathBuf::from("changelog.md"));
        assert_eq!(config.changelog.release_count, 1);
        assert_eq!(config.git.remote, "origin");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[changelog]\nrelease_count = 3\n").unwrap();
        assert_eq!(config.changelog.release_count, 3);
        assert_eq!(config.changelog.tag_prefix, "v");
        assert_eq!(config.git.remote, "origin");
    }
}
