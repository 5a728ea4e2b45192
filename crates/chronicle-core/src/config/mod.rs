//! Optional `chronicle.toml` / `chronicle.yaml` settings.
//!
//! Precedence is command-line flags, then the nearest config file, then the
//! built-in defaults.

mod defaults;
mod loader;
mod types;
mod validation;

pub use defaults::{
    CONFIG_FILE_NAMES, DEFAULT_CHANGELOG_FILE, DEFAULT_RELEASE_COUNT, DEFAULT_REMOTE,
    DEFAULT_TAG_PREFIX,
};
pub use loader::{find_config, load_config, load_config_or_default};
pub use types::{ChangelogConfig, Config, GitConfig};
pub use validation::validate_config;
