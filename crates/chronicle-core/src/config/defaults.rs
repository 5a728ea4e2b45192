//! Built-in defaults, used when neither flags nor a config file say otherwise

pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Default changelog file, relative to the working directory
pub const DEFAULT_CHANGELOG_FILE: &str = "changelog.md";

/// Number of releases generated when nothing else is requested
pub const DEFAULT_RELEASE_COUNT: usize = 1;

/// Prefix stripped from release tags
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Remote used to derive repository links
pub const DEFAULT_REMOTE: &str = "origin";

/// Config file names, in lookup order at each directory level
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    DEFAULT_CONFIG_TOML,
    DEFAULT_CONFIG_YAML,
    ".chronicle.toml",
    ".chronicle.yaml",
];
