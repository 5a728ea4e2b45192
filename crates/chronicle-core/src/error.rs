//! Error types shared by the chronicle crates

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Any failure while producing a changelog
#[derive(Debug, Error)]
pub enum ChronicleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChronicleError {
    /// True when HEAD is unborn, i.e. nothing has been committed yet
    pub fn is_empty_repository(&self) -> bool {
        matches!(self, Self::Git(GitError::NoCommits))
    }
}

/// Bad settings from the config file, a context file or the command line
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    #[error("Cannot use context file {path}: {reason}")]
    ContextFile { path: PathBuf, reason: String },

    #[error("Malformed YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Malformed TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Malformed JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading repository history
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Cannot open repository: {0}")]
    OpenFailed(String),

    /// HEAD does not point at a commit yet
    #[error("No commits found in repository")]
    NoCommits,

    #[error("No remote named '{0}'")]
    RemoteNotFound(String),

    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Failures loading or rendering the changelog templates
#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("Cannot read template {path}: {source}")]
    TemplateLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template '{name}' at byte {offset}: {message}")]
    TemplateSyntax {
        name: String,
        offset: usize,
        message: String,
    },

    #[error("Unknown partial: {0}")]
    UnknownPartial(String),

    /// Partials include each other too deeply, most likely a cycle
    #[error("Partial nesting too deep at '{0}'")]
    PartialDepth(String),

    /// A commit parser pattern failed to compile
    #[error("Invalid parser pattern: {0}")]
    InvalidPattern(String),
}

/// Failures reading package.json or Cargo.toml
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Package manifest not found at {0}")]
    NotFound(PathBuf),

    #[error("Cannot parse manifest {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Unsupported manifest: {0}")]
    Unsupported(PathBuf),
}
