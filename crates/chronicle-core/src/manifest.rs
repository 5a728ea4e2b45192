//! Package manifest reading (package.json and Cargo.toml)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::context::RepositoryInfo;
use crate::error::{ManifestError, Result};

/// Manifest file names probed in a directory, in order
pub const MANIFEST_FILE_NAMES: [&str; 2] = ["package.json", "Cargo.toml"];

/// The parts of a package manifest that feed the rendering context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Repository URL as written in the manifest
    pub repository: Option<String>,
    /// Where the manifest was read from
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    repository: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: Option<String>,
    version: Option<toml::Value>,
    repository: Option<toml::Value>,
}

impl PackageManifest {
    /// Load a manifest from an explicit path
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ManifestError::NotFound(path.to_path_buf()))?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let manifest = match file_name {
            "Cargo.toml" => Self::from_cargo_toml(&content, path)?,
            name if name.ends_with(".json") => Self::from_package_json(&content, path)?,
            _ => return Err(ManifestError::Unsupported(path.to_path_buf()).into()),
        };

        debug!(
            name = ?manifest.name,
            version = ?manifest.version,
            repository = ?manifest.repository,
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Find and load the first known manifest in a directory
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        for name in MANIFEST_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    fn from_package_json(content: &str, path: &Path) -> Result<Self> {
        let pkg: PackageJson =
            serde_json::from_str(content).map_err(|e| ManifestError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // "repository" is either a string or {"type": "git", "url": "..."}
        let repository = match pkg.repository {
            Some(Value::String(url)) => Some(url),
            Some(Value::Object(map)) => map.get("url").and_then(Value::as_str).map(String::from),
            _ => None,
        };

        Ok(Self {
            name: pkg.name,
            version: pkg.version,
            repository,
            path: path.to_path_buf(),
        })
    }

    fn from_cargo_toml(content: &str, path: &Path) -> Result<Self> {
        let cargo: CargoToml = toml::from_str(content).map_err(|e| ManifestError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Workspace-inherited fields (`version.workspace = true`) are tables
        let package = cargo.package;
        let as_string = |v: Option<toml::Value>| v.and_then(|v| v.as_str().map(String::from));

        Ok(match package {
            Some(package) => Self {
                name: package.name,
                version: as_string(package.version),
                repository: as_string(package.repository),
                path: path.to_path_buf(),
            },
            None => Self {
                path: path.to_path_buf(),
                ..Default::default()
            },
        })
    }

    /// Repository coordinates, if the manifest declares a parseable URL
    pub fn repository_info(&self) -> Option<RepositoryInfo> {
        self.repository.as_deref().and_then(RepositoryInfo::parse)
    }
}
