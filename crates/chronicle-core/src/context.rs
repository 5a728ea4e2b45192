//! Template rendering context

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{ConfigError, Result};

/// Repository coordinates derived from a repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Host including scheme, e.g. `https://github.com`
    pub host: String,
    /// Owner or group path
    pub owner: String,
    /// Repository name without `.git`
    pub repository: String,
}

impl RepositoryInfo {
    /// Parse the URL forms found in manifests and git remotes.
    ///
    /// Accepts `https://host/owner/repo(.git)`, `git+https://…`,
    /// `ssh://git@host/owner/repo`, `git@host:owner/repo.git`, the
    /// `github:`/`gitlab:`/`bitbucket:` shorthands and bare `owner/repo`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        for (prefix, host) in [
            ("github:", "https://github.com"),
            ("gitlab:", "https://gitlab.com"),
            ("bitbucket:", "https://bitbucket.org"),
        ] {
            if let Some(rest) = raw.strip_prefix(prefix) {
                return Self::from_path(host, rest);
            }
        }

        if let Some(rest) = raw.strip_prefix("git@") {
            let (host, path) = rest.split_once(':')?;
            return Self::from_path(&format!("https://{}", host), path);
        }

        if !raw.contains(':') {
            let mut parts = raw.split('/');
            return match (parts.next(), parts.next(), parts.next()) {
                (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                    Self::from_path("https://github.com", raw)
                }
                _ => None,
            };
        }

        let url = Url::parse(raw.strip_prefix("git+").unwrap_or(raw)).ok()?;
        let host = url.host_str()?;
        let scheme = if url.scheme() == "http" { "http" } else { "https" };
        let host = match url.port() {
            Some(port) if scheme == "http" => format!("{}://{}:{}", scheme, host, port),
            _ => format!("{}://{}", scheme, host),
        };
        Self::from_path(&host, url.path())
    }

    fn from_path(host: &str, path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repository) = path.rsplit_once('/')?;
        if owner.is_empty() || repository.is_empty() {
            return None;
        }

        Some(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            repository: repository.to_string(),
        })
    }

    /// Browsable repository URL
    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.host, self.owner, self.repository)
    }
}

/// Template variables shared by every commit of a run.
///
/// Known keys are typed; anything else supplied by a context file is kept
/// in `extra` and handed to the templates untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    /// Hosting platform URL, e.g. `https://github.com`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Repository owner
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Repository name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Full repository URL, used when owner/repository are unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    /// Version of the package being released
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Name of the package being released
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Additional user supplied variables
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill host, owner, repository and repoUrl from repository coordinates
    pub fn with_repository(mut self, info: &RepositoryInfo) -> Self {
        self.host = Some(info.host.clone());
        self.owner = Some(info.owner.clone());
        self.repository = Some(info.repository.clone());
        self.repo_url = Some(info.repo_url());
        self
    }

    /// Set the package version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the package name
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    /// Base URL that issue numbers are appended to, without `/issues/`.
    ///
    /// Uses `host/owner/repository` when all three are known, otherwise
    /// `repoUrl`.
    pub fn issue_base_url(&self) -> Option<String> {
        match (&self.host, &self.owner, &self.repository) {
            (Some(host), Some(owner), Some(repository)) => {
                Some(format!("{}/{}/{}", host, owner, repository))
            }
            _ => self.repo_url.clone(),
        }
    }

    /// Merge user supplied variables over this context; user keys win.
    pub fn with_overrides(self, overrides: Map<String, Value>) -> Result<Self> {
        if overrides.is_empty() {
            return Ok(self);
        }

        let mut merged = match serde_json::to_value(&self).map_err(ConfigError::JsonError)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        debug!(keys = overrides.len(), "applying context overrides");
        merged.extend(overrides);

        Ok(serde_json::from_value(Value::Object(merged)).map_err(ConfigError::JsonError)?)
    }

    /// Render the context as a JSON object for the template engine
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Load a context file (JSON, TOML or YAML by extension) as a variable map
#[instrument(fields(path = %path.display()))]
pub fn load_context_file(path: &Path) -> Result<Map<String, Value>> {
    info!(path = %path.display(), "loading context file");
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ContextFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let value: Value = match extension {
        "toml" => toml::from_str(&content).map_err(ConfigError::TomlError)?,
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?,
        _ => serde_json::from_str(&content).map_err(ConfigError::JsonError)?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::ContextFile {
            path: path.to_path_buf(),
            reason: "top level value must be an object".to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_https_url() {
        let info = RepositoryInfo::parse("https://github.com/bar/foo.git").unwrap();
        assert_eq!(info.host, "https://github.com");
        assert_eq!(info.owner, "bar");
        assert_eq!(info.repository, "foo");
        assert_eq!(info.repo_url(), "https://github.com/bar/foo");
    }

    #[test]
    fn test_parse_git_plus_and_ssh_urls() {
        let info = RepositoryInfo::parse("git+https://github.com/bar/foo.git").unwrap();
        assert_eq!(info.repo_url(), "https://github.com/bar/foo");

        let info = RepositoryInfo::parse("ssh://git@gitlab.com/group/sub/foo.git").unwrap();
        assert_eq!(info.host, "https://gitlab.com");
        assert_eq!(info.owner, "group/sub");
        assert_eq!(info.repository, "foo");
    }

    #[test]
    fn test_parse_scp_and_shorthands() {
        let info = RepositoryInfo::parse("git@github.com:bar/foo.git").unwrap();
        assert_eq!(info.repo_url(), "https://github.com/bar/foo");

        let info = RepositoryInfo::parse("gitlab:bar/foo").unwrap();
        assert_eq!(info.host, "https://gitlab.com");

        let info = RepositoryInfo::parse("bar/foo").unwrap();
        assert_eq!(info.host, "https://github.com");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RepositoryInfo::parse("").is_none());
        assert!(RepositoryInfo::parse("just-a-name").is_none());
        assert!(RepositoryInfo::parse("a/b/c").is_none());
    }

    #[test]
    fn test_issue_base_url_prefers_coordinates() {
        let context = RenderContext {
            host: Some("https://github.com".to_string()),
            owner: Some("bar".to_string()),
            repository: Some("foo".to_string()),
            repo_url: Some("https://example.com/elsewhere".to_string()),
            ..Default::default()
        };
        assert_eq!(
            context.issue_base_url().as_deref(),
            Some("https://github.com/bar/foo")
        );
    }

    #[test]
    fn test_issue_base_url_falls_back_to_repo_url() {
        let context = RenderContext {
            repo_url: Some("https://git.example.com/foo".to_string()),
            ..Default::default()
        };
        assert_eq!(
            context.issue_base_url().as_deref(),
            Some("https://git.example.com/foo")
        );
        assert!(RenderContext::new().issue_base_url().is_none());
    }

    #[test]
    fn test_overrides_win() {
        let info = RepositoryInfo::parse("https://github.com/bar/foo").unwrap();
        let context = RenderContext::new().with_repository(&info);

        let overrides = json!({"owner": "someone", "title": "Codename"});
        let merged = context
            .with_overrides(overrides.as_object().unwrap().clone())
            .unwrap();

        assert_eq!(merged.owner.as_deref(), Some("someone"));
        assert_eq!(merged.repository.as_deref(), Some("foo"));
        assert_eq!(merged.extra.get("title"), Some(&json!("Codename")));
    }

    #[test]
    fn test_to_value_uses_camel_case() {
        let context = RenderContext {
            repo_url: Some("https://example.com/r".to_string()),
            ..Default::default()
        };
        assert_eq!(context.to_value(), json!({"repoUrl": "https://example.com/r"}));
    }

    #[test]
    fn test_load_context_file_formats() {
        let temp = TempDir::new().unwrap();

        let json_path = temp.path().join("context.json");
        std::fs::write(&json_path, r#"{"host": "https://github.com"}"#).unwrap();
        let map = load_context_file(&json_path).unwrap();
        assert_eq!(map.get("host"), Some(&json!("https://github.com")));

        let toml_path = temp.path().join("context.toml");
        std::fs::write(&toml_path, "owner = \"bar\"\n").unwrap();
        let map = load_context_file(&toml_path).unwrap();
        assert_eq!(map.get("owner"), Some(&json!("bar")));
    }

    #[test]
    fn test_load_context_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(load_context_file(&temp.path().join("missing.json")).is_err());

        let path = temp.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(load_context_file(&path).is_err());

        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(load_context_file(&path).is_err());
    }
}
