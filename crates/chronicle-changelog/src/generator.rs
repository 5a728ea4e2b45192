//! Changelog generation
//!
//! Walks the git history, splits it into release blocks at version tags and
//! renders each block through the preset's templates.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use chronicle_core::config::{DEFAULT_RELEASE_COUNT, DEFAULT_TAG_PREFIX};
use chronicle_core::error::{ConfigError, Result};
use chronicle_core::RenderContext;
use chronicle_git::{CommitInfo, GitRepo, TagInfo};

use crate::parser::{CommitParser, ConventionalParser};
use crate::preset::{Preset, WriterOptions};
use crate::types::ParsedCommit;

/// Version label of commits newer than any tag when no version is known
pub const UNRELEASED: &str = "Unreleased";

/// A `name@version` package selector for monorepo packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSelector {
    pub name: String,
    pub version: String,
}

impl PackageSelector {
    /// Parse `name@version`; the name may itself start with `@` (`@scope/name@1.0.0`)
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.rsplit_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => Ok(Self {
                name: name.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ConfigError::InvalidValue {
                field: "lerna-package".to_string(),
                message: format!("expected <name>@<version>, got '{}'", raw),
            }
            .into()),
        }
    }

    /// Prefix of this package's release tags
    pub fn tag_prefix(&self) -> String {
        format!("{}@", self.name)
    }
}

/// What to generate
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory the repository is discovered from
    pub cwd: PathBuf,
    /// Newest release blocks to render; 0 renders all of them
    pub release_count: usize,
    /// Prefix of release tags when no package selector is given
    pub tag_prefix: String,
    /// Monorepo package whose tags delimit releases
    pub package: Option<PackageSelector>,
    /// Only include commits touching this directory
    pub commit_path: Option<PathBuf>,
}

impl GenerateOptions {
    /// Options for a repository discovered from `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            release_count: DEFAULT_RELEASE_COUNT,
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
            package: None,
            commit_path: None,
        }
    }

    pub fn with_release_count(mut self, count: usize) -> Self {
        self.release_count = count;
        self
    }

    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    pub fn with_package(mut self, package: PackageSelector) -> Self {
        self.package = Some(package);
        self
    }

    pub fn with_commit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.commit_path = Some(path.into());
        self
    }

    /// Prefix that release tags carry for these options
    pub fn effective_tag_prefix(&self) -> String {
        match &self.package {
            Some(package) => package.tag_prefix(),
            None => self.tag_prefix.clone(),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Commits between two release tags
#[derive(Debug)]
struct ReleaseBlock {
    /// `None` for the commits above the newest tag
    tag: Option<TagInfo>,
    commits: Vec<CommitInfo>,
}

/// Changelog generator
pub struct ChangelogGenerator {
    parser: ConventionalParser,
    writer: WriterOptions,
}

impl ChangelogGenerator {
    /// Create a generator from a loaded preset
    pub fn new(preset: Preset) -> Result<Self> {
        Ok(Self {
            parser: ConventionalParser::with_options(&preset.parser)?,
            writer: preset.writer,
        })
    }

    /// Generate the changelog text for the newest `release_count` releases
    #[instrument(skip(self, context), fields(cwd = %options.cwd.display()))]
    pub fn generate(&self, options: &GenerateOptions, context: &RenderContext) -> Result<String> {
        let repo = GitRepo::discover(&options.cwd)?;
        let prefix = options.effective_tag_prefix();
        info!(prefix = %prefix, release_count = options.release_count, "generating changelog");

        if context.issue_base_url().is_none() {
            warn!("repository URL unknown, issue and commit links are not rendered");
        }

        let (mut blocks, latest_tag) = self.release_blocks(&repo, options, &prefix)?;
        let previous_tags: Vec<Option<String>> = (0..blocks.len())
            .map(|i| blocks.get(i + 1).and_then(|b| b.tag.as_ref()).map(|t| t.name.clone()))
            .collect();

        // The unreleased slot counts toward the limit even when empty
        if options.release_count > 0 {
            blocks.truncate(options.release_count);
        }
        debug!(blocks = blocks.len(), "release blocks selected");

        let unreleased_version = context
            .version
            .clone()
            .or_else(|| options.package.as_ref().map(|p| p.version.clone()))
            .filter(|version| !is_released(version, latest_tag.as_ref()));

        let mut output = String::new();
        for (block, previous_tag) in blocks.iter().zip(previous_tags) {
            let (version, current_tag) = match &block.tag {
                Some(tag) => (tag.version.to_string(), Some(tag.name.clone())),
                None if block.commits.is_empty() => continue,
                None => match &unreleased_version {
                    Some(version) => (version.clone(), Some(format!("{}{}", prefix, version))),
                    None => (UNRELEASED.to_string(), None),
                },
            };

            let block_context =
                self.block_context(block, &version, previous_tag, current_tag, context);
            output.push_str(&self.writer.templates.render(&block_context)?);
        }

        info!(bytes = output.len(), "changelog generated");
        Ok(output)
    }

    /// Split the history into release blocks, newest first, along with the
    /// highest release tag.
    ///
    /// The first block is always the unreleased one, possibly empty.
    fn release_blocks(
        &self,
        repo: &GitRepo,
        options: &GenerateOptions,
        prefix: &str,
    ) -> Result<(Vec<ReleaseBlock>, Option<TagInfo>)> {
        let history = repo.history(None)?;

        let included: Option<HashSet<String>> = match &options.commit_path {
            Some(path) => {
                let relative = repo_relative(repo, &options.cwd, path);
                let scoped = repo.history(Some(&relative))?;
                Some(scoped.into_iter().map(|c| c.hash).collect())
            }
            None => None,
        };

        let tags = repo.semver_tags(prefix)?;
        let latest = tags.first().cloned();
        if latest.is_none() {
            debug!(prefix, "no release tags found");
        }

        // Tags are sorted newest version first, so the highest tag on a commit wins
        let mut tag_by_commit: HashMap<String, TagInfo> = HashMap::new();
        for tag in tags {
            tag_by_commit.entry(tag.commit_hash.clone()).or_insert(tag);
        }

        let mut blocks = Vec::new();
        let mut current = ReleaseBlock {
            tag: None,
            commits: Vec::new(),
        };

        for commit in history {
            if let Some(tag) = tag_by_commit.remove(&commit.hash) {
                let next = ReleaseBlock {
                    tag: Some(tag),
                    commits: Vec::new(),
                };
                blocks.push(std::mem::replace(&mut current, next));
            }

            let keep = included
                .as_ref()
                .map_or(true, |set| set.contains(&commit.hash));
            if keep {
                current.commits.push(commit);
            }
        }
        blocks.push(current);

        Ok((blocks, latest))
    }

    fn block_context(
        &self,
        block: &ReleaseBlock,
        version: &str,
        previous_tag: Option<String>,
        current_tag: Option<String>,
        context: &RenderContext,
    ) -> Value {
        let commits: Vec<ParsedCommit> = block
            .commits
            .iter()
            .map(|commit| self.parser.parse(commit))
            .filter_map(|parsed| (self.writer.transform)(parsed, context))
            .collect();
        debug!(
            version,
            total = block.commits.len(),
            kept = commits.len(),
            "block commits transformed"
        );

        let (commit_groups, note_groups) = self.writer.policy.apply(&commits);

        let date = block
            .tag
            .as_ref()
            .map_or_else(Utc::now, |tag| tag.timestamp)
            .format("%Y-%m-%d")
            .to_string();

        let base_url = context.issue_base_url();
        let compare_url = match (&base_url, &previous_tag, &current_tag) {
            (Some(base), Some(previous), Some(current)) => {
                Some(format!("{}/compare/{}...{}", base, previous, current))
            }
            _ => None,
        };

        let mut values = match context.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        values.insert("version".to_string(), json!(version));
        values.insert("date".to_string(), json!(date));
        values.insert("previousTag".to_string(), json!(previous_tag));
        values.insert("currentTag".to_string(), json!(current_tag));
        values.insert("linkCompare".to_string(), json!(compare_url.is_some()));
        values.insert("compareUrl".to_string(), json!(compare_url));
        values.insert("linkReferences".to_string(), json!(base_url.is_some()));
        values.insert("repoBaseUrl".to_string(), json!(base_url));
        values.insert("commitGroups".to_string(), json!(commit_groups));
        values.insert("noteGroups".to_string(), json!(note_groups));
        Value::Object(values)
    }
}

/// Whether `version` is already the newest release tag, in which case the
/// unreleased block must not reuse it as its label
fn is_released(version: &str, latest: Option<&TagInfo>) -> bool {
    latest.is_some_and(|tag| tag.version.to_string() == version.trim_start_matches('v'))
}

/// Express `path` (relative to `cwd`) relative to the repository root
fn repo_relative(repo: &GitRepo, cwd: &Path, path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let absolute = absolute.canonicalize().unwrap_or(absolute);

    repo.workdir()
        .map(|root| root.canonicalize().unwrap_or_else(|_| root.to_path_buf()))
        .and_then(|root| absolute.strip_prefix(&root).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}
