//! CLI definition and command handling

pub mod output;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};

use chronicle_changelog::{
    load_preset, ChangelogGenerator, GenerateOptions, PackageSelector, TemplatePaths,
};
use chronicle_core::config::{load_config_or_default, Config};
use chronicle_core::context::load_context_file;
use chronicle_core::{PackageManifest, RenderContext, RepositoryInfo};
use chronicle_git::GitRepo;

use crate::pipeline::{self, OutputPlan};
use output::Notifier;

/// Chronicle - Generate a changelog from conventional commits
#[derive(Debug, Parser)]
#[command(name = "chronicle")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Read the changelog from this file [default: changelog.md]
    #[arg(short, long, value_name = "FILE")]
    pub in_file: Option<PathBuf>,

    /// Write the changelog to this file [default: the input file]
    #[arg(short, long, value_name = "FILE")]
    pub out_file: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(
        short,
        long,
        value_name = "BOOL",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub same_file: bool,

    /// Generate the changelog for the first time (all releases, no prior content)
    #[arg(short, long)]
    pub first_release: bool,

    /// Append the generated block instead of prepending it
    #[arg(short, long)]
    pub append: bool,

    /// Number of releases to generate, newest first (0 = all)
    #[arg(short, long, value_name = "N")]
    pub release_count: Option<usize>,

    /// Path to a specific package manifest [default: nearest package.json or Cargo.toml]
    #[arg(short = 'k', long, value_name = "PATH")]
    pub pkg: Option<PathBuf>,

    /// Generate a changelog for a specific monorepo package (name@1.0.0)
    #[arg(short, long, value_name = "NAME@VERSION")]
    pub lerna_package: Option<String>,

    /// Only include commits touching this directory
    #[arg(long, value_name = "DIR")]
    pub commit_path: Option<PathBuf>,

    /// File (JSON, TOML or YAML) defining extra template variables
    #[arg(short, long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    /// Show full error chains and generation warnings
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Working directory
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    /// Run the changelog generation
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;
        debug!(config = ?config_path, "configuration resolved");

        let plan = self.output_plan(&config)?;
        let options = self.generate_options(&cwd, &config)?;
        let context = self.render_context(&cwd, &config)?;
        info!(
            in_file = %plan.in_file.display(),
            out_file = %plan.out_file.display(),
            release_count = options.release_count,
            append = plan.append,
            "executing changelog generation"
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut notifier = Notifier::new();

        let preset = runtime.block_on(load_preset(&TemplatePaths::bundled()))?;
        let generator = ChangelogGenerator::new(preset)?;

        runtime.block_on(pipeline::ensure_exists(&plan.in_file, &mut notifier))?;

        let generated = match generator.generate(&options, &context) {
            Ok(text) => text,
            Err(err) if err.is_empty_repository() => {
                return Err(notifier.fail("Could not fetch commits. Is this a new repository?"));
            }
            Err(err) => return Err(err.into()),
        };

        runtime.block_on(pipeline::write_changelog(
            &plan,
            generated.as_bytes(),
            &mut notifier,
        ))
    }

    /// Release count after `--first-release` and config defaults
    fn release_count(&self, config: &Config) -> usize {
        if self.first_release {
            0
        } else {
            self.release_count.unwrap_or(config.changelog.release_count)
        }
    }

    fn output_plan(&self, config: &Config) -> anyhow::Result<OutputPlan> {
        let in_file = self
            .in_file
            .clone()
            .unwrap_or_else(|| config.changelog.file.clone());

        let out_file = match (&self.out_file, self.same_file) {
            (Some(out), _) => out.clone(),
            (None, true) => in_file.clone(),
            (None, false) => bail!("--out-file is required when --same-file is false"),
        };

        Ok(OutputPlan {
            in_file,
            out_file,
            append: self.append,
            read_prior: self.release_count(config) != 0,
        })
    }

    fn generate_options(&self, cwd: &Path, config: &Config) -> anyhow::Result<GenerateOptions> {
        let mut options = GenerateOptions::new(cwd)
            .with_release_count(self.release_count(config))
            .with_tag_prefix(config.changelog.tag_prefix.clone());

        if let Some(raw) = &self.lerna_package {
            options = options.with_package(PackageSelector::parse(raw)?);
        }
        if let Some(path) = &self.commit_path {
            options = options.with_commit_path(path);
        }
        Ok(options)
    }

    /// Manifest data, then the git remote, then the user's context file
    fn render_context(&self, cwd: &Path, config: &Config) -> anyhow::Result<RenderContext> {
        let manifest = match &self.pkg {
            Some(path) => PackageManifest::load(&cwd.join(path)).map(Some),
            None => PackageManifest::discover(cwd),
        };
        let manifest = manifest.unwrap_or_else(|err| {
            warn!(error = %err, "could not read package manifest");
            None
        });

        let mut context = RenderContext::new();
        let mut repository = None;
        if let Some(manifest) = &manifest {
            if let Some(name) = &manifest.name {
                context = context.with_package_name(name);
            }
            if let Some(version) = &manifest.version {
                context = context.with_version(version);
            }
            repository = manifest.repository_info();
        }

        if repository.is_none() {
            repository = remote_repository(cwd, &config.git.remote);
        }
        if let Some(info) = &repository {
            context = context.with_repository(info);
        }

        if let Some(path) = &self.context {
            let overrides = load_context_file(&cwd.join(path))?;
            context = context.with_overrides(overrides)?;
        }
        Ok(context)
    }
}

/// Repository coordinates from a git remote URL, if any
fn remote_repository(cwd: &Path, remote: &str) -> Option<RepositoryInfo> {
    let repo = GitRepo::discover(cwd).ok()?;
    match repo.remote_url(remote) {
        Ok(Some(url)) => {
            let info = RepositoryInfo::parse(&url);
            if info.is_none() {
                warn!(remote, url = %url, "could not parse remote URL");
            }
            info
        }
        Ok(None) => {
            debug!(remote, "remote has no URL");
            None
        }
        Err(err) => {
            debug!(remote, error = %err, "remote not available");
            None
        }
    }
}
