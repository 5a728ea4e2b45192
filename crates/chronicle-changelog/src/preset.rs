//! The conventional preset: parser grammar, transform, ordering and templates

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use chronicle_core::error::{ChangelogError, Result};

use crate::parser::ParserOptions;
use crate::policy::WriterPolicy;
use crate::template::{Template, TemplateSet};
use crate::transform::{transform, TransformFn};

/// Main template name
pub const MAIN_TEMPLATE: &str = "template";

/// Partial names, each stored as `<name>.md`
pub const PARTIALS: [&str; 3] = ["header", "commit", "footer"];

/// Where the preset's template files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    pub main: PathBuf,
    pub header: PathBuf,
    pub commit: PathBuf,
    pub footer: PathBuf,
}

impl TemplatePaths {
    /// Templates shipped with this crate
    pub fn bundled() -> Self {
        Self::in_dir(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
    }

    /// `template.md`, `header.md`, `commit.md` and `footer.md` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            main: dir.join(format!("{}.md", MAIN_TEMPLATE)),
            header: dir.join("header.md"),
            commit: dir.join("commit.md"),
            footer: dir.join("footer.md"),
        }
    }
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Everything the generator needs to render release blocks
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub templates: TemplateSet,
    pub transform: TransformFn,
    pub policy: WriterPolicy,
}

/// Parser and writer configuration for one changelog style
#[derive(Debug, Clone)]
pub struct Preset {
    pub parser: ParserOptions,
    pub writer: WriterOptions,
}

async fn read_template(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        ChangelogError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// Load the conventional preset, reading its four templates concurrently.
///
/// Fails if any template file is missing or does not compile.
#[instrument(skip_all, fields(main = %paths.main.display()))]
pub async fn load_preset(paths: &TemplatePaths) -> Result<Preset> {
    let (main, header, commit, footer) = tokio::try_join!(
        read_template(&paths.main),
        read_template(&paths.header),
        read_template(&paths.commit),
        read_template(&paths.footer),
    )?;
    debug!("templates read");

    let templates = TemplateSet::new(Template::compile(MAIN_TEMPLATE, &main)?)
        .with_partial(Template::compile(PARTIALS[0], &header)?)
        .with_partial(Template::compile(PARTIALS[1], &commit)?)
        .with_partial(Template::compile(PARTIALS[2], &footer)?);

    Ok(Preset {
        parser: ParserOptions::conventional(),
        writer: WriterOptions {
            templates,
            transform,
            policy: WriterPolicy::conventional(),
        },
    })
}
