//! Merging generated changelog text into the changelog file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument};

use crate::cli::output::Notifier;

/// Where the generated text goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    /// Changelog read for prior content
    pub in_file: PathBuf,
    /// Changelog written
    pub out_file: PathBuf,
    /// Append instead of putting the new text in front
    pub append: bool,
    /// Merge prior content; off when every release is regenerated
    pub read_prior: bool,
}

/// Create the changelog with a single newline if it does not exist yet
pub async fn ensure_exists(path: &Path, notifier: &mut Notifier) -> Result<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(());
    }

    notifier.notify("created {}", &[&path.display()]);
    tokio::fs::write(path, "\n")
        .await
        .with_context(|| format!("Failed to create {}", path.display()))
}

/// Stream of the prior changelog content, empty when it must not be read
pub async fn prior_content(path: &Path, read_prior: bool) -> Result<Box<dyn AsyncRead + Unpin>> {
    if !read_prior {
        debug!("skipping prior changelog content");
        return Ok(Box::new(tokio::io::empty()));
    }

    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Box::new(file))
}

/// Stream generated content onto the end of `out_file`
#[instrument(skip(generated), fields(out = %out_file.display()))]
pub async fn append_changes<G>(mut generated: G, out_file: &Path) -> Result<u64>
where
    G: AsyncRead + Unpin,
{
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(out_file)
        .await
        .with_context(|| format!("Failed to open {}", out_file.display()))?;

    let written = tokio::io::copy(&mut generated, &mut file).await?;
    file.flush().await?;
    Ok(written)
}

/// Write generated content followed by prior content to `out_file`.
///
/// Both streams go to a temporary file first, which is then copied over
/// the output, so `out_file` may be the file `prior` reads from. The copy
/// is not atomic.
#[instrument(skip(generated, prior), fields(out = %out_file.display()))]
pub async fn prepend_changes<G, P>(generated: G, prior: P, out_file: &Path) -> Result<u64>
where
    G: AsyncRead + Unpin,
    P: AsyncRead + Unpin,
{
    let temp = tempfile::Builder::new()
        .prefix("chronicle-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create temporary file")?
        .into_temp_path();

    let mut merged = generated.chain(prior);
    let mut staging = File::create(&temp).await?;
    let staged = tokio::io::copy(&mut merged, &mut staging).await?;
    staging.flush().await?;
    drop(staging);
    debug!(bytes = staged, temp = %temp.display(), "changes staged");

    let mut source = File::open(&temp).await?;
    let mut target = File::create(out_file)
        .await
        .with_context(|| format!("Failed to write {}", out_file.display()))?;
    let written = tokio::io::copy(&mut source, &mut target).await?;
    target.flush().await?;

    temp.close().context("Failed to remove temporary file")?;
    Ok(written)
}

/// Place generated content according to the plan and report where it went
pub async fn write_changelog(
    plan: &OutputPlan,
    generated: &[u8],
    notifier: &mut Notifier,
) -> Result<()> {
    let written = if plan.append {
        let written = append_changes(generated, &plan.out_file).await?;
        notifier.notify("appended changes to {}", &[&plan.out_file.display()]);
        written
    } else {
        let prior = prior_content(&plan.in_file, plan.read_prior).await?;
        let written = prepend_changes(generated, prior, &plan.out_file).await?;
        notifier.notify("output changes to {}", &[&plan.out_file.display()]);
        written
    };

    info!(bytes = written, out = %plan.out_file.display(), "changelog written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan(dir: &TempDir, append: bool, read_prior: bool) -> OutputPlan {
        let file = dir.path().join("changelog.md");
        OutputPlan {
            in_file: file.clone(),
            out_file: file,
            append,
            read_prior,
        }
    }

    #[tokio::test]
    async fn test_ensure_exists_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("changelog.md");
        let mut notifier = Notifier::quiet();

        ensure_exists(&path, &mut notifier).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n");
        assert_eq!(notifier.messages().len(), 1);
        assert!(notifier.messages()[0].starts_with("created "));

        std::fs::write(&path, "# kept\n").unwrap();
        ensure_exists(&path, &mut notifier).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# kept\n");
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_puts_new_content_first() {
        let dir = TempDir::new().unwrap();
        let plan = plan(&dir, false, true);
        std::fs::write(&plan.in_file, "# old entry\n").unwrap();
        let mut notifier = Notifier::quiet();

        write_changelog(&plan, b"# new entry\n", &mut notifier)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&plan.out_file).unwrap(),
            "# new entry\n# old entry\n"
        );
        assert!(notifier.messages()[0].starts_with("output changes to "));
    }

    #[tokio::test]
    async fn test_overwrite_into_other_file() {
        let dir = TempDir::new().unwrap();
        let mut plan = plan(&dir, false, true);
        plan.out_file = dir.path().join("out.md");
        std::fs::write(&plan.in_file, "# old entry\n").unwrap();

        write_changelog(&plan, b"# new entry\n", &mut Notifier::quiet())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&plan.out_file).unwrap(),
            "# new entry\n# old entry\n"
        );
        assert_eq!(std::fs::read_to_string(&plan.in_file).unwrap(), "# old entry\n");
    }

    #[tokio::test]
    async fn test_append_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let plan = plan(&dir, true, true);
        std::fs::write(&plan.out_file, "# old entry\n").unwrap();
        let mut notifier = Notifier::quiet();

        write_changelog(&plan, b"# new entry\n", &mut notifier)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&plan.out_file).unwrap(),
            "# old entry\n# new entry\n"
        );
        assert!(notifier.messages()[0].starts_with("appended changes to "));
    }

    #[tokio::test]
    async fn test_first_release_never_reads_prior() {
        let dir = TempDir::new().unwrap();
        let mut plan = plan(&dir, false, false);
        plan.in_file = dir.path().join("does-not-exist.md");

        write_changelog(&plan, b"# everything\n", &mut Notifier::quiet())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&plan.out_file).unwrap(),
            "# everything\n"
        );
    }

    #[tokio::test]
    async fn test_prior_content_of_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(prior_content(&dir.path().join("missing.md"), true).await.is_err());
    }

    #[tokio::test]
    async fn test_prepend_streams_are_chained() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.md");

        let written = prepend_changes(&b"a"[..], &b"b"[..], &out).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "ab");
    }
}
