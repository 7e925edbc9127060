//! Run the inlining pass over HTML files on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::{CONFIG_FILE, InlineConfig};
use crate::inline::{InlineReport, Inliner};
use crate::logger::ProgressLine;
use crate::{debug, log};

use super::Cli;

/// Load config, build the inliner and process every file.
pub fn run(cli: &Cli) -> Result<()> {
    crate::logger::set_verbose(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    let inliner = Inliner::new(&config).context("Invalid configuration")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(inline_files(&inliner, &cli.files, cli.out_dir.as_deref()))
}

/// Explicit config path, else `inline.toml` when present, else defaults.
fn load_config(path: Option<&Path>) -> Result<InlineConfig> {
    match path {
        Some(path) => InlineConfig::load(path)
            .with_context(|| format!("Failed to load config `{}`", path.display())),
        None if Path::new(CONFIG_FILE).exists() => InlineConfig::load(Path::new(CONFIG_FILE))
            .with_context(|| format!("Failed to load config `{CONFIG_FILE}`")),
        None => Ok(InlineConfig::default()),
    }
}

async fn inline_files(inliner: &Inliner, files: &[PathBuf], out_dir: Option<&Path>) -> Result<()> {
    let progress = ProgressLine::new(&[("files", files.len())]);
    let mut failed = Vec::new();
    let (mut inlined, mut skipped) = (0, 0);

    for file in files {
        match inline_file(inliner, file, out_dir).await {
            Ok(report) => {
                inlined += report.inlined();
                skipped += report.skipped().count();
                progress.inc("files");
            }
            Err(e) => failed.push((file, e)),
        }
    }
    progress.finish();

    log!(
        "inline";
        "{} asset(s) inlined, {} skipped, {} file(s)",
        inlined,
        skipped,
        files.len()
    );

    if failed.is_empty() {
        return Ok(());
    }
    for (file, err) in &failed {
        log!("error"; "{}: {:#}", file.display(), err);
    }
    bail!("{} of {} file(s) failed", failed.len(), files.len())
}

/// Inline a single file, returning its report.
async fn inline_file(inliner: &Inliner, path: &Path, out_dir: Option<&Path>) -> Result<InlineReport> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read `{}`", path.display()))?;

    let result = inliner.inline_with_report(&html).await;
    debug!(
        "inline";
        "{}: {} inlined, {} skipped",
        path.display(),
        result.report.inlined(),
        result.report.skipped().count()
    );

    let dest = match out_dir {
        Some(dir) => dir.join(path.file_name().context("Input path has no file name")?),
        None => path.to_path_buf(),
    };

    if dest == path && result.report.inlined() == 0 {
        return Ok(result.report);
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    tokio::fs::write(&dest, result.html)
        .await
        .with_context(|| format!("Failed to write `{}`", dest.display()))?;

    Ok(result.report)
}
