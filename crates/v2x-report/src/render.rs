//! Staged, all-or-nothing rendering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use v2x_metrics::AnalysisReport;

use crate::{ArtifactWriter, ChartWriter, RenderError, RenderResult, SummaryWriter, TableWriter};

/// Prefix of the staging directory created inside the output directory.
const STAGING_PREFIX: &str = ".v2x-render-";

/// Subdirectory of the staging directory holding replaced output files.
const BACKUP_DIR: &str = ".replaced";

/// The writers [`render`] runs, in order.
pub fn default_writers() -> Vec<Box<dyn ArtifactWriter>> {
    let writers: Vec<Box<dyn ArtifactWriter>> = vec![
        Box::new(ChartWriter),
        Box::new(TableWriter),
        Box::new(SummaryWriter),
    ];
    #[cfg(feature = "parquet")]
    let writers = {
        let mut writers = writers;
        writers.push(Box::new(crate::ParquetWriter));
        writers
    };
    writers
}

/// Write every artifact for `report` into `output_dir`.
///
/// Returns the promoted paths in write order.  On error nothing new appears
/// in `output_dir`.
pub fn render(report: &AnalysisReport, output_dir: &Path) -> RenderResult<Vec<PathBuf>> {
    render_with(&default_writers(), report, output_dir)
}

/// [`render`] with an explicit set of writers.
pub fn render_with(
    writers:    &[Box<dyn ArtifactWriter>],
    report:     &AnalysisReport,
    output_dir: &Path,
) -> RenderResult<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).map_err(|source| RenderError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    // Same directory as the targets, so promotion is a rename on one
    // filesystem.  Dropping `staging` removes whatever is left in it.
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(output_dir)
        .map_err(|source| RenderError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

    let mut names = Vec::new();
    for writer in writers {
        writer.write(report, staging.path())?;
        for &name in writer.artifacts() {
            debug!("staged {name}");
            names.push(name);
        }
    }

    let promoted = promote(&staging, &names, output_dir)?;
    info!("{}: wrote {} artifacts to {}", report.scenario, promoted.len(), output_dir.display());
    Ok(promoted)
}

/// One completed rename, with the file it displaced if any.
struct Moved {
    staged: PathBuf,
    target: PathBuf,
    backup: Option<PathBuf>,
}

fn promote(staging: &TempDir, names: &[&str], output_dir: &Path) -> RenderResult<Vec<PathBuf>> {
    // Every staged file must exist, and every target must be free or a
    // regular file, before the first one is moved.
    for name in names {
        let staged = staging.path().join(name);
        fs::metadata(&staged).map_err(RenderError::io(&staged))?;

        let target = output_dir.join(name);
        match fs::symlink_metadata(&target) {
            Ok(meta) if !meta.file_type().is_file() => {
                return Err(RenderError::TargetNotFile { path: target });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(RenderError::Io { path: target, source }),
        }
    }

    // Displaced files are parked here until every rename has succeeded.
    let backups = staging.path().join(BACKUP_DIR);
    fs::create_dir(&backups).map_err(RenderError::io(&backups))?;

    let mut moved: Vec<Moved> = Vec::with_capacity(names.len());
    for name in names {
        match promote_one(staging.path(), &backups, name, output_dir) {
            Ok(m) => moved.push(m),
            Err(e) => {
                warn!("promotion of {name} failed, rolling back {} artifacts", moved.len());
                roll_back(&moved);
                return Err(e);
            }
        }
    }
    Ok(moved.into_iter().map(|m| m.target).collect())
}

fn promote_one(staging: &Path, backups: &Path, name: &str, output_dir: &Path) -> RenderResult<Moved> {
    let staged = staging.join(name);
    let target = output_dir.join(name);

    let backup = if target.exists() {
        let backup = backups.join(name);
        fs::rename(&target, &backup).map_err(RenderError::io(&target))?;
        Some(backup)
    } else {
        None
    };

    if let Err(source) = fs::rename(&staged, &target) {
        if let Some(backup) = &backup {
            restore(backup, &target);
        }
        return Err(RenderError::Io { path: target, source });
    }
    Ok(Moved { staged, target, backup })
}

/// Undo completed renames, newest first.  Best effort: the original error is
/// what the caller reports.
fn roll_back(moved: &[Moved]) {
    for m in moved.iter().rev() {
        restore(&m.target, &m.staged);
        if let Some(backup) = &m.backup {
            restore(backup, &m.target);
        }
    }
}

fn restore(from: &Path, to: &Path) {
    if let Err(e) = fs::rename(from, to) {
        warn!("cannot move {} back to {}: {e}", from.display(), to.display());
    }
}
