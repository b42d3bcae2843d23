//! Run-level driver: discover metadata files under a directory tree and
//! repair (or just scan) them one after another.
//!
//! Strictly sequential — each document is parsed, repaired and saved
//! before the next one is considered, and every error stays local to
//! its file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, trace};

use crate::config::RepairConfig;
use crate::error::{MetsfixError, Result};
use crate::repair::{repair_file, scan_file, FileRepair, Outcome};

/// An error that ended one file's repair pass without affecting the run.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregated result of one run over a directory tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Metadata files found and examined.
    pub files_scanned: usize,
    /// Files in which at least one duplicate was found.
    pub files_with_duplicates: usize,
    /// Total distinct duplicate values across all files.
    pub total_duplicates: usize,
    /// Parent-directory identifiers of every file in which duplicates
    /// were found, in run order. Populated by scan-only runs too.
    pub affected_ids: Vec<String>,
    /// Per-file repair details (empty for scan-only runs).
    pub repairs: Vec<FileRepair>,
    /// Per-file failures; the run itself continued past each of them.
    pub errors: Vec<FileError>,
}

impl RunReport {
    /// The `id:<a> <b> …` selector line used downstream to reprocess the
    /// affected records.
    pub fn id_line(&self) -> String {
        format!("id:{}", self.affected_ids.join(" "))
    }
}

/// Recursively find files matching the metadata filename
/// (case-insensitive), sorted within each directory so the run order is
/// deterministic.
pub fn find_metadata_files(root: &Path, meta_filename: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(MetsfixError::DirectoryNotFound(root.display().to_string()));
    }
    let mut found = Vec::new();
    let wanted = meta_filename.to_lowercase();
    collect_files(root, &wanted, &mut found)?;
    Ok(found)
}

fn collect_files(dir: &Path, wanted: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_files(&path, wanted, found)?;
        } else if path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase() == wanted)
            .unwrap_or(false)
        {
            trace!(file = %path.display(), "metadata file found");
            found.push(path);
        }
    }
    Ok(())
}

fn parent_id(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Repair every metadata file under `root`.
pub fn repair_tree(root: &Path, config: &RepairConfig) -> Result<RunReport> {
    let files = find_metadata_files(root, &config.meta_filename)?;
    let mut report = RunReport::default();

    for path in files {
        report.files_scanned += 1;
        match repair_file(&path, config) {
            Ok(Outcome::Clean) => {}
            Ok(Outcome::Unrepairable(scan)) => {
                report.files_with_duplicates += 1;
                report.total_duplicates += scan.distinct();
                if let Some(id) = parent_id(&path) {
                    report.affected_ids.push(id);
                }
            }
            Ok(Outcome::Repaired(repair)) => {
                report.files_with_duplicates += 1;
                report.total_duplicates += repair.duplicates.len();
                if let Some(id) = &repair.parent_id {
                    report.affected_ids.push(id.clone());
                }
                report.repairs.push(repair);
            }
            Err(e) => {
                error!(file = %path.display(), "repair failed: {e}");
                report.errors.push(FileError {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Detect duplicates under `root` without changing anything — no
/// backups, no saves.
pub fn scan_tree(root: &Path, config: &RepairConfig) -> Result<RunReport> {
    let files = find_metadata_files(root, &config.meta_filename)?;
    let mut report = RunReport::default();

    for path in files {
        report.files_scanned += 1;
        match scan_file(&path, config) {
            Ok(scan) if scan.found() => {
                report.files_with_duplicates += 1;
                report.total_duplicates += scan.distinct();
                if let Some(id) = parent_id(&path) {
                    report.affected_ids.push(id);
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!(file = %path.display(), "scan failed: {e}");
                report.errors.push(FileError {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

// ─── Tests ─────────────────────────────────────────────────
