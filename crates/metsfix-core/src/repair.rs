//! Per-document repair orchestration.
//!
//! One pass over one file: parse, scan, and if duplicates are present
//! resolve and rewrite each duplicate group in memory, renumber, then
//! back up and save. The document either comes out untouched, or
//! repaired with a verified backup next to it — never in between. Any
//! error before the final save leaves the file as it was.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup;
use crate::collect::collect_image_refs;
use crate::config::RepairConfig;
use crate::detect::{find_duplicates, Duplicate, DuplicateScan};
use crate::error::{MetsfixError, Result};
use crate::resolve::resolve_group;
use crate::rewrite::{apply_group, renumber_order};
use crate::xml;

/// Result of a repair pass over one document.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// No duplicates: no backup, no save, file untouched.
    Clean,
    /// Duplicates exist but none could be traced to a structural
    /// anchor, so there was nothing to rewrite. File untouched.
    Unrepairable(DuplicateScan),
    /// Duplicates were found and repaired in place.
    Repaired(FileRepair),
}

/// Details of one repaired document.
#[derive(Debug, Clone, Serialize)]
pub struct FileRepair {
    pub path: PathBuf,
    /// Name of the containing directory — the record identifier used
    /// downstream to select records for reprocessing.
    pub parent_id: Option<String>,
    /// Distinct duplicated values with their excess counts.
    pub duplicates: Vec<Duplicate>,
    pub removed_nodes: usize,
    pub redirected_links: usize,
    pub renumbered_entries: usize,
    pub backup_path: PathBuf,
}

/// Detect duplicates in one document without touching it.
pub fn scan_file(path: &Path, config: &RepairConfig) -> Result<DuplicateScan> {
    let original = std::fs::read(path)?;
    let doc = xml::parse_bytes(&original)?;
    let refs = collect_image_refs(&doc, &config.image_extension);
    Ok(find_duplicates(&refs))
}

/// Run the full repair state machine on one document.
pub fn repair_file(path: &Path, config: &RepairConfig) -> Result<Outcome> {
    let original = std::fs::read(path)?;
    let mut doc = xml::parse_bytes(&original)?;

    let refs = collect_image_refs(&doc, &config.image_extension);
    let scan = find_duplicates(&refs);
    if !scan.found() {
        debug!(file = %path.display(), "no duplicates");
        return Ok(Outcome::Clean);
    }

    info!(
        file = %path.display(),
        distinct = scan.distinct(),
        "duplicate image references found"
    );
    for dup in &scan.duplicates {
        info!("   {} ({} excess)", dup.value, dup.excess);
    }

    // Resolve and rewrite in memory first; the file on disk is not
    // touched until a rewrite actually changed something.
    let mut removed_nodes = 0;
    let mut redirected_links = 0;
    for dup in &scan.duplicates {
        let group = resolve_group(&doc, &dup.value);
        if group.is_noop() {
            // ResolutionGap: the duplicate has no traceable structural
            // anchor. Expected in partially corrupted documents.
            warn!(
                file = %path.display(),
                value = %dup.value,
                "duplicate has no structural anchor, skipping"
            );
            continue;
        }
        let outcome = apply_group(&mut doc, &group);
        removed_nodes += outcome.removed_nodes;
        redirected_links += outcome.redirected_links;
    }

    if removed_nodes == 0 && redirected_links == 0 {
        warn!(
            file = %path.display(),
            "duplicates present but nothing could be repaired, leaving file as is"
        );
        return Ok(Outcome::Unrepairable(scan));
    }

    // Backup before the original is overwritten; failure aborts the pass.
    let backup_path = backup::create_backup(path, &original)?;

    let renumbered_entries = renumber_order(&mut doc);

    let output = xml::to_xml_string(&doc);
    std::fs::write(path, output).map_err(|e| MetsfixError::Save {
        path: path.display().to_string(),
        backup: backup_path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(
        file = %path.display(),
        removed_nodes,
        redirected_links,
        "document repaired and saved"
    );
    Ok(Outcome::Repaired(FileRepair {
        path: path.to_path_buf(),
        parent_id: parent_directory_name(path),
        duplicates: scan.duplicates,
        removed_nodes,
        redirected_links,
        renumbered_entries,
        backup_path,
    }))
}

fn parent_directory_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

// ─── Tests ─────────────────────────────────────────────────
