//! Backup creation and cleanup.
//!
//! A repair never mutates a file before a verified byte-identical copy
//! exists next to it. Backup names follow the original tool's scheme:
//! `meta.xml` → `meta_20240131_154210123.xml`.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, trace};

use crate::error::{MetsfixError, Result};

/// Write a timestamped sibling copy of `path` containing `original`,
/// then read it back and verify the bytes match. Any failure here means
/// the caller must not mutate the original (fail closed).
pub fn create_backup(path: &Path, original: &[u8]) -> Result<PathBuf> {
    let backup_path = backup_path_for(path);
    if backup_path.exists() {
        return Err(MetsfixError::Backup {
            path: path.display().to_string(),
            reason: format!("backup target already exists: {}", backup_path.display()),
        });
    }

    std::fs::write(&backup_path, original).map_err(|e| MetsfixError::Backup {
        path: path.display().to_string(),
        reason: format!("could not write {}: {e}", backup_path.display()),
    })?;
    let written = std::fs::read(&backup_path).map_err(|e| MetsfixError::Backup {
        path: path.display().to_string(),
        reason: format!("could not read back {}: {e}", backup_path.display()),
    })?;
    if written != original {
        return Err(MetsfixError::Backup {
            path: path.display().to_string(),
            reason: format!(
                "backup content differs from original: {}",
                backup_path.display()
            ),
        });
    }

    debug!(backup = %backup_path.display(), "backup created and verified");
    Ok(backup_path)
}

fn backup_path_for(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S%3f");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "meta".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}"),
    };
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Whether a file name looks like a backup of the given metadata file:
/// same stem and extension with a purely numeric timestamp part between,
/// e.g. `meta_20240131_154210123.xml` for `meta.xml`.
pub fn is_backup_file(file_name: &str, meta_filename: &str) -> bool {
    let (stem, ext) = match meta_filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (meta_filename, ""),
    };

    let Some(rest) = file_name.strip_prefix(stem) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix('_') else {
        return false;
    };
    let middle = if ext.is_empty() {
        rest
    } else {
        match rest.strip_suffix(ext).and_then(|r| r.strip_suffix('.')) {
            Some(middle) => middle,
            None => return false,
        }
    };
    !middle.is_empty() && middle.chars().all(|c| c.is_ascii_digit() || c == '_')
}

/// Recursively delete backup files under `root`. Returns how many were
/// removed.
pub fn cleanup_backups(root: &Path, meta_filename: &str) -> Result<usize> {
    if !root.is_dir() {
        return Err(MetsfixError::DirectoryNotFound(root.display().to_string()));
    }
    let mut removed = 0;
    cleanup_dir(root, meta_filename, &mut removed)?;
    Ok(removed)
}

fn cleanup_dir(dir: &Path, meta_filename: &str, removed: &mut usize) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            cleanup_dir(&path, meta_filename, removed)?;
        } else if path
            .file_name()
            .map(|n| is_backup_file(&n.to_string_lossy(), meta_filename))
            .unwrap_or(false)
        {
            trace!(file = %path.display(), "deleting backup file");
            std::fs::remove_file(&path)?;
            *removed += 1;
        }
    }
    Ok(())
}

// ─── Tests ─────────────────────────────────────────────────
