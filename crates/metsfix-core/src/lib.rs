//! Core library for metsfix: repairs METS-style digitization metadata
//! documents that carry duplicate references to the same scanned image.
//!
//! Pipeline per document: collect image references in document order,
//! detect repeats, resolve each duplicate to the FILEID/PHYSID entries
//! behind it, redirect structural links, remove the redundant entries,
//! renumber ORDER, and save — always behind a verified backup.

pub mod backup;
pub mod collect;
pub mod config;
pub mod detect;
pub mod error;
pub mod repair;
pub mod resolve;
pub mod rewrite;
pub mod run;
pub mod xml;

pub use config::RepairConfig;
pub use detect::{find_duplicates, Duplicate, DuplicateScan};
pub use error::{MetsfixError, Result};
pub use repair::{repair_file, scan_file, FileRepair, Outcome};
pub use run::{find_metadata_files, repair_tree, scan_tree, FileError, RunReport};
