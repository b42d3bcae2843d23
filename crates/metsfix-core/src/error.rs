use thiserror::Error;

/// All errors that can occur in metsfix-core.
///
/// Every variant is local to a single document or a single run; nothing
/// here is retried automatically.
#[derive(Debug, Error)]
pub enum MetsfixError {
    #[error("Not well-formed XML: {0}")]
    Parse(String),

    #[error("Backup could not be verified for {path}: {reason}")]
    Backup { path: String, reason: String },

    #[error("Could not save repaired document to {path} (original preserved at {backup}): {reason}")]
    Save {
        path: String,
        backup: String,
        reason: String,
    },

    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MetsfixError>;

// ─── Tests ─────────────────────────────────────────────────
