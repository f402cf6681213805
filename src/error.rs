//! Error types for the autosplitter
//!
//! Errors stay inside the crate's internal layers. The host-facing
//! [`Autosplitter`](crate::Autosplitter) collapses every failure into a
//! `false` decision or an empty elapsed time.

use thiserror::Error;

/// Errors produced by catalog loading, detection and memory sampling
#[derive(Debug, Error)]
pub enum AutosplitterError {
    #[error("No candidate process is running")]
    ProcessNotFound,

    #[error("Executable hash {0} does not match any known version")]
    VersionUnknown(String),

    #[error("Failed to read field '{field}' at 0x{address:X}")]
    ReadFailed { field: String, address: usize },

    #[error("Field '{0}' is not part of the bound field table")]
    FieldMissing(String),

    #[error("Unknown title: {0}")]
    UnknownTitle(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AutosplitterError {
    /// Whether this error is a per-tick read failure that the next tick may recover from
    pub fn is_transient(&self) -> bool {
        matches!(self, AutosplitterError::ReadFailed { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AutosplitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_display() {
        let err = AutosplitterError::ReadFailed {
            field: "level_time".to_string(),
            address: 0x1400_0000,
        };
        let s = err.to_string();
        assert!(s.contains("level_time"));
        assert!(s.contains("0x14000000"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_non_transient() {
        assert!(!AutosplitterError::ProcessNotFound.is_transient());
        assert!(!AutosplitterError::VersionUnknown("ab".into()).is_transient());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AutosplitterError = io_err.into();
        assert!(matches!(err, AutosplitterError::Io(_)));
    }
}
