//! Error types for exc.

use exc_common::CommonError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExcError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("package '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("invalid bundle {}: {reason}", path.display())]
    InvalidBundle { path: PathBuf, reason: String },

    #[error("missing info.json in {}", path.display())]
    MissingManifest { path: PathBuf },

    #[error("missing start.sh in {}", path.display())]
    MissingEntrypoint { path: PathBuf },

    #[error("invalid manifest {}: {reason}", path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("invalid package name '{name}'")]
    InvalidName { name: String },

    #[error("failed to launch '{command}': {source}")]
    Execution {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("package not found: {name}")]
    Unresolved { name: String },

    #[error("failed to read confirmation: {0}")]
    Prompt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExcError {
    pub(crate) fn invalid_manifest(path: impl Into<PathBuf>, err: CommonError) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn invalid_bundle(path: impl Into<PathBuf>, err: CommonError) -> Self {
        Self::InvalidBundle {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<CommonError> for ExcError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Io(err) => Self::Io(err),
            other => Self::Extraction {
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T, E = ExcError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_installed_display() {
        let err = ExcError::NotInstalled {
            name: "hello".to_string(),
        };
        assert_eq!(err.to_string(), "package 'hello' is not installed");
    }

    #[test]
    fn archive_error_maps_to_extraction() {
        let err: ExcError = CommonError::Archive("bad entry".to_string()).into();
        assert!(matches!(err, ExcError::Extraction { .. }));
        assert_eq!(err.to_string(), "extraction failed: archive error: bad entry");
    }

    #[test]
    fn io_error_stays_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExcError = CommonError::Io(io).into();
        assert!(matches!(err, ExcError::Io(_)));
    }
}
