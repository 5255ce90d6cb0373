use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an extraction, load or emission pass.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),
    #[error("index document {} is missing", .0.display())]
    MissingIndex(PathBuf),
    #[error("malformed document {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StructuralError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Read a whole file, mapping failures to [`StructuralError::Io`].
pub(crate) fn read_file(path: &std::path::Path) -> Result<String, StructuralError> {
    std::fs::read_to_string(path).map_err(|err| StructuralError::io(path, err))
}
