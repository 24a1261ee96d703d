use std::path::{Path, PathBuf};

pub type ReelResult<T> = Result<T, ReelError>;

#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("geometry mismatch: expected {expected} bytes, got {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("{tool} exited with status {status}: {stderr}")]
    ExternalProcess {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("io error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`ReelError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Decode,
    Transform,
    GeometryMismatch,
    ExternalProcess,
    Io,
    Validation,
    Other,
}

impl ReelError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn external(
        tool: impl Into<String>,
        status: impl std::fmt::Display,
        stderr: impl AsRef<str>,
    ) -> Self {
        Self::ExternalProcess {
            tool: tool.into(),
            status: status.to_string(),
            stderr: stderr.as_ref().trim().to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Transform(_) => ErrorKind::Transform,
            Self::GeometryMismatch { .. } => ErrorKind::GeometryMismatch,
            Self::ExternalProcess { .. } => ErrorKind::ExternalProcess,
            Self::Io { .. } => ErrorKind::Io,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
