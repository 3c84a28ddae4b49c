use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FtgsError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error in {context}: {reason}")]
    Parse { context: String, reason: String },
    #[error("schema error: {0}")]
    Schema(String),
    #[error("precondition violated: {0}")]
    Precondition(String),
}

impl FtgsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FtgsError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(context: impl Into<String>, reason: impl Into<String>) -> Self {
        FtgsError::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        FtgsError::Schema(reason.into())
    }

    pub fn precondition(reason: impl Into<String>) -> Self {
        FtgsError::Precondition(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, FtgsError>;
