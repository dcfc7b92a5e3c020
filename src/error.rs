use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: malformed CSV: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: row {row}: column '{column}' has invalid value '{value}'", path.display())]
    InvalidValue {
        path: PathBuf,
        row: u64,
        column: String,
        value: String,
    },

    #[error("{}: record {id}: '{column}' = {value} is outside {expected}", path.display())]
    OutOfDomain {
        path: PathBuf,
        id: u64,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{}: no records to aggregate", path.display())]
    EmptyDataset { path: PathBuf },

    #[error("failed to render chart {}: {message}", path.display())]
    Chart { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`] variants, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File missing, unreadable, or unwritable.
    Io,
    /// Expected column absent or holding a value of the wrong type.
    Schema,
    /// Value outside its declared range in data that should already be clean.
    Domain,
    /// Chart rendering or summary serialization failed.
    Render,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Read { .. } | Error::Write { .. } => ErrorKind::Io,
            Error::Csv { source, .. } if source.is_io_error() => ErrorKind::Io,
            Error::Csv { .. } | Error::MissingColumn { .. } | Error::InvalidValue { .. } => {
                ErrorKind::Schema
            }
            Error::OutOfDomain { .. } | Error::EmptyDataset { .. } => ErrorKind::Domain,
            Error::Chart { .. } | Error::Serialization(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}
