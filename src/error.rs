// src/error.rs

use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Everything that can go wrong between the endpoint and the rendered page.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure, refused connection or timeout.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered, but not with a 2xx.
    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    /// Body or file is not valid JSON.
    #[error("malformed JSON from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expected nested keys are absent or have the wrong type.
    #[error("unexpected document layout: {0}")]
    Schema(String),

    /// A row, or the series list, does not carry one value per indicator.
    #[error("shape mismatch at {at}: expected {expected} values, found {found}")]
    Shape {
        at: String,
        expected: usize,
        found: usize,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Short, stable name of the failure class, used in logs and on the failure page.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network { .. } => "network",
            Error::Status { .. } => "status",
            Error::Parse { .. } => "parse",
            Error::NotFound { .. } => "not_found",
            Error::Io { .. } => "io",
            Error::Schema(_) => "schema",
            Error::Shape { .. } => "shape",
            Error::Arrow(_) => "arrow",
            Error::Parquet(_) => "parquet",
            Error::Config(_) => "config",
        }
    }

    /// Map a file read failure, keeping a missing file distinct from other I/O errors.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound { path }
        } else {
            Error::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
