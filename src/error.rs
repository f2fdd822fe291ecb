use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the loader can surface.
///
/// Connection and DDL errors are fatal for the whole run. The rest are scoped
/// to the file being loaded; whether they stop the run is up to the
/// orchestrator's failure policy.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] DbErr),

    #[error("DDL statement failed ({statement}): {source}")]
    Ddl {
        statement: String,
        #[source]
        source: DbErr,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk data directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("malformed JSON in {} at line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} line {line}: NextSong record has no usable `{field}`", .path.display())]
    MissingField {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },

    #[error("{} line {line}: timestamp {ts} is out of range", .path.display())]
    InvalidTimestamp { path: PathBuf, line: usize, ts: i64 },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl EtlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtlError::Io {
            path: path.into(),
            source,
        }
    }
}
