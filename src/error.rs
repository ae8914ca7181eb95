//src/error.rs

use std::path::PathBuf;

/// Errors raised while building or reporting hit tables.
#[derive(thiserror::Error, Debug)]
pub enum HitError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A BLAST row that cannot be parsed. `row` is 1-based within the sample.
    #[error("malformed BLAST row {row} in sample {sample}: {reason}")]
    MalformedRow {
        sample: String,
        row: usize,
        reason: String,
    },

    /// A sample was added to the store twice; the driving loop is broken.
    #[error("sample {0} has already been added to the hit store")]
    DuplicateSample(String),

    /// A query identifier that cannot name a file inside the output directory.
    #[error("query identifier '{0}' cannot be used as an output file name")]
    InvalidQueryId(String),

    #[error("no samples found to compile")]
    NoSamples,

    #[error("cannot build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl HitError {
    /// Wraps an I/O error together with the path that caused it.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        HitError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HitError>;
