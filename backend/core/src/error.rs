use std::num::ParseFloatError;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for OCR log analysis.
#[derive(Debug, Error)]
pub enum OcrLogError {
    #[error("malformed score '{token}': {source}")]
    MalformedScore {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("invalid line pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("cannot read log file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, OcrLogError>;
