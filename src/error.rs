//! Errors surfaced by a `split` call.
//!
//! Every failure aborts the whole call; no partial piece list is returned.

use crate::acquire::AcquisitionError;
use crate::imaging::{BackendError, EncodingError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Image acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error("Drawing surface unavailable: cannot allocate {width}x{height} pixels")]
    ContextUnavailable { width: u32, height: u32 },
    #[error("Pixel sampling failed: {0}")]
    Sampling(BackendError),
    #[error("Encoding piece at row {row}, col {col} failed: {source}")]
    Encoding {
        row: u32,
        col: u32,
        #[source]
        source: EncodingError,
    },
}

impl From<BackendError> for SplitError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Allocation { width, height } => {
                SplitError::ContextUnavailable { width, height }
            }
            other => SplitError::Sampling(other),
        }
    }
}
