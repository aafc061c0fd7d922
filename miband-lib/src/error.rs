use std::array::TryFromSliceError;
use thiserror::Error;

use crate::session::ActivitySession;

/// The primary error type for the `miband-lib` library.
#[derive(Error, Debug)]
pub enum MiBandError {
    #[error("Invalid device address {0:?}: expected 12 hex digits")]
    InvalidAddress(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout waiting for the band: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Activity transfer aborted: notification stream closed before the final header")]
    TransferAborted,

    /// The transfer was received but writing an acknowledgment failed.
    /// The session keeps every decoded segment and the unsent acknowledgments.
    #[error("Acknowledgment failed with {} unsent: {source}", .session.pending_acknowledgments().len())]
    AcknowledgmentFailed {
        session: Box<ActivitySession>,
        #[source]
        source: Box<MiBandError>,
    },

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<TryFromSliceError> for MiBandError {
    fn from(_: TryFromSliceError) -> Self {
        MiBandError::InvalidPayload("Failed to convert slice to array".to_string())
    }
}
