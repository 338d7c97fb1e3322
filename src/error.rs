use std::io;

use derive_more::{Display, Error};

/// Errors returned by fallible network operations.
///
/// Success is `Ok(())`; callers must check the result before using the network.
#[derive(Debug, Display, Error)]
pub enum DiwaError {
    #[display("invalid parameter values: {reason}")]
    InvalidParamValues {
        #[error(not(source))]
        reason: String,
    },
    #[display("failed to read model: {source}")]
    ModelReadError { source: io::Error },
    #[display("failed to save model: {source}")]
    ModelSaveError { source: io::Error },
    #[display("invalid magic number {found:?}, expected `diwa`")]
    InvalidMagicNumber {
        #[error(not(source))]
        found: [u8; 4],
    },
    #[display("stream is not open")]
    StreamNotOpen,
    /// Raised when a buffer of `n_floats` values cannot be obtained.
    #[display("failed to allocate {n_floats} floats")]
    AllocationFailed {
        #[error(not(source))]
        n_floats: usize,
    },
    /// Raised by host integrations when a required platform capability is missing
    /// (e.g. external RAM on a microcontroller).
    #[display("platform precondition unmet: {requirement}")]
    PlatformPreconditionUnmet {
        #[error(not(source))]
        requirement: &'static str,
    },
}

impl DiwaError {
    pub(crate) fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParamValues {
            reason: reason.into(),
        }
    }
}

pub type DiwaResult<T> = Result<T, DiwaError>;
