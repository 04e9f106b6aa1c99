//! Snapshot errors

use alloy_primitives::Address;
use thiserror::Error;

use crate::RecoveryError;

/// Errors that abort folding headers into a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Headers are not contiguous or do not extend the snapshot
    #[error("invalid voting chain")]
    InvalidVotingChain,

    /// Header signer is not an authorized validator
    #[error("unauthorized validator {0}")]
    Unauthorized(Address),

    /// Vote intent is neither authorize nor deauthorize
    #[error("invalid vote")]
    InvalidVote,

    /// QBFT extra data could not be decoded
    #[error("invalid extra data format: {0}")]
    InvalidExtraDataFormat(alloy_rlp::Error),

    /// Signer could not be recovered from the header
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}
