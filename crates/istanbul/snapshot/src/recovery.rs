//! Header signer recovery

use alloy_consensus::Header;
use alloy_primitives::Address;
use thiserror::Error;

/// Errors returned by a [`SignerRecovery`] implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    /// Header carries no seal
    #[error("missing signature in header extra data")]
    MissingSignature,

    /// Seal is present but does not recover to a key
    #[error("invalid header signature: {0}")]
    InvalidSignature(String),
}

/// Resolves the validator that produced a header.
///
/// IBFT headers are sealed by their proposer, so the signer comes from the
/// signature. QBFT headers name the proposer in the coinbase.
pub trait SignerRecovery {
    /// Recover the signer from the header seal
    fn recover_from_signature(&self, header: &Header) -> Result<Address, RecoveryError>;

    /// Recover the signer from the coinbase field
    fn recover_from_coinbase(&self, header: &Header) -> Result<Address, RecoveryError> {
        Ok(header.beneficiary)
    }
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for &T {
    fn recover_from_signature(&self, header: &Header) -> Result<Address, RecoveryError> {
        (**self).recover_from_signature(header)
    }

    fn recover_from_coinbase(&self, header: &Header) -> Result<Address, RecoveryError> {
        (**self).recover_from_coinbase(header)
    }
}
