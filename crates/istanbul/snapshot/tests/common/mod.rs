//! Shared helpers for snapshot tests

#![allow(dead_code, unreachable_pub)]

use alloy_consensus::Header;
use alloy_primitives::{Address, B256, Bytes};
use istanbul_snapshot::{
    DefaultValidatorSet, ProposerPolicy, QbftExtra, RecoveryError, SignerRecovery, Snapshot,
    ValidatorSortOrder, ValidatorVote, constants,
};

/// Reads the legacy signer from the first 20 bytes of the extra data
#[derive(Debug, Default)]
pub struct TestRecovery;

impl SignerRecovery for TestRecovery {
    fn recover_from_signature(&self, header: &Header) -> Result<Address, RecoveryError> {
        header
            .extra_data
            .get(..20)
            .map(Address::from_slice)
            .ok_or(RecoveryError::MissingSignature)
    }
}

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn snapshot(epoch: u64, number: u64, validators: &[u8]) -> Snapshot {
    let policy = ProposerPolicy::default().with_order(ValidatorSortOrder::ByByte);
    let set = DefaultValidatorSet::new(validators.iter().copied().map(addr), policy);
    Snapshot::new(epoch, number, B256::repeat_byte(0xee), set)
}

pub fn legacy_header(number: u64, signer: u8, target: u8, authorize: bool) -> Header {
    Header {
        number,
        beneficiary: addr(target),
        nonce: if authorize { constants::NONCE_AUTH_VOTE } else { constants::NONCE_DROP_VOTE },
        extra_data: Bytes::copy_from_slice(addr(signer).as_slice()),
        ..Default::default()
    }
}

pub fn qbft_header(number: u64, proposer: u8, vote: Option<ValidatorVote>) -> Header {
    let extra = QbftExtra { vote, ..Default::default() };
    Header { number, beneficiary: addr(proposer), extra_data: extra.to_bytes(), ..Default::default() }
}
