//! Istanbul Authorization Snapshots
//!
//! This crate folds block headers into versioned snapshots of the authorized
//! validator set for Istanbul BFT and QBFT chains.
//!
//! # Voting
//!
//! ```text
//! Every header carries one vote from its signer:
//!
//!   IBFT (legacy):  target = coinbase, intent = nonce (0xff..ff add, 0x00..00 drop)
//!   QBFT:           target + intent embedded in the RLP extra data
//!
//! A vote passes once it is backed by more than half of the validators.
//! All pending votes are discarded on checkpoint blocks (number % epoch == 0).
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use istanbul_snapshot::{
//!     DefaultValidatorSet, IstanbulConfig, MemoryDatabase, Snapshot, SnapshotStore,
//! };
//!
//! let config = IstanbulConfig::default();
//! let validator_set = DefaultValidatorSet::new(genesis_validators, config.proposer_policy());
//! let genesis = Snapshot::new(config.epoch, 0, genesis_hash, validator_set);
//! let next = genesis.apply(&headers, &recovery, config.consensus_mode())?;
//!
//! let store = SnapshotStore::new(MemoryDatabase::default());
//! store.store(&next)?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod config;
pub mod error;
pub mod extra;
pub mod recovery;
pub mod snapshot;
pub mod store;
pub mod vote;

pub use config::{ConfigError, ConsensusMode, IstanbulConfig};
pub use error::SnapshotError;
pub use extra::{QbftExtra, ValidatorVote};
pub use recovery::{RecoveryError, SignerRecovery};
pub use snapshot::{Snapshot, SnapshotRecord};
pub use store::{
    DatabaseError, MemoryDatabase, SnapshotDatabase, SnapshotStore, StoreError, snapshot_key,
};
pub use vote::{Tally, Vote};

pub use istanbul_validator::{
    DefaultValidatorSet, ProposerPolicy, ProposerPolicyId, ValidatorSet, ValidatorSortOrder,
};

/// Voting constants
pub mod constants {
    use alloy_primitives::B64;

    /// Default number of blocks after which pending votes are reset
    pub const DEFAULT_EPOCH: u64 = 30000;

    /// Legacy nonce voting to authorize the coinbase
    pub const NONCE_AUTH_VOTE: B64 = B64::new([0xff; 8]);

    /// Legacy nonce voting to deauthorize the coinbase
    pub const NONCE_DROP_VOTE: B64 = B64::new([0x00; 8]);

    /// QBFT vote type authorizing the recipient
    pub const QBFT_AUTH_VOTE: u8 = 0xff;

    /// QBFT vote type deauthorizing the recipient
    pub const QBFT_DROP_VOTE: u8 = 0x00;

    /// Database key prefix for persisted snapshots
    pub const SNAPSHOT_KEY_PREFIX: &[u8] = b"istanbul-snapshot";
}
