//! Proposer policies
//!
//! A policy is a persisted identifier (which rotation rule picks the next
//! proposer) plus the comparator used to keep the validator list ordered.
//! Only the identifier survives serialization.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use thiserror::Error;

/// Identifier of a proposer-rotation rule.
///
/// Persisted as a bare integer: `0` round-robin, `1` sticky.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub enum ProposerPolicyId {
    /// Proposer advances one slot after every block or round change.
    #[default]
    RoundRobin,
    /// Proposer stays until a round change forces a new one.
    Sticky,
}

impl From<ProposerPolicyId> for u64 {
    fn from(id: ProposerPolicyId) -> Self {
        match id {
            ProposerPolicyId::RoundRobin => 0,
            ProposerPolicyId::Sticky => 1,
        }
    }
}

impl TryFrom<u64> for ProposerPolicyId {
    type Error = UnknownProposerPolicy;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::RoundRobin),
            1 => Ok(Self::Sticky),
            other => Err(UnknownProposerPolicy(other)),
        }
    }
}

impl fmt::Display for ProposerPolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => f.write_str("round-robin"),
            Self::Sticky => f.write_str("sticky"),
        }
    }
}

/// A policy id that is not known to this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown proposer policy id {0}")]
pub struct UnknownProposerPolicy(pub u64);

/// Comparator that keeps a validator list in canonical order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidatorSortOrder {
    /// Compare the EIP-55 checksummed text of the addresses.
    #[default]
    ByString,
    /// Compare raw address bytes.
    ByByte,
}

impl ValidatorSortOrder {
    /// Compare two addresses under this order
    pub fn compare(&self, a: &Address, b: &Address) -> Ordering {
        match self {
            Self::ByString => a.to_checksum(None).cmp(&b.to_checksum(None)),
            Self::ByByte => a.cmp(b),
        }
    }

    /// Sort a list of addresses in place
    pub fn sort(&self, addresses: &mut [Address]) {
        match self {
            Self::ByString => addresses.sort_by_cached_key(|a| a.to_checksum(None)),
            Self::ByByte => addresses.sort_unstable(),
        }
    }
}

/// Proposer rotation rule plus list ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProposerPolicy {
    /// Rotation rule, persisted with the snapshot
    pub id: ProposerPolicyId,
    /// List ordering; not persisted
    pub by: ValidatorSortOrder,
}

impl ProposerPolicy {
    /// Policy with the canonical [`ValidatorSortOrder::ByString`] comparator.
    ///
    /// Snapshots are rebuilt through this constructor: the membership they
    /// carry is already decided, so only a concrete comparator is needed.
    pub const fn new(id: ProposerPolicyId) -> Self {
        Self { id, by: ValidatorSortOrder::ByString }
    }

    /// Override the list ordering
    pub const fn with_order(mut self, by: ValidatorSortOrder) -> Self {
        self.by = by;
        self
    }
}
