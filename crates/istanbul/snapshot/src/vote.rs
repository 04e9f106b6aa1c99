//! Votes and tallies

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// A vote an authorized validator cast to change the authorization list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    /// Validator who cast the vote
    pub validator: Address,
    /// Block number the vote was cast in
    pub block: u64,
    /// Account being voted on
    pub address: Address,
    /// Whether to authorize or deauthorize the account
    pub authorize: bool,
}

/// Running score of the votes on one account.
///
/// Only votes backing the proposal are counted; voting against it is the
/// same as not voting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    /// Whether the proposal is to authorize or to kick the account
    pub authorize: bool,
    /// Number of votes backing the proposal
    pub votes: usize,
}

impl Tally {
    /// A tally holding a single vote
    pub const fn new(authorize: bool) -> Self {
        Self { authorize, votes: 1 }
    }
}
