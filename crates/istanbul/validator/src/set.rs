//! The validator-set capability

use alloy_primitives::Address;
use std::fmt::Debug;

use crate::ProposerPolicy;

/// An ordered set of authorized validator addresses.
///
/// `Clone` must produce an independent set: the snapshot copies its set
/// before folding headers and relies on the original staying untouched.
pub trait ValidatorSet: Clone + Debug {
    /// Build a set from a list of addresses and a policy
    fn from_addresses(addresses: Vec<Address>, policy: ProposerPolicy) -> Self;

    /// Position and address of a validator, if it is in the set
    fn get_by_address(&self, address: &Address) -> Option<(usize, Address)>;

    /// Add a validator. Returns `false` if it was already present.
    fn add_validator(&mut self, address: Address) -> bool;

    /// Remove a validator. Returns `false` if it was not present.
    fn remove_validator(&mut self, address: &Address) -> bool;

    /// Number of validators
    fn size(&self) -> usize;

    /// All validators in policy order
    fn list(&self) -> Vec<Address>;

    /// The proposer policy of this set
    fn policy(&self) -> ProposerPolicy;

    /// Independent copy of this set
    fn copy(&self) -> Self {
        self.clone()
    }

    /// Check if an address is a validator
    fn contains(&self, address: &Address) -> bool {
        self.get_by_address(address).is_some()
    }
}
