//! Reference validator set
//!
//! Validators are kept in a list ordered by the policy comparator. The
//! proposer is tracked alongside and rotated by [`DefaultValidatorSet::calc_proposer`].

use alloy_primitives::Address;

use crate::{ProposerPolicy, ProposerPolicyId, ValidatorSet};

/// The active validator set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultValidatorSet {
    /// Validator addresses in policy order
    validators: Vec<Address>,
    /// Ordering and rotation rule
    policy: ProposerPolicy,
    /// Current proposer
    proposer: Option<Address>,
}

impl DefaultValidatorSet {
    /// Create a validator set from a list of addresses.
    ///
    /// Duplicates are dropped and the first validator in policy order becomes
    /// the proposer.
    pub fn new(addresses: impl IntoIterator<Item = Address>, policy: ProposerPolicy) -> Self {
        let mut validators = Vec::new();
        for address in addresses {
            if !validators.contains(&address) {
                validators.push(address);
            }
        }
        policy.by.sort(&mut validators);

        let proposer = validators.first().copied();
        Self { validators, policy, proposer }
    }

    /// Get the validator at a position in policy order
    pub fn get_by_index(&self, index: usize) -> Option<Address> {
        self.validators.get(index).copied()
    }

    /// Get the current proposer
    pub const fn get_proposer(&self) -> Option<Address> {
        self.proposer
    }

    /// Check if an address is the current proposer
    pub fn is_proposer(&self, address: &Address) -> bool {
        self.proposer.as_ref() == Some(address)
    }

    /// Pick the proposer for `round` given the proposer of the previous block.
    ///
    /// `Address::ZERO` means there was no previous proposer.
    pub fn calc_proposer(&mut self, last_proposer: Address, round: u64) {
        if self.validators.is_empty() {
            self.proposer = None;
            return;
        }

        let len = self.validators.len() as u64;
        let round = round % len;
        let seed = if last_proposer.is_zero() {
            round
        } else {
            let offset = self
                .validators
                .iter()
                .position(|v| *v == last_proposer)
                .unwrap_or_default() as u64;
            match self.policy.id {
                ProposerPolicyId::RoundRobin => offset + round + 1,
                ProposerPolicyId::Sticky => offset + round,
            }
        };

        let pick = (seed % len) as usize;
        self.proposer = self.get_by_index(pick);
    }

    /// Maximum number of faulty validators tolerated
    pub const fn max_faulty(&self) -> usize {
        self.validators.len().saturating_sub(1) / 3
    }

    /// Number of commits needed for a quorum (ceil(2N/3))
    pub const fn quorum_size(&self) -> usize {
        (2 * self.validators.len()).div_ceil(3)
    }

    /// Check if the set is empty
    pub const fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ValidatorSet for DefaultValidatorSet {
    fn from_addresses(addresses: Vec<Address>, policy: ProposerPolicy) -> Self {
        Self::new(addresses, policy)
    }

    fn get_by_address(&self, address: &Address) -> Option<(usize, Address)> {
        self.validators.iter().position(|v| v == address).map(|i| (i, *address))
    }

    fn add_validator(&mut self, address: Address) -> bool {
        if self.validators.contains(&address) {
            return false;
        }
        self.validators.push(address);
        self.policy.by.sort(&mut self.validators);
        if self.proposer.is_none() {
            self.proposer = self.validators.first().copied();
        }
        true
    }

    fn remove_validator(&mut self, address: &Address) -> bool {
        let before = self.validators.len();
        self.validators.retain(|v| v != address);
        self.validators.len() != before
    }

    fn size(&self) -> usize {
        self.validators.len()
    }

    fn list(&self) -> Vec<Address> {
        self.validators.clone()
    }

    fn policy(&self) -> ProposerPolicy {
        self.policy
    }
}
