//! Authorization voting snapshots
//!
//! A [`Snapshot`] is the state of validator authorization voting at a given
//! block. New snapshots are produced by [`Snapshot::apply`], which folds a
//! run of headers into a copy of the receiver; a returned snapshot is never
//! mutated again.

use alloy_consensus::Header;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

use crate::{
    ConsensusMode, DefaultValidatorSet, ProposerPolicy, ProposerPolicyId, QbftExtra,
    SignerRecovery, SnapshotError, Tally, ValidatorSet, ValidatorVote, Vote, constants,
};

/// How a single header encodes its vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteEncoding {
    /// Signer from the seal, target in the coinbase, intent in the nonce
    Legacy,
    /// Signer in the coinbase, target and intent in the extra data
    Qbft,
}

impl VoteEncoding {
    const fn for_header(mode: ConsensusMode, number: u64) -> Self {
        if mode.is_qbft(number) { Self::Qbft } else { Self::Legacy }
    }
}

/// A vote extracted from a header, before it is tallied
#[derive(Debug, Clone, Copy)]
struct Ballot {
    signer: Address,
    target: Address,
    authorize: bool,
}

/// State of authorization voting at a given block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<V = DefaultValidatorSet> {
    /// Blocks between checkpoints that reset pending votes
    epoch: u64,
    /// Block number the snapshot was created at
    number: u64,
    /// Block hash the snapshot was created at
    hash: B256,
    /// Votes in chronological order
    votes: Vec<Vote>,
    /// Current tally, derived from `votes`
    tally: BTreeMap<Address, Tally>,
    /// Authorized validators
    validator_set: V,
}

impl<V: ValidatorSet> Snapshot<V> {
    /// Create a snapshot with no pending votes.
    ///
    /// Only use this for the genesis block or a trusted checkpoint.
    pub const fn new(epoch: u64, number: u64, hash: B256, validator_set: V) -> Self {
        Self { epoch, number, hash, votes: Vec::new(), tally: BTreeMap::new(), validator_set }
    }

    /// Blocks between vote resets
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Block number of this snapshot
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Block hash of this snapshot
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Pending votes, oldest first
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Pending tally per voted account
    pub const fn tally(&self) -> &BTreeMap<Address, Tally> {
        &self.tally
    }

    /// The authorized validator set
    pub const fn validator_set(&self) -> &V {
        &self.validator_set
    }

    /// Authorized validators in ascending byte order
    pub fn validators(&self) -> Vec<Address> {
        let mut validators = self.validator_set.list();
        validators.sort_unstable();
        validators
    }

    /// Replace the epoch length, keeping everything else
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Check if a vote would change the current authorization state
    pub fn check_vote(&self, address: &Address, authorize: bool) -> bool {
        self.validator_set.contains(address) != authorize
    }

    /// Rebuild the tally from the vote log
    pub fn recompute_tally(&self) -> BTreeMap<Address, Tally> {
        let mut tally = BTreeMap::new();
        for vote in &self.votes {
            tally
                .entry(vote.address)
                .and_modify(|t: &mut Tally| t.votes += 1)
                .or_insert_with(|| Tally::new(vote.authorize));
        }
        tally
    }

    /// Create a new snapshot by folding `headers` into a copy of this one.
    ///
    /// The headers must be contiguous and start right after this snapshot.
    /// Any error discards the whole run.
    pub fn apply<R: SignerRecovery>(
        &self,
        headers: &[Header],
        recovery: &R,
        mode: ConsensusMode,
    ) -> Result<Self, SnapshotError> {
        let Some(last) = headers.last() else {
            return Ok(self.copy());
        };

        if headers.windows(2).any(|pair| pair[0].number.checked_add(1) != Some(pair[1].number)) {
            return Err(SnapshotError::InvalidVotingChain);
        }
        if self.number.checked_add(1) != Some(headers[0].number) {
            return Err(SnapshotError::InvalidVotingChain);
        }

        let mut snap = self.copy();
        for header in headers {
            let encoding = VoteEncoding::for_header(mode, header.number);
            snap.fold_header(header, recovery, encoding)?;
        }
        snap.number = last.number;
        snap.hash = last.hash_slow();

        trace!(
            target: "istanbul::snapshot",
            number = snap.number,
            hash = %snap.hash,
            headers = headers.len(),
            "Applied headers to snapshot"
        );
        Ok(snap)
    }

    /// Deep copy of the set and tally; votes are plain values
    fn copy(&self) -> Self {
        Self {
            epoch: self.epoch,
            number: self.number,
            hash: self.hash,
            votes: self.votes.clone(),
            tally: self.tally.clone(),
            validator_set: self.validator_set.copy(),
        }
    }

    fn fold_header<R: SignerRecovery>(
        &mut self,
        header: &Header,
        recovery: &R,
        encoding: VoteEncoding,
    ) -> Result<(), SnapshotError> {
        let number = header.number;

        // Remove any votes on checkpoint blocks
        if number.is_multiple_of(self.epoch) {
            trace!(target: "istanbul::snapshot", number, "Checkpoint block, resetting votes");
            self.votes.clear();
            self.tally.clear();
        }

        let ballot = self.ballot(header, recovery, encoding)?;
        self.tally_vote(ballot, number);
        Ok(())
    }

    /// Resolve the signer and its vote from a header
    fn ballot<R: SignerRecovery>(
        &self,
        header: &Header,
        recovery: &R,
        encoding: VoteEncoding,
    ) -> Result<Ballot, SnapshotError> {
        let signer = match encoding {
            VoteEncoding::Legacy => recovery.recover_from_signature(header)?,
            VoteEncoding::Qbft => recovery.recover_from_coinbase(header)?,
        };
        if !self.validator_set.contains(&signer) {
            return Err(SnapshotError::Unauthorized(signer));
        }

        let (target, authorize) = match encoding {
            VoteEncoding::Legacy => {
                let authorize = if header.nonce == constants::NONCE_AUTH_VOTE {
                    true
                } else if header.nonce == constants::NONCE_DROP_VOTE {
                    false
                } else {
                    return Err(SnapshotError::InvalidVote);
                };
                (header.beneficiary, authorize)
            }
            VoteEncoding::Qbft => {
                let extra =
                    QbftExtra::from_header(header).map_err(SnapshotError::InvalidExtraDataFormat)?;
                // A header without a vote counts as a drop vote on the zero address
                let vote = extra.vote.unwrap_or(ValidatorVote::deauthorize(Address::ZERO));
                let authorize = vote.intent().ok_or(SnapshotError::InvalidVote)?;
                (vote.recipient_address, authorize)
            }
        };

        Ok(Ballot { signer, target, authorize })
    }

    /// Record a vote and resolve the target once a majority backs it
    fn tally_vote(&mut self, ballot: Ballot, number: u64) {
        let Ballot { signer, target, authorize } = ballot;

        // Discard any previous vote from the signer on the same account
        if let Some(pos) =
            self.votes.iter().position(|vote| vote.validator == signer && vote.address == target)
        {
            let previous = self.votes.remove(pos);
            self.uncast(&previous.address, previous.authorize);
        }

        if self.cast(target, authorize) {
            self.votes.push(Vote { validator: signer, block: number, address: target, authorize });
            debug!(
                target: "istanbul::snapshot",
                %signer,
                %target,
                authorize,
                number,
                "Vote cast"
            );
        }

        let Some(tally) = self.tally.get(&target).copied() else {
            return;
        };
        if tally.votes <= self.validator_set.size() / 2 {
            return;
        }

        if tally.authorize {
            self.validator_set.add_validator(target);
            info!(target: "istanbul::snapshot", validator = %target, number, "Validator authorized");
        } else {
            self.validator_set.remove_validator(&target);

            // Discard any previous votes the deauthorized validator cast
            let (revoked, kept): (Vec<_>, Vec<_>) =
                std::mem::take(&mut self.votes).into_iter().partition(|vote| vote.validator == target);
            self.votes = kept;
            for vote in &revoked {
                self.uncast(&vote.address, vote.authorize);
            }
            info!(
                target: "istanbul::snapshot",
                validator = %target,
                number,
                revoked = revoked.len(),
                "Validator deauthorized"
            );
        }

        // The account is decided, no vote on it stays pending
        self.votes.retain(|vote| vote.address != target);
        self.tally.remove(&target);
    }

    /// Add a vote to the tally. Returns `false` if the vote is meaningless
    /// or conflicts with the pending proposal on the account.
    fn cast(&mut self, address: Address, authorize: bool) -> bool {
        if !self.check_vote(&address, authorize) {
            return false;
        }
        match self.tally.get_mut(&address) {
            Some(tally) if tally.authorize != authorize => false,
            Some(tally) => {
                tally.votes += 1;
                true
            }
            None => {
                self.tally.insert(address, Tally::new(authorize));
                true
            }
        }
    }

    /// Remove a previously cast vote from the tally
    fn uncast(&mut self, address: &Address, authorize: bool) -> bool {
        // Dangling vote, nothing to revert
        let Some(tally) = self.tally.get_mut(address) else {
            return false;
        };
        // Only revert counted votes
        if tally.authorize != authorize {
            return false;
        }
        if tally.votes > 1 {
            tally.votes -= 1;
        } else {
            self.tally.remove(address);
        }
        true
    }
}

/// Persisted form of a [`Snapshot`]
///
/// The validator set is flattened to its sorted address list and policy id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Epoch length at the time of storing
    pub epoch: u64,
    /// Block number
    pub number: u64,
    /// Block hash
    pub hash: B256,
    /// Votes in chronological order
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: Vec<Vote>,
    /// Tally per voted account
    #[serde(default, deserialize_with = "null_as_default")]
    pub tally: BTreeMap<Address, Tally>,
    /// Validators in ascending byte order
    pub validators: Vec<Address>,
    /// Proposer policy id
    pub policy: ProposerPolicyId,
}

impl<V: ValidatorSet> From<&Snapshot<V>> for SnapshotRecord {
    fn from(snap: &Snapshot<V>) -> Self {
        Self {
            epoch: snap.epoch,
            number: snap.number,
            hash: snap.hash,
            votes: snap.votes.clone(),
            tally: snap.tally.clone(),
            validators: snap.validators(),
            policy: snap.validator_set.policy().id,
        }
    }
}

impl<V: ValidatorSet> From<SnapshotRecord> for Snapshot<V> {
    fn from(record: SnapshotRecord) -> Self {
        // Membership is already decided, so the canonical string order is
        // fine whatever comparator the set was originally built with.
        let policy = ProposerPolicy::new(record.policy);
        Self {
            epoch: record.epoch,
            number: record.number,
            hash: record.hash,
            votes: record.votes,
            tally: record.tally,
            validator_set: V::from_addresses(record.validators, policy),
        }
    }
}

impl<V: ValidatorSet> Serialize for Snapshot<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotRecord::from(self).serialize(serializer)
    }
}

impl<'de, V: ValidatorSet> Deserialize<'de> for Snapshot<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SnapshotRecord::deserialize(deserializer).map(Into::into)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
