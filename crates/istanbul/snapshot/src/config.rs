//! Istanbul consensus configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ProposerPolicy, ProposerPolicyId, constants};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Epoch must be positive
    #[error("epoch length must be greater than zero")]
    ZeroEpoch,

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How headers encode their authorization vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusMode {
    /// Every header uses the legacy nonce/coinbase encoding
    Ibft,
    /// Headers above `transition_block` carry a QBFT vote in their extra
    /// data; the others use the legacy encoding
    Qbft {
        /// Last block folded with the legacy encoding
        transition_block: u64,
    },
}

impl ConsensusMode {
    /// Check if the header at `number` carries a QBFT vote
    pub const fn is_qbft(&self, number: u64) -> bool {
        match self {
            Self::Ibft => false,
            Self::Qbft { transition_block } => number > *transition_block,
        }
    }
}

/// Istanbul configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IstanbulConfig {
    /// Blocks between vote resets
    pub epoch: u64,
    /// Proposer rotation rule for new validator sets
    pub policy: ProposerPolicyId,
    /// Block after which QBFT voting applies; `None` keeps legacy voting
    pub qbft_block: Option<u64>,
}

impl Default for IstanbulConfig {
    fn default() -> Self {
        Self { epoch: constants::DEFAULT_EPOCH, policy: ProposerPolicyId::RoundRobin, qbft_block: None }
    }
}

impl IstanbulConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.epoch == 0 {
            return Err(ConfigError::ZeroEpoch);
        }
        Ok(())
    }

    /// Proposer policy for validator sets built from this config
    pub const fn proposer_policy(&self) -> ProposerPolicy {
        ProposerPolicy::new(self.policy)
    }

    /// Voting mode implied by this config
    pub const fn consensus_mode(&self) -> ConsensusMode {
        match self.qbft_block {
            Some(transition_block) => ConsensusMode::Qbft { transition_block },
            None => ConsensusMode::Ibft,
        }
    }
}
