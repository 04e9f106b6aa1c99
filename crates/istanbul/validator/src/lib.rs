//! Istanbul Validator Sets
//!
//! This crate provides the validator-set capability consumed by the Istanbul
//! authorization snapshot, together with a reference implementation.
//!
//! # Ordering
//!
//! ```text
//! ValidatorSet
//! ├── membership: add / remove / lookup by address
//! ├── ordering:   ProposerPolicy.by (ByString | ByByte)
//! └── proposer:   ProposerPolicy.id (RoundRobin | Sticky)
//! ```
//!
//! The snapshot only ever talks to a set through [`ValidatorSet`]; the
//! proposer rotation of [`DefaultValidatorSet`] is used by block producers
//! and is never consulted while folding votes.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod policy;
pub mod set;
pub mod validator;

pub use policy::{ProposerPolicy, ProposerPolicyId, UnknownProposerPolicy, ValidatorSortOrder};
pub use set::ValidatorSet;
pub use validator::DefaultValidatorSet;
