//! Cross-crate scenario and property tests for stakepool.
//!
//! Every test drives a full [`Deployment`](stakepool_engine::Deployment)
//! through its public operations and checks pool-level invariants.

pub mod helpers;
