//! One-time pool seeding gate.
//!
//! The pool is inert until its owner funds it once. The gate owns the
//! `is_funded` flag and the authorization rules around it; moving tokens
//! and writing the first lot and checkpoint is the engine's job.

use stakepool_core::error::StakingError;
use stakepool_core::types::{Address, Amount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingGate {
    funder: Address,
    funded: bool,
}

impl FundingGate {
    /// A closed gate that only `funder` may open.
    pub fn new(funder: Address) -> Self {
        Self { funder, funded: false }
    }

    pub fn funder(&self) -> &Address {
        &self.funder
    }

    pub fn is_funded(&self) -> bool {
        self.funded
    }

    /// Validate an `initial_fund` call without changing anything.
    ///
    /// Checked in order: caller, already funded, zero amount.
    pub fn check(&self, caller: &Address, amount: Amount) -> Result<(), StakingError> {
        if caller != &self.funder {
            return Err(StakingError::Unauthorized(*caller));
        }
        if self.funded {
            return Err(StakingError::AlreadyFunded);
        }
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        Ok(())
    }

    /// Open the gate. Only call after a successful [`check`](Self::check)
    /// and once the seeding has been applied.
    pub fn mark_funded(&mut self) {
        self.funded = true;
    }

    /// Fail with [`StakingError::NotAlreadyFunded`] while the gate is closed.
    pub fn require_funded(&self) -> Result<(), StakingError> {
        if self.funded { Ok(()) } else { Err(StakingError::NotAlreadyFunded) }
    }
}
