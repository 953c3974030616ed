//! Segmented reward accrual.
//!
//! A lot earns `reward_rate` per second, scaled by its share of the pool.
//! The pool total changes whenever anyone stakes or withdraws, so the share
//! is only constant between checkpoints. The reward of a lot is the sum over
//! every constant-total segment since its accrual start:
//!
//! ```text
//! reward = Σ  amount * reward_rate * (t_{i+1} - t_i) / total(t_i)
//! ```
//!
//! Each term is floored on its own. All arithmetic is checked `u128`.

use crate::checkpoint::PoolCheckpointLog;
use crate::error::LedgerError;
use crate::types::{Amount, Lot, Timestamp};

/// Reward integral over a checkpoint log at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardAccrual {
    reward_rate: Amount,
}

impl RewardAccrual {
    /// Create an accrual at `reward_rate`.
    pub fn new(reward_rate: Amount) -> Self {
        Self { reward_rate }
    }

    /// The configured rate.
    pub fn reward_rate(&self) -> Amount {
        self.reward_rate
    }

    /// Reward for `amount` held `duration` seconds in a pool of `total_staked`.
    ///
    /// Zero for an empty interval, an empty lot or an empty pool.
    pub fn segment_reward(
        &self,
        amount: Amount,
        duration: u64,
        total_staked: Amount,
    ) -> Result<Amount, LedgerError> {
        if duration == 0 || amount == 0 || total_staked == 0 {
            return Ok(0);
        }
        let weighted = amount
            .checked_mul(self.reward_rate)
            .and_then(|v| v.checked_mul(duration as Amount))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(weighted / total_staked)
    }

    /// Reward `lot` has accrued from its timestamp up to `as_of`.
    ///
    /// Pure: neither the lot nor the log is modified. Returns 0 when
    /// `as_of <= lot.timestamp`.
    pub fn pending_reward(
        &self,
        lot: &Lot,
        log: &PoolCheckpointLog,
        as_of: Timestamp,
    ) -> Result<Amount, LedgerError> {
        if lot.is_empty() {
            return Ok(0);
        }
        log.segments(lot.timestamp, as_of).try_fold(0 as Amount, |acc, seg| {
            let reward = self.segment_reward(lot.amount, seg.duration(), seg.total_staked)?;
            acc.checked_add(reward).ok_or(LedgerError::ArithmeticOverflow)
        })
    }

    /// Pending reward of each lot, in lot order.
    pub fn lot_rewards(
        &self,
        lots: &[Lot],
        log: &PoolCheckpointLog,
        as_of: Timestamp,
    ) -> Result<Vec<Amount>, LedgerError> {
        lots.iter()
            .map(|lot| self.pending_reward(lot, log, as_of))
            .collect()
    }

    /// Sum of the pending rewards of `lots`.
    pub fn total_reward(
        &self,
        lots: &[Lot],
        log: &PoolCheckpointLog,
        as_of: Timestamp,
    ) -> Result<Amount, LedgerError> {
        lots.iter().try_fold(0 as Amount, |acc, lot| {
            acc.checked_add(self.pending_reward(lot, log, as_of)?)
                .ok_or(LedgerError::ArithmeticOverflow)
        })
    }
}
