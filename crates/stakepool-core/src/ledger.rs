//! Per-owner deposit lots.
//!
//! Each owner has an ordered list of [`Lot`]s, oldest first. A lot is
//! addressed by `(owner, index)` for the life of the ledger: draining a lot
//! zeroes it in place and never shifts later indices.
//!
//! Withdrawals drain FIFO. They are computed as a [`DrainPlan`] against the
//! current lots and applied in a separate step, so callers can price the
//! visited lots before anything is mutated.

use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::types::{Address, Amount, Lot, Timestamp};

/// One lot visited by a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotDraw {
    /// Index of the lot within the owner's account.
    pub index: usize,
    /// Amount taken out of the lot. May be zero for a claim-only visit.
    pub taken: Amount,
}

/// FIFO withdrawal computed against an owner's lots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainPlan {
    /// Amount the caller asked for.
    pub requested: Amount,
    /// Amount actually withdrawn: `min(requested, balance)`.
    pub withdrawn: Amount,
    /// Visited lots in visiting order.
    pub draws: Vec<LotDraw>,
}

/// Arena of deposit lots keyed by owner.
#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    accounts: BTreeMap<Address, Vec<Lot>>,
}

impl StakeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self { accounts: BTreeMap::new() }
    }

    /// Append a lot to `owner`'s account and return its index.
    pub fn push_lot(&mut self, owner: &Address, amount: Amount, timestamp: Timestamp) -> usize {
        let lots = self.accounts.entry(*owner).or_default();
        lots.push(Lot::new(amount, timestamp));
        lots.len() - 1
    }

    /// All lots of `owner`, oldest first. Empty for unknown owners.
    pub fn lots(&self, owner: &Address) -> &[Lot] {
        self.accounts.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The lot at `index` in `owner`'s account.
    ///
    /// # Errors
    ///
    /// [`LedgerError::LotIndexOutOfRange`] if the owner has no such lot.
    pub fn lot(&self, owner: &Address, index: usize) -> Result<Lot, LedgerError> {
        let lots = self.lots(owner);
        lots.get(index).copied().ok_or(LedgerError::LotIndexOutOfRange {
            owner: *owner,
            index,
            len: lots.len(),
        })
    }

    /// Number of lots ever created for `owner`, drained ones included.
    pub fn lot_count(&self, owner: &Address) -> usize {
        self.lots(owner).len()
    }

    /// Sum of `owner`'s lot amounts.
    pub fn balance(&self, owner: &Address) -> Result<Amount, LedgerError> {
        sum_lots(self.lots(owner))
    }

    /// Sum of every lot of every owner.
    pub fn total(&self) -> Result<Amount, LedgerError> {
        self.accounts.values().try_fold(0 as Amount, |acc, lots| {
            acc.checked_add(sum_lots(lots)?).ok_or(LedgerError::ArithmeticOverflow)
        })
    }

    /// Every owner that has ever deposited, in address order.
    pub fn owners(&self) -> impl Iterator<Item = &Address> {
        self.accounts.keys()
    }

    /// Restart accrual of every lot of `owner` at `now`. Amounts are unchanged.
    pub fn reset_timestamps(&mut self, owner: &Address, now: Timestamp) {
        if let Some(lots) = self.accounts.get_mut(owner) {
            for lot in lots.iter_mut() {
                lot.timestamp = now;
            }
        }
    }

    /// Compute a FIFO withdrawal of up to `requested` from `owner`.
    ///
    /// Empty lots are skipped. Each non-empty lot is visited in order and
    /// gives up `min(lot.amount, remaining)`; visiting stops as soon as the
    /// remaining amount reaches zero. A zero request therefore visits only
    /// the first non-empty lot.
    pub fn plan_drain(&self, owner: &Address, requested: Amount) -> Result<DrainPlan, LedgerError> {
        let lots = self.lots(owner);
        let withdrawn = requested.min(sum_lots(lots)?);
        let mut remaining = withdrawn;
        let mut draws = Vec::new();

        for (index, lot) in lots.iter().enumerate() {
            if lot.is_empty() {
                continue;
            }
            let taken = lot.amount.min(remaining);
            remaining -= taken;
            draws.push(LotDraw { index, taken });
            if remaining == 0 {
                break;
            }
        }

        Ok(DrainPlan { requested, withdrawn, draws })
    }

    /// Apply a plan produced by [`plan_drain`](Self::plan_drain) for the
    /// same owner against the same lots.
    ///
    /// Every visited lot loses its `taken` amount and restarts accrual at
    /// `now`.
    pub fn apply_drain(&mut self, owner: &Address, plan: &DrainPlan, now: Timestamp) {
        let Some(lots) = self.accounts.get_mut(owner) else {
            return;
        };
        for draw in &plan.draws {
            if let Some(lot) = lots.get_mut(draw.index) {
                lot.amount -= draw.taken.min(lot.amount);
                lot.timestamp = now;
            }
        }
    }

    /// Copy of `owner`'s lots, for undoing a failed operation.
    pub fn snapshot(&self, owner: &Address) -> Vec<Lot> {
        self.lots(owner).to_vec()
    }

    /// Replace `owner`'s lots with a snapshot taken earlier in the same
    /// operation.
    pub fn restore(&mut self, owner: &Address, lots: Vec<Lot>) {
        if lots.is_empty() {
            self.accounts.remove(owner);
        } else {
            self.accounts.insert(*owner, lots);
        }
    }
}

fn sum_lots(lots: &[Lot]) -> Result<Amount, LedgerError> {
    lots.iter().try_fold(0 as Amount, |acc, lot| {
        acc.checked_add(lot.amount).ok_or(LedgerError::ArithmeticOverflow)
    })
}
