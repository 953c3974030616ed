//! The staking engine.
//!
//! [`StakingEngine`] owns the whole pool aggregate: the funding gate, the
//! stake ledger, the checkpoint log and the running total. State-changing
//! operations take `&mut self` and are all-or-nothing:
//!
//! 1. **Checks**: gate, amount, token handles, clock, arithmetic.
//! 2. **Effects**: ledger, total and checkpoint log are updated.
//! 3. **Interactions**: token services are called last. If one fails, the
//!    effects are undone from an undo record taken in step 2.
//!
//! `stake` and `initial_fund` are the exception: they pull tokens before any
//! effect, so a failed pull leaves nothing to undo.

use std::sync::Arc;

use tracing::{debug, info, warn};

use stakepool_core::accrual::RewardAccrual;
use stakepool_core::checkpoint::PoolCheckpointLog;
use stakepool_core::error::{LedgerError, StakingError, TokenError, TokenKind};
use stakepool_core::ledger::StakeLedger;
use stakepool_core::traits::{Clock, RewardToken, TokenGateway};
use stakepool_core::types::{Address, Amount, Lot, PoolCheckpoint, Timestamp};

use crate::events::StakingEvent;
use crate::funding::FundingGate;

/// What a single lot gave up during a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotPayout {
    pub index: usize,
    /// Stake taken out of the lot.
    pub withdrawn: Amount,
    /// Reward the lot had accrued up to the withdrawal.
    pub reward: Amount,
}

/// Outcome of [`StakingEngine::withdraw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub requested: Amount,
    /// `min(requested, balance)`.
    pub withdrawn: Amount,
    /// Sum of the per-lot rewards, minted in one call.
    pub reward: Amount,
    /// Visited lots, oldest first.
    pub lots: Vec<LotPayout>,
}

/// Undo record for the effects phase of an operation.
struct Undo {
    owner: Address,
    lots: Vec<Lot>,
    total_staked: Amount,
    checkpoints_len: usize,
}

pub struct StakingEngine {
    address: Address,
    gate: FundingGate,
    ledger: StakeLedger,
    checkpoints: PoolCheckpointLog,
    total_staked: Amount,
    accrual: RewardAccrual,
    staking_token: Option<Arc<dyn TokenGateway>>,
    reward_token: Option<Arc<dyn RewardToken>>,
    clock: Arc<dyn Clock>,
    events: Vec<StakingEvent>,
}

impl std::fmt::Debug for StakingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StakingEngine")
            .field("address", &self.address)
            .field("owner", self.gate.funder())
            .field("is_funded", &self.gate.is_funded())
            .field("total_staked", &self.total_staked)
            .field("reward_rate", &self.accrual.reward_rate())
            .field("checkpoints", &self.checkpoints.len())
            .finish_non_exhaustive()
    }
}

impl StakingEngine {
    /// Create an unfunded engine at `address`, administered by `owner`.
    ///
    /// Both token handles start unset; see
    /// [`set_staking_token`](Self::set_staking_token) and
    /// [`set_reward_token`](Self::set_reward_token).
    pub fn new(address: Address, owner: Address, reward_rate: Amount, clock: Arc<dyn Clock>) -> Self {
        Self {
            address,
            gate: FundingGate::new(owner),
            ledger: StakeLedger::new(),
            checkpoints: PoolCheckpointLog::new(),
            total_staked: 0,
            accrual: RewardAccrual::new(reward_rate),
            staking_token: None,
            reward_token: None,
            clock,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Attach the stake asset. Owner only.
    pub fn set_staking_token(
        &mut self,
        caller: &Address,
        token: Arc<dyn TokenGateway>,
    ) -> Result<(), StakingError> {
        self.require_owner(caller)?;
        self.staking_token = Some(token);
        info!(engine = %self.address, "staking token set");
        Ok(())
    }

    /// Attach the reward asset. Owner only.
    pub fn set_reward_token(
        &mut self,
        caller: &Address,
        token: Arc<dyn RewardToken>,
    ) -> Result<(), StakingError> {
        self.require_owner(caller)?;
        self.reward_token = Some(token);
        info!(engine = %self.address, "reward token set");
        Ok(())
    }

    // ------------------------------------------------------------------
    // State-changing operations
    // ------------------------------------------------------------------

    /// Seed the pool with the owner's first lot. Succeeds exactly once.
    ///
    /// The caller must have approved the engine for `amount` of the stake
    /// asset.
    pub fn initial_fund(&mut self, caller: &Address, amount: Amount) -> Result<(), StakingError> {
        self.gate.check(caller, amount).inspect_err(|e| {
            warn!(caller = %caller, amount, error = %e, "initial fund rejected");
        })?;
        let token = Arc::clone(self.staking_token()?);
        let now = self.now()?;

        token.transfer_from(&self.address, caller, &self.address, amount)?;

        self.ledger.push_lot(caller, amount, now);
        self.total_staked = amount;
        self.checkpoints.append(now, amount)?;
        self.gate.mark_funded();

        info!(funder = %caller, amount, timestamp = now, "pool funded");
        self.events.push(StakingEvent::Funded { funder: *caller, amount, timestamp: now });
        Ok(())
    }

    /// Deposit `amount` of the stake asset as a new lot.
    pub fn stake(&mut self, caller: &Address, amount: Amount) -> Result<(), StakingError> {
        self.gate.require_funded()?;
        if amount == 0 {
            return Err(StakingError::InvalidAmount);
        }
        let token = Arc::clone(self.staking_token()?);
        let now = self.now()?;
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        token
            .transfer_from(&self.address, caller, &self.address, amount)
            .inspect_err(|e| warn!(owner = %caller, amount, error = %e, "stake pull failed"))?;

        let index = self.ledger.push_lot(caller, amount, now);
        self.total_staked = new_total;
        self.checkpoints.append(now, new_total)?;

        info!(owner = %caller, amount, index, total_staked = new_total, "staked");
        self.events.push(StakingEvent::Staked { owner: *caller, amount, timestamp: now });
        Ok(())
    }

    /// Withdraw up to `amount`, oldest lots first, paying out the rewards
    /// of every visited lot.
    ///
    /// Requests above the balance are capped. `amount == 0` claims the
    /// reward of the first non-empty lot and withdraws nothing.
    pub fn withdraw(&mut self, caller: &Address, amount: Amount) -> Result<Withdrawal, StakingError> {
        let stake_token = Arc::clone(self.staking_token()?);
        let reward_token = Arc::clone(self.reward_token()?);
        let now = self.now()?;

        let plan = self.ledger.plan_drain(caller, amount)?;
        let mut lots = Vec::with_capacity(plan.draws.len());
        let mut reward: Amount = 0;
        for draw in &plan.draws {
            let lot = self.ledger.lot(caller, draw.index)?;
            let lot_reward = self.accrual.pending_reward(&lot, &self.checkpoints, now)?;
            reward = reward.checked_add(lot_reward).ok_or(LedgerError::ArithmeticOverflow)?;
            debug!(owner = %caller, index = draw.index, taken = draw.taken, reward = lot_reward, "lot visited");
            lots.push(LotPayout { index: draw.index, withdrawn: draw.taken, reward: lot_reward });
        }
        let new_total = self
            .total_staked
            .checked_sub(plan.withdrawn)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let held = stake_token.balance_of(&self.address);
        if held < plan.withdrawn {
            return Err(TokenError::InsufficientBalance { have: held, need: plan.withdrawn }.into());
        }

        let undo = self.undo_record(caller);
        self.ledger.apply_drain(caller, &plan, now);
        if plan.withdrawn > 0 {
            self.total_staked = new_total;
            self.checkpoints.append(now, new_total)?;
        }

        if reward > 0 {
            if let Err(e) = reward_token.mint(&self.address, caller, reward) {
                warn!(owner = %caller, reward, error = %e, "reward mint failed, withdrawal undone");
                self.rollback(undo);
                return Err(e.into());
            }
        }
        if plan.withdrawn > 0 {
            if let Err(e) = stake_token.transfer(&self.address, caller, plan.withdrawn) {
                warn!(owner = %caller, amount = plan.withdrawn, error = %e, "stake payout failed, withdrawal undone");
                self.rollback(undo);
                return Err(e.into());
            }
        }

        info!(
            owner = %caller,
            requested = amount,
            withdrawn = plan.withdrawn,
            reward,
            total_staked = self.total_staked,
            "withdrawn"
        );
        self.events.push(StakingEvent::Withdrawn {
            owner: *caller,
            amount: plan.withdrawn,
            reward,
            timestamp: now,
        });
        Ok(Withdrawal { requested: amount, withdrawn: plan.withdrawn, reward, lots })
    }

    /// Pay out the pending reward of every lot of the caller and restart
    /// their accrual. Returns the amount minted; zero mints nothing.
    pub fn claim_rewards(&mut self, caller: &Address) -> Result<Amount, StakingError> {
        let reward_token = Arc::clone(self.reward_token()?);
        let now = self.now()?;
        let reward = self.accrual.total_reward(self.ledger.lots(caller), &self.checkpoints, now)?;

        let undo = self.undo_record(caller);
        self.ledger.reset_timestamps(caller, now);

        if reward > 0 {
            if let Err(e) = reward_token.mint(&self.address, caller, reward) {
                warn!(owner = %caller, reward, error = %e, "reward mint failed, claim undone");
                self.rollback(undo);
                return Err(e.into());
            }
        }

        info!(owner = %caller, reward, timestamp = now, "rewards claimed");
        self.events.push(StakingEvent::RewardsClaimed { owner: *caller, reward, timestamp: now });
        Ok(reward)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Pending reward of all of `owner`'s lots as of now.
    pub fn staker_rewards(&self, owner: &Address) -> Result<Amount, StakingError> {
        self.staker_rewards_at(owner, self.clock.now())
    }

    /// Pending reward of all of `owner`'s lots as of `as_of`.
    pub fn staker_rewards_at(&self, owner: &Address, as_of: Timestamp) -> Result<Amount, StakingError> {
        Ok(self.accrual.total_reward(self.ledger.lots(owner), &self.checkpoints, as_of)?)
    }

    /// Pending reward of each of `owner`'s lots as of now, in lot order.
    pub fn lot_rewards(&self, owner: &Address) -> Result<Vec<Amount>, StakingError> {
        Ok(self.accrual.lot_rewards(self.ledger.lots(owner), &self.checkpoints, self.clock.now())?)
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn is_funded(&self) -> bool {
        self.gate.is_funded()
    }

    pub fn lot_at(&self, owner: &Address, index: usize) -> Result<Lot, StakingError> {
        Ok(self.ledger.lot(owner, index)?)
    }

    pub fn lot_count(&self, owner: &Address) -> usize {
        self.ledger.lot_count(owner)
    }

    /// Sum of `owner`'s lot amounts.
    pub fn staked_balance(&self, owner: &Address) -> Result<Amount, StakingError> {
        Ok(self.ledger.balance(owner)?)
    }

    /// Every owner that has ever held a lot, in address order.
    pub fn stakers(&self) -> impl Iterator<Item = &Address> {
        self.ledger.owners()
    }

    pub fn checkpoints(&self) -> &[PoolCheckpoint] {
        self.checkpoints.as_slice()
    }

    pub fn reward_rate(&self) -> Amount {
        self.accrual.reward_rate()
    }

    pub fn owner(&self) -> &Address {
        self.gate.funder()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Notifications recorded so far, oldest first.
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Take the recorded notifications, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pool conservation: the running total equals both the sum of every lot
    /// and the latest checkpoint.
    pub fn audit(&self) -> bool {
        let Ok(lot_sum) = self.ledger.total() else {
            return false;
        };
        lot_sum == self.total_staked && self.checkpoints.latest_total() == self.total_staked
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_owner(&self, caller: &Address) -> Result<(), StakingError> {
        if caller != self.gate.funder() {
            warn!(caller = %caller, "unauthorized admin call");
            return Err(StakingError::Unauthorized(*caller));
        }
        Ok(())
    }

    fn staking_token(&self) -> Result<&Arc<dyn TokenGateway>, StakingError> {
        self.staking_token
            .as_ref()
            .ok_or(StakingError::TokenNotConfigured(TokenKind::Stake))
    }

    fn reward_token(&self) -> Result<&Arc<dyn RewardToken>, StakingError> {
        self.reward_token
            .as_ref()
            .ok_or(StakingError::TokenNotConfigured(TokenKind::Reward))
    }

    /// Read the clock, rejecting readings before the latest checkpoint.
    fn now(&self) -> Result<Timestamp, StakingError> {
        let now = self.clock.now();
        self.checkpoints.check_time(now)?;
        Ok(now)
    }

    fn undo_record(&self, owner: &Address) -> Undo {
        Undo {
            owner: *owner,
            lots: self.ledger.snapshot(owner),
            total_staked: self.total_staked,
            checkpoints_len: self.checkpoints.len(),
        }
    }

    fn rollback(&mut self, undo: Undo) {
        self.ledger.restore(&undo.owner, undo.lots);
        self.total_staked = undo.total_staked;
        self.checkpoints.rollback_to(undo.checkpoints_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::token::MemoryToken;

    const RATE: Amount = 1_000_000;
    const P: Amount = 1_000;

    fn owner() -> Address {
        Address::repeat(0x0A)
    }

    fn engine_addr() -> Address {
        Address::repeat(0xEE)
    }

    fn alice() -> Address {
        Address::repeat(0xA1)
    }

    struct Fixture {
        engine: StakingEngine,
        stake: Arc<MemoryToken>,
        reward: Arc<MemoryToken>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(1_000));
        let stake = Arc::new(MemoryToken::with_premint("STK", &owner(), 1_000_000));
        let reward = Arc::new(MemoryToken::mintable("RWD", &engine_addr()));
        let mut engine = StakingEngine::new(engine_addr(), owner(), RATE, clock.clone());
        engine.set_staking_token(&owner(), stake.clone()).unwrap();
        engine.set_reward_token(&owner(), reward.clone()).unwrap();
        stake.transfer(&owner(), &alice(), 10_000).unwrap();
        stake.approve(&alice(), &engine_addr(), Amount::MAX);
        Fixture { engine, stake, reward, clock }
    }

    fn funded() -> Fixture {
        let mut f = fixture();
        f.stake.approve(&owner(), &engine_addr(), P);
        f.engine.initial_fund(&owner(), P).unwrap();
        f
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    #[test]
    fn setters_are_owner_only() {
        let f = fixture();
        let mut engine = f.engine;
        let err = engine.set_staking_token(&alice(), f.stake.clone()).unwrap_err();
        assert_eq!(err, StakingError::Unauthorized(alice()));
        let err = engine.set_reward_token(&alice(), f.reward.clone()).unwrap_err();
        assert_eq!(err, StakingError::Unauthorized(alice()));
    }

    #[test]
    fn missing_tokens_reported() {
        let clock = Arc::new(ManualClock::new(0));
        let mut engine = StakingEngine::new(engine_addr(), owner(), RATE, clock);
        assert_eq!(
            engine.initial_fund(&owner(), 1).unwrap_err(),
            StakingError::TokenNotConfigured(TokenKind::Stake)
        );
        assert_eq!(
            engine.claim_rewards(&alice()).unwrap_err(),
            StakingError::TokenNotConfigured(TokenKind::Reward)
        );
    }

    // ------------------------------------------------------------------
    // Funding
    // ------------------------------------------------------------------

    #[test]
    fn initial_fund_seeds_first_lot_and_checkpoint() {
        let f = funded();
        assert!(f.engine.is_funded());
        assert_eq!(f.engine.total_staked(), P);
        assert_eq!(f.engine.lot_at(&owner(), 0).unwrap(), Lot::new(P, 1_000));
        assert_eq!(
            f.engine.checkpoints(),
            &[PoolCheckpoint { timestamp: 1_000, total_staked: P }]
        );
        assert_eq!(f.stake.balance_of(&engine_addr()), P);
        assert!(f.engine.audit());
        assert_eq!(
            f.engine.events(),
            &[StakingEvent::Funded { funder: owner(), amount: P, timestamp: 1_000 }]
        );
    }

    #[test]
    fn initial_fund_rejections() {
        let mut f = funded();
        assert_eq!(f.engine.initial_fund(&owner(), P).unwrap_err(), StakingError::AlreadyFunded);

        let mut f2 = fixture();
        assert_eq!(
            f2.engine.initial_fund(&alice(), 5).unwrap_err(),
            StakingError::Unauthorized(alice())
        );
        assert_eq!(f2.engine.initial_fund(&owner(), 0).unwrap_err(), StakingError::InvalidAmount);
        assert!(!f2.engine.is_funded());
    }

    #[test]
    fn initial_fund_without_allowance_stays_closed() {
        let mut f = fixture();
        let err = f.engine.initial_fund(&owner(), P).unwrap_err();
        assert_eq!(err, StakingError::Token(TokenError::InsufficientAllowance { have: 0, need: P }));
        assert!(!f.engine.is_funded());
        assert!(f.engine.checkpoints().is_empty());
    }

    // ------------------------------------------------------------------
    // Stake
    // ------------------------------------------------------------------

    #[test]
    fn stake_before_funding_rejected() {
        let mut f = fixture();
        assert_eq!(f.engine.stake(&alice(), 10).unwrap_err(), StakingError::NotAlreadyFunded);
    }

    #[test]
    fn stake_appends_lot_and_checkpoint() {
        let mut f = funded();
        f.clock.advance(5);
        f.engine.stake(&alice(), 200).unwrap();
        assert_eq!(f.engine.total_staked(), P + 200);
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap(), Lot::new(200, 1_005));
        assert_eq!(f.engine.checkpoints().len(), 2);
        assert_eq!(f.stake.balance_of(&alice()), 9_800);
        assert!(f.engine.audit());
    }

    #[test]
    fn stake_zero_rejected() {
        let mut f = funded();
        assert_eq!(f.engine.stake(&alice(), 0).unwrap_err(), StakingError::InvalidAmount);
    }

    #[test]
    fn failed_pull_leaves_state() {
        let mut f = funded();
        let err = f.engine.stake(&alice(), 50_000).unwrap_err();
        assert_eq!(
            err,
            StakingError::Token(TokenError::InsufficientBalance { have: 10_000, need: 50_000 })
        );
        assert_eq!(f.engine.lot_count(&alice()), 0);
        assert_eq!(f.engine.checkpoints().len(), 1);
        assert!(f.engine.audit());
    }

    #[test]
    fn clock_going_backwards_rejected() {
        let mut f = funded();
        f.clock.set(999);
        let err = f.engine.stake(&alice(), 10).unwrap_err();
        assert_eq!(
            err,
            StakingError::Ledger(LedgerError::ClockWentBackwards { last: 1_000, now: 999 })
        );
        assert_eq!(f.stake.balance_of(&alice()), 10_000);
    }

    // ------------------------------------------------------------------
    // Rewards
    // ------------------------------------------------------------------

    #[test]
    fn claim_pays_and_resets() {
        let mut f = funded();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        let expected = 200 * RATE * 10 / (P + 200);
        assert_eq!(f.engine.staker_rewards(&alice()).unwrap(), expected);

        assert_eq!(f.engine.claim_rewards(&alice()).unwrap(), expected);
        assert_eq!(f.reward.balance_of(&alice()), expected);
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap(), Lot::new(200, 1_010));
        assert_eq!(f.engine.claim_rewards(&alice()).unwrap(), 0);
        assert_eq!(f.reward.total_supply(), expected);
    }

    #[test]
    fn lot_rewards_per_lot() {
        let mut f = funded();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        let first = 200 * RATE * 10 / (P + 200) + 200 * RATE * 10 / (P + 400);
        let second = 200 * RATE * 10 / (P + 400);
        assert_eq!(f.engine.lot_rewards(&alice()).unwrap(), vec![first, second]);
    }

    #[test]
    fn mint_failure_undoes_claim() {
        let mut f = funded();
        // A reward token the engine may not mint.
        let foreign = Arc::new(MemoryToken::mintable("RWD", &owner()));
        f.engine.set_reward_token(&owner(), foreign).unwrap();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);

        let err = f.engine.claim_rewards(&alice()).unwrap_err();
        assert_eq!(err, StakingError::Token(TokenError::Unauthorized(engine_addr())));
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap(), Lot::new(200, 1_000));
        assert_eq!(f.engine.events().len(), 2);
    }

    // ------------------------------------------------------------------
    // Withdraw
    // ------------------------------------------------------------------

    #[test]
    fn withdraw_returns_stake_and_reward() {
        let mut f = funded();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        let w = f.engine.withdraw(&alice(), 150).unwrap();
        let reward = 200 * RATE * 10 / (P + 200);
        assert_eq!(w.withdrawn, 150);
        assert_eq!(w.reward, reward);
        assert_eq!(w.lots, vec![LotPayout { index: 0, withdrawn: 150, reward }]);
        assert_eq!(f.stake.balance_of(&alice()), 9_950);
        assert_eq!(f.reward.balance_of(&alice()), reward);
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap(), Lot::new(50, 1_010));
        assert_eq!(f.engine.total_staked(), P + 50);
        assert!(f.engine.audit());
    }

    #[test]
    fn withdraw_zero_claims_first_lot_only() {
        let mut f = funded();
        f.engine.stake(&alice(), 200).unwrap();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        let w = f.engine.withdraw(&alice(), 0).unwrap();
        assert_eq!(w.withdrawn, 0);
        assert_eq!(w.lots.len(), 1);
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap().timestamp, 1_010);
        assert_eq!(f.engine.lot_at(&alice(), 1).unwrap().timestamp, 1_000);
        assert_eq!(f.engine.checkpoints().len(), 3);
    }

    #[test]
    fn withdraw_without_lots_is_noop() {
        let mut f = funded();
        let w = f.engine.withdraw(&alice(), 100).unwrap();
        assert_eq!(w.withdrawn, 0);
        assert_eq!(w.reward, 0);
        assert!(w.lots.is_empty());
        assert_eq!(f.engine.checkpoints().len(), 1);
    }

    #[test]
    fn mint_failure_undoes_withdraw() {
        let mut f = funded();
        f.engine.stake(&alice(), 200).unwrap();
        f.clock.advance(10);
        let foreign = Arc::new(MemoryToken::mintable("RWD", &owner()));
        f.engine.set_reward_token(&owner(), foreign).unwrap();

        assert!(f.engine.withdraw(&alice(), 200).is_err());
        assert_eq!(f.engine.lot_at(&alice(), 0).unwrap(), Lot::new(200, 1_000));
        assert_eq!(f.engine.total_staked(), P + 200);
        assert_eq!(f.engine.checkpoints().len(), 2);
        assert_eq!(f.stake.balance_of(&alice()), 9_800);
        assert!(f.engine.audit());
    }

    #[test]
    fn owner_can_withdraw_funding_lot() {
        let mut f = funded();
        let w = f.engine.withdraw(&owner(), P).unwrap();
        assert_eq!(w.withdrawn, P);
        assert_eq!(f.engine.total_staked(), 0);
        assert!(f.engine.audit());
    }

    #[test]
    fn drain_events_empties_buffer() {
        let mut f = funded();
        f.engine.stake(&alice(), 1).unwrap();
        let events = f.engine.drain_events();
        assert_eq!(events.len(), 2);
        assert!(f.engine.events().is_empty());
    }

    #[test]
    fn debug_shows_summary() {
        let f = funded();
        let dbg = format!("{:?}", f.engine);
        assert!(dbg.contains("StakingEngine"));
        assert!(dbg.contains("total_staked"));
    }
}
