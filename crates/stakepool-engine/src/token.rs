//! In-memory fungible token service.
//!
//! [`MemoryToken`] backs both pool assets: the stake asset (pre-minted to the
//! deployer, no minter) and the reward asset (mintable only by the staking
//! engine). State lives behind a `parking_lot::RwLock` so one `Arc` can be
//! shared by the engine and by the holders approving it.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use stakepool_core::error::TokenError;
use stakepool_core::traits::{RewardToken, TokenGateway};
use stakepool_core::types::{Address, Amount};

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Address, Amount>,
    /// Keyed by `(holder, spender)`.
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl Ledger {
    fn balance(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn debit(&mut self, from: &Address, amount: Amount) -> Result<(), TokenError> {
        let have = self.balance(from);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        self.balances.insert(*from, have - amount);
        Ok(())
    }

    fn credit(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
        Ok(())
    }

    fn move_funds(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        // Cannot overflow: the amount was part of the supply a moment ago.
        self.credit(to, amount)
    }

    fn issue(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let supply = self.total_supply.checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }
}

/// A fungible token with balances, allowances and an optional minter.
#[derive(Debug)]
pub struct MemoryToken {
    symbol: String,
    minter: Option<Address>,
    inner: RwLock<Ledger>,
}

impl MemoryToken {
    /// An empty token with no minter.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), minter: None, inner: RwLock::new(Ledger::default()) }
    }

    /// A token whose entire fixed supply is credited to `holder`.
    pub fn with_premint(symbol: impl Into<String>, holder: &Address, amount: Amount) -> Self {
        let mut ledger = Ledger::default();
        ledger.balances.insert(*holder, amount);
        ledger.total_supply = amount;
        Self { symbol: symbol.into(), minter: None, inner: RwLock::new(ledger) }
    }

    /// An empty token that only `minter` may mint.
    pub fn mintable(symbol: impl Into<String>, minter: &Address) -> Self {
        Self { symbol: symbol.into(), minter: Some(*minter), inner: RwLock::new(Ledger::default()) }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The authorized minter, if any.
    pub fn minter(&self) -> Option<Address> {
        self.minter
    }

    /// Credit `amount` new units to `to` without a minter check.
    ///
    /// Used when setting up balances outside the engine.
    pub fn issue(&self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.write().issue(to, amount)
    }

    /// Set `spender`'s allowance over `holder`'s balance to `amount`.
    pub fn approve(&self, holder: &Address, spender: &Address, amount: Amount) {
        debug!(token = %self.symbol, %holder, %spender, amount, "approve");
        self.inner.write().allowances.insert((*holder, *spender), amount);
    }

    /// Raise `spender`'s allowance over `holder`'s balance by `amount`.
    pub fn increase_allowance(
        &self,
        holder: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Amount, TokenError> {
        let mut inner = self.inner.write();
        let current = inner.allowances.entry((*holder, *spender)).or_insert(0);
        *current = current.checked_add(amount).ok_or(TokenError::SupplyOverflow)?;
        Ok(*current)
    }

    /// Remaining allowance of `spender` over `holder`'s balance.
    pub fn allowance(&self, holder: &Address, spender: &Address) -> Amount {
        self.inner.read().allowances.get(&(*holder, *spender)).copied().unwrap_or(0)
    }
}

impl TokenGateway for MemoryToken {
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let mut inner = self.inner.write();
        let have = inner.allowances.get(&(*from, *spender)).copied().unwrap_or(0);
        if have < amount {
            return Err(TokenError::InsufficientAllowance { have, need: amount });
        }
        inner.move_funds(from, to, amount)?;
        inner.allowances.insert((*from, *spender), have - amount);
        debug!(token = %self.symbol, %from, %to, amount, "transfer_from");
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.inner.write().move_funds(from, to, amount)?;
        debug!(token = %self.symbol, %from, %to, amount, "transfer");
        Ok(())
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.inner.read().balance(holder)
    }

    fn total_supply(&self) -> Amount {
        self.inner.read().total_supply
    }
}

impl RewardToken for MemoryToken {
    fn mint(&self, minter: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if self.minter != Some(*minter) {
            return Err(TokenError::Unauthorized(*minter));
        }
        self.inner.write().issue(to, amount)?;
        debug!(token = %self.symbol, %to, amount, "mint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder() -> Address {
        Address::repeat(0x01)
    }

    fn spender() -> Address {
        Address::repeat(0x02)
    }

    fn other() -> Address {
        Address::repeat(0x03)
    }

    // ------------------------------------------------------------------
    // Balances and supply
    // ------------------------------------------------------------------

    #[test]
    fn premint_credits_holder() {
        let token = MemoryToken::with_premint("STK", &holder(), 1_000);
        assert_eq!(token.balance_of(&holder()), 1_000);
        assert_eq!(token.total_supply(), 1_000);
        assert_eq!(token.balance_of(&other()), 0);
        assert_eq!(token.symbol(), "STK");
        assert_eq!(token.minter(), None);
    }

    #[test]
    fn transfer_moves_funds() {
        let token = MemoryToken::with_premint("STK", &holder(), 100);
        token.transfer(&holder(), &other(), 30).unwrap();
        assert_eq!(token.balance_of(&holder()), 70);
        assert_eq!(token.balance_of(&other()), 30);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn transfer_rejects_overdraft() {
        let token = MemoryToken::with_premint("STK", &holder(), 10);
        let err = token.transfer(&holder(), &other(), 11).unwrap_err();
        assert_eq!(err, TokenError::InsufficientBalance { have: 10, need: 11 });
        assert_eq!(token.balance_of(&holder()), 10);
    }

    #[test]
    fn issue_grows_supply() {
        let token = MemoryToken::new("STK");
        token.issue(&holder(), 5).unwrap();
        token.issue(&holder(), 7).unwrap();
        assert_eq!(token.balance_of(&holder()), 12);
        assert_eq!(token.total_supply(), 12);
    }

    #[test]
    fn issue_overflow_leaves_state() {
        let token = MemoryToken::with_premint("STK", &holder(), Amount::MAX);
        assert_eq!(token.issue(&other(), 1).unwrap_err(), TokenError::SupplyOverflow);
        assert_eq!(token.balance_of(&other()), 0);
        assert_eq!(token.total_supply(), Amount::MAX);
    }

    // ------------------------------------------------------------------
    // Allowances
    // ------------------------------------------------------------------

    #[test]
    fn transfer_from_consumes_allowance() {
        let token = MemoryToken::with_premint("STK", &holder(), 100);
        token.approve(&holder(), &spender(), 60);
        token.transfer_from(&spender(), &holder(), &other(), 40).unwrap();
        assert_eq!(token.allowance(&holder(), &spender()), 20);
        assert_eq!(token.balance_of(&other()), 40);
    }

    #[test]
    fn transfer_from_without_allowance() {
        let token = MemoryToken::with_premint("STK", &holder(), 100);
        let err = token.transfer_from(&spender(), &holder(), &other(), 1).unwrap_err();
        assert_eq!(err, TokenError::InsufficientAllowance { have: 0, need: 1 });
    }

    #[test]
    fn transfer_from_insufficient_balance_keeps_allowance() {
        let token = MemoryToken::with_premint("STK", &holder(), 10);
        token.approve(&holder(), &spender(), 50);
        let err = token.transfer_from(&spender(), &holder(), &other(), 20).unwrap_err();
        assert_eq!(err, TokenError::InsufficientBalance { have: 10, need: 20 });
        assert_eq!(token.allowance(&holder(), &spender()), 50);
    }

    #[test]
    fn approve_overwrites_and_increase_adds() {
        let token = MemoryToken::new("STK");
        token.approve(&holder(), &spender(), 10);
        token.approve(&holder(), &spender(), 4);
        assert_eq!(token.allowance(&holder(), &spender()), 4);
        assert_eq!(token.increase_allowance(&holder(), &spender(), 6).unwrap(), 10);
        assert_eq!(token.allowance(&spender(), &holder()), 0);
    }

    // ------------------------------------------------------------------
    // Minting
    // ------------------------------------------------------------------

    #[test]
    fn mint_by_minter() {
        let token = MemoryToken::mintable("RWD", &spender());
        token.mint(&spender(), &other(), 500).unwrap();
        assert_eq!(token.balance_of(&other()), 500);
        assert_eq!(token.total_supply(), 500);
    }

    #[test]
    fn mint_by_stranger_rejected() {
        let token = MemoryToken::mintable("RWD", &spender());
        let err = token.mint(&other(), &other(), 1).unwrap_err();
        assert_eq!(err, TokenError::Unauthorized(other()));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn token_without_minter_rejects_all() {
        let token = MemoryToken::new("STK");
        assert!(token.mint(&holder(), &holder(), 1).is_err());
    }
}
