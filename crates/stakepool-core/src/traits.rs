//! Trait interfaces between the ledger and its environment.
//!
//! - [`TokenGateway`]: a fungible asset service (stake or reward asset)
//! - [`RewardToken`]: a token the engine is allowed to mint
//! - [`Clock`]: the ambient time source
//!
//! All traits are object-safe; the engine holds them as `Arc<dyn ...>`.

use crate::error::TokenError;
use crate::types::{Address, Amount, Timestamp};

/// Capability for moving a fungible asset.
///
/// Methods take `&self`: implementations own their interior locking so the
/// same token can be shared by the engine and by the holders approving it.
pub trait TokenGateway: Send + Sync {
    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// `spender`'s allowance over `from`'s balance.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientAllowance`] if the allowance is too small
    /// - [`TokenError::InsufficientBalance`] if `from` holds too little
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Move `amount` out of `from`'s own balance to `to`.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Current balance of `holder`.
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Total amount in existence.
    fn total_supply(&self) -> Amount;
}

/// A token whose supply can be extended by a single authorized minter.
pub trait RewardToken: TokenGateway {
    /// Create `amount` new units credited to `to`.
    ///
    /// # Errors
    ///
    /// [`TokenError::Unauthorized`] unless `minter` is the configured minter.
    fn mint(&self, minter: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;
}

/// Source of the current time.
///
/// Expected to be non-decreasing; consecutive readings may be equal.
pub trait Clock: Send + Sync {
    /// Current time in Unix seconds.
    fn now(&self) -> Timestamp;
}
