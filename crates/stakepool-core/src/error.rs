//! Error types for the stakepool ledger.
use thiserror::Error;

use crate::types::{Address, Amount, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address length: {0} hex digits")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

/// Failures reported by a token service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient allowance: have {have}, need {need}")] InsufficientAllowance { have: Amount, need: Amount },
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("unauthorized minter: {0}")] Unauthorized(Address),
    #[error("supply overflow")] SupplyOverflow,
}

/// Failures of the pure ledger structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("clock went backwards: last checkpoint at {last}, now {now}")] ClockWentBackwards { last: Timestamp, now: Timestamp },
    #[error("lot index out of range for {owner}: {index} >= {len}")] LotIndexOutOfRange { owner: Address, index: usize, len: usize },
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

/// Which of the two backing assets an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Stake,
    Reward,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stake => f.write_str("staking token"),
            Self::Reward => f.write_str("reward token"),
        }
    }
}

/// Errors returned by the staking engine's public operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("pool has not been funded yet")] NotAlreadyFunded,
    #[error("pool is already funded")] AlreadyFunded,
    #[error("amount must be greater than zero")] InvalidAmount,
    #[error("unauthorized caller: {0}")] Unauthorized(Address),
    #[error("{0} is not configured")] TokenNotConfigured(TokenKind),
    #[error(transparent)] Token(#[from] TokenError),
    #[error(transparent)] Ledger(#[from] LedgerError),
}
