//! Pool constants. Token amounts are in base units (1 token = 10^18 units).

use crate::types::Amount;

/// Decimal places of both pool assets.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole token in base units.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Reward rate used when no configuration overrides it.
///
/// Scales every segment integral: `amount * rate * seconds / pool_total`.
pub const DEFAULT_REWARD_RATE: Amount = 10_000_000_000;

/// Stake-asset supply credited to the deployer at deployment, in base units.
pub const DEFAULT_PREMINT: Amount = 21_000_000;

/// Prefix for environment variables read by the configuration loader.
pub const ENV_PREFIX: &str = "STAKEPOOL";

/// Number of bytes in an [`Address`](crate::types::Address).
pub const ADDRESS_LEN: usize = 20;
