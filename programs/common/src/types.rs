//! Shared constants and identifiers

use pinocchio::pubkey::Pubkey;

/// Sentinel token id for the chain's native asset (lamports)
pub const NATIVE_ASSET: Pubkey = [0xEE; 32];

/// SPL mint of wrapped SOL; locks of it are credited to the native leg
pub const WRAPPED_NATIVE_MINT: Pubkey =
    pinocchio_pubkey::pubkey!("So11111111111111111111111111111111111111112");

/// Capacity of the lockable-token allow-list
pub const MAX_ALLOWED_TOKENS: usize = 16;

/// Delay between activation and the first claim (7 days)
pub const TIMELOCK_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on accounts forwarded to an external program in one call
pub const MAX_CPI_ACCOUNTS: usize = 32;

/// PDA seeds
pub const POOL_SEED: &[u8] = b"pool";
pub const NATIVE_VAULT_SEED: &[u8] = b"native";
pub const POSITION_SEED: &[u8] = b"position";
pub const REFERRAL_SEED: &[u8] = b"referral";
/// Delegate that the aggregator spends a claim's entitlement through
pub const SWAP_AUTHORITY_SEED: &[u8] = b"swap";

/// True for the all-zero key used as "unset"
#[inline]
pub fn is_unset(key: &Pubkey) -> bool {
    key.iter().all(|b| *b == 0)
}

/// Token whose ledger a lock of `token` is credited to
#[inline]
pub fn ledger_token(token: &Pubkey) -> Pubkey {
    if token == &WRAPPED_NATIVE_MINT {
        NATIVE_ASSET
    } else {
        *token
    }
}
