//! Pool error codes
//!
//! Surfaced to clients as `ProgramError::Custom(code)`; the discriminants are
//! part of the program's public interface and must not be renumbered.

use pinocchio::program_error::ProgramError;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Malformed or truncated instruction data
    InvalidInstruction = 0,
    /// Wrong account supplied (key, owner, size, or contents)
    InvalidAccount = 1,
    /// Privileged instruction signed by someone other than the owner
    Unauthorized = 2,
    /// Operation attempted outside its lifecycle phase
    InvalidLifecycleState = 3,
    /// Lock of a token missing from the allow-list
    TokenNotAllowed = 4,
    /// Zero amount where a positive one is required
    InvalidAmount = 5,
    /// Debit exceeds the caller's entitlement
    InsufficientBalance = 6,
    /// Swap payload does not match the claimed token, settlement asset, amount or recipient
    InvalidSwapRoute = 7,
    /// Measured settlement output below the caller's floor
    SlippageExceeded = 8,
    /// Activation requested twice
    AlreadyActivated = 9,
    /// Settlement mint or vault not configured yet
    VaultNotConfigured = 10,
    /// Settlement addresses are one-time
    SettlementAlreadySet = 11,
    /// Native leg already converted
    AlreadyConverted = 12,
    /// A cross-program call failed
    ExternalCallFailed = 13,
    /// Arithmetic overflow
    Overflow = 14,
    /// Allow-list exceeds its fixed capacity
    TooManyTokens = 15,
}

impl From<PoolError> for ProgramError {
    fn from(e: PoolError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
