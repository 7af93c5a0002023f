//! Checks over SPL token accounts

use crate::error::PoolError;
use pinocchio::{account_info::AccountInfo, pubkey::Pubkey};
use pinocchio_token::state::TokenAccount;

fn load(account: &AccountInfo) -> Result<pinocchio::account_info::Ref<'_, TokenAccount>, PoolError> {
    TokenAccount::from_account_info(account).map_err(|_| PoolError::InvalidAccount)
}

/// Balance of a token account
pub fn token_balance(account: &AccountInfo) -> Result<u64, PoolError> {
    Ok(load(account)?.amount())
}

/// Authority (owner field) of a token account
pub fn token_authority(account: &AccountInfo) -> Result<Pubkey, PoolError> {
    Ok(*load(account)?.owner())
}

/// Require a token account of `mint` whose authority is `authority`
pub fn expect_token_account(account: &AccountInfo, mint: &Pubkey, authority: &Pubkey) -> Result<(), PoolError> {
    let state = load(account)?;
    if state.mint() != mint || state.owner() != authority {
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}
