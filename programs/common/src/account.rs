//! Account validation and zero-copy access

use crate::error::PoolError;
use pinocchio::{account_info::AccountInfo, pubkey::Pubkey};

/// Require `account` to be owned by `owner`
#[inline]
pub fn validate_owner(account: &AccountInfo, owner: &Pubkey) -> Result<(), PoolError> {
    if !account.is_owned_by(owner) {
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

#[inline]
pub fn validate_writable(account: &AccountInfo) -> Result<(), PoolError> {
    if !account.is_writable() {
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

#[inline]
pub fn validate_signer(account: &AccountInfo) -> Result<(), PoolError> {
    if !account.is_signer() {
        return Err(PoolError::Unauthorized);
    }
    Ok(())
}

/// Require `account` to sit at `expected`
#[inline]
pub fn validate_key(account: &AccountInfo, expected: &Pubkey) -> Result<(), PoolError> {
    if account.key() != expected {
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}

/// Borrow account data as `T`
///
/// # Safety
///
/// `T` must be `repr(C)`, valid for any bit pattern, and no other borrow of
/// the account data may be live.
#[inline]
pub unsafe fn borrow_account_data<T>(account: &AccountInfo) -> Result<&T, PoolError> {
    if account.data_len() < core::mem::size_of::<T>() {
        return Err(PoolError::InvalidAccount);
    }
    Ok(&*(account.borrow_data_unchecked().as_ptr() as *const T))
}

/// Borrow account data as `&mut T`
///
/// # Safety
///
/// Same contract as [`borrow_account_data`], and the account must be writable.
#[inline]
pub unsafe fn borrow_account_data_mut<T>(account: &AccountInfo) -> Result<&mut T, PoolError> {
    if account.data_len() < core::mem::size_of::<T>() {
        return Err(PoolError::InvalidAccount);
    }
    Ok(&mut *(account.borrow_mut_data_unchecked().as_mut_ptr() as *mut T))
}
