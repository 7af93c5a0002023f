//! Withdraw instruction - exit with the original token

use crate::custody::Custody;
use crate::state::{PoolConfig, Position};
use model_safety::lifecycle::Operation;
use pinocchio::msg;
use pinocchio_log::log;
use prelaunch_common::*;

/// Return the whole entitlement in `position` to its owner
///
/// Open while the timelock runs (the exit window after the owner commits), or
/// in any phase under emergency mode. Returns the amount released.
pub fn process_withdraw<C: Custody>(
    pool: &mut PoolConfig,
    position: &mut Position,
    now: i64,
    custody: &mut C,
) -> Result<u64, PoolError> {
    if !pool.is_emergency() {
        pool.require_phase(Operation::Withdraw, now).map_err(|e| {
            msg!("Error: Withdrawals are closed");
            e
        })?;
    }

    let token = position.token;
    let native = token == NATIVE_ASSET;
    if native && pool.native_converted() {
        msg!("Error: Native leg already converted");
        return Err(PoolError::InvalidLifecycleState);
    }

    let amount = position.balance();
    if amount == 0 {
        return Err(PoolError::InsufficientBalance);
    }

    let prior_native = pool.total_native_locked;
    if native {
        pool.total_native_locked =
            model_safety::math::sub_u64(prior_native, amount).ok_or(PoolError::InsufficientBalance)?;
    }
    position.debit(amount)?;

    if let Err(e) = custody.release(&token, amount) {
        msg!("Error: Transfer out of pool failed");
        position.amount = amount;
        pool.total_native_locked = prior_native;
        return Err(e);
    }

    log!("Withdrew {}", amount);
    Ok(amount)
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "withdraw_test.rs"]
mod withdraw_test;
