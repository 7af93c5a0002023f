//! ConvertAll instruction - bulk conversion of the native leg

use crate::custody::Custody;
use crate::state::PoolConfig;
use model_safety::lifecycle::Operation;
use pinocchio::{msg, pubkey::Pubkey};
use pinocchio_log::log;
use prelaunch_common::*;

/// Convert every locked lamport into settlement asset
///
/// Runs once claims open, so native lockers can still withdraw for the whole
/// timelock.
/// The output is the measured change of the pool settlement balance; it
/// becomes the numerator of every native claimant's pro-rata share. Returns
/// that output.
pub fn process_convert_all<C: Custody>(
    pool: &mut PoolConfig,
    signer: &Pubkey,
    now: i64,
    custody: &mut C,
) -> Result<u64, PoolError> {
    pool.require_owner(signer)?;
    pool.require_phase(Operation::Convert, now).map_err(|e| {
        msg!("Error: Conversion opens after the timelock");
        e
    })?;
    if !pool.settlement_configured() {
        msg!("Error: Settlement addresses not set");
        return Err(PoolError::VaultNotConfigured);
    }
    if pool.native_converted() {
        msg!("Error: Native leg already converted");
        return Err(PoolError::AlreadyConverted);
    }

    let lamports = pool.total_native_locked;
    pool.native_converted = 1;
    pool.conversion_time = now;

    match convert(custody, lamports) {
        Ok(output) => {
            pool.total_native_converted = output;
            log!("Converted {} lamports into {}", lamports, output);
            Ok(output)
        }
        Err(e) => {
            msg!("Error: Conversion failed");
            pool.native_converted = 0;
            pool.conversion_time = 0;
            Err(e)
        }
    }
}

fn convert<C: Custody>(custody: &mut C, lamports: u64) -> Result<u64, PoolError> {
    if lamports == 0 {
        return Ok(0);
    }
    let before = custody.settlement_balance()?;
    custody.convert_native(lamports)?;
    let after = custody.settlement_balance()?;
    after.checked_sub(before).ok_or(PoolError::ExternalCallFailed)
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "convert_test.rs"]
mod convert_test;
