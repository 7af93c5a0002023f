//! Owner-only instructions

use crate::custody::Custody;
use crate::state::PoolConfig;
use model_safety::lifecycle::{self, Operation};
use pinocchio::{msg, pubkey::Pubkey};
use pinocchio_log::log;
use prelaunch_common::*;

/// Record the settlement mint, settlement program and vault
///
/// One-time: the addresses move from unset to set exactly once, in any phase.
pub fn process_set_settlement_addresses(
    pool: &mut PoolConfig,
    signer: &Pubkey,
    settlement_mint: &Pubkey,
    settlement_program: &Pubkey,
    vault: &Pubkey,
    now: i64,
) -> Result<(), PoolError> {
    pool.require_owner(signer)?;
    pool.require_phase(Operation::Configure, now)?;

    if pool.settlement_configured() {
        msg!("Error: Settlement addresses already set");
        return Err(PoolError::SettlementAlreadySet);
    }
    if is_unset(settlement_mint) || is_unset(settlement_program) || is_unset(vault) {
        msg!("Error: Settlement addresses must be non-zero");
        return Err(PoolError::InvalidAccount);
    }

    pool.settlement_mint = *settlement_mint;
    pool.settlement_program = *settlement_program;
    pool.vault = *vault;

    msg!("Settlement addresses set");
    Ok(())
}

/// Close the lock window and start the timelock
pub fn process_activate(pool: &mut PoolConfig, signer: &Pubkey, now: i64) -> Result<(), PoolError> {
    pool.require_owner(signer)?;

    // A second activation is its own error, not a phase violation
    let activation = lifecycle::activate(pool.activation_time, now).ok_or_else(|| {
        msg!("Error: Pool already activated");
        PoolError::AlreadyActivated
    })?;
    pool.require_phase(Operation::Activate, now)?;

    pool.activation_time = activation;

    log!("Pool activated at {}", activation);
    Ok(())
}

pub fn process_set_emergency_mode(
    pool: &mut PoolConfig,
    signer: &Pubkey,
    flag: bool,
) -> Result<(), PoolError> {
    pool.require_owner(signer)?;
    pool.emergency = flag as u8;

    if flag {
        msg!("Emergency mode on");
    } else {
        msg!("Emergency mode off");
    }
    Ok(())
}

pub fn process_set_owner(
    pool: &mut PoolConfig,
    signer: &Pubkey,
    new_owner: &Pubkey,
) -> Result<(), PoolError> {
    pool.require_owner(signer)?;
    if is_unset(new_owner) {
        return Err(PoolError::InvalidAccount);
    }
    pool.owner = *new_owner;

    msg!("Owner updated");
    Ok(())
}

/// Send stray tokens held by the pool to the owner
///
/// Anything users can hold an entitlement in is off limits: allow-listed
/// tokens, the native asset and the settlement mint.
pub fn process_recover_token<C: Custody>(
    pool: &PoolConfig,
    signer: &Pubkey,
    token: &Pubkey,
    amount: u64,
    custody: &mut C,
) -> Result<(), PoolError> {
    pool.require_owner(signer)?;
    if amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if pool.is_allowed(token) || token == &pool.settlement_mint {
        msg!("Error: Token is held on behalf of users");
        return Err(PoolError::TokenNotAllowed);
    }

    custody.release(token, amount)?;

    log!("Recovered {} tokens", amount);
    Ok(())
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "admin_test.rs"]
mod admin_test;
