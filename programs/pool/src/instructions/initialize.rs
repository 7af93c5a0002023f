//! Initialize instruction - write the pool configuration

use crate::state::PoolConfig;
use arrayvec::ArrayVec;
use pinocchio::{msg, pubkey::Pubkey};
use prelaunch_common::*;

/// Decoded `Initialize` data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeArgs {
    pub exchange_program: Pubkey,
    pub tokens: ArrayVec<Pubkey, MAX_ALLOWED_TOKENS>,
}

impl InitializeArgs {
    /// exchange_program(32) token_count(1) tokens(32 * n)
    pub fn parse(data: &[u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        let exchange_program = reader.read_pubkey()?;
        let count = reader.read_u8()? as usize;
        if count > MAX_ALLOWED_TOKENS {
            return Err(PoolError::TooManyTokens);
        }
        let mut tokens = ArrayVec::new();
        for _ in 0..count {
            tokens.push(reader.read_pubkey()?);
        }
        reader.finish()?;
        Ok(Self { exchange_program, tokens })
    }
}

/// PDAs the entrypoint derived for a new pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAddresses {
    pub bump: u8,
    pub native_vault_bump: u8,
    pub swap_authority: Pubkey,
    pub swap_authority_bump: u8,
}

/// Process initialize instruction
///
/// Called once at deployment. The allow-list is fixed from here on; the
/// settlement addresses are written later by `SetSettlementAddresses`.
///
/// # Arguments
/// * `pool` - Zeroed pool config account data
/// * `owner` - Initial privileged role
/// * `args` - Exchange aggregator and lockable tokens
/// * `addresses` - PDA bumps and the swap authority found by the entrypoint
pub fn process_initialize(
    pool: &mut PoolConfig,
    owner: &Pubkey,
    args: &InitializeArgs,
    addresses: &PoolAddresses,
) -> Result<(), PoolError> {
    pool.initialize(
        *owner,
        args.exchange_program,
        &args.tokens,
        addresses.bump,
        addresses.native_vault_bump,
    )?;
    pool.set_swap_authority(addresses.swap_authority, addresses.swap_authority_bump);

    msg!("Pool initialized");
    Ok(())
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "initialize_test.rs"]
mod initialize_test;
