//! Program derived addresses

use pinocchio::pubkey::{create_program_address, find_program_address, Pubkey};
use prelaunch_common::*;

/// Pool config; also the authority of every pool token account
pub fn derive_pool_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[POOL_SEED], program_id)
}

/// System-owned account holding locked lamports
pub fn derive_native_vault_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[NATIVE_VAULT_SEED], program_id)
}

/// Delegate approved for exactly one claim's input before each swap
pub fn derive_swap_authority_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[SWAP_AUTHORITY_SEED], program_id)
}

pub fn derive_position_pda(user: &Pubkey, token: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[POSITION_SEED, &user[..], &token[..]], program_id)
}

pub fn derive_referral_pda(code: &[u8; 32], program_id: &Pubkey) -> (Pubkey, u8) {
    find_program_address(&[REFERRAL_SEED, &code[..]], program_id)
}

/// Check `key` against seeds plus a stored bump
pub fn verify_pda(key: &Pubkey, seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Result<(), PoolError> {
    let bump = [bump];
    let mut with_bump: [&[u8]; 4] = [&[]; 4];
    if seeds.len() >= with_bump.len() {
        return Err(PoolError::InvalidAccount);
    }
    with_bump[..seeds.len()].copy_from_slice(seeds);
    with_bump[seeds.len()] = &bump;

    let expected = create_program_address(&with_bump[..=seeds.len()], program_id)
        .map_err(|_| PoolError::InvalidAccount)?;
    if &expected != key {
        return Err(PoolError::InvalidAccount);
    }
    Ok(())
}
