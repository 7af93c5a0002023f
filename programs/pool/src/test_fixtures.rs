//! Shared fixtures for handler tests

use crate::state::{PoolConfig, Position};
use pinocchio::pubkey::Pubkey;

pub const OWNER: Pubkey = [1; 32];
pub const USER: Pubkey = [0x11; 32];
pub const OTHER_USER: Pubkey = [0x12; 32];
pub const EXCHANGE: Pubkey = [2; 32];
/// Allow-listed token swapped on claim
pub const TOKEN: Pubkey = [3; 32];
pub const SETTLEMENT_MINT: Pubkey = [7; 32];
pub const SETTLEMENT_PROGRAM: Pubkey = [6; 32];
pub const VAULT: Pubkey = [5; 32];
/// Pool's settlement token account
pub const POOL_SETTLEMENT: Pubkey = [8; 32];
pub const SWAP_AUTHORITY: Pubkey = [9; 32];
pub const T0: i64 = 1_700_000_000;
/// One whole token at 9 decimals
pub const ONE: u64 = 1_000_000_000;

pub fn fresh_pool() -> PoolConfig {
    match PoolConfig::new(OWNER, EXCHANGE, &[TOKEN, SETTLEMENT_MINT], 255, 254) {
        Ok(mut pool) => {
            pool.set_swap_authority(SWAP_AUTHORITY, 253);
            pool
        }
        Err(e) => panic!("fixture pool: {:?}", e),
    }
}

pub fn configured_pool() -> PoolConfig {
    let mut pool = fresh_pool();
    pool.settlement_mint = SETTLEMENT_MINT;
    pool.settlement_program = SETTLEMENT_PROGRAM;
    pool.vault = VAULT;
    pool
}

pub fn position(user: Pubkey, token: Pubkey, amount: u64) -> Position {
    let mut pos = Position::new(user, token, 250);
    pos.amount = amount;
    pos
}
