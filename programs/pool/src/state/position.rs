//! Per-(user, token) locked balance

use pinocchio::pubkey::Pubkey;
use prelaunch_common::PoolError;

pub const POSITION_MAGIC: [u8; 8] = *b"PRLNPOSN";

/// User entitlement for one token
/// PDA: ["position", user, token]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub magic: [u8; 8],
    pub bump: u8,
    pub _padding: [u8; 7],
    pub user: Pubkey,
    pub token: Pubkey,
    /// Locked amount in the token's smallest unit
    pub amount: u64,
}

impl Position {
    pub const LEN: usize = core::mem::size_of::<Self>();

    pub fn new(user: Pubkey, token: Pubkey, bump: u8) -> Self {
        Self {
            magic: POSITION_MAGIC,
            bump,
            _padding: [0; 7],
            user,
            token,
            amount: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.magic == POSITION_MAGIC
    }

    /// Require this position to belong to (`user`, `token`)
    pub fn validate(&self, user: &Pubkey, token: &Pubkey) -> Result<(), PoolError> {
        if !self.is_initialized() || &self.user != user || &self.token != token {
            return Err(PoolError::InvalidAccount);
        }
        Ok(())
    }

    /// Current entitlement
    pub fn balance(&self) -> u64 {
        self.amount
    }

    pub fn credit(&mut self, amount: u64) -> Result<(), PoolError> {
        self.amount = model_safety::math::add_u64(self.amount, amount).ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// Remove `amount` from the entitlement
    pub fn debit(&mut self, amount: u64) -> Result<(), PoolError> {
        self.amount = model_safety::math::sub_u64(self.amount, amount)
            .ok_or(PoolError::InsufficientBalance)?;
        Ok(())
    }
}
