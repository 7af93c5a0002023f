//! Referral accumulator
//!
//! Additive bookkeeping for off-protocol attribution. Nothing in the pool
//! reads it back.

use pinocchio::pubkey::Pubkey;

pub const REFERRAL_MAGIC: [u8; 8] = *b"PRLNREFR";

/// PDA: ["referral", code]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralRecord {
    pub magic: [u8; 8],
    pub bump: u8,
    pub _padding: [u8; 7],
    pub code: [u8; 32],
    /// Raw amounts summed across tokens (saturating)
    pub total_locked: u64,
    pub lock_count: u64,
}

impl ReferralRecord {
    pub const LEN: usize = core::mem::size_of::<Self>();

    pub fn new(code: [u8; 32], bump: u8) -> Self {
        Self {
            magic: REFERRAL_MAGIC,
            bump,
            _padding: [0; 7],
            code,
            total_locked: 0,
            lock_count: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.magic == REFERRAL_MAGIC
    }

    pub fn matches(&self, code: &[u8; 32]) -> bool {
        self.is_initialized() && &self.code == code
    }

    pub fn record(&mut self, amount: u64) {
        self.total_locked = self.total_locked.saturating_add(amount);
        self.lock_count = self.lock_count.saturating_add(1);
    }
}

/// The all-zero code means "no referral"
pub fn has_referral(code: &Pubkey) -> bool {
    !prelaunch_common::is_unset(code)
}
