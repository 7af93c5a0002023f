//! Pool configuration account
//!
//! Holds the owner, the lifecycle clock, the allow-list and the settlement
//! addresses. The phase is never stored; it is derived from
//! `activation_time` and the clock on every read.

use model_safety::lifecycle::{self, Operation, Phase, ACTIVATION_UNSET};
use pinocchio::pubkey::Pubkey;
use prelaunch_common::*;

pub const POOL_MAGIC: [u8; 8] = *b"PRLNPOOL";
pub const POOL_VERSION: u8 = 1;

/// Pool configuration
/// PDA: ["pool"]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub magic: [u8; 8],
    pub version: u8,
    /// Bump of the pool PDA (token and vault authority)
    pub bump: u8,
    /// Bump of the native vault PDA
    pub native_vault_bump: u8,
    /// Withdrawals allowed in any phase while set
    pub emergency: u8,
    pub allowed_count: u8,
    /// Native leg already converted
    pub native_converted: u8,
    /// Bump of the swap authority PDA
    pub swap_authority_bump: u8,
    pub _padding: [u8; 1],
    /// Privileged role
    pub owner: Pubkey,
    /// Swap aggregator invoked on claims
    pub exchange_program: Pubkey,
    /// Only delegate the aggregator may spend pool tokens through
    pub swap_authority: Pubkey,
    /// Settlement asset mint (zero until configured)
    pub settlement_mint: Pubkey,
    /// Program converting the native leg (zero until configured)
    pub settlement_program: Pubkey,
    /// Yield vault program (zero until configured)
    pub vault: Pubkey,
    pub activation_time: i64,
    pub conversion_time: i64,
    /// Native leg owed to lockers; fixed once converted
    pub total_native_locked: u64,
    /// Settlement received for the native leg
    pub total_native_converted: u64,
    pub allowed_tokens: [Pubkey; MAX_ALLOWED_TOKENS],
}

impl PoolConfig {
    pub const LEN: usize = core::mem::size_of::<Self>();

    pub fn new(
        owner: Pubkey,
        exchange_program: Pubkey,
        tokens: &[Pubkey],
        bump: u8,
        native_vault_bump: u8,
    ) -> Result<Self, PoolError> {
        let mut pool = Self::zeroed();
        pool.initialize(owner, exchange_program, tokens, bump, native_vault_bump)?;
        Ok(pool)
    }

    pub const fn zeroed() -> Self {
        Self {
            magic: [0; 8],
            version: 0,
            bump: 0,
            native_vault_bump: 0,
            emergency: 0,
            allowed_count: 0,
            native_converted: 0,
            swap_authority_bump: 0,
            _padding: [0; 1],
            owner: [0; 32],
            exchange_program: [0; 32],
            swap_authority: [0; 32],
            settlement_mint: [0; 32],
            settlement_program: [0; 32],
            vault: [0; 32],
            activation_time: ACTIVATION_UNSET,
            conversion_time: 0,
            total_native_locked: 0,
            total_native_converted: 0,
            allowed_tokens: [[0; 32]; MAX_ALLOWED_TOKENS],
        }
    }

    /// Write a fresh configuration in place (avoids a large stack copy)
    pub fn initialize(
        &mut self,
        owner: Pubkey,
        exchange_program: Pubkey,
        tokens: &[Pubkey],
        bump: u8,
        native_vault_bump: u8,
    ) -> Result<(), PoolError> {
        if self.is_initialized() {
            return Err(PoolError::InvalidAccount);
        }
        if tokens.len() > MAX_ALLOWED_TOKENS {
            return Err(PoolError::TooManyTokens);
        }
        if is_unset(&owner) || is_unset(&exchange_program) {
            return Err(PoolError::InvalidAccount);
        }
        for (i, token) in tokens.iter().enumerate() {
            let native = token == &NATIVE_ASSET || token == &WRAPPED_NATIVE_MINT;
            if is_unset(token) || native || tokens[..i].contains(token) {
                return Err(PoolError::InvalidAccount);
            }
        }

        *self = Self::zeroed();
        self.magic = POOL_MAGIC;
        self.version = POOL_VERSION;
        self.bump = bump;
        self.native_vault_bump = native_vault_bump;
        self.owner = owner;
        self.exchange_program = exchange_program;
        self.allowed_count = tokens.len() as u8;
        self.allowed_tokens[..tokens.len()].copy_from_slice(tokens);
        Ok(())
    }

    /// Record the swap authority PDA found by the entrypoint
    pub fn set_swap_authority(&mut self, key: Pubkey, bump: u8) {
        self.swap_authority = key;
        self.swap_authority_bump = bump;
    }

    pub fn is_initialized(&self) -> bool {
        self.magic == POOL_MAGIC
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if !self.is_initialized() || self.version != POOL_VERSION {
            return Err(PoolError::InvalidAccount);
        }
        if self.allowed_count as usize > MAX_ALLOWED_TOKENS {
            return Err(PoolError::InvalidAccount);
        }
        Ok(())
    }

    /// Phase at `now`
    pub fn phase(&self, now: i64) -> Phase {
        lifecycle::phase_at(self.activation_time, now, TIMELOCK_SECONDS)
    }

    /// Fail with `InvalidLifecycleState` unless `op` may run at `now`
    pub fn require_phase(&self, op: Operation, now: i64) -> Result<Phase, PoolError> {
        let phase = self.phase(now);
        if !op.permits(phase) {
            return Err(PoolError::InvalidLifecycleState);
        }
        Ok(phase)
    }

    pub fn require_owner(&self, signer: &Pubkey) -> Result<(), PoolError> {
        if &self.owner != signer {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    pub fn allowed(&self) -> &[Pubkey] {
        &self.allowed_tokens[..(self.allowed_count as usize).min(MAX_ALLOWED_TOKENS)]
    }

    /// Lockable: allow-listed, the native sentinel or wrapped native
    pub fn is_allowed(&self, token: &Pubkey) -> bool {
        token == &NATIVE_ASSET || token == &WRAPPED_NATIVE_MINT || self.allowed().contains(token)
    }

    pub fn settlement_configured(&self) -> bool {
        !is_unset(&self.settlement_mint)
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency != 0
    }

    pub fn native_converted(&self) -> bool {
        self.native_converted != 0
    }

    /// Decode from raw account bytes (unaligned copy)
    pub fn read_from(data: &[u8]) -> Result<Self, PoolError> {
        if data.len() < Self::LEN {
            return Err(PoolError::InvalidAccount);
        }
        let pool = unsafe { core::ptr::read_unaligned(data.as_ptr() as *const Self) };
        pool.validate()?;
        Ok(pool)
    }
}
