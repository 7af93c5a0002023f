//! Decoded view of the on-chain pool config and the keeper's decisions

use model_safety::lifecycle::{claim_start, Operation, Phase};
use prelaunch_common::TIMELOCK_SECONDS;
use prelaunch_pool::state::PoolConfig;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeeperError {
    #[error("pool account has {0} bytes, expected {expected}", expected = PoolConfig::LEN)]
    WrongSize(usize),
    #[error("pool account is not an initialized pool config")]
    NotInitialized,
    #[error("pool account owned by {owner}, expected {program}")]
    WrongOwner { owner: Pubkey, program: Pubkey },
}

/// Something the keeper should submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ConvertAll,
}

#[derive(Debug, Clone, Copy)]
pub struct PoolView {
    pub config: PoolConfig,
}

impl PoolView {
    pub fn decode(owner: &Pubkey, program: &Pubkey, data: &[u8]) -> Result<Self, KeeperError> {
        if owner != program {
            return Err(KeeperError::WrongOwner { owner: *owner, program: *program });
        }
        if data.len() != PoolConfig::LEN {
            return Err(KeeperError::WrongSize(data.len()));
        }
        let config = PoolConfig::read_from(data).map_err(|_| KeeperError::NotInitialized)?;
        Ok(Self { config })
    }

    pub fn phase(&self, now: i64) -> Phase {
        self.config.phase(now)
    }

    pub fn owner(&self) -> Pubkey {
        Pubkey::new_from_array(self.config.owner)
    }

    /// Seconds until claims open; None before activation
    pub fn seconds_to_claims(&self, now: i64) -> Option<i64> {
        match self.phase(now) {
            Phase::Locking => None,
            _ => Some(claim_start(self.config.activation_time, TIMELOCK_SECONDS).saturating_sub(now).max(0)),
        }
    }

    /// What to submit next, if anything
    pub fn next_action(&self, now: i64, auto_convert: bool) -> Option<Action> {
        if !auto_convert || !Operation::Convert.permits(self.phase(now)) {
            return None;
        }
        if !self.config.settlement_configured() || self.config.native_converted() {
            return None;
        }
        Some(Action::ConvertAll)
    }
}
