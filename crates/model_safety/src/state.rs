//! Pure state model for Kani verification and proptest

use crate::lifecycle::{phase_at, Phase, ACTIVATION_UNSET};

/// Number of token slots in the model
pub const N_TOKENS: usize = 3;
/// Slot modelling the native asset (pooled, bulk converted)
pub const NATIVE: usize = 0;
/// Slot modelling an ordinary allow-listed token (swapped on claim)
pub const SWAPPED: usize = 1;
/// Slot modelling a lock of the settlement asset itself
pub const SETTLEMENT: usize = 2;

/// Per-user locked balances, one entry per token slot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    pub locked: [u64; N_TOKENS],
    /// Settlement asset paid out or staked for this user
    pub received: u128,
}

/// Cumulative flows per token slot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flows {
    pub locked: [u128; N_TOKENS],
    pub claimed: [u128; N_TOKENS],
    pub withdrawn: [u128; N_TOKENS],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub timelock: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub now: i64,
    pub activation_time: i64,
    pub emergency: bool,
    pub native_converted: bool,
    pub settlement_configured: bool,
    /// Native leg still owed to lockers (pro-rata denominator)
    pub total_native_locked: u64,
    /// Settlement received for the native leg
    pub total_native_converted: u64,
    /// Pool holdings per token slot (settlement slot = user locks of it)
    pub custody: [u128; N_TOKENS],
    /// Settlement asset held for the converted native leg
    pub settlement_held: u128,
    pub users: arrayvec::ArrayVec<Ledger, 6>, // Small fixed bound for Kani
    pub flows: Flows,
    pub params: Params,
}

impl State {
    pub fn phase(&self) -> Phase {
        phase_at(self.activation_time, self.now, self.params.timelock)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            timelock: 7 * 24 * 60 * 60,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self {
            now: 1_700_000_000,
            activation_time: ACTIVATION_UNSET,
            emergency: false,
            native_converted: false,
            settlement_configured: true,
            total_native_locked: 0,
            total_native_converted: 0,
            custody: [0; N_TOKENS],
            settlement_held: 0,
            users: arrayvec::ArrayVec::new(),
            flows: Flows::default(),
            params: Params::default(),
        }
    }
}
