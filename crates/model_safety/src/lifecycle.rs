//! Lifecycle phases and the operation permission table
//!
//! The pool moves Locking -> Converting -> Claiming. The first edge is taken
//! once by the owner (activation); the second is purely time driven. Nothing
//! moves backwards: the phase is a monotone function of the clock once the
//! activation time is written.

/// Activation time value meaning "not yet activated"
pub const ACTIVATION_UNSET: i64 = 0;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Deposits open, operator has not committed
    Locking = 0,
    /// Activated, timelock running; the exit window
    Converting = 1,
    /// Timelock elapsed; the native leg can be converted and entitlements claimed
    Claiming = 2,
}

/// Mutating operations gated by the lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Lock,
    Activate,
    Configure,
    Withdraw,
    Convert,
    Claim,
}

impl Operation {
    /// Permission table: which phases each operation may run in
    pub const fn permits(self, phase: Phase) -> bool {
        match (self, phase) {
            (Operation::Lock, Phase::Locking) => true,
            (Operation::Activate, Phase::Locking) => true,
            (Operation::Configure, _) => true,
            (Operation::Withdraw, Phase::Converting) => true,
            // Native lockers keep their exit through the whole timelock
            (Operation::Convert, Phase::Claiming) => true,
            (Operation::Claim, Phase::Claiming) => true,
            _ => false,
        }
    }
}

/// Derive the phase at `now` for a pool activated at `activation_time`
pub fn phase_at(activation_time: i64, now: i64, timelock: i64) -> Phase {
    if activation_time == ACTIVATION_UNSET {
        return Phase::Locking;
    }
    if now < claim_start(activation_time, timelock) {
        Phase::Converting
    } else {
        Phase::Claiming
    }
}

/// First timestamp at which claims are accepted
pub fn claim_start(activation_time: i64, timelock: i64) -> i64 {
    activation_time.saturating_add(timelock)
}

/// Record activation. None when already activated.
///
/// 0 is the unset sentinel, so a clock reading of 0 or below is stored as 1.
pub fn activate(activation_time: i64, now: i64) -> Option<i64> {
    if activation_time != ACTIVATION_UNSET {
        return None;
    }
    Some(if now < 1 { 1 } else { now })
}

/// True when `after` is the same phase or a later one
pub fn phase_never_regresses(before: Phase, after: Phase) -> bool {
    after >= before
}
