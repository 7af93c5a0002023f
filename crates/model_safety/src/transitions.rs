//! State transition functions - all total, no panics
//!
//! A transition that is not permitted returns the state unchanged, which is
//! the model's rendering of an aborted instruction.

use crate::lifecycle::{self, Operation};
use crate::math::*;
use crate::state::*;

/// Lock `amount` of `token` for user `uid`
pub fn lock(mut s: State, uid: usize, token: usize, amount: u64) -> State {
    if uid >= s.users.len() || token >= N_TOKENS || amount == 0 {
        return s;
    }

    if !Operation::Lock.permits(s.phase()) {
        return s;
    }

    let Some(next) = add_u64(s.users[uid].locked[token], amount) else {
        return s;
    };

    if token == NATIVE {
        let Some(total) = add_u64(s.total_native_locked, amount) else {
            return s;
        };
        s.total_native_locked = total;
    }

    s.users[uid].locked[token] = next;
    s.custody[token] = add_u128(s.custody[token], amount as u128);
    s.flows.locked[token] = add_u128(s.flows.locked[token], amount as u128);

    s
}

/// Owner activation (Locking -> Converting)
pub fn activate(mut s: State) -> State {
    if !Operation::Activate.permits(s.phase()) {
        return s;
    }

    match lifecycle::activate(s.activation_time, s.now) {
        Some(at) => {
            s.activation_time = at;
            s
        }
        None => s,
    }
}

/// Advance the clock
pub fn tick(mut s: State, seconds: u32) -> State {
    s.now = s.now.saturating_add(seconds as i64);
    s
}

/// Toggle emergency mode
pub fn set_emergency(mut s: State, flag: bool) -> State {
    s.emergency = flag;
    s
}

/// Withdraw a user's whole entitlement in the original token
pub fn withdraw(mut s: State, uid: usize, token: usize) -> State {
    if uid >= s.users.len() || token >= N_TOKENS {
        return s;
    }

    if !s.emergency && !Operation::Withdraw.permits(s.phase()) {
        return s;
    }

    // Converted native lamports are gone; those lockers must claim
    if token == NATIVE && s.native_converted {
        return s;
    }

    let amount = s.users[uid].locked[token];
    if amount == 0 || s.custody[token] < amount as u128 {
        return s;
    }

    if token == NATIVE {
        let Some(total) = sub_u64(s.total_native_locked, amount) else {
            return s;
        };
        s.total_native_locked = total;
    }

    s.users[uid].locked[token] = 0;
    s.custody[token] = sub_u128(s.custody[token], amount as u128);
    s.flows.withdrawn[token] = add_u128(s.flows.withdrawn[token], amount as u128);

    s
}

/// Bulk conversion of the native leg; `output` is the measured settlement delta
pub fn convert_native(mut s: State, output: u64) -> State {
    if !Operation::Convert.permits(s.phase()) || !s.settlement_configured || s.native_converted {
        return s;
    }

    s.custody[NATIVE] = sub_u128(s.custody[NATIVE], s.total_native_locked as u128);
    s.settlement_held = add_u128(s.settlement_held, output as u128);
    s.total_native_converted = output;
    s.native_converted = true;

    s
}

/// Claim a user's whole entitlement for `token`
///
/// `swap_output` is the settlement delta the external swap produced; it is
/// only consulted for the swapped slot.
pub fn claim(mut s: State, uid: usize, token: usize, swap_output: u64, min_out: u64) -> State {
    if uid >= s.users.len() || token >= N_TOKENS {
        return s;
    }

    if !Operation::Claim.permits(s.phase()) || !s.settlement_configured {
        return s;
    }

    let stake = s.users[uid].locked[token];
    if stake == 0 {
        return s;
    }

    let received = match token {
        NATIVE => {
            if !s.native_converted {
                return s;
            }
            mul_div_floor(stake, s.total_native_converted, s.total_native_locked)
        }
        SETTLEMENT => stake,
        _ => swap_output,
    };

    if received < min_out {
        return s;
    }

    if token == NATIVE {
        if s.settlement_held < received as u128 {
            return s;
        }
        s.settlement_held = sub_u128(s.settlement_held, received as u128);
    } else {
        if s.custody[token] < stake as u128 {
            return s;
        }
        s.custody[token] = sub_u128(s.custody[token], stake as u128);
    }

    let user = &mut s.users[uid];
    user.locked[token] = 0;
    user.received = add_u128(user.received, received as u128);
    s.flows.claimed[token] = add_u128(s.flows.claimed[token], stake as u128);

    s
}
