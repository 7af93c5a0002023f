//! Invariant checking helpers

use crate::math::*;
use crate::state::*;

/// Sum of all users' entitlements for a token slot
pub fn sum_entitlements(s: &State, token: usize) -> u128 {
    if token >= N_TOKENS {
        return 0;
    }
    s.users.iter().fold(0u128, |acc, u| add_u128(acc, u.locked[token] as u128))
}

/// Conservation: for every token, entitlements equal locked - claimed - withdrawn
pub fn ledger_conserved(s: &State) -> bool {
    (0..N_TOKENS).all(|t| {
        let outstanding = sub_u128(
            s.flows.locked[t],
            add_u128(s.flows.claimed[t], s.flows.withdrawn[t]),
        );
        sum_entitlements(s, t) == outstanding
    })
}

/// The pool holds enough to honour every outstanding entitlement
pub fn custody_covers(s: &State) -> bool {
    let native = sum_entitlements(s, NATIVE);
    let native_ok = if s.native_converted {
        native <= s.total_native_locked as u128
            && s.settlement_held
                >= mul_div_floor(
                    native as u64,
                    s.total_native_converted,
                    s.total_native_locked,
                ) as u128
    } else {
        s.custody[NATIVE] >= native && native == s.total_native_locked as u128
    };

    native_ok
        && s.custody[SWAPPED] >= sum_entitlements(s, SWAPPED)
        && s.custody[SETTLEMENT] >= sum_entitlements(s, SETTLEMENT)
}

/// Ledger entries unchanged between two states
pub fn ledger_unchanged(before: &State, after: &State) -> bool {
    if before.users.len() != after.users.len() {
        return false;
    }
    before
        .users
        .iter()
        .zip(after.users.iter())
        .all(|(a, b)| a.locked == b.locked)
}

/// Nothing a user was owed was paid out between two states
pub fn payouts_unchanged(before: &State, after: &State) -> bool {
    if before.users.len() != after.users.len() {
        return false;
    }
    before
        .users
        .iter()
        .zip(after.users.iter())
        .all(|(a, b)| a.received == b.received)
}
