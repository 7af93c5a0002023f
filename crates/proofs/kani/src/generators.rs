//! Generators for arbitrary reachable state (for Kani)
//!
//! States are built by replaying transitions from an empty pool so that
//! every generated state is reachable, instead of assigning fields freely.

#[cfg(kani)]
use kani::any;
use model_safety::{state::*, transitions::*};

use crate::sanitizer::N_USERS;
#[cfg(kani)]
use crate::sanitizer::{bounded_amount, MAX_TICK};

/// Empty pool with `N_USERS` ledgers
pub fn empty_pool() -> State {
    let mut s = State::default();
    for _ in 0..N_USERS {
        s.users.push(Ledger::default());
    }
    s
}

/// Pool where every user locked `amount` of every token, then activated
pub fn activated_pool(amount: u64) -> State {
    let mut s = empty_pool();
    for uid in 0..N_USERS {
        for token in 0..N_TOKENS {
            s = lock(s, uid, token, amount);
        }
    }
    activate(s)
}

#[cfg(kani)]
pub fn any_state_bounded() -> State {
    let mut s = empty_pool();

    // A few locks with arbitrary users, tokens and amounts
    for _ in 0..2 {
        let uid = (any::<u8>() as usize) % N_USERS;
        let token = (any::<u8>() as usize) % N_TOKENS;
        s = lock(s, uid, token, bounded_amount(any()));
    }

    if any::<bool>() {
        s = activate(s);
        s = tick(s, any::<u32>() % MAX_TICK);
    }

    s
}
