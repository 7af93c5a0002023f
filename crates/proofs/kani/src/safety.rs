//! Kani safety proofs for the pool invariants

use kani::any;
use model_safety::{helpers::*, lifecycle::*, state::*, transitions::*};
use crate::{adversary::*, generators::*, sanitizer::*};

/// Conservation and coverage hold across short adversarial sequences
#[kani::proof]
#[kani::unwind(8)]
fn conservation_holds_across_short_adversary_sequences() {
    let mut s = any_state_bounded().sanitize();
    kani::assume(ledger_conserved(&s));

    let mut steps: u8 = any();
    steps = (steps % MAX_STEPS) + 1;

    for _ in 0..steps {
        let before_phase = s.phase();
        s = adversary_step(s);
        kani::assert(ledger_conserved(&s), "Entitlements equal locked - claimed - withdrawn");
        kani::assert(custody_covers(&s), "Pool custody covers every entitlement");
        kani::assert(phase_never_regresses(before_phase, s.phase()), "Lifecycle never moves backwards");
    }
}

/// Locking after activation never changes the ledger
#[kani::proof]
fn lock_after_activation_is_rejected() {
    let s = activated_pool(bounded_amount(any()));
    let s = tick(s, any::<u32>() % MAX_TICK);
    let before = s.clone();

    let uid = (any::<u8>() as usize) % N_USERS;
    let token = (any::<u8>() as usize) % N_TOKENS;
    let after = lock(s, uid, token, any());

    kani::assert(ledger_unchanged(&before, &after), "Lock must fail once activated");
}

/// Claims before the timelock elapses never pay out
#[kani::proof]
fn claim_before_timelock_is_rejected() {
    let s = activated_pool(bounded_amount(any()));
    let wait: u32 = any();
    kani::assume((wait as i64) < s.params.timelock);
    let s = tick(s, wait);
    let before = s.clone();

    let uid = (any::<u8>() as usize) % N_USERS;
    let token = (any::<u8>() as usize) % N_TOKENS;
    let after = claim(s, uid, token, any(), 0);

    kani::assert(ledger_unchanged(&before, &after), "Claim must wait for the timelock");
    kani::assert(payouts_unchanged(&before, &after), "No payout before the timelock");
}

/// A swap producing less than the floor leaves ledger and payouts untouched
#[kani::proof]
fn slippage_floor_is_enforced() {
    let s = activated_pool(bounded_amount(any()));
    let timelock = s.params.timelock as u32;
    let s = tick(s, timelock);
    let before = s.clone();

    let out: u64 = any();
    let floor: u64 = any();
    kani::assume(out < floor);
    let after = claim(s, 0, SWAPPED, out, floor);

    kani::assert(before == after, "Below-floor claim must abort");
}

/// Activation is one-shot
#[kani::proof]
fn activation_is_irreversible() {
    let s = activate(empty_pool());
    let first = s.activation_time;
    let s = tick(s, any());
    let s = activate(s);

    kani::assert(s.activation_time == first, "Second activation must not move the clock");
    kani::assert(s.phase() != Phase::Locking, "Activated pool never returns to Locking");
}
