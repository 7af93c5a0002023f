//! State space sanitizer - bounds values for Kani exploration

use model_safety::state::*;

pub const N_USERS: usize = 3;
pub const MAX_STEPS: u8 = 4;

/// Bounds for tractable verification
pub const MAX_AMOUNT: u64 = 1_000;
pub const MAX_TICK: u32 = 8 * 24 * 60 * 60;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

impl Sanitize for State {
    fn sanitize(mut self) -> State {
        // Clamp user count
        while self.users.len() > N_USERS {
            self.users.pop();
        }

        // A zero timelock collapses Converting; keep the window open
        if self.params.timelock <= 0 {
            self.params.timelock = 1;
        }

        self
    }
}

/// Clamp an amount into the explored range, never zero
pub fn bounded_amount(raw: u64) -> u64 {
    (raw % MAX_AMOUNT) + 1
}
