//! Adversarial step generator

#[cfg(kani)]
use kani::any;
#[cfg(kani)]
use model_safety::{state::*, transitions::*};

#[derive(Clone, Copy, Debug)]
pub enum Step {
    Lock,
    Activate,
    Tick,
    Emergency,
    Withdraw,
    Convert,
    Claim,
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let choice: u8 = any();
        match choice % 7 {
            0 => Step::Lock,
            1 => Step::Activate,
            2 => Step::Tick,
            3 => Step::Emergency,
            4 => Step::Withdraw,
            5 => Step::Convert,
            _ => Step::Claim,
        }
    }
}

#[cfg(kani)]
pub fn adversary_step(s: State) -> State {
    if s.users.is_empty() {
        return s;
    }

    let uid: usize = (any::<u8>() as usize) % s.users.len();
    let token: usize = (any::<u8>() as usize) % N_TOKENS;

    match any::<Step>() {
        Step::Lock => lock(s, uid, token, crate::sanitizer::bounded_amount(any())),
        Step::Activate => activate(s),
        Step::Tick => tick(s, any::<u32>() % crate::sanitizer::MAX_TICK),
        Step::Emergency => set_emergency(s, any()),
        Step::Withdraw => withdraw(s, uid, token),
        Step::Convert => convert_native(s, any::<u64>() % 10_000),
        Step::Claim => {
            let out: u64 = any::<u64>() % 10_000;
            let floor: u64 = any::<u64>() % 10_000;
            claim(s, uid, token, out, floor)
        }
    }
}
