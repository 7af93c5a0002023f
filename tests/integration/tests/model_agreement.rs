//! Random instruction sequences replayed against the handlers and the pure
//! pool model; both must accept and reject the same operations and end in
//! the same ledger.

use model_safety as model;
use prelaunch_common::{PoolError, NATIVE_ASSET};
use prelaunch_integration_tests::*;
use prelaunch_pool::instructions::ClaimMode;
use proptest::prelude::*;

const TOKEN_X: Pubkey = [3; 32];
const USERS: [Pubkey; 3] = [[0x11; 32], [0x12; 32], [0x13; 32]];
const FUNDING: u64 = 1 << 40;

#[derive(Clone, Debug)]
enum Op {
    Lock { uid: usize, native: bool, amount: u64 },
    Activate,
    Tick(u32),
    Emergency(bool),
    Withdraw { uid: usize, native: bool },
    Convert { rate_bps: u64 },
    Claim { uid: usize, native: bool, rate_bps: u64, min_out: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..3usize, any::<bool>(), 0..1_000_000u64)
            .prop_map(|(uid, native, amount)| Op::Lock { uid, native, amount }),
        1 => Just(Op::Activate),
        2 => (0..800_000u32).prop_map(Op::Tick),
        1 => any::<bool>().prop_map(Op::Emergency),
        1 => (0..3usize, any::<bool>()).prop_map(|(uid, native)| Op::Withdraw { uid, native }),
        1 => (5_000..20_000u64).prop_map(|rate_bps| Op::Convert { rate_bps }),
        2 => (0..3usize, any::<bool>(), 5_000..20_000u64, 0..1_000_000u64).prop_map(
            |(uid, native, rate_bps, min_out)| Op::Claim { uid, native, rate_bps, min_out }
        ),
    ]
}

fn slot(native: bool) -> (usize, Pubkey) {
    if native {
        (model::NATIVE, NATIVE_ASSET)
    } else {
        (model::SWAPPED, TOKEN_X)
    }
}

fn scaled(amount: u64, bps: u64) -> u64 {
    model::math::mul_div_floor(amount, bps, 10_000)
}

fn setup() -> (Harness, model::State) {
    let mut h = Harness::new(&[TOKEN_X, SETTLEMENT_MINT]);
    let mut s = model::State::default();
    for user in USERS {
        h.fund(user, TOKEN_X, FUNDING);
        h.fund(user, NATIVE_ASSET, FUNDING);
        s.users.push(model::Ledger::default());
    }
    (h, s)
}

/// Apply `op` to both sides; returns the handler result and the model state
fn apply(h: &mut Harness, s: model::State, op: &Op) -> (Result<(), PoolError>, model::State) {
    match *op {
        Op::Lock { uid, native, amount } => {
            let (idx, token) = slot(native);
            let r = h.lock(USERS[uid], token, amount, [0; 32]);
            (r, model::lock(s, uid, idx, amount))
        }
        Op::Activate => (h.activate(), model::transitions::activate(s)),
        Op::Tick(secs) => {
            h.advance(secs as i64);
            (Ok(()), model::tick(s, secs))
        }
        Op::Emergency(flag) => (h.set_emergency(flag), model::set_emergency(s, flag)),
        Op::Withdraw { uid, native } => {
            let (idx, token) = slot(native);
            let r = h.withdraw(USERS[uid], token).map(|_| ());
            (r, model::withdraw(s, uid, idx))
        }
        Op::Convert { rate_bps } => {
            h.custody.convert_rate_bps = rate_bps;
            let output = scaled(s.total_native_locked, rate_bps);
            let r = h.convert_all().map(|_| ());
            (r, model::convert_native(s, output))
        }
        Op::Claim { uid, native, rate_bps, min_out } => {
            let (idx, token) = slot(native);
            let user = USERS[uid];
            h.custody.swap_rate_bps = rate_bps;
            let swap_output = scaled(h.balance_of(&user, &token), rate_bps);
            let r = if native {
                h.claim(user, token, min_out, 0, &[], ClaimMode::Payout)
            } else {
                h.claim_direct(user, token, min_out, ClaimMode::Payout)
            };
            (r.map(|_| ()), model::claim(s, uid, idx, swap_output, min_out))
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn handlers_agree_with_model(ops in proptest::collection::vec(op(), 1..40)) {
        let (mut h, mut s) = setup();

        for op in &ops {
            let before = s.clone();
            let (result, next) = apply(&mut h, s, op);
            s = next;

            // The model signals rejection by returning the state unchanged
            if result.is_err() {
                prop_assert_eq!(&before, &s, "handler rejected {:?} ({:?}) but model applied it", op, result);
            }

            prop_assert_eq!(h.pool.phase(h.now), s.phase());
            prop_assert_eq!(h.pool.total_native_locked, s.total_native_locked);
            prop_assert_eq!(h.pool.native_converted(), s.native_converted);

            for (uid, user) in USERS.iter().enumerate() {
                prop_assert_eq!(h.balance_of(user, &TOKEN_X), s.users[uid].locked[model::SWAPPED]);
                prop_assert_eq!(h.balance_of(user, &NATIVE_ASSET), s.users[uid].locked[model::NATIVE]);
                prop_assert_eq!(h.wallet(user, &SETTLEMENT_MINT) as u128, s.users[uid].received);
            }

            prop_assert!(model::ledger_conserved(&s));
            prop_assert!(model::custody_covers(&s));
            prop_assert!(h.pool_holdings(&TOKEN_X) as u128 >= h.total_entitlement(&TOKEN_X));
        }
    }
}
