//! End-to-end pool scenarios
//!
//! Each test walks a pool through lock, activation, the timelock and
//! redemption with several users, checking balances on both sides of custody.

use prelaunch_common::*;
use prelaunch_integration_tests::*;
use prelaunch_pool::instructions::ClaimMode;

const TOKEN_X: Pubkey = [3; 32];
const TOKEN_Y: Pubkey = [4; 32];
const ALICE: Pubkey = [0x11; 32];
const BOB: Pubkey = [0x12; 32];
const CAROL: Pubkey = [0x13; 32];
const NO_REFERRAL: [u8; 32] = [0; 32];

fn pool_with_x() -> Harness {
    let mut h = Harness::new(&[TOKEN_X, TOKEN_Y, SETTLEMENT_MINT]);
    for user in [ALICE, BOB, CAROL] {
        h.fund(user, TOKEN_X, 10 * ONE);
        h.fund(user, NATIVE_ASSET, 10 * ONE);
        h.fund(user, SETTLEMENT_MINT, 10 * ONE);
    }
    h
}

fn past_timelock(h: &mut Harness) {
    h.advance(TIMELOCK_SECONDS);
}

#[test]
fn test_full_lifecycle_with_swap_claim() {
    println!("\n=== Lock, activate, wait, claim ===");
    let mut h = pool_with_x();

    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    assert_eq!(h.balance_of(&ALICE, &TOKEN_X), ONE);
    assert_eq!(h.pool_holdings(&TOKEN_X), ONE);
    assert_eq!(h.wallet(&ALICE, &TOKEN_X), 9 * ONE);

    h.activate().unwrap();
    past_timelock(&mut h);

    // Aggregator returns 0.97 settlement per X; floor 0.95
    h.custody.swap_rate_bps = 9_700;
    let receipt = h.claim_direct(ALICE, TOKEN_X, ONE * 95 / 100, ClaimMode::Payout).unwrap();

    assert_eq!(receipt.received, ONE * 97 / 100);
    assert_eq!(h.balance_of(&ALICE, &TOKEN_X), 0);
    assert_eq!(h.pool_holdings(&TOKEN_X), 0);
    assert_eq!(h.wallet(&ALICE, &SETTLEMENT_MINT), 10 * ONE + ONE * 97 / 100);
    println!("✓ Claimed {} settlement", receipt.received);
}

#[test]
fn test_claim_below_floor_keeps_entitlement() {
    let mut h = pool_with_x();
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    h.custody.swap_rate_bps = 9_000;
    let err = h
        .claim_direct(ALICE, TOKEN_X, ONE * 95 / 100, ClaimMode::Payout)
        .unwrap_err();

    assert_eq!(err, PoolError::SlippageExceeded);
    assert_eq!(h.balance_of(&ALICE, &TOKEN_X), ONE);
    assert_eq!(h.wallet(&ALICE, &SETTLEMENT_MINT), 10 * ONE);

    assert_eq!(h.pool_holdings(&TOKEN_X), ONE);

    // A better quote later still goes through
    h.custody.swap_rate_bps = 9_600;
    let receipt = h.claim_direct(ALICE, TOKEN_X, ONE * 95 / 100, ClaimMode::Payout).unwrap();
    assert_eq!(receipt.received, ONE * 96 / 100);
}

#[test]
fn test_claim_and_stake_credits_shares() {
    let mut h = pool_with_x();
    h.lock(BOB, TOKEN_X, 2 * ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    let receipt = h.claim_direct(BOB, TOKEN_X, 2 * ONE, ClaimMode::Stake).unwrap();

    assert_eq!(receipt.received, 2 * ONE);
    assert_eq!(receipt.shares, 2 * ONE);
    assert_eq!(h.shares(&BOB), 2 * ONE);
    // Staked, not paid out
    assert_eq!(h.wallet(&BOB, &SETTLEMENT_MINT), 10 * ONE);
}

#[test]
fn test_lock_closes_at_activation() {
    let mut h = pool_with_x();
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();

    let err = h.lock(BOB, TOKEN_X, ONE, NO_REFERRAL).unwrap_err();
    assert_eq!(err, PoolError::InvalidLifecycleState);
    assert_eq!(h.wallet(&BOB, &TOKEN_X), 10 * ONE);
    assert_eq!(h.pool_holdings(&TOKEN_X), ONE);

    assert_eq!(h.activate().unwrap_err(), PoolError::AlreadyActivated);
}

#[test]
fn test_claim_waits_for_timelock() {
    let mut h = pool_with_x();
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    h.advance(TIMELOCK_SECONDS - 1);

    let err = h.claim_direct(ALICE, TOKEN_X, 0, ClaimMode::Payout).unwrap_err();
    assert_eq!(err, PoolError::InvalidLifecycleState);

    h.advance(1);
    assert!(h.claim_direct(ALICE, TOKEN_X, 0, ClaimMode::Payout).is_ok());
}

#[test]
fn test_claim_rejects_route_for_other_token() {
    let mut h = pool_with_x();
    h.fund(ALICE, TOKEN_Y, ONE);
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.lock(ALICE, TOKEN_Y, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    // Claiming X with a payload that sells Y
    let payload = encode_direct(&TOKEN_Y, &SETTLEMENT_MINT, ONE, 0, &POOL_SETTLEMENT);
    let err = h
        .claim(ALICE, TOKEN_X, 0, 0, &payload, ClaimMode::Payout)
        .unwrap_err();

    assert_eq!(err, PoolError::InvalidSwapRoute);
    assert_eq!(h.balance_of(&ALICE, &TOKEN_X), ONE);
    assert_eq!(h.pool_holdings(&TOKEN_Y), ONE);
}

#[test]
fn test_settlement_lock_claims_one_to_one() {
    let mut h = pool_with_x();
    h.lock(CAROL, SETTLEMENT_MINT, 3 * ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    let receipt = h
        .claim(CAROL, SETTLEMENT_MINT, 3 * ONE, 0, &[], ClaimMode::Payout)
        .unwrap();
    assert_eq!(receipt.received, 3 * ONE);
    assert_eq!(h.wallet(&CAROL, &SETTLEMENT_MINT), 10 * ONE);
}

#[test]
fn test_native_leg_is_converted_once_and_shared_pro_rata() {
    println!("\n=== Native conversion ===");
    let mut h = pool_with_x();
    for user in [ALICE, BOB, CAROL] {
        h.lock(user, NATIVE_ASSET, 1, NO_REFERRAL).unwrap();
    }
    assert_eq!(h.pool.total_native_locked, 3);

    h.activate().unwrap();
    // Conversion waits for the timelock
    assert_eq!(h.convert_all().unwrap_err(), PoolError::InvalidLifecycleState);

    past_timelock(&mut h);
    // 3 lamports convert into 10 units of settlement
    h.custody.convert_rate_bps = 33_334;
    assert_eq!(h.convert_all().unwrap(), 10);
    assert_eq!(h.convert_all().unwrap_err(), PoolError::AlreadyConverted);

    // Converted lamports cannot be taken back, even in emergency mode
    h.set_emergency(true).unwrap();
    assert_eq!(
        h.withdraw(ALICE, NATIVE_ASSET).unwrap_err(),
        PoolError::InvalidLifecycleState
    );
    h.set_emergency(false).unwrap();

    for user in [ALICE, BOB, CAROL] {
        let receipt = h.claim(user, NATIVE_ASSET, 3, 0, &[], ClaimMode::Payout).unwrap();
        assert_eq!(receipt.received, 3);
        assert_eq!(h.wallet(&user, &SETTLEMENT_MINT), 10 * ONE + 3);
    }

    // Rounding dust stays with the pool
    assert_eq!(h.pool_holdings(&SETTLEMENT_MINT), 1);
    println!("✓ Native leg shared 3/3/3, dust 1");
}

#[test]
fn test_native_lockers_can_exit_for_the_whole_timelock() {
    let mut h = pool_with_x();
    h.lock(ALICE, NATIVE_ASSET, ONE, NO_REFERRAL).unwrap();
    h.lock(BOB, NATIVE_ASSET, 2 * ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();

    // An operator trying to convert early changes nothing
    h.advance(TIMELOCK_SECONDS - 1);
    assert_eq!(h.convert_all().unwrap_err(), PoolError::InvalidLifecycleState);
    assert!(!h.pool.native_converted());

    assert_eq!(h.withdraw(ALICE, NATIVE_ASSET).unwrap(), ONE);
    assert_eq!(h.wallet(&ALICE, &NATIVE_ASSET), 10 * ONE);
    assert_eq!(h.pool.total_native_locked, 2 * ONE);

    h.advance(1);
    assert_eq!(h.convert_all().unwrap(), 2 * ONE);
    let receipt = h.claim(BOB, NATIVE_ASSET, 0, 0, &[], ClaimMode::Payout).unwrap();
    assert_eq!(receipt.received, 2 * ONE);
}

#[test]
fn test_wrapped_native_lock_is_claimed_with_the_native_leg() {
    let mut h = pool_with_x();
    h.fund(ALICE, WRAPPED_NATIVE_MINT, 2 * ONE);
    h.lock(ALICE, WRAPPED_NATIVE_MINT, 2 * ONE, NO_REFERRAL).unwrap();
    h.lock(BOB, NATIVE_ASSET, 2 * ONE, NO_REFERRAL).unwrap();

    assert_eq!(h.pool.total_native_locked, 4 * ONE);
    assert_eq!(h.balance_of(&ALICE, &NATIVE_ASSET), 2 * ONE);
    assert_eq!(h.balance_of(&ALICE, &WRAPPED_NATIVE_MINT), 0);
    assert_eq!(h.pool_holdings(&NATIVE_ASSET), 4 * ONE);
    assert_eq!(h.pool_holdings(&WRAPPED_NATIVE_MINT), 0);

    h.activate().unwrap();
    past_timelock(&mut h);
    h.custody.convert_rate_bps = 5_000;
    assert_eq!(h.convert_all().unwrap(), 2 * ONE);

    let receipt = h.claim(ALICE, NATIVE_ASSET, 0, 0, &[], ClaimMode::Payout).unwrap();
    assert_eq!(receipt.received, ONE);
    assert_eq!(h.wallet(&ALICE, &SETTLEMENT_MINT), 10 * ONE + ONE);
}

#[test]
fn test_native_claim_needs_conversion() {
    let mut h = pool_with_x();
    h.lock(ALICE, NATIVE_ASSET, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    let err = h
        .claim(ALICE, NATIVE_ASSET, 0, 0, &[], ClaimMode::Payout)
        .unwrap_err();
    assert_eq!(err, PoolError::InvalidLifecycleState);

    // Conversion stays open after the timelock
    h.convert_all().unwrap();
    let receipt = h.claim(ALICE, NATIVE_ASSET, ONE, 0, &[], ClaimMode::Stake).unwrap();
    assert_eq!(receipt.shares, ONE);
}

#[test]
fn test_withdraw_window_follows_lifecycle() {
    let mut h = pool_with_x();
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.lock(BOB, TOKEN_X, ONE, NO_REFERRAL).unwrap();

    // No exit while locks are still open
    assert_eq!(
        h.withdraw(ALICE, TOKEN_X).unwrap_err(),
        PoolError::InvalidLifecycleState
    );

    h.activate().unwrap();
    assert_eq!(h.withdraw(ALICE, TOKEN_X).unwrap(), ONE);
    assert_eq!(h.wallet(&ALICE, &TOKEN_X), 10 * ONE);
    assert_eq!(
        h.withdraw(ALICE, TOKEN_X).unwrap_err(),
        PoolError::InsufficientBalance
    );

    past_timelock(&mut h);
    assert_eq!(
        h.withdraw(BOB, TOKEN_X).unwrap_err(),
        PoolError::InvalidLifecycleState
    );
    assert_eq!(h.balance_of(&BOB, &TOKEN_X), ONE);
}

#[test]
fn test_emergency_mode_opens_withdrawals() {
    let mut h = pool_with_x();
    h.lock(ALICE, NATIVE_ASSET, 2 * ONE, NO_REFERRAL).unwrap();
    h.lock(BOB, TOKEN_X, ONE, NO_REFERRAL).unwrap();

    h.set_emergency(true).unwrap();
    assert_eq!(h.withdraw(ALICE, NATIVE_ASSET).unwrap(), 2 * ONE);
    assert_eq!(h.pool.total_native_locked, 0);
    assert_eq!(h.wallet(&ALICE, &NATIVE_ASSET), 10 * ONE);

    // Locks still work; emergency only widens exits
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();

    h.set_emergency(false).unwrap();
    assert_eq!(
        h.withdraw(BOB, TOKEN_X).unwrap_err(),
        PoolError::InvalidLifecycleState
    );
}

#[test]
fn test_lock_for_credits_receiver_and_referral() {
    let mut h = pool_with_x();
    let code = [0xAB; 32];

    h.lock_for(ALICE, BOB, TOKEN_X, ONE, code).unwrap();
    h.lock(CAROL, TOKEN_X, 2 * ONE, code).unwrap();

    assert_eq!(h.wallet(&ALICE, &TOKEN_X), 9 * ONE);
    assert_eq!(h.balance_of(&BOB, &TOKEN_X), ONE);
    assert_eq!(h.balance_of(&ALICE, &TOKEN_X), 0);
    assert_eq!(h.wallet(&BOB, &TOKEN_X), 10 * ONE);

    let record = h.referrals[&code];
    assert_eq!(record.total_locked, 3 * ONE);
    assert_eq!(record.lock_count, 2);
}

#[test]
fn test_unlisted_token_is_rejected() {
    let mut h = pool_with_x();
    let stray = [0x99; 32];
    h.fund(ALICE, stray, ONE);

    let err = h.lock(ALICE, stray, ONE, NO_REFERRAL).unwrap_err();
    assert_eq!(err, PoolError::TokenNotAllowed);
    assert_eq!(h.wallet(&ALICE, &stray), ONE);
}

#[test]
fn test_claims_need_settlement_addresses() {
    let mut h = Harness::unconfigured(&[TOKEN_X]);
    h.fund(ALICE, TOKEN_X, ONE);
    h.lock(ALICE, TOKEN_X, ONE, NO_REFERRAL).unwrap();
    h.activate().unwrap();
    past_timelock(&mut h);

    let err = h.claim_direct(ALICE, TOKEN_X, 0, ClaimMode::Payout).unwrap_err();
    assert_eq!(err, PoolError::VaultNotConfigured);

    // Late configuration is accepted once
    h.set_settlement().unwrap();
    assert_eq!(h.set_settlement().unwrap_err(), PoolError::SettlementAlreadySet);
    assert!(h.claim_direct(ALICE, TOKEN_X, 0, ClaimMode::Payout).is_ok());
}
