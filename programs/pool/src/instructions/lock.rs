//! Lock instructions - deposit into pool custody and credit an entitlement

use crate::custody::Custody;
use crate::state::{has_referral, PoolConfig, Position, ReferralRecord};
use model_safety::lifecycle::Operation;
use pinocchio::{msg, pubkey::Pubkey};
use pinocchio_log::log;
use prelaunch_common::*;

/// Decoded `Lock` / `LockFor` data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockArgs {
    /// Credited user; the signer for plain `Lock`
    pub receiver: Option<Pubkey>,
    pub token: Pubkey,
    pub amount: u64,
    pub referral: [u8; 32],
}

impl LockArgs {
    /// [receiver(32)] token(32) amount(8) referral(32)
    pub fn parse(data: &[u8], with_receiver: bool) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        let receiver = if with_receiver {
            Some(reader.read_pubkey()?)
        } else {
            None
        };
        let token = reader.read_pubkey()?;
        let amount = reader.read_u64()?;
        let referral = reader.read_bytes::<32>()?;
        reader.finish()?;
        Ok(Self { receiver, token, amount, referral })
    }

    pub fn receiver_or<'a>(&'a self, signer: &'a Pubkey) -> &'a Pubkey {
        self.receiver.as_ref().unwrap_or(signer)
    }
}

/// Process a lock
///
/// The payer is whoever the custody backend pulls from; the entitlement goes
/// to `position`, which the entrypoint has already matched to the receiver.
/// Wrapped native locks are credited to the native position and total.
///
/// # Arguments
/// * `pool` - Pool config (native total is updated here)
/// * `position` - Receiver's position for the ledger token of `args.token`
/// * `referral` - Accumulator for `args.referral`; `None` for the zero code
/// * `now` - Clock unix timestamp
/// * `custody` - Funds movement backend
pub fn process_lock<C: Custody>(
    pool: &mut PoolConfig,
    position: &mut Position,
    referral: Option<&mut ReferralRecord>,
    args: &LockArgs,
    now: i64,
    custody: &mut C,
) -> Result<(), PoolError> {
    pool.require_phase(Operation::Lock, now).map_err(|e| {
        msg!("Error: Pool is no longer accepting locks");
        e
    })?;
    if args.amount == 0 {
        return Err(PoolError::InvalidAmount);
    }
    if !pool.is_allowed(&args.token) {
        msg!("Error: Token not allowed");
        return Err(PoolError::TokenNotAllowed);
    }
    let ledger = ledger_token(&args.token);
    if position.token != ledger {
        return Err(PoolError::InvalidAccount);
    }
    if has_referral(&args.referral) && referral.is_none() {
        return Err(PoolError::InvalidAccount);
    }

    let native = ledger == NATIVE_ASSET;
    let prior_native = pool.total_native_locked;
    let prior_balance = position.amount;
    if native {
        pool.total_native_locked =
            model_safety::math::add_u64(prior_native, args.amount).ok_or(PoolError::Overflow)?;
    }
    if let Err(e) = position.credit(args.amount) {
        pool.total_native_locked = prior_native;
        return Err(e);
    }

    if let Err(e) = custody.receive(&args.token, args.amount) {
        msg!("Error: Transfer into pool failed");
        position.amount = prior_balance;
        pool.total_native_locked = prior_native;
        return Err(e);
    }

    if let Some(record) = referral {
        if has_referral(&args.referral) {
            record.record(args.amount);
        }
    }

    log!("Locked {} (balance {})", args.amount, position.amount);
    Ok(())
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "lock_test.rs"]
mod lock_test;
