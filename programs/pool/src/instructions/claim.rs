//! Claim instructions - redeem an entitlement as settlement asset
//!
//! Order of operations:
//! 1. Lifecycle, configuration and entitlement checks
//! 2. Swap payload decoded and validated against the entitlement
//! 3. Entitlement zeroed
//! 4. Swap executed; output measured as the settlement balance delta
//! 5. Floor check, then payout or vault deposit
//!
//! Any failure after step 3 restores the entitlement before returning.

use crate::custody::Custody;
use crate::route::{SwapOrder, SwapRoute};
use crate::state::{PoolConfig, Position};
use model_safety::lifecycle::Operation;
use model_safety::math::mul_div_floor;
use pinocchio::{msg, pubkey::Pubkey};
use pinocchio_log::log;
use prelaunch_common::*;

/// Where the settlement asset goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    /// Transfer to the user's settlement account
    Payout,
    /// Deposit into the vault, shares to the user
    Stake,
}

/// Decoded `Claim` / `ClaimAndStake` data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest<'a> {
    pub token: Pubkey,
    /// Minimum settlement the caller accepts
    pub min_out: u64,
    pub route: u8,
    /// How many of the trailing accounts belong to the aggregator
    pub swap_accounts: u8,
    pub payload: &'a [u8],
}

impl<'a> ClaimRequest<'a> {
    /// token(32) min_out(8) route(1) swap_accounts(1) payload_len(2) payload
    pub fn parse(data: &'a [u8]) -> Result<Self, PoolError> {
        let mut reader = InstructionReader::new(data);
        let token = reader.read_pubkey()?;
        let min_out = reader.read_u64()?;
        let route = reader.read_u8()?;
        let swap_accounts = reader.read_u8()?;
        let len = reader.read_u16()? as usize;
        let payload = reader.read_slice(len)?;
        reader.finish()?;
        Ok(Self { token, min_out, route, swap_accounts, payload })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClaimReceipt {
    /// Settlement asset delivered
    pub received: u64,
    /// Vault shares credited (stake mode only)
    pub shares: u64,
}

/// How the settlement amount for a claim is obtained
enum Source<'a> {
    /// Entitlement already denominated in the settlement asset
    Settlement(u64),
    /// Pro-rata share of the converted native leg
    Native(u64),
    Swap(SwapOrder<'a>),
}

/// Process a claim
///
/// # Arguments
/// * `pool` - Pool config
/// * `position` - Claimant's position for `req.token`
/// * `req` - Decoded request
/// * `mode` - Payout or stake
/// * `now` - Clock unix timestamp
/// * `custody` - Funds movement backend
pub fn process_claim<'a, C: Custody>(
    pool: &PoolConfig,
    position: &mut Position,
    req: &ClaimRequest<'a>,
    mode: ClaimMode,
    now: i64,
    custody: &mut C,
) -> Result<ClaimReceipt, PoolError> {
    pool.require_phase(Operation::Claim, now).map_err(|e| {
        msg!("Error: Claims open after the timelock");
        e
    })?;
    if !pool.settlement_configured() {
        msg!("Error: Settlement addresses not set");
        return Err(PoolError::VaultNotConfigured);
    }
    if position.token != req.token {
        return Err(PoolError::InvalidAccount);
    }

    let stake = position.balance();
    if stake == 0 {
        return Err(PoolError::InsufficientBalance);
    }

    let source = if req.token == pool.settlement_mint {
        Source::Settlement(stake)
    } else if req.token == NATIVE_ASSET {
        if !pool.native_converted() {
            msg!("Error: Native leg not converted yet");
            return Err(PoolError::InvalidLifecycleState);
        }
        Source::Native(mul_div_floor(
            stake,
            pool.total_native_converted,
            pool.total_native_locked,
        ))
    } else {
        let route = SwapRoute::from_u8(req.route)?;
        let order = SwapOrder::decode(route, req.payload)?;
        order
            .validate(&req.token, &pool.settlement_mint, stake, &custody.settlement_account())
            .map_err(|e| {
                msg!("Error: Swap does not match the claim");
                e
            })?;
        Source::Swap(order)
    };

    position.debit(stake)?;

    match settle(&source, stake, req.min_out, mode, custody) {
        Ok(receipt) => {
            log!("Claimed {} settlement for {}", receipt.received, stake);
            Ok(receipt)
        }
        Err(e) => {
            position.amount = stake;
            Err(e)
        }
    }
}

fn settle<C: Custody>(
    source: &Source,
    stake: u64,
    min_out: u64,
    mode: ClaimMode,
    custody: &mut C,
) -> Result<ClaimReceipt, PoolError> {
    let received = match source {
        Source::Settlement(amount) | Source::Native(amount) => *amount,
        Source::Swap(order) => swap(order, stake, custody)?,
    };

    if received < min_out {
        msg!("Error: Output below minimum");
        return Err(PoolError::SlippageExceeded);
    }

    let shares = match mode {
        ClaimMode::Payout => {
            custody.payout(received)?;
            0
        }
        ClaimMode::Stake => custody.stake(received)?,
    };

    Ok(ClaimReceipt { received, shares })
}

/// Execute the order and measure what it produced
///
/// Fails when the aggregator takes more of the input token than the
/// entitlement, or leaves the pool with less settlement asset than before.
fn swap<C: Custody>(order: &SwapOrder, stake: u64, custody: &mut C) -> Result<u64, PoolError> {
    let input_before = custody.held(&order.input_mint)?;
    let output_before = custody.settlement_balance()?;

    custody.swap(order)?;

    let input_after = custody.held(&order.input_mint)?;
    let output_after = custody.settlement_balance()?;

    if input_before.saturating_sub(input_after) > stake {
        msg!("Error: Swap spent more than the entitlement");
        return Err(PoolError::InvalidSwapRoute);
    }
    output_after.checked_sub(output_before).ok_or(PoolError::ExternalCallFailed)
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "claim_test.rs"]
mod claim_test;
