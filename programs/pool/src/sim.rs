//! In-memory custody backend
//!
//! Models the pool's token accounts, one user's wallet and the three external
//! programs (aggregator, settlement program, vault) closely enough to drive
//! the instruction handlers off chain.

use std::collections::BTreeMap;

use pinocchio::pubkey::Pubkey;
use prelaunch_common::*;

use crate::custody::Custody;
use crate::route::SwapOrder;

const BPS: u64 = 10_000;

/// External call to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    Receive,
    Release,
    Swap,
    Convert,
    Payout,
    Stake,
}

#[derive(Debug, Clone)]
pub struct SimCustody {
    pub settlement_mint: Pubkey,
    pub settlement_account: Pubkey,
    /// Pool holdings per token (native and settlement included)
    pub pool: BTreeMap<Pubkey, u64>,
    /// The acting user's wallet per token
    pub wallet: BTreeMap<Pubkey, u64>,
    /// The acting user's vault shares
    pub shares: u64,
    /// Aggregator output per unit of input
    pub swap_rate_bps: u64,
    /// Extra input the aggregator tries to take beyond the order; the
    /// delegated allowance makes any such attempt fail the call
    pub swap_overdraw: u64,
    /// Settlement program output per lamport
    pub convert_rate_bps: u64,
    /// Vault shares minted per unit deposited
    pub share_rate_bps: u64,
    pub fail_on: Option<SimCall>,
}

impl SimCustody {
    pub fn new(settlement_mint: Pubkey, settlement_account: Pubkey) -> Self {
        Self {
            settlement_mint,
            settlement_account,
            pool: BTreeMap::new(),
            wallet: BTreeMap::new(),
            shares: 0,
            swap_rate_bps: BPS,
            swap_overdraw: 0,
            convert_rate_bps: BPS,
            share_rate_bps: BPS,
            fail_on: None,
        }
    }

    pub fn fund_wallet(&mut self, token: Pubkey, amount: u64) {
        *self.wallet.entry(token).or_insert(0) += amount;
    }

    pub fn wallet_balance(&self, token: &Pubkey) -> u64 {
        self.wallet.get(token).copied().unwrap_or(0)
    }

    pub fn pool_balance(&self, token: &Pubkey) -> u64 {
        self.pool.get(token).copied().unwrap_or(0)
    }

    fn check(&self, call: SimCall) -> Result<(), PoolError> {
        if self.fail_on == Some(call) {
            return Err(PoolError::ExternalCallFailed);
        }
        Ok(())
    }

    fn take(map: &mut BTreeMap<Pubkey, u64>, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        let balance = map.entry(*token).or_insert(0);
        *balance = balance.checked_sub(amount).ok_or(PoolError::ExternalCallFailed)?;
        Ok(())
    }

    fn give(map: &mut BTreeMap<Pubkey, u64>, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        let balance = map.entry(*token).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(PoolError::ExternalCallFailed)?;
        Ok(())
    }

    fn scaled(amount: u64, bps: u64) -> u64 {
        model_safety::math::mul_div_floor(amount, bps, BPS)
    }
}

impl Custody for SimCustody {
    fn settlement_account(&self) -> Pubkey {
        self.settlement_account
    }

    fn held(&self, token: &Pubkey) -> Result<u64, PoolError> {
        Ok(self.pool_balance(token))
    }

    fn settlement_balance(&self) -> Result<u64, PoolError> {
        Ok(self.pool_balance(&self.settlement_mint))
    }

    fn receive(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        self.check(SimCall::Receive)?;
        Self::take(&mut self.wallet, token, amount)?;
        Self::give(&mut self.pool, &ledger_token(token), amount)
    }

    fn release(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        self.check(SimCall::Release)?;
        Self::take(&mut self.pool, token, amount)?;
        Self::give(&mut self.wallet, token, amount)
    }

    fn swap(&mut self, order: &SwapOrder) -> Result<(), PoolError> {
        self.check(SimCall::Swap)?;
        if self.swap_overdraw > 0 {
            // Spending past the delegated allowance
            return Err(PoolError::ExternalCallFailed);
        }
        Self::take(&mut self.pool, &order.input_mint, order.amount_in)?;
        let out = Self::scaled(order.amount_in, self.swap_rate_bps);
        Self::give(&mut self.pool, &order.output_mint, out)
    }

    fn convert_native(&mut self, lamports: u64) -> Result<(), PoolError> {
        self.check(SimCall::Convert)?;
        Self::take(&mut self.pool, &NATIVE_ASSET, lamports)?;
        let out = Self::scaled(lamports, self.convert_rate_bps);
        let mint = self.settlement_mint;
        Self::give(&mut self.pool, &mint, out)
    }

    fn payout(&mut self, amount: u64) -> Result<(), PoolError> {
        self.check(SimCall::Payout)?;
        let mint = self.settlement_mint;
        Self::take(&mut self.pool, &mint, amount)?;
        Self::give(&mut self.wallet, &mint, amount)
    }

    fn stake(&mut self, amount: u64) -> Result<u64, PoolError> {
        self.check(SimCall::Stake)?;
        let mint = self.settlement_mint;
        Self::take(&mut self.pool, &mint, amount)?;
        let minted = Self::scaled(amount, self.share_rate_bps);
        self.shares = self.shares.checked_add(minted).ok_or(PoolError::ExternalCallFailed)?;
        Ok(minted)
    }
}
