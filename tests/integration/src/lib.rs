//! Prelaunch Pool Integration Harness
//!
//! Drives the pool's instruction handlers end to end against the in-memory
//! custody backend. Accounts live in maps keyed the way the program derives
//! its PDAs; each user has their own wallet and vault share balance.

use std::collections::BTreeMap;

use prelaunch_common::*;
use prelaunch_pool::instructions::*;
use prelaunch_pool::sim::SimCustody;
use prelaunch_pool::state::{PoolConfig, Position, ReferralRecord};

pub use prelaunch_pool::route::encode_direct;

pub type Pubkey = [u8; 32];

pub const OWNER: Pubkey = [1; 32];
pub const EXCHANGE: Pubkey = [2; 32];
pub const SETTLEMENT_MINT: Pubkey = [7; 32];
pub const SETTLEMENT_PROGRAM: Pubkey = [6; 32];
pub const VAULT: Pubkey = [5; 32];
pub const POOL_SETTLEMENT: Pubkey = [8; 32];
pub const SWAP_AUTHORITY: Pubkey = [9; 32];
pub const T0: i64 = 1_700_000_000;
/// One whole token at 9 decimals
pub const ONE: u64 = 1_000_000_000;

pub struct Harness {
    pub pool: PoolConfig,
    pub positions: BTreeMap<(Pubkey, Pubkey), Position>,
    pub referrals: BTreeMap<[u8; 32], ReferralRecord>,
    pub custody: SimCustody,
    wallets: BTreeMap<Pubkey, BTreeMap<Pubkey, u64>>,
    shares: BTreeMap<Pubkey, u64>,
    pub now: i64,
}

impl Harness {
    /// Initialized pool in the Locking phase with settlement addresses set
    pub fn new(tokens: &[Pubkey]) -> Self {
        let mut h = Self::unconfigured(tokens);
        h.set_settlement().expect("settlement addresses");
        h
    }

    pub fn unconfigured(tokens: &[Pubkey]) -> Self {
        let args = InitializeArgs {
            exchange_program: EXCHANGE,
            tokens: tokens.iter().copied().collect(),
        };
        let mut pool = PoolConfig::zeroed();
        let addresses = PoolAddresses {
            bump: 255,
            native_vault_bump: 254,
            swap_authority: SWAP_AUTHORITY,
            swap_authority_bump: 253,
        };
        process_initialize(&mut pool, &OWNER, &args, &addresses).expect("initialize");

        Self {
            pool,
            positions: BTreeMap::new(),
            referrals: BTreeMap::new(),
            custody: SimCustody::new(SETTLEMENT_MINT, POOL_SETTLEMENT),
            wallets: BTreeMap::new(),
            shares: BTreeMap::new(),
            now: T0,
        }
    }

    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
    }

    pub fn fund(&mut self, user: Pubkey, token: Pubkey, amount: u64) {
        *self.wallets.entry(user).or_default().entry(token).or_insert(0) += amount;
    }

    pub fn wallet(&self, user: &Pubkey, token: &Pubkey) -> u64 {
        self.wallets
            .get(user)
            .and_then(|w| w.get(token))
            .copied()
            .unwrap_or(0)
    }

    pub fn shares(&self, user: &Pubkey) -> u64 {
        self.shares.get(user).copied().unwrap_or(0)
    }

    /// Entitlement of `user` in `token`
    pub fn balance_of(&self, user: &Pubkey, token: &Pubkey) -> u64 {
        self.positions
            .get(&(*user, *token))
            .map(|p| p.balance())
            .unwrap_or(0)
    }

    pub fn pool_holdings(&self, token: &Pubkey) -> u64 {
        self.custody.pool_balance(token)
    }

    /// Run `f` with `user`'s wallet and shares loaded into the custody backend
    fn as_user<T>(
        &mut self,
        user: Pubkey,
        f: impl FnOnce(&mut Self) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        self.custody.wallet = self.wallets.remove(&user).unwrap_or_default();
        self.custody.shares = self.shares.remove(&user).unwrap_or(0);
        let result = self.atomically(f);
        self.wallets.insert(user, std::mem::take(&mut self.custody.wallet));
        self.shares.insert(user, std::mem::take(&mut self.custody.shares));
        result
    }

    /// A failed instruction reverts every token movement it made, as the
    /// runtime does for a failed transaction. Program state is left to the
    /// handler's own rollback.
    fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        let snapshot = self.custody.clone();
        let result = f(self);
        if result.is_err() {
            self.custody = snapshot;
        }
        result
    }

    pub fn set_settlement(&mut self) -> Result<(), PoolError> {
        process_set_settlement_addresses(
            &mut self.pool,
            &OWNER,
            &SETTLEMENT_MINT,
            &SETTLEMENT_PROGRAM,
            &VAULT,
            self.now,
        )
    }

    pub fn activate(&mut self) -> Result<(), PoolError> {
        process_activate(&mut self.pool, &OWNER, self.now)
    }

    pub fn set_emergency(&mut self, flag: bool) -> Result<(), PoolError> {
        process_set_emergency_mode(&mut self.pool, &OWNER, flag)
    }

    pub fn lock(&mut self, user: Pubkey, token: Pubkey, amount: u64, referral: [u8; 32]) -> Result<(), PoolError> {
        self.lock_for(user, user, token, amount, referral)
    }

    /// `payer` funds the lock, `receiver` is credited
    pub fn lock_for(
        &mut self,
        payer: Pubkey,
        receiver: Pubkey,
        token: Pubkey,
        amount: u64,
        referral: [u8; 32],
    ) -> Result<(), PoolError> {
        let args = LockArgs {
            receiver: Some(receiver),
            token,
            amount,
            referral,
        };
        // Wrapped native shares the native position, as the PDA seeds do
        let ledger = ledger_token(&token);
        self.as_user(payer, |h| {
            let mut position = h
                .positions
                .get(&(receiver, ledger))
                .copied()
                .unwrap_or_else(|| Position::new(receiver, ledger, 0));
            let mut record = h
                .referrals
                .get(&referral)
                .copied()
                .unwrap_or_else(|| ReferralRecord::new(referral, 0));
            let referral_slot = if is_unset(&referral) { None } else { Some(&mut record) };

            process_lock(&mut h.pool, &mut position, referral_slot, &args, h.now, &mut h.custody)?;

            h.positions.insert((receiver, ledger), position);
            if !is_unset(&referral) {
                h.referrals.insert(referral, record);
            }
            Ok(())
        })
    }

    pub fn withdraw(&mut self, user: Pubkey, token: Pubkey) -> Result<u64, PoolError> {
        self.as_user(user, |h| {
            let position = h
                .positions
                .get_mut(&(user, token))
                .ok_or(PoolError::InvalidAccount)?;
            process_withdraw(&mut h.pool, position, h.now, &mut h.custody)
        })
    }

    pub fn convert_all(&mut self) -> Result<u64, PoolError> {
        self.atomically(|h| process_convert_all(&mut h.pool, &OWNER, h.now, &mut h.custody))
    }

    pub fn claim(
        &mut self,
        user: Pubkey,
        token: Pubkey,
        min_out: u64,
        route: u8,
        payload: &[u8],
        mode: ClaimMode,
    ) -> Result<ClaimReceipt, PoolError> {
        let req = ClaimRequest {
            token,
            min_out,
            route,
            swap_accounts: 0,
            payload,
        };
        self.as_user(user, |h| {
            let position = h
                .positions
                .get_mut(&(user, token))
                .ok_or(PoolError::InvalidAccount)?;
            process_claim(&h.pool, position, &req, mode, h.now, &mut h.custody)
        })
    }

    /// Claim a swapped token with a direct route covering the whole entitlement
    pub fn claim_direct(
        &mut self,
        user: Pubkey,
        token: Pubkey,
        min_out: u64,
        mode: ClaimMode,
    ) -> Result<ClaimReceipt, PoolError> {
        let payload = encode_direct(
            &token,
            &SETTLEMENT_MINT,
            self.balance_of(&user, &token),
            min_out,
            &POOL_SETTLEMENT,
        );
        self.claim(user, token, min_out, 0, &payload, mode)
    }

    /// Sum of entitlements in `token` over every position
    pub fn total_entitlement(&self, token: &Pubkey) -> u128 {
        self.positions
            .iter()
            .filter(|((_, t), _)| t == token)
            .map(|(_, p)| p.balance() as u128)
            .sum()
    }
}
