//! Movement of funds in and out of pool custody
//!
//! Instruction handlers keep the ledger and talk to the outside world only
//! through [`Custody`]. On chain every method is a CPI; host tests use the
//! in-memory backend in `sim`.

use arrayvec::ArrayVec;
use pinocchio::{
    account_info::AccountInfo,
    cpi::slice_invoke_signed,
    instruction::{AccountMeta, Instruction, Seed, Signer},
    pubkey::Pubkey,
};
use pinocchio_system::instructions::Transfer as SystemTransfer;
use pinocchio_token::instructions::{Approve, CloseAccount, Revoke, Transfer};
use prelaunch_common::*;

use crate::route::SwapOrder;

/// Settlement program `DepositNative { lamports }`
pub const DEPOSIT_NATIVE_TAG: u8 = 0;
/// Vault program `Deposit { amount }`
pub const VAULT_DEPOSIT_TAG: u8 = 0;

pub trait Custody {
    /// Pool account that receives settlement asset
    fn settlement_account(&self) -> Pubkey;

    /// Pool holdings of `token`
    fn held(&self, token: &Pubkey) -> Result<u64, PoolError>;

    /// Pool holdings of the settlement asset
    fn settlement_balance(&self) -> Result<u64, PoolError>;

    /// Pull `amount` of `token` from the payer into the pool
    ///
    /// Wrapped native tokens arrive as lamports in the native vault.
    fn receive(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError>;

    /// Send `amount` of `token` from the pool back to the user
    fn release(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError>;

    /// Hand a validated order to the exchange aggregator
    ///
    /// The aggregator may spend at most `order.amount_in` of the input token
    /// and never acts with the pool's authority.
    fn swap(&mut self, order: &SwapOrder) -> Result<(), PoolError>;

    /// Convert `lamports` of the native leg into settlement asset
    fn convert_native(&mut self, lamports: u64) -> Result<(), PoolError>;

    /// Transfer settlement asset to the user
    fn payout(&mut self, amount: u64) -> Result<(), PoolError>;

    /// Deposit settlement asset into the vault for the user; returns shares credited
    fn stake(&mut self, amount: u64) -> Result<u64, PoolError>;
}

/// Accounts an instruction makes available for CPIs
///
/// Only the accounts an instruction needs are set; a method reaching for a
/// missing account fails with `InvalidAccount`.
pub struct CpiCustody<'a> {
    pub pool: &'a AccountInfo,
    pub pool_bump: u8,
    /// Delegate the aggregator spends through during a claim
    pub swap_authority: Option<&'a AccountInfo>,
    pub swap_authority_bump: u8,
    /// Signer of the instruction; source of locks, destination of releases
    pub user: &'a AccountInfo,
    pub native_vault: Option<&'a AccountInfo>,
    pub native_vault_bump: u8,
    /// Pool token account for the instruction's token; a scratch wrapped
    /// native account for wrapped native locks
    pub pool_token: Option<&'a AccountInfo>,
    /// User token account for the instruction's token
    pub user_token: Option<&'a AccountInfo>,
    pub pool_settlement: Option<&'a AccountInfo>,
    pub user_settlement: Option<&'a AccountInfo>,
    pub user_shares: Option<&'a AccountInfo>,
    pub exchange_program: Pubkey,
    pub settlement_program: Pubkey,
    pub vault_program: Pubkey,
    /// Accounts forwarded to the aggregator
    pub swap_accounts: &'a [AccountInfo],
    /// Accounts forwarded to the settlement or vault program
    pub extra_accounts: &'a [AccountInfo],
}

fn need(account: Option<&AccountInfo>) -> Result<&AccountInfo, PoolError> {
    account.ok_or(PoolError::InvalidAccount)
}

fn failed<E>(_: E) -> PoolError {
    PoolError::ExternalCallFailed
}

/// Build metas for forwarded accounts; `signer` is marked as signing
fn forward<'a>(
    metas: &mut ArrayVec<AccountMeta<'a>, MAX_CPI_ACCOUNTS>,
    infos: &mut ArrayVec<&'a AccountInfo, MAX_CPI_ACCOUNTS>,
    accounts: &'a [AccountInfo],
    signer: &Pubkey,
) -> Result<(), PoolError> {
    for account in accounts {
        let is_signer = account.is_signer() || account.key() == signer;
        metas
            .try_push(AccountMeta::new(account.key(), account.is_writable(), is_signer))
            .map_err(|_| PoolError::InvalidAccount)?;
        infos.try_push(account).map_err(|_| PoolError::InvalidAccount)?;
    }
    Ok(())
}

impl<'a> CpiCustody<'a> {
    fn native_vault(&self) -> Result<&'a AccountInfo, PoolError> {
        need(self.native_vault)
    }

    fn pool_settlement(&self) -> Result<&'a AccountInfo, PoolError> {
        need(self.pool_settlement)
    }

    /// Run `f` with the pool PDA signer
    fn with_pool_signer<R>(&self, f: impl FnOnce(&[Signer]) -> R) -> R {
        let bump = [self.pool_bump];
        let seeds = [Seed::from(POOL_SEED), Seed::from(&bump[..])];
        let signers = [Signer::from(&seeds[..])];
        f(&signers)
    }

    fn with_swap_signer<R>(&self, f: impl FnOnce(&[Signer]) -> R) -> R {
        let bump = [self.swap_authority_bump];
        let seeds = [Seed::from(SWAP_AUTHORITY_SEED), Seed::from(&bump[..])];
        let signers = [Signer::from(&seeds[..])];
        f(&signers)
    }

    fn with_native_signer<R>(&self, f: impl FnOnce(&[Signer]) -> R) -> R {
        let bump = [self.native_vault_bump];
        let seeds = [Seed::from(NATIVE_VAULT_SEED), Seed::from(&bump[..])];
        let signers = [Signer::from(&seeds[..])];
        f(&signers)
    }
}

impl<'a> Custody for CpiCustody<'a> {
    fn settlement_account(&self) -> Pubkey {
        self.pool_settlement.map(|a| *a.key()).unwrap_or([0; 32])
    }

    fn held(&self, token: &Pubkey) -> Result<u64, PoolError> {
        if token == &NATIVE_ASSET {
            return Ok(self.native_vault()?.lamports());
        }
        token_balance(need(self.pool_token)?)
    }

    fn settlement_balance(&self) -> Result<u64, PoolError> {
        token_balance(self.pool_settlement()?)
    }

    fn receive(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        if token == &NATIVE_ASSET {
            let to = self.native_vault()?;
            return SystemTransfer { from: self.user, to, lamports: amount }
                .invoke()
                .map_err(failed);
        }
        let from = need(self.user_token)?;
        let to = need(self.pool_token)?;
        Transfer { from, to, authority: self.user, amount }
            .invoke()
            .map_err(failed)?;

        if token == &WRAPPED_NATIVE_MINT {
            // Unwrap: closing the scratch account refunds the payer, who then
            // moves the unwrapped lamports into the native vault
            let vault = self.native_vault()?;
            self.with_pool_signer(|signers| {
                CloseAccount { account: to, destination: self.user, authority: self.pool }.invoke_signed(signers)
            })
            .map_err(failed)?;
            SystemTransfer { from: self.user, to: vault, lamports: amount }
                .invoke()
                .map_err(failed)?;
        }
        Ok(())
    }

    fn release(&mut self, token: &Pubkey, amount: u64) -> Result<(), PoolError> {
        if token == &NATIVE_ASSET {
            let from = self.native_vault()?;
            return self
                .with_native_signer(|signers| {
                    SystemTransfer { from, to: self.user, lamports: amount }.invoke_signed(signers)
                })
                .map_err(failed);
        }
        let from = need(self.pool_token)?;
        let to = need(self.user_token)?;
        self.with_pool_signer(|signers| {
            Transfer { from, to, authority: self.pool, amount }.invoke_signed(signers)
        })
        .map_err(failed)
    }

    fn swap(&mut self, order: &SwapOrder) -> Result<(), PoolError> {
        let source = need(self.pool_token)?;
        let delegate = need(self.swap_authority)?;

        let mut metas = ArrayVec::<AccountMeta, MAX_CPI_ACCOUNTS>::new();
        let mut infos = ArrayVec::<&AccountInfo, MAX_CPI_ACCOUNTS>::new();
        forward(&mut metas, &mut infos, self.swap_accounts, delegate.key())?;

        self.with_pool_signer(|signers| {
            Approve { source, delegate, authority: self.pool, amount: order.amount_in }.invoke_signed(signers)
        })
        .map_err(failed)?;

        let ix = Instruction {
            program_id: &self.exchange_program,
            accounts: &metas,
            data: order.payload,
        };
        self.with_swap_signer(|signers| slice_invoke_signed(&ix, &infos, signers))
            .map_err(failed)?;

        self.with_pool_signer(|signers| Revoke { source, authority: self.pool }.invoke_signed(signers))
            .map_err(failed)
    }

    fn convert_native(&mut self, lamports: u64) -> Result<(), PoolError> {
        let vault = self.native_vault()?;
        let settlement = self.pool_settlement()?;

        let mut metas = ArrayVec::<AccountMeta, MAX_CPI_ACCOUNTS>::new();
        let mut infos = ArrayVec::<&AccountInfo, MAX_CPI_ACCOUNTS>::new();
        metas.push(AccountMeta::writable_signer(vault.key()));
        metas.push(AccountMeta::writable(settlement.key()));
        infos.push(vault);
        infos.push(settlement);
        forward(&mut metas, &mut infos, self.extra_accounts, vault.key())?;

        let mut data = [0u8; 9];
        data[0] = DEPOSIT_NATIVE_TAG;
        data[1..].copy_from_slice(&lamports.to_le_bytes());
        let ix = Instruction {
            program_id: &self.settlement_program,
            accounts: &metas,
            data: &data,
        };
        self.with_native_signer(|signers| slice_invoke_signed(&ix, &infos, signers))
            .map_err(failed)
    }

    fn payout(&mut self, amount: u64) -> Result<(), PoolError> {
        let from = self.pool_settlement()?;
        let to = need(self.user_settlement)?;
        self.with_pool_signer(|signers| {
            Transfer { from, to, authority: self.pool, amount }.invoke_signed(signers)
        })
        .map_err(failed)
    }

    fn stake(&mut self, amount: u64) -> Result<u64, PoolError> {
        let settlement = self.pool_settlement()?;
        let shares = need(self.user_shares)?;
        let before = token_balance(shares)?;

        let mut metas = ArrayVec::<AccountMeta, MAX_CPI_ACCOUNTS>::new();
        let mut infos = ArrayVec::<&AccountInfo, MAX_CPI_ACCOUNTS>::new();
        metas.push(AccountMeta::readonly_signer(self.pool.key()));
        metas.push(AccountMeta::writable(settlement.key()));
        metas.push(AccountMeta::writable(shares.key()));
        infos.push(self.pool);
        infos.push(settlement);
        infos.push(shares);
        forward(&mut metas, &mut infos, self.extra_accounts, self.pool.key())?;

        let mut data = [0u8; 9];
        data[0] = VAULT_DEPOSIT_TAG;
        data[1..].copy_from_slice(&amount.to_le_bytes());
        let ix = Instruction {
            program_id: &self.vault_program,
            accounts: &metas,
            data: &data,
        };
        self.with_pool_signer(|signers| slice_invoke_signed(&ix, &infos, signers))
            .map_err(failed)?;

        let after = token_balance(shares)?;
        after.checked_sub(before).ok_or(PoolError::ExternalCallFailed)
    }
}
