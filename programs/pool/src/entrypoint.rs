//! Pool program entrypoint
//!
//! Parses instruction data, validates accounts (owners, PDAs, token account
//! mints and authorities) and hands typed state plus a [`CpiCustody`] to the
//! instruction handlers.
//!
//! Checks that need no syscall run before PDA verification so they can be
//! exercised off chain.

use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvars::{clock::Clock, rent::Rent, Sysvar},
    ProgramResult,
};
use pinocchio_system::instructions::{CreateAccount, Transfer as SystemTransfer};

use crate::custody::CpiCustody;
use crate::instructions::*;
use crate::pda::*;
use crate::state::{has_referral, PoolConfig, Position, ReferralRecord};
use prelaunch_common::*;

#[cfg(feature = "bpf-entrypoint")]
pinocchio::entrypoint!(process_instruction);

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let Some((&discriminator, data)) = instruction_data.split_first() else {
        msg!("Error: Instruction data is empty");
        return Err(PoolError::InvalidInstruction.into());
    };

    let Some(instruction) = PoolInstruction::from_u8(discriminator) else {
        msg!("Error: Unknown instruction");
        return Err(PoolError::InvalidInstruction.into());
    };

    match instruction {
        PoolInstruction::Initialize => {
            msg!("Instruction: Initialize");
            process_initialize_inner(program_id, accounts, data)
        }
        PoolInstruction::SetSettlementAddresses => {
            msg!("Instruction: SetSettlementAddresses");
            process_set_settlement_inner(program_id, accounts, data)
        }
        PoolInstruction::Activate => {
            msg!("Instruction: Activate");
            process_activate_inner(program_id, accounts, data)
        }
        PoolInstruction::Lock => {
            msg!("Instruction: Lock");
            process_lock_inner(program_id, accounts, data, false)
        }
        PoolInstruction::LockFor => {
            msg!("Instruction: LockFor");
            process_lock_inner(program_id, accounts, data, true)
        }
        PoolInstruction::Withdraw => {
            msg!("Instruction: Withdraw");
            process_withdraw_inner(program_id, accounts, data)
        }
        PoolInstruction::ConvertAll => {
            msg!("Instruction: ConvertAll");
            process_convert_all_inner(program_id, accounts, data)
        }
        PoolInstruction::Claim => {
            msg!("Instruction: Claim");
            process_claim_inner(program_id, accounts, data, ClaimMode::Payout)
        }
        PoolInstruction::ClaimAndStake => {
            msg!("Instruction: ClaimAndStake");
            process_claim_inner(program_id, accounts, data, ClaimMode::Stake)
        }
        PoolInstruction::SetEmergencyMode => {
            msg!("Instruction: SetEmergencyMode");
            process_set_emergency_inner(program_id, accounts, data)
        }
        PoolInstruction::SetOwner => {
            msg!("Instruction: SetOwner");
            process_set_owner_inner(program_id, accounts, data)
        }
        PoolInstruction::RecoverToken => {
            msg!("Instruction: RecoverToken");
            process_recover_token_inner(program_id, accounts, data)
        }
    }
}

// Account loading

fn require_accounts(accounts: &[AccountInfo], n: usize) -> Result<(), PoolError> {
    if accounts.len() < n {
        msg!("Error: Not enough accounts");
        return Err(PoolError::InvalidInstruction);
    }
    Ok(())
}

fn now() -> Result<i64, ProgramError> {
    Ok(Clock::get()?.unix_timestamp)
}

/// Borrow the pool config after owner, size, layout and PDA checks
fn load_pool<'a>(program_id: &Pubkey, account: &'a AccountInfo) -> Result<&'a mut PoolConfig, PoolError> {
    validate_owner(account, program_id)?;
    validate_writable(account)?;
    if account.data_len() != PoolConfig::LEN {
        return Err(PoolError::InvalidAccount);
    }
    let pool = unsafe { borrow_account_data_mut::<PoolConfig>(account)? };
    pool.validate()?;
    verify_pda(account.key(), &[POOL_SEED], pool.bump, program_id)?;
    Ok(pool)
}

fn load_native_vault<'a>(
    program_id: &Pubkey,
    pool: &PoolConfig,
    account: &'a AccountInfo,
) -> Result<&'a AccountInfo, PoolError> {
    validate_writable(account)?;
    verify_pda(account.key(), &[NATIVE_VAULT_SEED], pool.native_vault_bump, program_id)?;
    Ok(account)
}

fn load_position<'a>(
    program_id: &Pubkey,
    account: &'a AccountInfo,
    user: &Pubkey,
    token: &Pubkey,
) -> Result<&'a mut Position, PoolError> {
    validate_owner(account, program_id)?;
    validate_writable(account)?;
    if account.data_len() != Position::LEN {
        return Err(PoolError::InvalidAccount);
    }
    let position = unsafe { borrow_account_data_mut::<Position>(account)? };
    position.validate(user, token)?;
    verify_pda(account.key(), &[POSITION_SEED, &user[..], &token[..]], position.bump, program_id)?;
    Ok(position)
}

/// Allocate a program-owned PDA account of `space` bytes, paid by `payer`
fn create_pda_account(
    program_id: &Pubkey,
    payer: &AccountInfo,
    account: &AccountInfo,
    space: usize,
    signer: Signer,
) -> Result<(), ProgramError> {
    let lamports = Rent::get()?.minimum_balance(space);
    CreateAccount {
        from: payer,
        to: account,
        lamports,
        space: space as u64,
        owner: program_id,
    }
    .invoke_signed(&[signer])
}

/// Load the receiver's position, creating it on first lock
fn open_position<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo,
    account: &'a AccountInfo,
    user: &Pubkey,
    token: &Pubkey,
) -> Result<&'a mut Position, ProgramError> {
    if account.data_len() != 0 {
        return Ok(load_position(program_id, account, user, token)?);
    }

    let (expected, bump) = derive_position_pda(user, token, program_id);
    validate_key(account, &expected)?;
    let bump_seed = [bump];
    let seeds = [
        Seed::from(POSITION_SEED),
        Seed::from(&user[..]),
        Seed::from(&token[..]),
        Seed::from(&bump_seed[..]),
    ];
    create_pda_account(program_id, payer, account, Position::LEN, Signer::from(&seeds[..]))?;

    let position = unsafe { borrow_account_data_mut::<Position>(account)? };
    *position = Position::new(*user, *token, bump);
    Ok(position)
}

fn open_referral<'a>(
    program_id: &Pubkey,
    payer: &AccountInfo,
    account: &'a AccountInfo,
    code: &[u8; 32],
) -> Result<&'a mut ReferralRecord, ProgramError> {
    validate_writable(account)?;
    if account.data_len() == 0 {
        let (expected, bump) = derive_referral_pda(code, program_id);
        validate_key(account, &expected)?;
        let bump_seed = [bump];
        let seeds = [
            Seed::from(REFERRAL_SEED),
            Seed::from(&code[..]),
            Seed::from(&bump_seed[..]),
        ];
        create_pda_account(program_id, payer, account, ReferralRecord::LEN, Signer::from(&seeds[..]))?;
        let record = unsafe { borrow_account_data_mut::<ReferralRecord>(account)? };
        *record = ReferralRecord::new(*code, bump);
        return Ok(record);
    }

    validate_owner(account, program_id)?;
    if account.data_len() != ReferralRecord::LEN {
        return Err(PoolError::InvalidAccount.into());
    }
    let record = unsafe { borrow_account_data_mut::<ReferralRecord>(account)? };
    if !record.matches(code) {
        return Err(PoolError::InvalidAccount.into());
    }
    verify_pda(account.key(), &[REFERRAL_SEED, &code[..]], record.bump, program_id)?;
    Ok(record)
}

/// Pool-owned token account for `mint`
fn pool_token_account<'a>(
    account: &'a AccountInfo,
    mint: &Pubkey,
    pool_key: &Pubkey,
) -> Result<&'a AccountInfo, PoolError> {
    validate_writable(account)?;
    expect_token_account(account, mint, pool_key)?;
    Ok(account)
}

/// User-owned token account for `mint`
fn user_token_account<'a>(
    account: &'a AccountInfo,
    mint: &Pubkey,
    user: &Pubkey,
) -> Result<&'a AccountInfo, PoolError> {
    validate_writable(account)?;
    expect_token_account(account, mint, user)?;
    Ok(account)
}

/// Vault share account held by `user`
fn share_account<'a>(account: &'a AccountInfo, user: &Pubkey) -> Result<&'a AccountInfo, PoolError> {
    validate_writable(account)?;
    if &token_authority(account)? != user {
        return Err(PoolError::InvalidAccount);
    }
    Ok(account)
}

/// The delegate recorded at initialization; nothing else may receive an allowance
fn swap_authority_account<'a>(pool: &PoolConfig, account: &'a AccountInfo) -> Result<&'a AccountInfo, PoolError> {
    if is_unset(&pool.swap_authority) {
        return Err(PoolError::InvalidAccount);
    }
    validate_key(account, &pool.swap_authority)?;
    Ok(account)
}

fn cpi_custody<'a>(pool: &PoolConfig, pool_account: &'a AccountInfo, user: &'a AccountInfo) -> CpiCustody<'a> {
    CpiCustody {
        pool: pool_account,
        pool_bump: pool.bump,
        swap_authority: None,
        swap_authority_bump: pool.swap_authority_bump,
        user,
        native_vault: None,
        native_vault_bump: pool.native_vault_bump,
        pool_token: None,
        user_token: None,
        pool_settlement: None,
        user_settlement: None,
        user_shares: None,
        exchange_program: pool.exchange_program,
        settlement_program: pool.settlement_program,
        vault_program: pool.vault,
        swap_accounts: &[],
        extra_accounts: &[],
    }
}

// Instruction processors with account validation

/// Process initialize instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config (PDA, uninitialized)
/// 1. `[writable]` Native vault (PDA)
/// 2. `[signer, writable]` Owner, pays rent
/// 3. `[]` System program
///
/// Expected data layout:
/// - exchange_program: Pubkey (32 bytes)
/// - token_count: u8
/// - tokens: [Pubkey; token_count]
fn process_initialize_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 4)?;
    let pool_account = &accounts[0];
    let native_vault = &accounts[1];
    let owner = &accounts[2];

    validate_signer(owner)?;
    validate_writable(pool_account)?;
    validate_writable(native_vault)?;

    let args = InitializeArgs::parse(data)?;

    let (pool_key, bump) = derive_pool_pda(program_id);
    validate_key(pool_account, &pool_key)?;
    let (vault_key, native_vault_bump) = derive_native_vault_pda(program_id);
    validate_key(native_vault, &vault_key)?;
    let (swap_authority, swap_authority_bump) = derive_swap_authority_pda(program_id);

    if pool_account.data_len() != 0 {
        msg!("Error: Pool already initialized");
        return Err(PoolError::InvalidAccount.into());
    }
    let bump_seed = [bump];
    let seeds = [Seed::from(POOL_SEED), Seed::from(&bump_seed[..])];
    create_pda_account(program_id, owner, pool_account, PoolConfig::LEN, Signer::from(&seeds[..]))?;

    // Keep the native vault rent exempt so lamport accounting starts at zero
    let vault_rent = Rent::get()?.minimum_balance(0);
    let top_up = vault_rent.saturating_sub(native_vault.lamports());
    if top_up > 0 {
        SystemTransfer { from: owner, to: native_vault, lamports: top_up }.invoke()?;
    }

    let pool = unsafe { borrow_account_data_mut::<PoolConfig>(pool_account)? };
    let addresses = PoolAddresses {
        bump,
        native_vault_bump,
        swap_authority,
        swap_authority_bump,
    };
    process_initialize(pool, owner.key(), &args, &addresses)?;
    Ok(())
}

/// Process set settlement addresses instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Owner
///
/// Expected data layout (96 bytes):
/// - settlement_mint: Pubkey
/// - settlement_program: Pubkey
/// - vault: Pubkey
fn process_set_settlement_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;
    let pool = load_pool(program_id, &accounts[0])?;
    let owner = &accounts[1];
    validate_signer(owner)?;

    let mut reader = InstructionReader::new(data);
    let settlement_mint = reader.read_pubkey()?;
    let settlement_program = reader.read_pubkey()?;
    let vault = reader.read_pubkey()?;
    reader.finish()?;

    process_set_settlement_addresses(pool, owner.key(), &settlement_mint, &settlement_program, &vault, now()?)?;
    Ok(())
}

/// Process activate instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Owner
fn process_activate_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;
    InstructionReader::new(data).finish()?;
    let pool = load_pool(program_id, &accounts[0])?;
    let owner = &accounts[1];
    validate_signer(owner)?;

    process_activate(pool, owner.key(), now()?)?;
    Ok(())
}

/// Process lock / lock-for instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[writable]` Receiver's position (PDA, created on first lock)
/// 2. `[signer, writable]` Payer
/// 3. `[writable]` Native vault (ignored for tokens)
/// 4. `[writable]` Payer token account (ignored for native)
/// 5. `[writable]` Pool token account (ignored for native); for wrapped
///    native a scratch account with the pool as authority, closed by the lock
/// 6. `[]` System program
/// 7. `[]` Token program
/// 8. `[writable]` Referral record (PDA, required for a non-zero code)
///
/// A wrapped native lock is credited to the receiver's native position.
///
/// Expected data layout:
/// - receiver: Pubkey (LockFor only)
/// - token: Pubkey
/// - amount: u64
/// - referral: [u8; 32]
fn process_lock_inner(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
    with_receiver: bool,
) -> ProgramResult {
    require_accounts(accounts, 8)?;
    let pool_account = &accounts[0];
    let payer = &accounts[2];
    validate_signer(payer)?;
    validate_writable(payer)?;

    let args = LockArgs::parse(data, with_receiver)?;
    let receiver = *args.receiver_or(payer.key());

    let pool = load_pool(program_id, pool_account)?;
    let mut custody = cpi_custody(pool, pool_account, payer);
    let ledger = ledger_token(&args.token);
    if ledger == NATIVE_ASSET {
        custody.native_vault = Some(load_native_vault(program_id, pool, &accounts[3])?);
    }
    if args.token != NATIVE_ASSET {
        custody.user_token = Some(user_token_account(&accounts[4], &args.token, payer.key())?);
        custody.pool_token = Some(pool_token_account(&accounts[5], &args.token, pool_account.key())?);
    }

    let position = open_position(program_id, payer, &accounts[1], &receiver, &ledger)?;
    let referral = if has_referral(&args.referral) {
        require_accounts(accounts, 9)?;
        Some(open_referral(program_id, payer, &accounts[8], &args.referral)?)
    } else {
        None
    };

    process_lock(pool, position, referral, &args, now()?, &mut custody)?;
    Ok(())
}

/// Process withdraw instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[writable]` Caller's position
/// 2. `[signer, writable]` User
/// 3. `[writable]` Native vault
/// 4. `[writable]` User token account (ignored for native)
/// 5. `[writable]` Pool token account (ignored for native)
/// 6. `[]` System program
/// 7. `[]` Token program
///
/// Expected data layout (32 bytes):
/// - token: Pubkey
fn process_withdraw_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 8)?;
    let pool_account = &accounts[0];
    let user = &accounts[2];
    validate_signer(user)?;
    validate_writable(user)?;

    let mut reader = InstructionReader::new(data);
    let token = reader.read_pubkey()?;
    reader.finish()?;

    let pool = load_pool(program_id, pool_account)?;
    let position = load_position(program_id, &accounts[1], user.key(), &token)?;
    let mut custody = cpi_custody(pool, pool_account, user);
    if token == NATIVE_ASSET {
        custody.native_vault = Some(load_native_vault(program_id, pool, &accounts[3])?);
    } else {
        custody.user_token = Some(user_token_account(&accounts[4], &token, user.key())?);
        custody.pool_token = Some(pool_token_account(&accounts[5], &token, pool_account.key())?);
    }

    process_withdraw(pool, position, now()?, &mut custody)?;
    Ok(())
}

/// Process convert-all instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Owner
/// 2. `[writable]` Native vault
/// 3. `[writable]` Pool settlement token account
/// 4..N. Accounts forwarded to the settlement program
fn process_convert_all_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 4)?;
    InstructionReader::new(data).finish()?;
    let pool_account = &accounts[0];
    let owner = &accounts[1];
    validate_signer(owner)?;

    let pool = load_pool(program_id, pool_account)?;
    if !pool.settlement_configured() {
        msg!("Error: Settlement addresses not set");
        return Err(PoolError::VaultNotConfigured.into());
    }
    let mut custody = cpi_custody(pool, pool_account, owner);
    custody.native_vault = Some(load_native_vault(program_id, pool, &accounts[2])?);
    custody.pool_settlement =
        Some(pool_token_account(&accounts[3], &pool.settlement_mint, pool_account.key())?);
    custody.extra_accounts = &accounts[4..];

    process_convert_all(pool, owner.key(), now()?, &mut custody)?;
    Ok(())
}

/// Process claim / claim-and-stake instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[writable]` Caller's position
/// 2. `[signer]` User
/// 3. `[writable]` Pool token account for the claimed token (any for native/settlement)
/// 4. `[writable]` Pool settlement token account
/// 5. `[writable]` User settlement account (claim) or vault share account (stake)
/// 6. `[]` Token program
/// 7. `[]` Swap authority (PDA); the only signer the aggregator receives
/// 8..8+swap_accounts. Accounts forwarded to the aggregator
/// 8+swap_accounts..N. Accounts forwarded to the vault program
///
/// Expected data layout:
/// - token: Pubkey
/// - min_out: u64
/// - route: u8
/// - swap_accounts: u8
/// - payload_len: u16
/// - payload: [u8; payload_len]
fn process_claim_inner(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
    mode: ClaimMode,
) -> ProgramResult {
    require_accounts(accounts, 8)?;
    let pool_account = &accounts[0];
    let user = &accounts[2];
    validate_signer(user)?;
    validate_key(&accounts[6], &pinocchio_token::ID)?;

    let req = ClaimRequest::parse(data)?;
    let swap_end = 8 + req.swap_accounts as usize;
    require_accounts(accounts, swap_end)?;

    let pool = load_pool(program_id, pool_account)?;
    if !pool.settlement_configured() {
        msg!("Error: Settlement addresses not set");
        return Err(PoolError::VaultNotConfigured.into());
    }
    let position = load_position(program_id, &accounts[1], user.key(), &req.token)?;

    let mut custody = cpi_custody(pool, pool_account, user);
    if req.token != NATIVE_ASSET && req.token != pool.settlement_mint {
        custody.pool_token = Some(pool_token_account(&accounts[3], &req.token, pool_account.key())?);
    }
    custody.pool_settlement =
        Some(pool_token_account(&accounts[4], &pool.settlement_mint, pool_account.key())?);
    match mode {
        ClaimMode::Payout => {
            custody.user_settlement =
                Some(user_token_account(&accounts[5], &pool.settlement_mint, user.key())?);
        }
        ClaimMode::Stake => {
            custody.user_shares = Some(share_account(&accounts[5], user.key())?);
        }
    }
    custody.swap_authority = Some(swap_authority_account(pool, &accounts[7])?);
    custody.swap_accounts = &accounts[8..swap_end];
    custody.extra_accounts = &accounts[swap_end..];

    process_claim(pool, position, &req, mode, now()?, &mut custody)?;
    Ok(())
}

/// Process set emergency mode instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Owner
///
/// Expected data layout (1 byte):
/// - flag: u8 (0 = off, 1 = on)
fn process_set_emergency_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;
    let pool = load_pool(program_id, &accounts[0])?;
    let owner = &accounts[1];
    validate_signer(owner)?;

    let mut reader = InstructionReader::new(data);
    let flag = match reader.read_u8()? {
        0 => false,
        1 => true,
        _ => return Err(PoolError::InvalidInstruction.into()),
    };
    reader.finish()?;

    process_set_emergency_mode(pool, owner.key(), flag)?;
    Ok(())
}

/// Process set owner instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Current owner
///
/// Expected data layout (32 bytes):
/// - new_owner: Pubkey
fn process_set_owner_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;
    let pool = load_pool(program_id, &accounts[0])?;
    let owner = &accounts[1];
    validate_signer(owner)?;

    let mut reader = InstructionReader::new(data);
    let new_owner = reader.read_pubkey()?;
    reader.finish()?;

    process_set_owner(pool, owner.key(), &new_owner)?;
    Ok(())
}

/// Process recover token instruction
///
/// Expected accounts:
/// 0. `[writable]` Pool config
/// 1. `[signer]` Owner
/// 2. `[writable]` Pool token account holding the stray token
/// 3. `[writable]` Owner token account
/// 4. `[]` Token program
///
/// Expected data layout (40 bytes):
/// - token: Pubkey
/// - amount: u64
fn process_recover_token_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 5)?;
    let pool_account = &accounts[0];
    let owner = &accounts[1];
    validate_signer(owner)?;

    let mut reader = InstructionReader::new(data);
    let token = reader.read_pubkey()?;
    let amount = reader.read_u64()?;
    reader.finish()?;

    let pool = load_pool(program_id, pool_account)?;
    let mut custody = cpi_custody(pool, pool_account, owner);
    custody.pool_token = Some(pool_token_account(&accounts[2], &token, pool_account.key())?);
    custody.user_token = Some(user_token_account(&accounts[3], &token, owner.key())?);

    process_recover_token(pool, owner.key(), &token, amount, &mut custody)?;
    Ok(())
}

#[cfg(all(test, not(target_os = "solana")))]
#[path = "entrypoint_test.rs"]
mod entrypoint_test;
