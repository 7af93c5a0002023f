//! Transaction builders for owner instructions

use anyhow::Result;
use prelaunch_common::{NATIVE_VAULT_SEED, POOL_SEED};
use prelaunch_pool::instructions::PoolInstruction;
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

pub fn pool_address(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[POOL_SEED], program).0
}

pub fn native_vault_address(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[NATIVE_VAULT_SEED], program).0
}

/// Build the Activate instruction
pub fn build_activate_instruction(program: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new(pool_address(program), false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: vec![PoolInstruction::Activate as u8],
    }
}

/// Build the ConvertAll instruction
///
/// `settlement_accounts` are forwarded to the settlement program as writable.
pub fn build_convert_all_instruction(
    program: &Pubkey,
    owner: &Pubkey,
    pool_settlement: &Pubkey,
    settlement_program: &Pubkey,
    settlement_accounts: &[Pubkey],
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(pool_address(program), false),
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new(native_vault_address(program), false),
        AccountMeta::new(*pool_settlement, false),
        AccountMeta::new_readonly(*settlement_program, false),
    ];
    accounts.extend(settlement_accounts.iter().map(|key| AccountMeta::new(*key, false)));

    Instruction {
        program_id: *program,
        accounts,
        data: vec![PoolInstruction::ConvertAll as u8],
    }
}

/// Sign a single-instruction transaction paid by the owner
pub fn build_transaction(
    instruction: Instruction,
    owner: &Keypair,
    recent_blockhash: Hash,
) -> Result<Transaction> {
    let transaction = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&owner.pubkey()),
        &[owner],
        recent_blockhash,
    );

    Ok(transaction)
}
