//! Runtime-shaped account buffers for host tests
//!
//! Accounts are serialized the way the loader lays out program input and
//! parsed back with pinocchio's own deserializer, so validation code runs
//! against real `AccountInfo`s.

extern crate std;

use core::mem::{size_of, MaybeUninit};
use std::vec::Vec;

use pinocchio::{
    account_info::{AccountInfo, MAX_PERMITTED_DATA_INCREASE},
    entrypoint::{deserialize, NON_DUP_MARKER},
    pubkey::Pubkey,
};
use pinocchio_token::state::TokenAccount;

const MAX_ACCOUNTS: usize = 32;

#[derive(Debug, Clone)]
pub struct MockAccount {
    pub key: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl MockAccount {
    pub fn new(key: Pubkey, owner: Pubkey) -> Self {
        Self {
            key,
            owner,
            lamports: 0,
            data: Vec::new(),
            is_signer: false,
            is_writable: false,
        }
    }

    pub fn signer(mut self) -> Self {
        self.is_signer = true;
        self
    }

    pub fn writable(mut self) -> Self {
        self.is_writable = true;
        self
    }

    pub fn with_lamports(mut self, lamports: u64) -> Self {
        self.lamports = lamports;
        self
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }
}

/// Writable, initialized SPL token account at `key`
pub fn token_account(key: Pubkey, mint: Pubkey, authority: Pubkey, amount: u64) -> MockAccount {
    let mut data = std::vec![0u8; TokenAccount::LEN];
    data[..32].copy_from_slice(&mint);
    data[32..64].copy_from_slice(&authority);
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    // AccountState::Initialized
    data[108] = 1;
    MockAccount::new(key, pinocchio_token::ID).writable().with_data(data)
}

/// Owns the input buffer the `AccountInfo`s point into
pub struct MockAccounts {
    _input: Vec<u64>,
    infos: Vec<AccountInfo>,
}

impl MockAccounts {
    pub fn new(accounts: &[MockAccount]) -> Self {
        assert!(accounts.len() <= MAX_ACCOUNTS);
        let bytes = serialize(accounts);

        let mut input = std::vec![0u64; bytes.len().div_ceil(size_of::<u64>())];
        unsafe {
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), input.as_mut_ptr() as *mut u8, bytes.len());
        }

        let mut slots = [MaybeUninit::<AccountInfo>::uninit(); MAX_ACCOUNTS];
        let (_, count, _) = unsafe { deserialize::<MAX_ACCOUNTS>(input.as_mut_ptr() as *mut u8, &mut slots) };
        let infos = slots[..count].iter().map(|slot| unsafe { slot.assume_init_read() }).collect();

        Self { _input: input, infos }
    }

    pub fn infos(&self) -> &[AccountInfo] {
        &self.infos
    }
}

fn serialize(accounts: &[MockAccount]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(accounts.len() as u64).to_le_bytes());

    for account in accounts {
        out.extend_from_slice(&[
            NON_DUP_MARKER,
            account.is_signer as u8,
            account.is_writable as u8,
            0,
            0,
            0,
            0,
            0,
        ]);
        out.extend_from_slice(&account.key);
        out.extend_from_slice(&account.owner);
        out.extend_from_slice(&account.lamports.to_le_bytes());
        out.extend_from_slice(&(account.data.len() as u64).to_le_bytes());
        out.extend_from_slice(&account.data);
        out.resize(out.len() + MAX_PERMITTED_DATA_INCREASE, 0);
        out.resize(out.len().next_multiple_of(size_of::<u64>()), 0);
        // rent epoch
        out.extend_from_slice(&0u64.to_le_bytes());
    }

    // Empty instruction data, zero program id
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&[0u8; 32]);
    out
}
