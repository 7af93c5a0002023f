#![cfg_attr(not(any(test, feature = "mock")), no_std)]

pub mod types;
pub mod error;
pub mod account;
pub mod instruction;
pub mod token;

#[cfg(all(any(test, feature = "mock"), not(target_os = "solana")))]
pub mod mock;

pub use types::*;
pub use error::*;
pub use account::*;
pub use instruction::*;
pub use token::*;
