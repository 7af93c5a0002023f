#![cfg_attr(target_os = "solana", no_std)]

pub mod state;
pub mod instructions;
pub mod pda;
pub mod route;
pub mod custody;

#[cfg(all(any(test, feature = "sim"), not(target_os = "solana")))]
pub mod sim;

#[cfg(test)]
mod test_fixtures;

// Always expose entrypoint for testing, but only register as entrypoint when feature enabled
pub mod entrypoint;

// Panic handler for no_std builds (only for Solana BPF)
#[cfg(all(target_os = "solana", not(test)))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

pub use state::*;
pub use instructions::*;

pinocchio_pubkey::declare_id!("8igX2224f6VV99D11aMcoQp1FRrM2cnfDAC9684tWNMx");
