//! Pure Rust safety model of the prelaunch pool for Kani and proptest
//! No Solana dependencies, no unwrap/panic, all functions total

pub mod state;
pub mod math;
pub mod lifecycle;
pub mod helpers;
pub mod transitions;

// Re-export commonly used types
pub use state::*;
pub use lifecycle::*;
pub use helpers::*;
pub use transitions::*;
