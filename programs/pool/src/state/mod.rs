pub mod pool;
pub mod position;
pub mod referral;

pub use pool::*;
pub use position::*;
pub use referral::*;
