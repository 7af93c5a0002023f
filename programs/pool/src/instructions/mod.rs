/// Pool instruction handlers
///
/// Handlers operate on already validated account state and a [`Custody`]
/// backend; account parsing and PDA checks live in the entrypoint.
///
/// [`Custody`]: crate::custody::Custody

pub mod initialize;
pub mod admin;
pub mod lock;
pub mod withdraw;
pub mod convert;
pub mod claim;

pub use initialize::*;
pub use admin::*;
pub use lock::*;
pub use withdraw::*;
pub use convert::*;
pub use claim::*;

/// Instruction discriminator
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolInstruction {
    /// Create the pool config and fund the native vault
    Initialize = 0,
    /// One-time settlement mint, settlement program and vault
    SetSettlementAddresses = 1,
    /// Owner commits; Locking -> Converting
    Activate = 2,
    /// Lock a token for the signer
    Lock = 3,
    /// Lock a token on behalf of another user
    LockFor = 4,
    /// Take back an entitlement in the original token
    Withdraw = 5,
    /// Convert the native leg into settlement asset
    ConvertAll = 6,
    /// Redeem an entitlement as settlement asset
    Claim = 7,
    /// Redeem an entitlement straight into the vault
    ClaimAndStake = 8,
    SetEmergencyMode = 9,
    SetOwner = 10,
    /// Rescue tokens sent to the pool by mistake
    RecoverToken = 11,
}

impl PoolInstruction {
    pub fn from_u8(discriminator: u8) -> Option<Self> {
        Some(match discriminator {
            0 => Self::Initialize,
            1 => Self::SetSettlementAddresses,
            2 => Self::Activate,
            3 => Self::Lock,
            4 => Self::LockFor,
            5 => Self::Withdraw,
            6 => Self::ConvertAll,
            7 => Self::Claim,
            8 => Self::ClaimAndStake,
            9 => Self::SetEmergencyMode,
            10 => Self::SetOwner,
            11 => Self::RecoverToken,
            _ => return None,
        })
    }
}
