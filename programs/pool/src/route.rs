//! Swap route adapters
//!
//! A claim carries an opaque payload for the exchange aggregator. Before the
//! pool signs anything, the payload is decoded with the adapter chosen by the
//! route selector and checked against what the claimant is entitled to swap.
//!
//! Payload layouts (little-endian):
//!
//! Direct:   tag(1) input_mint(32) output_mint(32) amount_in(8) min_out(8) recipient(32)
//! MultiHop: tag(1) hops(1) path(32 * (hops + 1)) amount_in(8) min_out(8) recipient(32)

use pinocchio::pubkey::Pubkey;
use prelaunch_common::*;

/// Leading byte of a direct (single pool) swap payload
pub const DIRECT_SWAP_TAG: u8 = 0xD1;
/// Leading byte of a multi-hop swap payload
pub const MULTI_HOP_SWAP_TAG: u8 = 0xD2;
/// Longest accepted mint path
pub const MAX_HOPS: usize = 4;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRoute {
    Direct = 0,
    MultiHop = 1,
}

impl SwapRoute {
    pub fn from_u8(selector: u8) -> Result<Self, PoolError> {
        match selector {
            0 => Ok(SwapRoute::Direct),
            1 => Ok(SwapRoute::MultiHop),
            _ => Err(PoolError::InvalidSwapRoute),
        }
    }

    fn tag(self) -> u8 {
        match self {
            SwapRoute::Direct => DIRECT_SWAP_TAG,
            SwapRoute::MultiHop => MULTI_HOP_SWAP_TAG,
        }
    }
}

/// Decoded swap payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOrder<'a> {
    pub route: SwapRoute,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount_in: u64,
    pub min_out: u64,
    /// Where the aggregator sends the output; zero means the signer's default
    pub recipient: Pubkey,
    /// Raw bytes forwarded to the aggregator
    pub payload: &'a [u8],
}

impl<'a> SwapOrder<'a> {
    pub fn decode(route: SwapRoute, payload: &'a [u8]) -> Result<Self, PoolError> {
        let invalid = |_| PoolError::InvalidSwapRoute;
        let mut reader = InstructionReader::new(payload);

        if reader.read_u8().map_err(invalid)? != route.tag() {
            return Err(PoolError::InvalidSwapRoute);
        }

        let (input_mint, output_mint) = match route {
            SwapRoute::Direct => {
                let input = reader.read_pubkey().map_err(invalid)?;
                let output = reader.read_pubkey().map_err(invalid)?;
                (input, output)
            }
            SwapRoute::MultiHop => {
                let hops = reader.read_u8().map_err(invalid)? as usize;
                if hops == 0 || hops > MAX_HOPS {
                    return Err(PoolError::InvalidSwapRoute);
                }
                let input = reader.read_pubkey().map_err(invalid)?;
                let mut output = input;
                for _ in 0..hops {
                    output = reader.read_pubkey().map_err(invalid)?;
                }
                (input, output)
            }
        };

        let amount_in = reader.read_u64().map_err(invalid)?;
        let min_out = reader.read_u64().map_err(invalid)?;
        let recipient = reader.read_pubkey().map_err(invalid)?;
        reader.finish().map_err(invalid)?;

        Ok(Self {
            route,
            input_mint,
            output_mint,
            amount_in,
            min_out,
            recipient,
            payload,
        })
    }

    /// Reject any order that would sell something other than exactly the
    /// claimant's entitlement of `token` for the settlement asset, or send
    /// the proceeds anywhere but the pool
    pub fn validate(
        &self,
        token: &Pubkey,
        settlement_mint: &Pubkey,
        entitlement: u64,
        settlement_account: &Pubkey,
    ) -> Result<(), PoolError> {
        if &self.input_mint != token || &self.output_mint != settlement_mint {
            return Err(PoolError::InvalidSwapRoute);
        }
        if self.amount_in != entitlement {
            return Err(PoolError::InvalidSwapRoute);
        }
        if !is_unset(&self.recipient) && &self.recipient != settlement_account {
            return Err(PoolError::InvalidSwapRoute);
        }
        Ok(())
    }
}

/// Encode a direct swap payload
pub fn encode_direct(
    input_mint: &Pubkey,
    output_mint: &Pubkey,
    amount_in: u64,
    min_out: u64,
    recipient: &Pubkey,
) -> [u8; 113] {
    let mut out = [0u8; 113];
    out[0] = DIRECT_SWAP_TAG;
    out[1..33].copy_from_slice(input_mint);
    out[33..65].copy_from_slice(output_mint);
    out[65..73].copy_from_slice(&amount_in.to_le_bytes());
    out[73..81].copy_from_slice(&min_out.to_le_bytes());
    out[81..113].copy_from_slice(recipient);
    out
}

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;
