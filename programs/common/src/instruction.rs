//! Instruction data deserialization helpers
//!
//! All readers are bounds checked and fail with `InvalidInstruction` on short
//! input.

use crate::error::PoolError;
use pinocchio::pubkey::Pubkey;

/// Read a u8 from instruction data
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, PoolError> {
    data.get(offset).copied().ok_or(PoolError::InvalidInstruction)
}

/// Read a u16 (little-endian) from instruction data
#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> Result<u16, PoolError> {
    Ok(u16::from_le_bytes(read_bytes::<2>(data, offset)?))
}

/// Read a u64 (little-endian) from instruction data
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, PoolError> {
    Ok(u64::from_le_bytes(read_bytes::<8>(data, offset)?))
}

/// Read a fixed-size byte array from instruction data
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], PoolError> {
    let end = offset.checked_add(N).ok_or(PoolError::InvalidInstruction)?;
    if end > data.len() {
        return Err(PoolError::InvalidInstruction);
    }
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..end]);
    Ok(bytes)
}

/// Instruction data reader with tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, PoolError> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, PoolError> {
        let val = read_u16(self.data, self.offset)?;
        self.offset += 2;
        Ok(val)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, PoolError> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], PoolError> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    #[inline]
    pub fn read_pubkey(&mut self) -> Result<Pubkey, PoolError> {
        self.read_bytes::<32>()
    }

    /// Borrow the next `len` bytes without copying
    #[inline]
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], PoolError> {
        let end = self.offset.checked_add(len).ok_or(PoolError::InvalidInstruction)?;
        let slice = self.data.get(self.offset..end).ok_or(PoolError::InvalidInstruction)?;
        self.offset = end;
        Ok(slice)
    }

    /// Fail unless every byte has been consumed
    #[inline]
    pub fn finish(&self) -> Result<(), PoolError> {
        if self.remaining() != 0 {
            return Err(PoolError::InvalidInstruction);
        }
        Ok(())
    }
}
