//! Safe arithmetic helpers - no unwrap, no panics, no lossy casts

/// Add u64, None on overflow (ledger entries must stay exact)
pub fn add_u64(a: u64, b: u64) -> Option<u64> {
    a.checked_add(b)
}

/// Subtract u64, None on underflow
pub fn sub_u64(a: u64, b: u64) -> Option<u64> {
    a.checked_sub(b)
}

/// Add u128 with saturation at MAX
pub fn add_u128(a: u128, b: u128) -> u128 {
    a.saturating_add(b)
}

/// Subtract u128 with saturation at 0
pub fn sub_u128(a: u128, b: u128) -> u128 {
    a.saturating_sub(b)
}

/// Floor of `amount * numerator / denominator` computed in u128
///
/// Returns 0 when the denominator is 0. The result never exceeds
/// `numerator` when `amount <= denominator`, which is how pro-rata shares
/// of a converted pool stay covered.
pub fn mul_div_floor(amount: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let wide = (amount as u128) * (numerator as u128) / (denominator as u128);
    if wide > u64::MAX as u128 {
        u64::MAX
    } else {
        wide as u64
    }
}
