// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::U256;

/// Convert a raw token integer into whole units (`raw / 10^decimals`).
///
/// The result is a float: large supplies lose precision past ~15 significant digits, which is
/// acceptable for ranking and percentages.
pub fn scale_amount(raw: U256, decimals: u8) -> f64 {
    f64::from(raw) / 10f64.powi(i32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_decimals() {
        assert_eq!(scale_amount(U256::from(1_000u64), 0), 1000.0);
        assert_eq!(scale_amount(U256::from(1_500_000u64), 6), 1.5);
        assert_eq!(scale_amount(U256::ZERO, 18), 0.0);
    }

    #[test]
    fn handles_eighteen_decimal_supplies() {
        let raw = U256::from(10u64).pow(U256::from(27u64)); // 1e9 tokens
        assert!((scale_amount(raw, 18) - 1e9).abs() < 1e-3);
    }

    #[test]
    fn max_value_stays_finite() {
        let scaled = scale_amount(U256::MAX, 0);
        assert!(scaled.is_finite());
        assert!((scaled / 1.157920892373162e77 - 1.0).abs() < 1e-12);
    }
}
