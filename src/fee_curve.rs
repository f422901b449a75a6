//! Dynamic basis-point fee curve shared by every internal-liquidity-pool
//! route.
//!
//! The curve rewards trades that move the pool toward its target balance
//! (rebate) and penalizes trades that move it away (tax). All arithmetic is
//! integer fixed-point with truncation toward zero; the result gates
//! user-visible pricing and must be bit-for-bit reproducible.

use ethers::types::U256;

use crate::types::BPS_DIVISOR;

/// Inputs to one fee-curve evaluation. `initial` and `target` are pool
/// exposures in the pool's unit-of-account; `delta` is the trade's change in
/// that exposure.
#[derive(Debug, Clone, Copy)]
pub struct FeeCurveInput {
    /// Current pool exposure to the token.
    pub initial: U256,
    /// Exposure change caused by the trade.
    pub delta: U256,
    /// Equilibrium exposure from the pool's weighting configuration.
    pub target: U256,
    /// Base fee applied before any curve adjustment.
    pub base_fee_bps: u32,
    /// Maximum curve adjustment at full imbalance.
    pub tax_bps: u32,
    /// True when the trade adds exposure, false when it removes it.
    pub increment: bool,
}

fn abs_diff(a: U256, b: U256) -> U256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Evaluate the fee curve. With `target == 0` the curve is disabled and the
/// base fee is returned unchanged.
pub fn fee_basis_points(input: FeeCurveInput) -> u32 {
    let FeeCurveInput {
        initial,
        delta,
        target,
        base_fee_bps,
        tax_bps,
        increment,
    } = input;

    if target.is_zero() {
        return base_fee_bps;
    }

    let next = if increment {
        initial.saturating_add(delta)
    } else {
        initial.saturating_sub(delta)
    };

    let initial_diff = abs_diff(initial, target);
    let next_diff = abs_diff(next, target);

    if next_diff < initial_diff {
        // The trade moves the pool toward target: rebate.
        let rebate = U256::from(tax_bps).saturating_mul(initial_diff) / target;
        let rebate = if rebate > U256::from(u32::MAX) {
            u32::MAX
        } else {
            rebate.as_u32()
        };
        base_fee_bps.saturating_sub(rebate)
    } else {
        // The trade moves the pool away from target: tax on the average
        // imbalance, capped at the target itself.
        let avg_diff = (initial_diff + next_diff) / U256::from(2u8);
        let avg_diff = std::cmp::min(target, avg_diff);
        let tax = U256::from(tax_bps).saturating_mul(avg_diff) / target;
        base_fee_bps.saturating_add(tax.as_u32())
    }
}

/// Compose the fee basis points of two chained conversion legs.
/// Compounding, not additive: `f1 + f2 - f1*f2/DIVISOR`.
pub fn combine_fee_bps(first: u32, second: u32) -> u32 {
    first + second - first * second / BPS_DIVISOR
}

/// Deduct a basis-point fee from an amount, truncating toward zero.
pub fn apply_fee_bps(amount: U256, fee_bps: u32) -> U256 {
    let divisor = U256::from(BPS_DIVISOR);
    let keep = divisor.saturating_sub(U256::from(fee_bps));
    amount.saturating_mul(keep) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(initial: u64, delta: u64, target: u64, increment: bool) -> u32 {
        fee_basis_points(FeeCurveInput {
            initial: U256::from(initial),
            delta: U256::from(delta),
            target: U256::from(target),
            base_fee_bps: 20,
            tax_bps: 50,
            increment,
        })
    }

    #[test]
    fn zero_target_disables_the_curve() {
        for delta in [0u64, 1, 1_000_000, u64::MAX] {
            assert_eq!(curve(500, delta, 0, true), 20);
            assert_eq!(curve(500, delta, 0, false), 20);
        }
    }

    #[test]
    fn rebalancing_trade_gets_a_rebate() {
        // Pool is 400 under target; depositing 400 lands exactly on target.
        // rebate = 50 * 400 / 1000 = 20, fee = 20 - 20 = 0.
        assert_eq!(curve(600, 400, 1000, true), 0);
    }

    #[test]
    fn rebate_floors_at_zero() {
        // initial_diff (900) towers over target contribution:
        // rebate = 50 * 900 / 1000 = 45 > base fee 20.
        assert_eq!(curve(100, 850, 1000, true), 0);
    }

    #[test]
    fn imbalancing_trade_pays_a_tax() {
        // Pool already above target; adding more keeps moving away.
        // initial_diff = 200, next_diff = 600, avg = 400, tax = 50*400/1000 = 20.
        assert_eq!(curve(1200, 400, 1000, true), 40);
    }

    #[test]
    fn average_imbalance_is_capped_at_target() {
        // Huge delta: avg_diff would exceed target, so tax caps at tax_bps.
        assert_eq!(curve(1000, 1_000_000, 1000, true), 20 + 50);
    }

    #[test]
    fn decrement_saturates_at_zero_exposure() {
        // Removing more than the pool holds clamps next to 0.
        // initial = 300, target = 1000: initial_diff = 700, next_diff = 1000.
        // avg = 850, tax = 50*850/1000 = 42.
        assert_eq!(curve(300, 5000, 1000, false), 62);
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        // avg_diff = 333, tax = 50*333/1000 = 16.65 -> 16.
        assert_eq!(curve(1333, 0, 1000, true), 36);
    }

    #[test]
    fn combine_is_compounding_not_additive() {
        assert_eq!(combine_fee_bps(0, 0), 0);
        assert_eq!(combine_fee_bps(100, 0), 100);
        // 1% then 1%: 100 + 100 - 1 = 199 bps, not 200.
        assert_eq!(combine_fee_bps(100, 100), 199);
    }

    #[test]
    fn apply_fee_bps_truncates() {
        assert_eq!(apply_fee_bps(U256::from(10_000u64), 25), U256::from(9_975u64));
        // 3 * 9975 / 10000 = 2.9925 -> 2
        assert_eq!(apply_fee_bps(U256::from(3u64), 25), U256::from(2u64));
        assert_eq!(apply_fee_bps(U256::from(1u64), 0), U256::from(1u64));
    }
}
