//! Shared pricing math for the internal-liquidity-pool routes.
//!
//! All amounts here are 18-decimal pool units; callers rescale to token
//! decimals at the boundary. Prices and unit-of-account values come from the
//! injected valuation oracle.

use ethers::types::{Address, U256};
use std::sync::Arc;

use crate::errors::Result;
use crate::fee_curve::{apply_fee_bps, fee_basis_points, FeeCurveInput};
use crate::normalization::mul_div_floor;
use crate::pool_methods::{price_unit, PoolMethods};
use crate::settings::PoolConfig;

/// Fee-curve evaluation for one side of a pool trade. `delta_units` is the
/// trade's unit-of-account value.
async fn side_fee_bps(
    methods: &Arc<dyn PoolMethods>,
    pool: &PoolConfig,
    token: Address,
    delta_units: U256,
    base_fee_bps: u32,
    increment: bool,
) -> Result<u32> {
    let accounting = methods.get_pool_accounting(token).await?;
    let target = methods.get_target_liquidity(token).await?;
    Ok(fee_basis_points(FeeCurveInput {
        initial: accounting.liquidity_units,
        delta: delta_units,
        target,
        base_fee_bps,
        tax_bps: pool.tax_bps,
        increment,
    }))
}

/// Minting pool shares against `token_in`. Returns the share amount
/// (18 decimals) and the applied fee.
pub async fn mint_quote(
    methods: &Arc<dyn PoolMethods>,
    pool: &PoolConfig,
    token_in: Address,
    amount_in_18: U256,
) -> Result<(U256, u32)> {
    let unit = price_unit();
    let min_price = methods.get_min_price(token_in).await?;
    let usd_in = mul_div_floor(amount_in_18, min_price, unit);
    let fee_bps = side_fee_bps(methods, pool, token_in, usd_in, pool.mint_fee_bps, true).await?;
    let usd_after = apply_fee_bps(usd_in, fee_bps);
    let share_price = methods.get_pool_share_price(true).await?;
    let shares = mul_div_floor(usd_after, unit, share_price);
    Ok((shares, fee_bps))
}

/// Redeeming pool shares for `token_out`. Returns the output amount
/// (18 decimals) and the applied fee.
pub async fn redeem_quote(
    methods: &Arc<dyn PoolMethods>,
    pool: &PoolConfig,
    token_out: Address,
    shares_18: U256,
) -> Result<(U256, u32)> {
    let unit = price_unit();
    let share_price = methods.get_pool_share_price(false).await?;
    let usd = mul_div_floor(shares_18, share_price, unit);
    let fee_bps = side_fee_bps(methods, pool, token_out, usd, pool.mint_fee_bps, false).await?;
    let usd_after = apply_fee_bps(usd, fee_bps);
    let max_price = methods.get_max_price(token_out).await?;
    let out = mul_div_floor(usd_after, unit, max_price);
    Ok((out, fee_bps))
}

/// Swapping one pool asset for another inside the pool. The fee curve is
/// evaluated on both the increment and the decrement side and the larger of
/// the two applies (conservative pricing). Returns the output amount
/// (18 decimals) and the applied fee.
pub async fn swap_quote(
    methods: &Arc<dyn PoolMethods>,
    pool: &PoolConfig,
    token_in: Address,
    token_out: Address,
    amount_in_18: U256,
) -> Result<(U256, u32)> {
    let unit = price_unit();
    let price_in = methods.get_min_price(token_in).await?;
    let price_out = methods.get_max_price(token_out).await?;
    let out_18 = mul_div_floor(amount_in_18, price_in, price_out);
    let usd_in = mul_div_floor(amount_in_18, price_in, unit);

    let fee_in = side_fee_bps(methods, pool, token_in, usd_in, pool.swap_fee_bps, true).await?;
    let fee_out = side_fee_bps(methods, pool, token_out, usd_in, pool.swap_fee_bps, false).await?;
    let fee_bps = std::cmp::max(fee_in, fee_out);

    Ok((apply_fee_bps(out_18, fee_bps), fee_bps))
}
