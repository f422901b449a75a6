//! Valuation oracle for the internal liquidity pool.
//!
//! Prices, pool accounting and target liquidity come from the protocol's
//! valuation subsystem; the conversion core consumes them through this trait
//! and never computes them itself. All prices and unit-of-account values are
//! 1e18 fixed-point.

use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::errors::Result;
use crate::types::PoolAccounting;

/// 1e18 fixed-point unit shared by pool prices and unit-of-account values.
pub fn price_unit() -> U256 {
    U256::exp10(18)
}

#[async_trait]
pub trait PoolMethods: Send + Sync {
    /// Price the pool pays when taking `token` in (the conservative side).
    async fn get_min_price(&self, token: Address) -> Result<U256>;

    /// Price the pool charges when giving `token` out.
    async fn get_max_price(&self, token: Address) -> Result<U256>;

    /// Current pool exposure to `token`.
    async fn get_pool_accounting(&self, token: Address) -> Result<PoolAccounting>;

    /// The ideal exposure the pool's weighting assigns to `token`; the fee
    /// curve's equilibrium point.
    async fn get_target_liquidity(&self, token: Address) -> Result<U256>;

    /// Sum of all configured asset weights.
    async fn get_total_weights(&self) -> Result<U256>;

    /// Unit price of the pool-share token. Buy and sell sides may differ.
    async fn get_pool_share_price(&self, is_buying: bool) -> Result<U256>;
}
