//! Conversion execution strategies.
//!
//! Each route is a stateless strategy exposing `weight`/`quote`/
//! `transaction` over the shared request shape. A weight of 0 means "not
//! applicable"; larger weights are preferred. Routes never throw for a
//! merely-inapplicable pair; absence of capability is weight 0.
//!
//! The registry order below is fixed and used only as a tie-break when two
//! routes report the same nonzero weight (first-registered wins).

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::TransactionRequest;

use crate::aggregators::AggregatorApi;
use crate::cache::ConvertCaches;
use crate::errors::Result;
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Quote};

pub mod aggregator;
pub mod pool_liquidity;
pub mod pool_math;
pub mod pool_swap;
pub mod psm;
pub mod psm_pool;
pub mod psm_pool_curve;
pub mod wrapped_native;

/// Weight constants. Larger = more preferred when several routes apply.
pub mod weights {
    pub const WRAPPED_NATIVE: u32 = 500;
    pub const PSM: u32 = 400;
    pub const POOL_LIQUIDITY: u32 = 300;
    pub const PSM_TO_POOL: u32 = 250;
    pub const POOL_SWAP: u32 = 200;
    pub const PSM_TO_POOL_TO_CURVE: u32 = 150;
    pub const AGGREGATOR: u32 = 100;
}

/// One self-contained conversion execution strategy.
#[async_trait]
pub trait Route: Send + Sync {
    fn name(&self) -> &'static str;

    /// Suitability score for this request. Must be fast and side-effect-free
    /// beyond read-only lookups; 0 = not applicable.
    async fn weight(&self, request: &ConversionRequest) -> Result<u32>;

    /// Price quote under this route's fee model. Produced fresh per call.
    async fn quote(&self, request: &ConversionRequest) -> Result<Quote>;

    /// Populated-but-unsigned transaction, using the same fee and price
    /// assumptions as `quote` for the identical request. Independently
    /// computable; no hidden session state.
    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest>;
}

/// Tokens must sit on the requested network and differ; no route applies
/// otherwise.
pub(crate) fn structurally_valid(request: &ConversionRequest) -> bool {
    request.from_token.is_on(request.network)
        && request.to_token.is_on(request.network)
        && request.from_token != request.to_token
}

/// The fixed, ordered registry of all strategies.
pub fn default_routes(
    config: Arc<ProtocolConfig>,
    caches: Arc<ConvertCaches>,
    zero_ex: Arc<dyn AggregatorApi>,
    paraswap: Arc<dyn AggregatorApi>,
) -> Vec<Arc<dyn Route>> {
    vec![
        Arc::new(psm::PsmRoute::new(Arc::clone(&config), Arc::clone(&caches))),
        Arc::new(pool_liquidity::PoolLiquidityRoute::new(Arc::clone(&config))),
        Arc::new(pool_swap::PoolSwapRoute::new(Arc::clone(&config))),
        Arc::new(aggregator::AggregatorRoute::new(
            "zero_ex_route",
            Arc::clone(&config),
            zero_ex,
        )),
        Arc::new(aggregator::AggregatorRoute::new(
            "paraswap_route",
            Arc::clone(&config),
            paraswap,
        )),
        Arc::new(wrapped_native::WrappedNativeRoute::new(Arc::clone(&config))),
        Arc::new(psm_pool::PsmToPoolRoute::new(
            Arc::clone(&config),
            Arc::clone(&caches),
        )),
        Arc::new(psm_pool_curve::PsmToPoolToCurveRoute::new(config, caches)),
    ]
}
