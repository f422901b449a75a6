//! Liquidity-pool internal swap route: converting between two pool-eligible
//! assets (never the share token itself). Output follows the oracle price
//! ratio; the fee curve is evaluated on both sides and the larger result
//! applies.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::contracts::PoolSwapCall;
use crate::errors::{ConvertError, Result};
use crate::fee_curve::apply_fee_bps;
use crate::normalization::{normalize_native, scale_amount, NormalizedToken};
use crate::routes::{pool_math, structurally_valid, weights, Route};
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Quote};

const GAS_ESTIMATE: u64 = 700_000;
const DEFAULT_SLIPPAGE_BPS: u32 = 50;

struct SwapPair {
    from: NormalizedToken,
    to: NormalizedToken,
}

pub struct PoolSwapRoute {
    config: Arc<ProtocolConfig>,
}

impl PoolSwapRoute {
    pub fn new(config: Arc<ProtocolConfig>) -> Self {
        Self { config }
    }

    fn applicability(&self, request: &ConversionRequest) -> Option<SwapPair> {
        if !structurally_valid(request) {
            return None;
        }
        let net = self.config.network(request.network).ok()?;
        let pool = net.pool.as_ref()?;

        if request.from_token.address == pool.share_token
            || request.to_token.address == pool.share_token
        {
            return None;
        }
        let from = normalize_native(&request.from_token, net).ok()?;
        let to = normalize_native(&request.to_token, net).ok()?;
        (pool.has_asset(from.address) && pool.has_asset(to.address) && from.address != to.address)
            .then_some(SwapPair { from, to })
    }

    fn require_applicability(&self, request: &ConversionRequest) -> Result<SwapPair> {
        self.applicability(request).ok_or_else(|| {
            ConvertError::unavailable(self.name(), "both sides must be pool-eligible assets")
        })
    }

    async fn priced_quote(&self, request: &ConversionRequest, pair: &SwapPair) -> Result<Quote> {
        let net = self.config.network(request.network)?;
        let pool = net.require_pool(request.network)?;
        let methods = request.require_pool_methods()?;
        let sell_amount = request.require_sell_amount()?;
        let sell_18 = scale_amount(sell_amount, request.from_token.decimals, 18);

        let (out_18, fee_bps) =
            pool_math::swap_quote(methods, pool, pair.from.address, pair.to.address, sell_18)
                .await?;
        let buy_amount = scale_amount(out_18, 18, request.to_token.decimals);

        Ok(Quote {
            sell_amount,
            buy_amount,
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target: if pair.from.is_native {
                None
            } else {
                Some(pool.pool)
            },
            fee_bps,
            fee_charged_before_convert: false,
        })
    }
}

#[async_trait]
impl Route for PoolSwapRoute {
    fn name(&self) -> &'static str {
        "pool_swap_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.applicability(request) {
            Some(_) => weights::POOL_SWAP,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let pair = self.require_applicability(request)?;
        self.priced_quote(request, &pair).await
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let pair = self.require_applicability(request)?;
        let net = self.config.network(request.network)?;
        let pool = net.require_pool(request.network)?;
        let amount = request.require_sell_amount()?;
        let receiver = request.receiver.unwrap_or_default();
        let slippage = request.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let quote = self.priced_quote(request, &pair).await?;
        let min_out = apply_fee_bps(quote.buy_amount, slippage);

        let mut tx = TransactionRequest::new().to(pool.pool).data(Bytes::from(
            PoolSwapCall {
                token_in: pair.from.address,
                token_out: pair.to.address,
                amount_in: amount,
                min_out,
                receiver,
            }
            .encode(),
        ));
        if pair.from.is_native {
            tx = tx.value(amount);
        }
        Ok(tx)
    }
}
