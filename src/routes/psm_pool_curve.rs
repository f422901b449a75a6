//! Compound route: peg-stability deposit, internal pool swap, then a swap
//! through an external curve-style pool, executed atomically by the
//! multi-hop router. Reaches assets the internal pool does not hold, via a
//! discovered curve path from a pool-eligible intermediate.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::cache::ConvertCaches;
use crate::contracts::SellPeggedToPoolToCurveCall;
use crate::errors::{ConvertError, Result};
use crate::fee_curve::{apply_fee_bps, combine_fee_bps};
use crate::normalization::scale_amount;
use crate::routes::{pool_math, structurally_valid, weights, Route};
use crate::settings::{ProtocolConfig, TokenConfig};
use crate::types::{ConversionRequest, CurvePath, Quote};

const GAS_ESTIMATE: u64 = 2_000_000;
const DEFAULT_SLIPPAGE_BPS: u32 = 50;

struct Hops {
    synth: TokenConfig,
    interim: TokenConfig,
    path: CurvePath,
}

pub struct PsmToPoolToCurveRoute {
    config: Arc<ProtocolConfig>,
    caches: Arc<ConvertCaches>,
}

impl PsmToPoolToCurveRoute {
    pub fn new(config: Arc<ProtocolConfig>, caches: Arc<ConvertCaches>) -> Self {
        Self { config, caches }
    }

    /// Resolve the two hops: a synthetic pegged against the input, and a
    /// pool-eligible intermediate with a discovered curve path to the
    /// output. All lookups are memoized, so repeated weight checks stay
    /// cheap.
    async fn hops(&self, request: &ConversionRequest) -> Result<Option<Hops>> {
        if !structurally_valid(request)
            || request.from_token.is_native
            || request.to_token.is_native
        {
            return Ok(None);
        }
        let Ok(net) = self.config.network(request.network) else {
            return Ok(None);
        };
        let (Some(psm), Some(pool), Some(_router), Some(factory)) = (
            net.psm,
            net.pool.as_ref(),
            net.convert_router,
            net.curve_factory,
        ) else {
            return Ok(None);
        };
        // Targets the internal pool can satisfy belong to the simpler routes.
        if request.to_token.address == pool.share_token
            || pool.has_asset(request.to_token.address)
        {
            return Ok(None);
        }

        let chain = request.chain.as_ref();
        let mut synth = None;
        for asset in &pool.assets {
            if self
                .caches
                .pegged(chain, request.network, psm, request.from_token.address, *asset)
                .await?
            {
                synth = net.token_by_address(*asset).cloned();
                break;
            }
        }
        let Some(synth) = synth else {
            return Ok(None);
        };

        for asset in &pool.assets {
            if *asset == synth.address {
                continue;
            }
            let Some(interim) = net.token_by_address(*asset) else {
                continue;
            };
            if let Some(path) = self
                .caches
                .curve_path(chain, request.network, factory, *asset, request.to_token.address)
                .await?
            {
                return Ok(Some(Hops {
                    synth,
                    interim: interim.clone(),
                    path,
                }));
            }
        }
        Ok(None)
    }

    async fn require_hops(&self, request: &ConversionRequest) -> Result<Hops> {
        self.hops(request).await?.ok_or_else(|| {
            ConvertError::unavailable(self.name(), "no pegged synthetic or curve path bridges the pair")
        })
    }

    async fn priced_quote(&self, request: &ConversionRequest, hops: &Hops) -> Result<Quote> {
        let net = self.config.network(request.network)?;
        let psm = net.require_psm(request.network)?;
        let pool = net.require_pool(request.network)?;
        let router = net.convert_router.ok_or_else(|| {
            ConvertError::Configuration(format!("no convert router on {}", request.network))
        })?;
        let methods = request.require_pool_methods()?;
        let sell_amount = request.require_sell_amount()?;

        // Leg 1: peg deposit.
        let psm_fee_bps = self
            .caches
            .psm_fee_bps(request.chain.as_ref(), request.network, psm)
            .await?;
        let synth_amount = apply_fee_bps(
            scale_amount(sell_amount, request.from_token.decimals, hops.synth.decimals),
            psm_fee_bps,
        );

        // Leg 2: internal pool swap to the intermediate.
        let synth_18 = scale_amount(synth_amount, hops.synth.decimals, 18);
        let (interim_18, swap_fee_bps) = pool_math::swap_quote(
            methods,
            pool,
            hops.synth.address,
            hops.interim.address,
            synth_18,
        )
        .await?;
        let interim_amount = scale_amount(interim_18, 18, hops.interim.decimals);

        // Leg 3: external curve swap. The curve pool's own fee is already
        // reflected in get_dy, so only the first two legs compound here.
        let buy_amount = request
            .chain
            .curve_get_dy(request.network, &hops.path, interim_amount)
            .await?;

        Ok(Quote {
            sell_amount,
            buy_amount,
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target: Some(router),
            fee_bps: combine_fee_bps(psm_fee_bps, swap_fee_bps),
            fee_charged_before_convert: true,
        })
    }
}

#[async_trait]
impl Route for PsmToPoolToCurveRoute {
    fn name(&self) -> &'static str {
        "psm_to_pool_to_curve_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.hops(request).await? {
            Some(_) => weights::PSM_TO_POOL_TO_CURVE,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let hops = self.require_hops(request).await?;
        self.priced_quote(request, &hops).await
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let hops = self.require_hops(request).await?;
        let net = self.config.network(request.network)?;
        let router = net.convert_router.ok_or_else(|| {
            ConvertError::Configuration(format!("no convert router on {}", request.network))
        })?;
        let amount = request.require_sell_amount()?;
        let receiver = request.receiver.unwrap_or_default();
        let slippage = request.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let quote = self.priced_quote(request, &hops).await?;
        let min_out = apply_fee_bps(quote.buy_amount, slippage);

        Ok(TransactionRequest::new().to(router).data(Bytes::from(
            SellPeggedToPoolToCurveCall {
                pegged_token: request.from_token.address,
                synth_token: hops.synth.address,
                token_interim: hops.interim.address,
                curve_pool: hops.path.pool,
                curve_from_index: hops.path.from_index,
                curve_to_index: hops.path.to_index,
                amount_in: amount,
                min_out,
                receiver,
            }
            .encode(),
        )))
    }
}
