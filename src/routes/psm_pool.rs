//! Compound route: peg-stability deposit followed by a pool-share mint,
//! executed atomically by the specialized multi-hop router. Covers
//! collateral -> share-token conversions where the collateral itself is not
//! pool-eligible but its synthetic counterpart is.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::cache::ConvertCaches;
use crate::contracts::SellPeggedToPoolCall;
use crate::errors::{ConvertError, Result};
use crate::fee_curve::{apply_fee_bps, combine_fee_bps};
use crate::normalization::scale_amount;
use crate::routes::{pool_math, structurally_valid, weights, Route};
use crate::settings::{ProtocolConfig, TokenConfig};
use crate::types::{ConversionRequest, Quote};

const GAS_ESTIMATE: u64 = 1_500_000;
const DEFAULT_SLIPPAGE_BPS: u32 = 50;

pub struct PsmToPoolRoute {
    config: Arc<ProtocolConfig>,
    caches: Arc<ConvertCaches>,
}

impl PsmToPoolRoute {
    pub fn new(config: Arc<ProtocolConfig>, caches: Arc<ConvertCaches>) -> Self {
        Self { config, caches }
    }

    /// Find a synthetic token that bridges the pair: pegged against
    /// `from_token` and eligible in the pool whose share token is requested.
    async fn bridge_synth(&self, request: &ConversionRequest) -> Result<Option<TokenConfig>> {
        if !structurally_valid(request)
            || request.from_token.is_native
            || request.to_token.is_native
        {
            return Ok(None);
        }
        let Ok(net) = self.config.network(request.network) else {
            return Ok(None);
        };
        let (Some(psm), Some(pool), Some(_router)) = (net.psm, net.pool.as_ref(), net.convert_router)
        else {
            return Ok(None);
        };
        if request.to_token.address != pool.share_token {
            return Ok(None);
        }
        // A directly pool-eligible input is the simple mint route's job.
        if pool.has_asset(request.from_token.address) {
            return Ok(None);
        }

        for asset in &pool.assets {
            let Some(token) = net.token_by_address(*asset) else {
                continue;
            };
            if self
                .caches
                .pegged(
                    request.chain.as_ref(),
                    request.network,
                    psm,
                    request.from_token.address,
                    *asset,
                )
                .await?
            {
                return Ok(Some(token.clone()));
            }
        }
        Ok(None)
    }

    async fn require_bridge(&self, request: &ConversionRequest) -> Result<TokenConfig> {
        self.bridge_synth(request).await?.ok_or_else(|| {
            ConvertError::unavailable(self.name(), "no pegged pool-eligible synthetic bridges the pair")
        })
    }

    async fn priced_quote(&self, request: &ConversionRequest, synth: &TokenConfig) -> Result<Quote> {
        let net = self.config.network(request.network)?;
        let psm = net.require_psm(request.network)?;
        let pool = net.require_pool(request.network)?;
        let router = net.convert_router.ok_or_else(|| {
            ConvertError::Configuration(format!("no convert router on {}", request.network))
        })?;
        let methods = request.require_pool_methods()?;
        let sell_amount = request.require_sell_amount()?;

        // Leg 1: peg deposit at the module's fixed fee.
        let psm_fee_bps = self
            .caches
            .psm_fee_bps(request.chain.as_ref(), request.network, psm)
            .await?;
        let synth_amount = apply_fee_bps(
            scale_amount(sell_amount, request.from_token.decimals, synth.decimals),
            psm_fee_bps,
        );

        // Leg 2: pool mint under the fee curve.
        let synth_18 = scale_amount(synth_amount, synth.decimals, 18);
        let (shares, mint_fee_bps) =
            pool_math::mint_quote(methods, pool, synth.address, synth_18).await?;

        Ok(Quote {
            sell_amount,
            buy_amount: scale_amount(shares, 18, request.to_token.decimals),
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target: Some(router),
            fee_bps: combine_fee_bps(psm_fee_bps, mint_fee_bps),
            fee_charged_before_convert: true,
        })
    }
}

#[async_trait]
impl Route for PsmToPoolRoute {
    fn name(&self) -> &'static str {
        "psm_to_pool_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.bridge_synth(request).await? {
            Some(_) => weights::PSM_TO_POOL,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let synth = self.require_bridge(request).await?;
        self.priced_quote(request, &synth).await
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let synth = self.require_bridge(request).await?;
        let net = self.config.network(request.network)?;
        let router = net.convert_router.ok_or_else(|| {
            ConvertError::Configuration(format!("no convert router on {}", request.network))
        })?;
        let amount = request.require_sell_amount()?;
        let receiver = request.receiver.unwrap_or_default();
        let slippage = request.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let quote = self.priced_quote(request, &synth).await?;
        let min_out = apply_fee_bps(quote.buy_amount, slippage);

        Ok(TransactionRequest::new().to(router).data(Bytes::from(
            SellPeggedToPoolCall {
                pegged_token: request.from_token.address,
                synth_token: synth.address,
                token_out: request.to_token.address,
                amount_in: amount,
                min_out,
                receiver,
            }
            .encode(),
        )))
    }
}
