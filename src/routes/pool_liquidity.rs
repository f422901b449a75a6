//! Liquidity-pool mint/redeem route: converting between the pool-share
//! token and any pool-eligible asset, with the dynamic fee curve applied on
//! the asset side.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::contracts::{PoolMintCall, PoolRedeemCall};
use crate::errors::{ConvertError, Result};
use crate::fee_curve::apply_fee_bps;
use crate::normalization::{normalize_native, scale_amount, NormalizedToken};
use crate::routes::{pool_math, structurally_valid, weights, Route};
use crate::settings::{PoolConfig, ProtocolConfig};
use crate::types::{ConversionRequest, Quote};

const GAS_ESTIMATE: u64 = 1_200_000;
const DEFAULT_SLIPPAGE_BPS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiquidityDirection {
    /// Pool-eligible asset in, share token out.
    Mint,
    /// Share token in, pool-eligible asset out.
    Redeem,
}

struct Applicability {
    direction: LiquidityDirection,
    /// The non-share side, after native normalization.
    asset: NormalizedToken,
}

pub struct PoolLiquidityRoute {
    config: Arc<ProtocolConfig>,
}

impl PoolLiquidityRoute {
    pub fn new(config: Arc<ProtocolConfig>) -> Self {
        Self { config }
    }

    fn applicability(&self, request: &ConversionRequest) -> Option<Applicability> {
        if !structurally_valid(request) {
            return None;
        }
        let net = self.config.network(request.network).ok()?;
        let pool = net.pool.as_ref()?;

        let from_is_share = request.from_token.address == pool.share_token;
        let to_is_share = request.to_token.address == pool.share_token;
        let (direction, asset_token) = match (from_is_share, to_is_share) {
            (false, true) => (LiquidityDirection::Mint, &request.from_token),
            (true, false) => (LiquidityDirection::Redeem, &request.to_token),
            _ => return None,
        };

        let asset = normalize_native(asset_token, net).ok()?;
        pool.has_asset(asset.address).then_some(Applicability { direction, asset })
    }

    fn require_applicability(&self, request: &ConversionRequest) -> Result<Applicability> {
        self.applicability(request).ok_or_else(|| {
            ConvertError::unavailable(self.name(), "pair is not share-token/pool-asset")
        })
    }

    fn pool<'a>(&'a self, request: &ConversionRequest) -> Result<&'a PoolConfig> {
        self.config
            .network(request.network)?
            .require_pool(request.network)
    }

    async fn priced_quote(
        &self,
        request: &ConversionRequest,
        applicability: &Applicability,
    ) -> Result<Quote> {
        let pool = self.pool(request)?;
        let methods = request.require_pool_methods()?;
        let sell_amount = request.require_sell_amount()?;
        let sell_18 = scale_amount(sell_amount, request.from_token.decimals, 18);

        let (out_18, fee_bps) = match applicability.direction {
            LiquidityDirection::Mint => {
                pool_math::mint_quote(methods, pool, applicability.asset.address, sell_18).await?
            }
            LiquidityDirection::Redeem => {
                pool_math::redeem_quote(methods, pool, applicability.asset.address, sell_18).await?
            }
        };
        let buy_amount = scale_amount(out_18, 18, request.to_token.decimals);

        // Native deposits attach value instead of an allowance.
        let allowance_target = if applicability.direction == LiquidityDirection::Mint
            && applicability.asset.is_native
        {
            None
        } else {
            Some(pool.pool)
        };

        Ok(Quote {
            sell_amount,
            buy_amount,
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target,
            fee_bps,
            fee_charged_before_convert: applicability.direction == LiquidityDirection::Mint,
        })
    }
}

#[async_trait]
impl Route for PoolLiquidityRoute {
    fn name(&self) -> &'static str {
        "pool_liquidity_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.applicability(request) {
            Some(_) => weights::POOL_LIQUIDITY,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let applicability = self.require_applicability(request)?;
        self.priced_quote(request, &applicability).await
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let applicability = self.require_applicability(request)?;
        let pool = self.pool(request)?;
        let amount = request.require_sell_amount()?;
        let receiver = request.receiver.unwrap_or_default();
        let slippage = request.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS);

        let quote = self.priced_quote(request, &applicability).await?;
        let min_out = apply_fee_bps(quote.buy_amount, slippage);

        let mut tx = TransactionRequest::new().to(pool.pool);
        match applicability.direction {
            LiquidityDirection::Mint => {
                if applicability.asset.is_native {
                    tx = tx.value(amount);
                }
                tx = tx.data(Bytes::from(
                    PoolMintCall {
                        token_in: applicability.asset.address,
                        amount_in: amount,
                        min_shares: min_out,
                        receiver,
                    }
                    .encode(),
                ));
            }
            LiquidityDirection::Redeem => {
                tx = tx.data(Bytes::from(
                    PoolRedeemCall {
                        token_out: applicability.asset.address,
                        share_amount: amount,
                        min_out,
                        receiver,
                    }
                    .encode(),
                ));
            }
        }
        Ok(tx)
    }
}
