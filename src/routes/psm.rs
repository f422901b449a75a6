//! Peg-stability module route: 1:1 (modulo decimals) conversion between a
//! synthetic token and its pegged collateral, at the module's fixed on-chain
//! fee.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::cache::ConvertCaches;
use crate::contracts::{PsmDepositCall, PsmWithdrawCall};
use crate::errors::{ConvertError, Result};
use crate::fee_curve::apply_fee_bps;
use crate::normalization::scale_amount;
use crate::routes::{structurally_valid, weights, Route};
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Quote};

const GAS_ESTIMATE: u64 = 250_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PegDirection {
    /// Collateral in, synthetic out.
    Deposit,
    /// Synthetic in, collateral out.
    Withdraw,
}

pub struct PsmRoute {
    config: Arc<ProtocolConfig>,
    caches: Arc<ConvertCaches>,
}

impl PsmRoute {
    pub fn new(config: Arc<ProtocolConfig>, caches: Arc<ConvertCaches>) -> Self {
        Self { config, caches }
    }

    /// Which way the pair crosses the peg module, if it does at all.
    async fn direction(&self, request: &ConversionRequest) -> Result<Option<PegDirection>> {
        if !structurally_valid(request)
            || request.from_token.is_native
            || request.to_token.is_native
        {
            return Ok(None);
        }
        let Ok(net) = self.config.network(request.network) else {
            return Ok(None);
        };
        let Some(psm) = net.psm else {
            return Ok(None);
        };

        let chain = request.chain.as_ref();
        if self
            .caches
            .pegged(
                chain,
                request.network,
                psm,
                request.from_token.address,
                request.to_token.address,
            )
            .await?
        {
            return Ok(Some(PegDirection::Deposit));
        }
        if self
            .caches
            .pegged(
                chain,
                request.network,
                psm,
                request.to_token.address,
                request.from_token.address,
            )
            .await?
        {
            return Ok(Some(PegDirection::Withdraw));
        }
        Ok(None)
    }

    async fn require_direction(&self, request: &ConversionRequest) -> Result<PegDirection> {
        self.direction(request).await?.ok_or_else(|| {
            ConvertError::unavailable(self.name(), "token pair is not registered with the peg module")
        })
    }
}

#[async_trait]
impl Route for PsmRoute {
    fn name(&self) -> &'static str {
        "psm_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.direction(request).await? {
            Some(_) => weights::PSM,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let direction = self.require_direction(request).await?;
        let net = self.config.network(request.network)?;
        let psm = net.require_psm(request.network)?;
        let sell_amount = request.require_sell_amount()?;

        let fee_bps = self
            .caches
            .psm_fee_bps(request.chain.as_ref(), request.network, psm)
            .await?;
        let scaled = scale_amount(
            sell_amount,
            request.from_token.decimals,
            request.to_token.decimals,
        );

        Ok(Quote {
            sell_amount,
            buy_amount: apply_fee_bps(scaled, fee_bps),
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target: Some(psm),
            fee_bps,
            fee_charged_before_convert: direction == PegDirection::Withdraw,
        })
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let direction = self.require_direction(request).await?;
        let net = self.config.network(request.network)?;
        let psm = net.require_psm(request.network)?;
        let amount = request.require_sell_amount()?;

        let calldata = match direction {
            PegDirection::Deposit => PsmDepositCall {
                pegged_token: request.from_token.address,
                synth_token: request.to_token.address,
                amount,
            }
            .encode(),
            PegDirection::Withdraw => PsmWithdrawCall {
                pegged_token: request.to_token.address,
                synth_token: request.from_token.address,
                amount,
            }
            .encode(),
        };

        Ok(TransactionRequest::new()
            .to(psm)
            .data(Bytes::from(calldata)))
    }
}
