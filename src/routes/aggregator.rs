//! External aggregator route. Two instances of this strategy are registered,
//! one per aggregator; the network partition lives in the injected client.
//! The remote API is the source of truth for amounts; the fee here is
//! informational, from the stablecoin-classification table.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, TransactionRequest};
use log::warn;

use crate::aggregators::{
    aggregator_fee_bps, classify_pair, AggregatorApi, AggregatorQuote, AggregatorQuoteRequest,
};
use crate::errors::{ConvertError, Result};
use crate::routes::{structurally_valid, weights, Route};
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Quote, Token};

/// Sentinel address both aggregator APIs use for the chain's native asset.
fn native_sentinel() -> Address {
    Address::repeat_byte(0xee)
}

fn aggregator_address(token: &Token) -> Address {
    if token.is_native {
        native_sentinel()
    } else {
        token.address
    }
}

pub struct AggregatorRoute {
    name: &'static str,
    config: Arc<ProtocolConfig>,
    api: Arc<dyn AggregatorApi>,
}

impl AggregatorRoute {
    pub fn new(
        name: &'static str,
        config: Arc<ProtocolConfig>,
        api: Arc<dyn AggregatorApi>,
    ) -> Self {
        Self { name, config, api }
    }

    fn applicable(&self, request: &ConversionRequest) -> bool {
        if !structurally_valid(request) || !self.api.serves(request.network) {
            return false;
        }
        match self.config.network(request.network) {
            Ok(net) => net.aggregator.is_some(),
            Err(_) => false,
        }
    }

    async fn remote_quote(&self, request: &ConversionRequest) -> Result<(AggregatorQuote, u32)> {
        if !self.applicable(request) {
            return Err(ConvertError::unavailable(
                self.name,
                "aggregator does not serve this pair",
            ));
        }
        let net = self.config.network(request.network)?;
        let fee_recipient = net.aggregator.as_ref().and_then(|a| a.fee_recipient);
        let fee_bps = aggregator_fee_bps(classify_pair(&request.from_token, &request.to_token));

        let api_request = AggregatorQuoteRequest {
            sell_token: aggregator_address(&request.from_token),
            buy_token: aggregator_address(&request.to_token),
            sell_token_decimals: request.from_token.decimals,
            buy_token_decimals: request.to_token.decimals,
            sell_amount: request.require_sell_amount()?,
            taker: request.receiver,
            slippage_bps: request.slippage_bps,
            fee_bps,
            fee_recipient,
        };
        let quote = self.api.swap_quote(request.network, &api_request).await?;
        Ok((quote, fee_bps))
    }
}

#[async_trait]
impl Route for AggregatorRoute {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(if self.applicable(request) {
            weights::AGGREGATOR
        } else {
            0
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let (remote, fee_bps) = self.remote_quote(request).await?;
        Ok(Quote {
            sell_amount: remote.sell_amount,
            buy_amount: remote.buy_amount,
            gas_estimate: remote.estimated_gas,
            allowance_target: remote.allowance_target,
            fee_bps,
            fee_charged_before_convert: true,
        })
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let (remote, _) = self.remote_quote(request).await?;
        let (Some(to), Some(data)) = (remote.to, remote.data.clone()) else {
            warn!(
                "{} returned no executable transaction for {:?}",
                self.api.name(),
                request
            );
            return Err(ConvertError::unavailable(
                self.name,
                "aggregator response carried no transaction; a taker address may be required",
            ));
        };
        let mut tx = TransactionRequest::new().to(to).data(data);
        if let Some(value) = remote.value {
            tx = tx.value(value);
        }
        Ok(tx)
    }
}
