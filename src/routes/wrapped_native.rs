//! Wrap/unwrap route: exactly 1:1, zero fee. Applicable only when exactly
//! one side is the chain's native asset and the other is its canonical
//! wrapped form.

use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::AbiEncode;
use ethers::types::{Bytes, TransactionRequest, U256};

use crate::contracts::{WethDepositCall, WethWithdrawCall};
use crate::errors::{ConvertError, Result};
use crate::routes::{structurally_valid, weights, Route};
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Quote, Token};

const GAS_ESTIMATE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WrapDirection {
    Wrap,
    Unwrap,
}

pub struct WrappedNativeRoute {
    config: Arc<ProtocolConfig>,
}

impl WrappedNativeRoute {
    pub fn new(config: Arc<ProtocolConfig>) -> Self {
        Self { config }
    }

    /// True when `wrapped` is the designated wrapped form of `native` on this
    /// network.
    fn is_wrapped_pair(&self, request: &ConversionRequest, native: &Token, wrapped: &Token) -> bool {
        let Ok(net) = self.config.network(request.network) else {
            return false;
        };
        net.wrapped_native(&native.symbol)
            .map(|t| t.address == wrapped.address)
            .unwrap_or(false)
    }

    fn direction(&self, request: &ConversionRequest) -> Option<WrapDirection> {
        if !structurally_valid(request) {
            return None;
        }
        let (from, to) = (&request.from_token, &request.to_token);
        match (from.is_native, to.is_native) {
            (true, false) if self.is_wrapped_pair(request, from, to) => Some(WrapDirection::Wrap),
            (false, true) if self.is_wrapped_pair(request, to, from) => Some(WrapDirection::Unwrap),
            _ => None,
        }
    }

    fn require_direction(&self, request: &ConversionRequest) -> Result<WrapDirection> {
        self.direction(request).ok_or_else(|| {
            ConvertError::unavailable(self.name(), "pair is not native/wrapped-native")
        })
    }
}

#[async_trait]
impl Route for WrappedNativeRoute {
    fn name(&self) -> &'static str {
        "wrapped_native_route"
    }

    async fn weight(&self, request: &ConversionRequest) -> Result<u32> {
        Ok(match self.direction(request) {
            Some(_) => weights::WRAPPED_NATIVE,
            None => 0,
        })
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        self.require_direction(request)?;
        let sell_amount = request.require_sell_amount()?;
        // Always exactly 1:1: wrapping neither charges a fee nor changes
        // decimals.
        Ok(Quote {
            sell_amount,
            buy_amount: sell_amount,
            gas_estimate: U256::from(GAS_ESTIMATE),
            allowance_target: None,
            fee_bps: 0,
            fee_charged_before_convert: false,
        })
    }

    async fn transaction(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        let direction = self.require_direction(request)?;
        let amount = request.require_sell_amount()?;

        match direction {
            WrapDirection::Wrap => {
                let wrapped = request.to_token.address;
                Ok(TransactionRequest::new()
                    .to(wrapped)
                    .value(amount)
                    .data(Bytes::from(WethDepositCall {}.encode())))
            }
            WrapDirection::Unwrap => {
                let wrapped = request.from_token.address;
                Ok(TransactionRequest::new()
                    .to(wrapped)
                    .data(Bytes::from(WethWithdrawCall { wad: amount }.encode())))
            }
        }
    }
}
