//! Core value types shared across the conversion engine.
//!
//! `Token` identity is `(address, chain_id)`; the symbol is a display hint
//! only and is never used for equality. `Quote` values are produced fresh on
//! every call and never cached: prices move every block.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::chain::ChainReader;
use crate::errors::{ConvertError, Result};
use crate::pool_methods::PoolMethods;

/// Fees are expressed as integer basis points over this divisor.
pub const BPS_DIVISOR: u32 = 10_000;

/// Supported networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Ethereum,
    Arbitrum,
    Polygon,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Arbitrum => 42161,
            Network::Polygon => 137,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Ethereum => write!(f, "ethereum"),
            Network::Arbitrum => write!(f, "arbitrum"),
            Network::Polygon => write!(f, "polygon"),
        }
    }
}

/// An ERC-20 token (or the chain's native asset) as the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub chain_id: u64,
    /// True for the chain's native asset (ETH, MATIC). Native tokens are
    /// normalized to their wrapped form before any downstream math.
    #[serde(default)]
    pub is_native: bool,
    /// True for the canonical wrapped form of the native asset.
    #[serde(default)]
    pub is_wrapped_native: bool,
    /// True for the internal liquidity pool's share token.
    #[serde(default)]
    pub is_pool_share: bool,
    /// For wrapped-native tokens, the symbol of the underlying native asset.
    #[serde(default)]
    pub base_symbol: Option<String>,
}

impl Token {
    /// Identity key. Symbols are display hints and never participate.
    pub fn key(&self) -> (Address, u64) {
        (self.address, self.chain_id)
    }

    pub fn is_on(&self, network: Network) -> bool {
        self.chain_id == network.chain_id()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A discovered swap path through an external curve-style pool:
/// the pool address plus the coin indices of the two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePath {
    pub pool: Address,
    pub from_index: i128,
    pub to_index: i128,
}

/// Current pool exposure to one asset, denominated in the pool's
/// unit-of-account. Supplied by the injected valuation oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolAccounting {
    pub liquidity_units: U256,
}

/// A price quote under one route's fee model. Immutable, produced fresh per
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub sell_amount: U256,
    pub buy_amount: U256,
    pub gas_estimate: U256,
    /// Contract the seller must approve before executing, if any.
    pub allowance_target: Option<Address>,
    pub fee_bps: u32,
    /// Whether the fee is deducted from the input side rather than the output.
    pub fee_charged_before_convert: bool,
}

/// Immutable per-call input to `weight`/`quote`/`transaction`.
///
/// Sell-amount-driven quoting is the only mode the engine guarantees;
/// `buy_amount` is carried for aggregator pass-through only.
#[derive(Clone)]
pub struct ConversionRequest {
    pub from_token: Token,
    pub to_token: Token,
    pub network: Network,
    pub sell_amount: Option<U256>,
    pub buy_amount: Option<U256>,
    /// Recipient of the converted funds; defaults to the sender on-chain.
    pub receiver: Option<Address>,
    /// Allowed slippage for routes that build a `minOut`, in basis points.
    pub slippage_bps: Option<u32>,
    /// Read-only on-chain surface (peg queries, fee parameters, curve paths).
    pub chain: Arc<dyn ChainReader>,
    /// Valuation oracle for the internal liquidity pool. Required by the
    /// pool-backed routes, unused by the others.
    pub pool_methods: Option<Arc<dyn PoolMethods>>,
}

impl ConversionRequest {
    pub fn new(
        from_token: Token,
        to_token: Token,
        network: Network,
        chain: Arc<dyn ChainReader>,
    ) -> Self {
        Self {
            from_token,
            to_token,
            network,
            sell_amount: None,
            buy_amount: None,
            receiver: None,
            slippage_bps: None,
            chain,
            pool_methods: None,
        }
    }

    pub fn with_sell_amount(mut self, amount: U256) -> Self {
        self.sell_amount = Some(amount);
        self
    }

    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_slippage_bps(mut self, bps: u32) -> Self {
        self.slippage_bps = Some(bps);
        self
    }

    pub fn with_pool_methods(mut self, methods: Arc<dyn PoolMethods>) -> Self {
        self.pool_methods = Some(methods);
        self
    }

    /// The sell amount, required by every quote path.
    pub fn require_sell_amount(&self) -> Result<U256> {
        self.sell_amount
            .ok_or_else(|| ConvertError::Configuration("sell_amount is required".into()))
    }

    /// The injected pool oracle, required by the pool-backed routes.
    pub fn require_pool_methods(&self) -> Result<&Arc<dyn PoolMethods>> {
        self.pool_methods
            .as_ref()
            .ok_or_else(|| ConvertError::Configuration("pool_methods oracle not supplied".into()))
    }
}

impl std::fmt::Debug for ConversionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRequest")
            .field("from", &self.from_token.symbol)
            .field("to", &self.to_token.symbol)
            .field("network", &self.network)
            .field("sell_amount", &self.sell_amount)
            .field("buy_amount", &self.buy_amount)
            .finish_non_exhaustive()
    }
}
