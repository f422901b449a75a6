//! Shared mocks and builders for the integration tests.
//!
//! The engine's injected collaborators (chain reader, pool oracle,
//! aggregator APIs) are replaced with in-memory fakes; no test touches the
//! network.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, TransactionRequest, U256};

use synth_convert_sdk::aggregators::{AggregatorApi, AggregatorQuote, AggregatorQuoteRequest};
use synth_convert_sdk::cache::ConvertCaches;
use synth_convert_sdk::chain::ChainReader;
use synth_convert_sdk::convert::Convert;
use synth_convert_sdk::errors::{ConvertError, Result};
use synth_convert_sdk::pool_methods::{price_unit, PoolMethods};
use synth_convert_sdk::routes::{default_routes, Route};
use synth_convert_sdk::settings::ProtocolConfig;
use synth_convert_sdk::types::{
    ConversionRequest, CurvePath, Network, PoolAccounting, Quote, Token,
};

// ---------------------------------------------------------------------------
// Chain reader fake
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockChain {
    pegged: HashSet<(Address, Address)>,
    psm_fee: U256,
    curve_paths: HashMap<(Address, Address), CurvePath>,
    pub is_pegged_calls: AtomicUsize,
    pub fee_calls: AtomicUsize,
    pub path_calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peg relationship: `pegged_token` can be deposited to mint
    /// `synth_token`.
    pub fn with_peg(mut self, pegged_token: Address, synth_token: Address) -> Self {
        self.pegged.insert((pegged_token, synth_token));
        self
    }

    /// Raw 1e18-fraction peg module fee (e.g. 0.001e18 = 10 bps).
    pub fn with_psm_fee(mut self, raw: U256) -> Self {
        self.psm_fee = raw;
        self
    }

    pub fn with_curve_path(mut self, from: Address, to: Address, path: CurvePath) -> Self {
        self.curve_paths.insert((from, to), path);
        self
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn is_pegged(
        &self,
        _network: Network,
        _psm: Address,
        pegged_token: Address,
        synth_token: Address,
    ) -> Result<bool> {
        self.is_pegged_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pegged.contains(&(pegged_token, synth_token)))
    }

    async fn psm_transaction_fee(&self, _network: Network, _psm: Address) -> Result<U256> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.psm_fee)
    }

    async fn find_curve_path(
        &self,
        _network: Network,
        _factory: Address,
        from: Address,
        to: Address,
    ) -> Result<Option<CurvePath>> {
        self.path_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.curve_paths.get(&(from, to)).copied())
    }

    async fn curve_get_dy(
        &self,
        _network: Network,
        _path: &CurvePath,
        amount_in: U256,
    ) -> Result<U256> {
        // The fake external pool trades 1:1 with no fee.
        Ok(amount_in)
    }
}

// ---------------------------------------------------------------------------
// Pool oracle fake
// ---------------------------------------------------------------------------

pub struct MockPool {
    prices: HashMap<Address, (U256, U256)>,
    accounting: HashMap<Address, U256>,
    targets: HashMap<Address, U256>,
    share_price: U256,
}

impl Default for MockPool {
    fn default() -> Self {
        Self {
            prices: HashMap::new(),
            accounting: HashMap::new(),
            targets: HashMap::new(),
            share_price: price_unit(),
        }
    }
}

impl MockPool {
    /// Unit prices, zero targets (fee curve disabled), unit share price.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, token: Address, min: U256, max: U256) -> Self {
        self.prices.insert(token, (min, max));
        self
    }

    pub fn with_accounting(mut self, token: Address, units: U256) -> Self {
        self.accounting.insert(token, units);
        self
    }

    pub fn with_target(mut self, token: Address, units: U256) -> Self {
        self.targets.insert(token, units);
        self
    }

    pub fn with_share_price(mut self, price: U256) -> Self {
        self.share_price = price;
        self
    }
}

#[async_trait]
impl PoolMethods for MockPool {
    async fn get_min_price(&self, token: Address) -> Result<U256> {
        Ok(self.prices.get(&token).map(|p| p.0).unwrap_or_else(price_unit))
    }

    async fn get_max_price(&self, token: Address) -> Result<U256> {
        Ok(self.prices.get(&token).map(|p| p.1).unwrap_or_else(price_unit))
    }

    async fn get_pool_accounting(&self, token: Address) -> Result<PoolAccounting> {
        Ok(PoolAccounting {
            liquidity_units: self.accounting.get(&token).copied().unwrap_or_default(),
        })
    }

    async fn get_target_liquidity(&self, token: Address) -> Result<U256> {
        Ok(self.targets.get(&token).copied().unwrap_or_default())
    }

    async fn get_total_weights(&self) -> Result<U256> {
        Ok(U256::from(100u64))
    }

    async fn get_pool_share_price(&self, _is_buying: bool) -> Result<U256> {
        Ok(self.share_price)
    }
}

// ---------------------------------------------------------------------------
// Aggregator fake
// ---------------------------------------------------------------------------

pub struct MockAggregator {
    name: &'static str,
    networks: Vec<Network>,
    /// buy_amount = sell_amount * num / den
    rate: (u64, u64),
    with_transaction: bool,
    pub calls: AtomicUsize,
}

impl MockAggregator {
    pub fn serving(name: &'static str, networks: Vec<Network>) -> Self {
        Self {
            name,
            networks,
            rate: (997, 1000),
            with_transaction: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_rate(mut self, num: u64, den: u64) -> Self {
        self.rate = (num, den);
        self
    }

    pub fn without_transaction(mut self) -> Self {
        self.with_transaction = false;
        self
    }
}

pub fn aggregator_to() -> Address {
    Address::repeat_byte(0x88)
}

pub fn aggregator_allowance_target() -> Address {
    Address::repeat_byte(0x77)
}

#[async_trait]
impl AggregatorApi for MockAggregator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn serves(&self, network: Network) -> bool {
        self.networks.contains(&network)
    }

    async fn swap_quote(
        &self,
        _network: Network,
        request: &AggregatorQuoteRequest,
    ) -> Result<AggregatorQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let buy_amount = request.sell_amount * U256::from(self.rate.0) / U256::from(self.rate.1);
        Ok(AggregatorQuote {
            sell_amount: request.sell_amount,
            buy_amount,
            estimated_gas: U256::from(180_000u64),
            allowance_target: Some(aggregator_allowance_target()),
            to: self.with_transaction.then(aggregator_to),
            data: self
                .with_transaction
                .then(|| Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])),
            value: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Static route fake (tie-break and isolation tests)
// ---------------------------------------------------------------------------

pub struct StaticRoute {
    pub route_name: &'static str,
    /// `None` makes the weight check fail.
    pub fixed_weight: Option<u32>,
}

#[async_trait]
impl Route for StaticRoute {
    fn name(&self) -> &'static str {
        self.route_name
    }

    async fn weight(&self, _request: &ConversionRequest) -> Result<u32> {
        self.fixed_weight
            .ok_or_else(|| ConvertError::Configuration("weight check blew up".into()))
    }

    async fn quote(&self, request: &ConversionRequest) -> Result<Quote> {
        let sell = request.require_sell_amount()?;
        Ok(Quote {
            sell_amount: sell,
            buy_amount: sell,
            gas_estimate: U256::zero(),
            allowance_target: None,
            fee_bps: self.fixed_weight.unwrap_or(0),
            fee_charged_before_convert: false,
        })
    }

    async fn transaction(&self, _request: &ConversionRequest) -> Result<TransactionRequest> {
        Ok(TransactionRequest::new())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn arc_config() -> Arc<ProtocolConfig> {
    Arc::new(ProtocolConfig::default_config())
}

/// Pull a token from the configured token list by symbol.
pub fn token_on(config: &ProtocolConfig, network: Network, symbol: &str) -> Token {
    config
        .network(network)
        .unwrap()
        .tokens
        .iter()
        .find(|t| t.symbol == symbol)
        .unwrap_or_else(|| panic!("token {symbol} not configured on {network}"))
        .to_token(network)
}

/// Engine over the default registry with mock aggregators.
pub fn engine(config: Arc<ProtocolConfig>) -> Convert {
    let caches = Arc::new(ConvertCaches::new());
    let zero_ex = Arc::new(MockAggregator::serving("mock_0x", vec![Network::Ethereum]));
    let paraswap = Arc::new(MockAggregator::serving(
        "mock_paraswap",
        vec![Network::Arbitrum, Network::Polygon],
    ));
    Convert::with_routes(
        default_routes(config, Arc::clone(&caches), zero_ex, paraswap),
        caches,
    )
}

/// Arbitrum config with USDC taken out of the pool's asset list (and a 1%
/// mint fee), so USDC can only reach the share token through the peg module.
pub fn config_without_usdc_in_pool() -> Arc<ProtocolConfig> {
    let mut config = ProtocolConfig::default_config();
    let usdc = token_on(&config, Network::Arbitrum, "USDC").address;
    let net = config.networks.get_mut(&Network::Arbitrum).unwrap();
    let pool = net.pool.as_mut().unwrap();
    pool.assets.retain(|a| *a != usdc);
    pool.mint_fee_bps = 100;
    Arc::new(config)
}

pub fn request(
    config: &ProtocolConfig,
    network: Network,
    from: &str,
    to: &str,
    chain: Arc<MockChain>,
) -> ConversionRequest {
    ConversionRequest::new(
        token_on(config, network, from),
        token_on(config, network, to),
        network,
        chain,
    )
}
