//! Conversion engine: evaluates every registered route's weight
//! concurrently, picks the winner and delegates quoting/transaction
//! building to it.

use std::sync::Arc;

use ethers::types::TransactionRequest;
use futures_util::future::join_all;
use log::{debug, info, warn};

use crate::aggregators::{ParaswapApi, ZeroExApi};
use crate::cache::ConvertCaches;
use crate::errors::{ConvertError, Result};
use crate::normalization::human_amount;
use crate::routes::{default_routes, Route};
use crate::settings::ProtocolConfig;
use crate::types::{ConversionRequest, Network, Quote};

const ZERO_EX_DEFAULT_URL: &str = "https://api.0x.org";
const PARASWAP_DEFAULT_URL: &str = "https://apiv5.paraswap.io";

/// The swap/conversion routing engine.
pub struct Convert {
    routes: Vec<Arc<dyn Route>>,
    caches: Arc<ConvertCaches>,
}

impl Convert {
    /// Build the engine with the default route registry and HTTP aggregator
    /// clients. Aggregator endpoints come from the per-network
    /// configuration, falling back to the public ones.
    pub fn new(config: Arc<ProtocolConfig>, caches: Arc<ConvertCaches>) -> Result<Self> {
        let zero_ex_url = aggregator_url(&config, Network::Ethereum, ZERO_EX_DEFAULT_URL);
        let paraswap_url = aggregator_url(&config, Network::Arbitrum, PARASWAP_DEFAULT_URL);
        let zero_ex = Arc::new(ZeroExApi::new(&zero_ex_url)?);
        let paraswap = Arc::new(ParaswapApi::new(&paraswap_url)?);
        let routes = default_routes(config, Arc::clone(&caches), zero_ex, paraswap);
        Ok(Self { routes, caches })
    }

    /// Build the engine over an explicit route list. Intended for tests and
    /// embedders that inject their own strategies.
    pub fn with_routes(routes: Vec<Arc<dyn Route>>, caches: Arc<ConvertCaches>) -> Self {
        Self { routes, caches }
    }

    pub fn caches(&self) -> &Arc<ConvertCaches> {
        &self.caches
    }

    /// Look up a registered route by name, for callers that pin a route
    /// after receiving a quote instead of re-resolving by weight.
    pub fn route_by_name(&self, name: &str) -> Option<Arc<dyn Route>> {
        self.routes.iter().find(|r| r.name() == name).cloned()
    }

    /// Concurrently score every route and return the winner. A failing
    /// weight check is downgraded to 0 and logged; it never fails the
    /// request. Ties resolve to the first-registered route.
    pub async fn select_route(&self, request: &ConversionRequest) -> Result<Arc<dyn Route>> {
        let checks = self.routes.iter().map(|route| route.weight(request));
        let results = join_all(checks).await;

        let mut best: Option<(&Arc<dyn Route>, u32)> = None;
        for (route, result) in self.routes.iter().zip(results) {
            let weight = match result {
                Ok(w) => w,
                Err(e) => {
                    warn!("weight check failed for {}: {e}", route.name());
                    0
                }
            };
            debug!("route {} weight {weight}", route.name());
            // Strictly greater: first-registered wins on ties.
            if weight > best.map(|(_, w)| w).unwrap_or(0) {
                best = Some((route, weight));
            }
        }

        match best {
            Some((route, weight)) => {
                if let Some(sell) = request.sell_amount {
                    info!(
                        "selected {} (weight {weight}) for {} {} -> {} on {}",
                        route.name(),
                        human_amount(sell, request.from_token.decimals),
                        request.from_token.symbol,
                        request.to_token.symbol,
                        request.network,
                    );
                }
                Ok(Arc::clone(route))
            }
            None => Err(ConvertError::NoRouteFound {
                from: request.from_token.symbol.clone(),
                to: request.to_token.symbol.clone(),
            }),
        }
    }

    /// Quote under the winning route's fee model.
    pub async fn get_quote(&self, request: &ConversionRequest) -> Result<Quote> {
        self.select_route(request).await?.quote(request).await
    }

    /// Executable unsigned transaction under the winning route. Route
    /// selection runs again here, independently of any prior `get_quote`;
    /// callers needing quote/swap consistency should pin the route via
    /// `swap_via` or keep inputs stable across both calls.
    pub async fn get_swap(&self, request: &ConversionRequest) -> Result<TransactionRequest> {
        self.select_route(request).await?.transaction(request).await
    }

    /// Quote through an explicitly named route, bypassing selection.
    pub async fn quote_via(&self, name: &str, request: &ConversionRequest) -> Result<Quote> {
        self.named(name)?.quote(request).await
    }

    /// Transaction through an explicitly named route, bypassing selection.
    pub async fn swap_via(
        &self,
        name: &str,
        request: &ConversionRequest,
    ) -> Result<TransactionRequest> {
        self.named(name)?.transaction(request).await
    }

    fn named(&self, name: &str) -> Result<Arc<dyn Route>> {
        self.route_by_name(name)
            .ok_or_else(|| ConvertError::Configuration(format!("unknown route: {name}")))
    }
}

fn aggregator_url(config: &ProtocolConfig, network: Network, fallback: &str) -> String {
    config
        .network(network)
        .ok()
        .and_then(|net| net.aggregator.as_ref())
        .map(|agg| agg.base_url.clone())
        .unwrap_or_else(|| fallback.to_string())
}
