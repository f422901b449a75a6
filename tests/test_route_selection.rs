//! Route selection behavior: weight ordering, tie-breaking and failure
//! isolation in the conversion engine.

mod common;

use std::sync::Arc;

use ethers::types::U256;

use synth_convert_sdk::cache::ConvertCaches;
use synth_convert_sdk::convert::Convert;
use synth_convert_sdk::errors::ConvertError;
use synth_convert_sdk::routes::Route;
use synth_convert_sdk::types::Network;

use common::{arc_config, engine, request, token_on, MockChain, StaticRoute};

#[tokio::test]
async fn native_wrap_is_exactly_one_to_one() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let chain = Arc::new(MockChain::new());

    // Even a single wei wraps without loss.
    let req = request(&config, Network::Ethereum, "ETH", "WETH", chain)
        .with_sell_amount(U256::one());
    let quote = convert.get_quote(&req).await.unwrap();

    assert_eq!(quote.buy_amount, U256::one());
    assert_eq!(quote.fee_bps, 0);
    assert!(quote.allowance_target.is_none());
}

#[tokio::test]
async fn wrap_outweighs_the_aggregator() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let chain = Arc::new(MockChain::new());

    // Both the wrap route and the aggregator serve ETH -> WETH on mainnet;
    // the lossless one must win.
    let req = request(&config, Network::Ethereum, "ETH", "WETH", chain)
        .with_sell_amount(U256::exp10(18));
    let route = convert.select_route(&req).await.unwrap();
    assert_eq!(route.name(), "wrapped_native_route");
}

#[tokio::test]
async fn peg_module_outweighs_pool_swap_and_aggregator() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let usdc = token_on(&config, Network::Arbitrum, "USDC");
    let xusd = token_on(&config, Network::Arbitrum, "xUSD");
    let chain = Arc::new(MockChain::new().with_peg(usdc.address, xusd.address));

    // USDC and xUSD are both pool assets, and the aggregator serves
    // Arbitrum, so three routes apply. The peg module carries the highest
    // weight.
    let req = request(&config, Network::Arbitrum, "USDC", "xUSD", chain)
        .with_sell_amount(U256::from(1_000_000u64));
    let route = convert.select_route(&req).await.unwrap();
    assert_eq!(route.name(), "psm_route");
}

#[tokio::test]
async fn identical_pair_finds_no_route() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let chain = Arc::new(MockChain::new());

    let req = request(&config, Network::Ethereum, "USDC", "USDC", chain)
        .with_sell_amount(U256::from(1u64));
    let err = convert.get_quote(&req).await.unwrap_err();

    assert!(matches!(err, ConvertError::NoRouteFound { .. }));
    let message = err.to_string();
    assert!(message.contains("USDC"), "error names the pair: {message}");
}

#[tokio::test]
async fn token_on_another_network_finds_no_route() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let chain = Arc::new(MockChain::new());

    let req = synth_convert_sdk::types::ConversionRequest::new(
        token_on(&config, Network::Ethereum, "USDC"),
        token_on(&config, Network::Arbitrum, "xUSD"),
        Network::Arbitrum,
        chain,
    )
    .with_sell_amount(U256::from(1u64));

    let Err(err) = convert.select_route(&req).await else {
        panic!("expected no applicable route");
    };
    assert!(matches!(err, ConvertError::NoRouteFound { .. }));
}

#[tokio::test]
async fn ties_resolve_to_the_first_registered_route() {
    let routes: Vec<Arc<dyn Route>> = vec![
        Arc::new(StaticRoute {
            route_name: "alpha",
            fixed_weight: Some(10),
        }),
        Arc::new(StaticRoute {
            route_name: "beta",
            fixed_weight: Some(10),
        }),
    ];
    let convert = Convert::with_routes(routes, Arc::new(ConvertCaches::new()));

    let config = arc_config();
    let chain = Arc::new(MockChain::new());
    let req = request(&config, Network::Arbitrum, "USDC", "xUSD", chain)
        .with_sell_amount(U256::one());

    let route = convert.select_route(&req).await.unwrap();
    assert_eq!(route.name(), "alpha");
}

#[tokio::test]
async fn failing_weight_check_does_not_poison_selection() {
    let routes: Vec<Arc<dyn Route>> = vec![
        Arc::new(StaticRoute {
            route_name: "broken",
            fixed_weight: None,
        }),
        Arc::new(StaticRoute {
            route_name: "healthy",
            fixed_weight: Some(5),
        }),
    ];
    let convert = Convert::with_routes(routes, Arc::new(ConvertCaches::new()));

    let config = arc_config();
    let chain = Arc::new(MockChain::new());
    let req = request(&config, Network::Arbitrum, "USDC", "xUSD", chain)
        .with_sell_amount(U256::one());

    // The erroring route is scored zero and skipped, not propagated.
    let route = convert.select_route(&req).await.unwrap();
    assert_eq!(route.name(), "healthy");
}

#[tokio::test]
async fn all_routes_failing_is_no_route_found() {
    let routes: Vec<Arc<dyn Route>> = vec![
        Arc::new(StaticRoute {
            route_name: "broken_a",
            fixed_weight: None,
        }),
        Arc::new(StaticRoute {
            route_name: "broken_b",
            fixed_weight: None,
        }),
    ];
    let convert = Convert::with_routes(routes, Arc::new(ConvertCaches::new()));

    let config = arc_config();
    let chain = Arc::new(MockChain::new());
    let req = request(&config, Network::Arbitrum, "USDC", "xUSD", chain)
        .with_sell_amount(U256::one());

    let Err(err) = convert.select_route(&req).await else {
        panic!("expected no applicable route");
    };
    assert!(matches!(err, ConvertError::NoRouteFound { .. }));
}

#[tokio::test]
async fn pinning_an_unknown_route_is_a_configuration_error() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let chain = Arc::new(MockChain::new());

    let req = request(&config, Network::Ethereum, "ETH", "WETH", chain)
        .with_sell_amount(U256::one());
    let err = convert.quote_via("no_such_route", &req).await.unwrap_err();
    assert!(matches!(err, ConvertError::Configuration(_)));
}

#[tokio::test]
async fn route_pinning_bypasses_weight_ordering() {
    let config = arc_config();
    let convert = engine(Arc::clone(&config));
    let usdc = token_on(&config, Network::Arbitrum, "USDC");
    let xusd = token_on(&config, Network::Arbitrum, "xUSD");
    let chain = Arc::new(MockChain::new().with_peg(usdc.address, xusd.address));

    // Selection would pick the peg module; pinning forces the aggregator.
    let req = request(&config, Network::Arbitrum, "USDC", "xUSD", chain)
        .with_sell_amount(U256::from(1_000_000u64));
    let quote = convert.quote_via("paraswap_route", &req).await.unwrap();
    assert_eq!(
        quote.allowance_target,
        Some(common::aggregator_allowance_target())
    );
}
