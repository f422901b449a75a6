//! # Synth Convert SDK
//!
//! Client SDK for a cross-chain synthetic-asset protocol. It wraps the
//! protocol's contract calls, aggregates swap liquidity sources and performs
//! the conversion math behind user-visible quotes.
//!
//! ## Overview
//!
//! The heart of the SDK is the conversion routing engine: given a
//! `(fromToken, toToken, network)` pair it picks, among several mutually
//! exclusive execution strategies, the one that is both feasible and
//! economically best, produces a price quote under that strategy's fee
//! model, and produces an executable transaction consistent with the quote.
//!
//! ## Architecture
//!
//! ### Routes
//! Each strategy is a [`routes::Route`]: a stateless object scoring its own
//! applicability (`weight`), pricing a request (`quote`) and building an
//! unsigned transaction (`transaction`). Strategies include the on-chain
//! peg-stability module, the internal liquidity pool (mint/redeem and
//! internal swaps), two external HTTP aggregators, wrapped-native
//! wrap/unwrap, and two atomic multi-hop compounds.
//!
//! ### Engine
//! [`Convert`] fans out weight checks concurrently, picks the maximum
//! weight (first-registered wins ties) and delegates to the winner.
//!
//! ### Injected collaborators
//! On-chain reads go through [`chain::ChainReader`]; pool valuation comes
//! from the [`pool_methods::PoolMethods`] oracle; memoized lookups live in
//! an explicit [`cache::ConvertCaches`] object handed to the engine, so
//! tests get deterministic cache resets.

// Core types
/// Shared value types (tokens, networks, quotes, requests)
pub mod types;
/// Error taxonomy
pub mod errors;

// Configuration
/// Per-network protocol configuration
pub mod settings;

// Conversion core
/// Memoized on-chain lookups
pub mod cache;
/// Route selection engine
pub mod convert;
/// Dynamic basis-point fee curve
pub mod fee_curve;
/// Decimal rescaling and native-token normalization
pub mod normalization;
/// Execution strategies
pub mod routes;

// External collaborators
/// Aggregator HTTP APIs
pub mod aggregators;
/// Read-only on-chain surface
pub mod chain;
/// Pool valuation oracle interface
pub mod pool_methods;

// Contracts (public ABIs only)
/// Smart contract interfaces
pub mod contracts;

// Re-exports for convenience
pub use cache::ConvertCaches;
pub use chain::{ChainReader, RpcChainReader};
pub use convert::Convert;
pub use errors::{ConvertError, Result};
pub use pool_methods::PoolMethods;
pub use routes::Route;
pub use settings::ProtocolConfig;
pub use types::{ConversionRequest, Network, Quote, Token};

/// Initialize the `env_logger` backend for binaries and examples embedding
/// the SDK. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
