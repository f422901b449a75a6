//! Error taxonomy for the conversion engine.
//!
//! The engine performs no automatic retries; every variant here is surfaced
//! to the caller as-is. `Configuration` failures are fatal (something is
//! missing from the network setup), `RouteUnavailable` signals a
//! weight/quote inconsistency the caller may retry, `NoRouteFound` is
//! terminal and user-visible.

use thiserror::Error;

/// All errors produced by the conversion core.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Missing or invalid network/contract configuration. Fatal, not retried.
    #[error("missing configuration: {0}")]
    Configuration(String),

    /// A precondition of the selected route turned out false after selection
    /// (the `weight` check could not fully verify it). Callers may retry.
    #[error("route {route} unavailable: {reason}")]
    RouteUnavailable {
        route: &'static str,
        reason: String,
    },

    /// No registered strategy is applicable to the requested token pair.
    #[error("no conversion route found for {from} -> {to}")]
    NoRouteFound { from: String, to: String },

    /// An aggregator HTTP call failed or returned malformed data.
    #[error("aggregator API error: {0}")]
    ExternalApi(String),

    /// RPC failure or contract revert, propagated unchanged.
    #[error("on-chain call failed: {0:#}")]
    OnChain(#[from] anyhow::Error),
}

impl ConvertError {
    /// Shorthand used by routes when a post-selection precondition fails.
    pub fn unavailable(route: &'static str, reason: impl Into<String>) -> Self {
        Self::RouteUnavailable {
            route,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
