//! Memoized on-chain lookups.
//!
//! Three independent, unbounded tables: peg relationships, the peg module's
//! fee parameter (converted to basis points), and discovered curve paths.
//! Population is lazy and single-flight is not guaranteed: concurrent first
//! callers may each issue the underlying call and the last write wins, which
//! is acceptable because the underlying values are stable for the process
//! lifetime. Entries are never invalidated; callers must tolerate staleness
//! if an on-chain parameter changes mid-process.
//!
//! The caches are plain objects handed to the engine's constructor rather
//! than module-level singletons, so tests can reset state deterministically.

use dashmap::DashMap;
use ethers::types::{Address, U256};
use log::debug;

use crate::chain::ChainReader;
use crate::errors::Result;
use crate::types::{CurvePath, Network, BPS_DIVISOR};

/// Process-wide memoization tables for the conversion engine.
#[derive(Debug, Default)]
pub struct ConvertCaches {
    /// Peg relationships, keyed by direction: `(A, B)` and `(B, A)` are
    /// distinct queries (deposit vs. withdraw).
    pegged: DashMap<(Network, Address, Address), bool>,
    /// Peg module fee, already converted to basis points.
    psm_fee_bps: DashMap<Network, u32>,
    /// Discovered curve paths; `None` is cached too, so a missing path is
    /// only looked up once per process.
    curve_paths: DashMap<(Network, Address, Address), Option<CurvePath>>,
}

impl ConvertCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized `isPegged(pegged_token, synth_token)`.
    pub async fn pegged(
        &self,
        chain: &dyn ChainReader,
        network: Network,
        psm: Address,
        pegged_token: Address,
        synth_token: Address,
    ) -> Result<bool> {
        let key = (network, pegged_token, synth_token);
        if let Some(hit) = self.pegged.get(&key) {
            return Ok(*hit);
        }
        let value = chain
            .is_pegged(network, psm, pegged_token, synth_token)
            .await?;
        self.pegged.insert(key, value);
        Ok(value)
    }

    /// Memoized peg-module fee, converted from a 1e18 fraction to basis
    /// points.
    pub async fn psm_fee_bps(
        &self,
        chain: &dyn ChainReader,
        network: Network,
        psm: Address,
    ) -> Result<u32> {
        if let Some(hit) = self.psm_fee_bps.get(&network) {
            return Ok(*hit);
        }
        let raw = chain.psm_transaction_fee(network, psm).await?;
        let scaled = raw.saturating_mul(U256::from(BPS_DIVISOR)) / U256::exp10(18);
        let bps = if scaled > U256::from(u32::MAX) {
            u32::MAX
        } else {
            scaled.as_u32()
        };
        debug!("psm fee on {network}: {raw} raw -> {bps} bps");
        self.psm_fee_bps.insert(network, bps);
        Ok(bps)
    }

    /// Memoized curve path discovery. Absence is cached as `None`.
    pub async fn curve_path(
        &self,
        chain: &dyn ChainReader,
        network: Network,
        factory: Address,
        from: Address,
        to: Address,
    ) -> Result<Option<CurvePath>> {
        let key = (network, from, to);
        if let Some(hit) = self.curve_paths.get(&key) {
            return Ok(*hit);
        }
        let value = chain.find_curve_path(network, factory, from, to).await?;
        if value.is_none() {
            debug!("no curve path for {from:?} -> {to:?} on {network}");
        }
        self.curve_paths.insert(key, value);
        Ok(value)
    }

    /// Drop all cached entries. Intended for tests and long-lived processes
    /// that want to pick up on-chain parameter changes.
    pub fn clear(&self) {
        self.pegged.clear();
        self.psm_fee_bps.clear();
        self.curve_paths.clear();
    }
}
