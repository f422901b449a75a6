//! Read-only on-chain surface consumed by the routes.
//!
//! The engine issues calls through this trait but never manages nonces, gas
//! pricing or broadcast. `RpcChainReader` is the ethers-backed production
//! implementation; tests substitute their own.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, U256};

use crate::contracts::{ICurveFactory, ICurvePool, IPegStability};
use crate::errors::Result;
use crate::types::{CurvePath, Network};

/// Read-only contract views the routes depend on.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Whether `pegged_token` is registered as collateral for `synth_token`
    /// in the network's peg-stability module. Direction is meaningful:
    /// `(A, B)` answers "can A be deposited to mint B".
    async fn is_pegged(
        &self,
        network: Network,
        psm: Address,
        pegged_token: Address,
        synth_token: Address,
    ) -> Result<bool>;

    /// The peg-stability module's fixed fee parameter, as a 1e18 fixed-point
    /// fraction of the converted amount.
    async fn psm_transaction_fee(&self, network: Network, psm: Address) -> Result<U256>;

    /// Ask the external pool factory for a pool trading `from` against `to`.
    /// `None` means no such pool exists.
    async fn find_curve_path(
        &self,
        network: Network,
        factory: Address,
        from: Address,
        to: Address,
    ) -> Result<Option<CurvePath>>;

    /// Expected output of swapping `amount_in` along a previously discovered
    /// path. The pool's own fee is already reflected in the result.
    async fn curve_get_dy(
        &self,
        network: Network,
        path: &CurvePath,
        amount_in: U256,
    ) -> Result<U256>;
}

/// `ChainReader` backed by an ethers HTTP provider.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: Arc<Provider<Http>>,
}

impl RpcChainReader {
    pub fn new(provider: Arc<Provider<Http>>) -> Self {
        Self { provider }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let provider =
            Provider::<Http>::try_from(url).with_context(|| format!("invalid RPC url: {url}"))?;
        Ok(Self::new(Arc::new(provider)))
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let id = self
            .provider
            .get_chainid()
            .await
            .context("eth_chainId failed")?;
        Ok(id.as_u64())
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn is_pegged(
        &self,
        network: Network,
        psm: Address,
        pegged_token: Address,
        synth_token: Address,
    ) -> Result<bool> {
        let module = IPegStability::new(psm, Arc::clone(&self.provider));
        let pegged = module
            .is_pegged(pegged_token, synth_token)
            .call()
            .await
            .with_context(|| format!("isPegged call failed on {network}"))?;
        Ok(pegged)
    }

    async fn psm_transaction_fee(&self, network: Network, psm: Address) -> Result<U256> {
        let module = IPegStability::new(psm, Arc::clone(&self.provider));
        let fee = module
            .transaction_fee()
            .call()
            .await
            .with_context(|| format!("transactionFee call failed on {network}"))?;
        Ok(fee)
    }

    async fn find_curve_path(
        &self,
        network: Network,
        factory: Address,
        from: Address,
        to: Address,
    ) -> Result<Option<CurvePath>> {
        let registry = ICurveFactory::new(factory, Arc::clone(&self.provider));
        let pool = registry
            .find_pool_for_coins(from, to)
            .call()
            .await
            .with_context(|| format!("find_pool_for_coins failed on {network}"))?;
        if pool == Address::zero() {
            return Ok(None);
        }
        let (from_index, to_index) = registry
            .get_coin_indices(pool, from, to)
            .call()
            .await
            .with_context(|| format!("get_coin_indices failed on {network}"))?;
        Ok(Some(CurvePath {
            pool,
            from_index,
            to_index,
        }))
    }

    async fn curve_get_dy(
        &self,
        network: Network,
        path: &CurvePath,
        amount_in: U256,
    ) -> Result<U256> {
        let pool = ICurvePool::new(path.pool, Arc::clone(&self.provider));
        let dy = pool
            .get_dy(path.from_index, path.to_index, amount_in)
            .call()
            .await
            .with_context(|| format!("get_dy failed on {network}"))?;
        Ok(dy)
    }
}
