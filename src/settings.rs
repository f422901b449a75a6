//! Protocol configuration: per-network token lists, contract addresses and
//! aggregator endpoints.
//!
//! Configuration can be loaded from a TOML file or taken from the built-in
//! defaults for the supported networks. All lookups the routes perform
//! (wrapped-native resolution, pool membership, contract addresses) go
//! through this module.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, File};
use ethers::types::Address;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{ConvertError, Result};
use crate::types::{Network, Token};

fn default_mint_fee_bps() -> u32 {
    20
}
fn default_swap_fee_bps() -> u32 {
    25
}
fn default_tax_bps() -> u32 {
    50
}

/// One token entry in a network's static token list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub is_wrapped_native: bool,
    #[serde(default)]
    pub is_pool_share: bool,
    #[serde(default)]
    pub base_symbol: Option<String>,
}

impl TokenConfig {
    pub fn to_token(&self, network: Network) -> Token {
        Token {
            address: self.address,
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            chain_id: network.chain_id(),
            is_native: self.is_native,
            is_wrapped_native: self.is_wrapped_native,
            is_pool_share: self.is_pool_share,
            base_symbol: self.base_symbol.clone(),
        }
    }
}

/// Internal liquidity pool deployment and its fee parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// The pool contract itself (mint/redeem/swap entry points).
    pub pool: Address,
    /// The pool-share token minted against deposits.
    pub share_token: Address,
    /// Base fee for mint/redeem, before the fee curve adjustment.
    #[serde(default = "default_mint_fee_bps")]
    pub mint_fee_bps: u32,
    /// Base fee for internal swaps, before the fee curve adjustment.
    #[serde(default = "default_swap_fee_bps")]
    pub swap_fee_bps: u32,
    /// Fee-curve tax parameter shared by every pool-backed route.
    #[serde(default = "default_tax_bps")]
    pub tax_bps: u32,
    /// Pool-eligible assets, by (wrapped) ERC-20 address.
    #[serde(default)]
    pub assets: Vec<Address>,
}

impl PoolConfig {
    pub fn has_asset(&self, address: Address) -> bool {
        self.assets.contains(&address)
    }
}

/// External aggregator endpoint for one network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub base_url: String,
    #[serde(default)]
    pub fee_recipient: Option<Address>,
}

/// Everything the engine knows about one network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    /// Peg-stability module, if deployed on this network.
    #[serde(default)]
    pub psm: Option<Address>,
    #[serde(default)]
    pub pool: Option<PoolConfig>,
    /// Specialized multi-hop router used by the compound routes.
    #[serde(default)]
    pub convert_router: Option<Address>,
    /// External curve-style pool factory used for path discovery.
    #[serde(default)]
    pub curve_factory: Option<Address>,
    #[serde(default)]
    pub aggregator: Option<AggregatorConfig>,
}

impl NetworkConfig {
    pub fn token_by_address(&self, address: Address) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| t.address == address)
    }

    /// The wrapped form of the native asset named `base_symbol`.
    pub fn wrapped_native(&self, base_symbol: &str) -> Option<&TokenConfig> {
        self.tokens
            .iter()
            .find(|t| t.is_wrapped_native && t.base_symbol.as_deref() == Some(base_symbol))
    }

    pub fn require_psm(&self, network: Network) -> Result<Address> {
        self.psm.ok_or_else(|| {
            ConvertError::Configuration(format!("no peg-stability module on {network}"))
        })
    }

    pub fn require_pool(&self, network: Network) -> Result<&PoolConfig> {
        self.pool
            .as_ref()
            .ok_or_else(|| ConvertError::Configuration(format!("no liquidity pool on {network}")))
    }
}

/// Full protocol configuration, keyed by network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub networks: HashMap<Network, NetworkConfig>,
}

impl ProtocolConfig {
    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| ConvertError::Configuration(format!("config load failed: {e}")))?;
        settings
            .try_deserialize()
            .map_err(|e| ConvertError::Configuration(format!("config parse failed: {e}")))
    }

    pub fn network(&self, network: Network) -> Result<&NetworkConfig> {
        self.networks
            .get(&network)
            .ok_or_else(|| ConvertError::Configuration(format!("network {network} not configured")))
    }

    /// Built-in configuration for the supported networks. Protocol contracts
    /// live on Arbitrum; the other networks carry token lists and aggregator
    /// endpoints only.
    pub fn default_config() -> Self {
        let mut networks = HashMap::new();

        networks.insert(
            Network::Ethereum,
            NetworkConfig {
                tokens: vec![
                    native("ETH", 18),
                    wrapped("WETH", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, "ETH"),
                    erc20("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6),
                    erc20("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6),
                    erc20("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18),
                    erc20("EURS", "0xdB25f211AB05b1c97D595516F45794528a807ad8", 2),
                ],
                aggregator: Some(AggregatorConfig {
                    base_url: "https://api.0x.org".to_string(),
                    fee_recipient: None,
                }),
                ..Default::default()
            },
        );

        let arb_weth = "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1";
        let arb_usdc = "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8";
        let arb_xusd = "0x8616E8EA83f048aB9A5eC513c9412Dd2993bcE3F";
        let arb_xeur = "0x116172B2482c5dC3E6f445C16Ac13367aC3FCd35";
        let arb_xlp = "0xB666b08609b2E69A8ba51AA720770053AeC0d2d3";
        networks.insert(
            Network::Arbitrum,
            NetworkConfig {
                tokens: vec![
                    native("ETH", 18),
                    wrapped("WETH", arb_weth, 18, "ETH"),
                    erc20("USDC", arb_usdc, 6),
                    erc20("xUSD", arb_xusd, 18),
                    erc20("xEUR", arb_xeur, 18),
                    share("xLP", arb_xlp, 18),
                ],
                psm: Some(addr("psm", "0x02a745ECB2AfF7BD86F69246bE0a60a0b25e08A5")),
                pool: Some(PoolConfig {
                    pool: addr("pool", "0x489ee077994B6658eAfA855C308275EAd8097C4A"),
                    share_token: addr("share_token", arb_xlp),
                    mint_fee_bps: default_mint_fee_bps(),
                    swap_fee_bps: default_swap_fee_bps(),
                    tax_bps: default_tax_bps(),
                    assets: vec![
                        addr("weth", arb_weth),
                        addr("usdc", arb_usdc),
                        addr("xusd", arb_xusd),
                        addr("xeur", arb_xeur),
                    ],
                }),
                convert_router: Some(addr(
                    "convert_router",
                    "0x0F8c6957F7fa9E9AFA33dca23f5Cc53e26ACdeaA",
                )),
                curve_factory: Some(addr(
                    "curve_factory",
                    "0xb17b674D9c5CB2e441F8e196a2f048A81355d031",
                )),
                aggregator: Some(AggregatorConfig {
                    base_url: "https://apiv5.paraswap.io".to_string(),
                    fee_recipient: None,
                }),
                ..Default::default()
            },
        );

        networks.insert(
            Network::Polygon,
            NetworkConfig {
                tokens: vec![
                    native("MATIC", 18),
                    wrapped("WMATIC", "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", 18, "MATIC"),
                    erc20("USDC", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174", 6),
                ],
                aggregator: Some(AggregatorConfig {
                    base_url: "https://apiv5.paraswap.io".to_string(),
                    fee_recipient: None,
                }),
                ..Default::default()
            },
        );

        Self { networks }
    }
}

/// Parse a known-good address constant, logging instead of panicking on a
/// typo (unwrap is prohibited outside tests).
fn addr(label: &'static str, s: &str) -> Address {
    match s.parse::<Address>() {
        Ok(a) => a,
        Err(e) => {
            warn!("invalid address constant ({label}={s}): {e:?}");
            Address::zero()
        }
    }
}

fn native(symbol: &str, decimals: u8) -> TokenConfig {
    TokenConfig {
        address: Address::zero(),
        symbol: symbol.to_string(),
        decimals,
        is_native: true,
        is_wrapped_native: false,
        is_pool_share: false,
        base_symbol: None,
    }
}

fn wrapped(symbol: &str, address: &str, decimals: u8, base: &str) -> TokenConfig {
    TokenConfig {
        address: addr("wrapped", address),
        symbol: symbol.to_string(),
        decimals,
        is_native: false,
        is_wrapped_native: true,
        is_pool_share: false,
        base_symbol: Some(base.to_string()),
    }
}

fn erc20(symbol: &str, address: &str, decimals: u8) -> TokenConfig {
    TokenConfig {
        address: addr("erc20", address),
        symbol: symbol.to_string(),
        decimals,
        is_native: false,
        is_wrapped_native: false,
        is_pool_share: false,
        base_symbol: None,
    }
}

fn share(symbol: &str, address: &str, decimals: u8) -> TokenConfig {
    TokenConfig {
        address: addr("share", address),
        symbol: symbol.to_string(),
        decimals,
        is_native: false,
        is_wrapped_native: false,
        is_pool_share: true,
        base_symbol: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_wrapped_native_per_network() {
        let config = ProtocolConfig::default_config();
        for (network, base) in [
            (Network::Ethereum, "ETH"),
            (Network::Arbitrum, "ETH"),
            (Network::Polygon, "MATIC"),
        ] {
            let net = config.network(network).unwrap();
            let wrapped = net.wrapped_native(base);
            assert!(wrapped.is_some(), "no wrapped native for {network}");
            assert_ne!(wrapped.unwrap().address, Address::zero());
        }
    }

    #[test]
    fn arbitrum_pool_assets_are_listed_tokens() {
        let config = ProtocolConfig::default_config();
        let net = config.network(Network::Arbitrum).unwrap();
        let pool = net.pool.as_ref().unwrap();
        for asset in &pool.assets {
            assert!(
                net.token_by_address(*asset).is_some(),
                "pool asset {asset:?} missing from token list"
            );
        }
    }

    #[test]
    fn unknown_network_is_a_configuration_error() {
        let config = ProtocolConfig {
            networks: HashMap::new(),
        };
        let err = config.network(Network::Ethereum).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }
}
