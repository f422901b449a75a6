//! External swap aggregator APIs.
//!
//! Two HTTP aggregators partition the supported networks: the 0x swap API
//! serves Ethereum mainnet, Paraswap serves the remaining chains. The remote
//! API is the source of truth for amounts; the fee the SDK attaches is
//! informational and comes from a stablecoin-classification table.

use std::collections::HashMap;

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use log::debug;
use once_cell::sync::Lazy;
use serde::Deserialize;
use url::Url;

use crate::errors::{ConvertError, Result};
use crate::types::{Network, Token};

/// Stablecoin classification of a token pair, used only to pick the
/// informational fee percentage attached to aggregator quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StablePairClass {
    /// Both sides are stablecoins of the same currency (USDC -> USDT).
    SameCurrencyStable,
    /// Both sides are stablecoins of different currencies (USDC -> EURS).
    CrossCurrencyStable,
    /// At least one side is not a recognized stablecoin.
    NonStable,
}

/// Known stablecoin symbols and the fiat currency they track.
static STABLE_CURRENCIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USDC", "USD"),
        ("USDT", "USD"),
        ("DAI", "USD"),
        ("LUSD", "USD"),
        ("xUSD", "USD"),
        ("EURS", "EUR"),
        ("AGEUR", "EUR"),
        ("xEUR", "EUR"),
    ])
});

pub fn classify_pair(from: &Token, to: &Token) -> StablePairClass {
    let from_currency = STABLE_CURRENCIES.get(from.symbol.as_str());
    let to_currency = STABLE_CURRENCIES.get(to.symbol.as_str());
    match (from_currency, to_currency) {
        (Some(a), Some(b)) if a == b => StablePairClass::SameCurrencyStable,
        (Some(_), Some(_)) => StablePairClass::CrossCurrencyStable,
        _ => StablePairClass::NonStable,
    }
}

/// Informational fee attached to aggregator quotes, by pair class.
pub fn aggregator_fee_bps(class: StablePairClass) -> u32 {
    match class {
        StablePairClass::SameCurrencyStable => 4,
        StablePairClass::CrossCurrencyStable => 10,
        StablePairClass::NonStable => 30,
    }
}

/// Request shape shared by both aggregator clients.
#[derive(Debug, Clone)]
pub struct AggregatorQuoteRequest {
    pub sell_token: Address,
    pub buy_token: Address,
    pub sell_token_decimals: u8,
    pub buy_token_decimals: u8,
    pub sell_amount: U256,
    pub taker: Option<Address>,
    pub slippage_bps: Option<u32>,
    pub fee_bps: u32,
    pub fee_recipient: Option<Address>,
}

/// Normalized aggregator response. Only the fields the core requires are
/// parsed; the rest of the remote schema is ignored.
#[derive(Debug, Clone)]
pub struct AggregatorQuote {
    pub sell_amount: U256,
    pub buy_amount: U256,
    pub estimated_gas: U256,
    pub allowance_target: Option<Address>,
    pub to: Option<Address>,
    pub data: Option<Bytes>,
    pub value: Option<U256>,
}

/// One external aggregator HTTP API.
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this aggregator serves the given network.
    fn serves(&self, network: Network) -> bool;

    async fn swap_quote(
        &self,
        network: Network,
        request: &AggregatorQuoteRequest,
    ) -> Result<AggregatorQuote>;
}

fn parse_dec(field: &'static str, value: &str) -> Result<U256> {
    U256::from_dec_str(value)
        .map_err(|e| ConvertError::ExternalApi(format!("bad {field} in response: {e}")))
}

fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| ConvertError::ExternalApi(format!("bad {field} in response: {e}")))
}

fn parse_calldata(value: &str) -> Result<Bytes> {
    let raw = hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| ConvertError::ExternalApi(format!("bad calldata in response: {e}")))?;
    Ok(Bytes::from(raw))
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    name: &'static str,
    url: Url,
) -> Result<T> {
    debug!("{name} GET {url}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ConvertError::ExternalApi(format!("{name} request failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ConvertError::ExternalApi(format!(
            "{name} returned {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ConvertError::ExternalApi(format!("{name} returned malformed data: {e}")))
}

// ---------------------------------------------------------------------------
// 0x swap API (Ethereum mainnet)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeroExQuoteDto {
    sell_amount: String,
    buy_amount: String,
    #[serde(default)]
    estimated_gas: Option<String>,
    #[serde(default)]
    allowance_target: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

pub struct ZeroExApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ZeroExApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConvertError::Configuration(format!("bad 0x base url: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }
}

#[async_trait]
impl AggregatorApi for ZeroExApi {
    fn name(&self) -> &'static str {
        "0x"
    }

    fn serves(&self, network: Network) -> bool {
        network == Network::Ethereum
    }

    async fn swap_quote(
        &self,
        _network: Network,
        request: &AggregatorQuoteRequest,
    ) -> Result<AggregatorQuote> {
        let mut url = self
            .base_url
            .join("/swap/v1/quote")
            .map_err(|e| ConvertError::Configuration(format!("bad 0x endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("sellToken", &format!("{:?}", request.sell_token));
            query.append_pair("buyToken", &format!("{:?}", request.buy_token));
            query.append_pair("sellAmount", &request.sell_amount.to_string());
            if let Some(taker) = request.taker {
                query.append_pair("takerAddress", &format!("{taker:?}"));
            }
            if let Some(slippage) = request.slippage_bps {
                query.append_pair("slippagePercentage", &(f64::from(slippage) / 10_000.0).to_string());
            }
            if let Some(recipient) = request.fee_recipient {
                query.append_pair(
                    "buyTokenPercentageFee",
                    &(f64::from(request.fee_bps) / 10_000.0).to_string(),
                );
                query.append_pair("feeRecipient", &format!("{recipient:?}"));
            }
        }

        let dto: ZeroExQuoteDto = get_json(&self.client, "0x", url).await?;
        Ok(AggregatorQuote {
            sell_amount: parse_dec("sellAmount", &dto.sell_amount)?,
            buy_amount: parse_dec("buyAmount", &dto.buy_amount)?,
            estimated_gas: dto
                .estimated_gas
                .as_deref()
                .map(|gas| parse_dec("estimatedGas", gas))
                .transpose()?
                .unwrap_or_default(),
            allowance_target: dto
                .allowance_target
                .as_deref()
                .map(|target| parse_address("allowanceTarget", target))
                .transpose()?,
            to: dto
                .to
                .as_deref()
                .map(|to| parse_address("to", to))
                .transpose()?,
            data: dto.data.as_deref().map(parse_calldata).transpose()?,
            value: dto
                .value
                .as_deref()
                .map(|value| parse_dec("value", value))
                .transpose()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Paraswap API (all other networks)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParaswapPriceRoute {
    src_amount: String,
    dest_amount: String,
    #[serde(default)]
    gas_cost: Option<String>,
    #[serde(default)]
    token_transfer_proxy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParaswapPricesDto {
    price_route: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParaswapTransactionDto {
    to: String,
    data: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    gas: Option<String>,
}

pub struct ParaswapApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ParaswapApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConvertError::Configuration(format!("bad paraswap base url: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    async fn build_transaction(
        &self,
        network: Network,
        request: &AggregatorQuoteRequest,
        price_route: &serde_json::Value,
        taker: Address,
    ) -> Result<ParaswapTransactionDto> {
        let url = self
            .base_url
            .join(&format!(
                "/transactions/{}?ignoreChecks=true",
                network.chain_id()
            ))
            .map_err(|e| ConvertError::Configuration(format!("bad paraswap endpoint: {e}")))?;
        let slippage = request.slippage_bps.unwrap_or(100);
        let body = serde_json::json!({
            "srcToken": format!("{:?}", request.sell_token),
            "destToken": format!("{:?}", request.buy_token),
            "srcAmount": request.sell_amount.to_string(),
            "slippage": slippage,
            "priceRoute": price_route,
            "userAddress": format!("{taker:?}"),
        });
        debug!("paraswap POST {url}");
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConvertError::ExternalApi(format!("paraswap request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::ExternalApi(format!(
                "paraswap returned {status}: {body}"
            )));
        }
        response
            .json::<ParaswapTransactionDto>()
            .await
            .map_err(|e| ConvertError::ExternalApi(format!("paraswap returned malformed data: {e}")))
    }
}

#[async_trait]
impl AggregatorApi for ParaswapApi {
    fn name(&self) -> &'static str {
        "paraswap"
    }

    fn serves(&self, network: Network) -> bool {
        network != Network::Ethereum
    }

    async fn swap_quote(
        &self,
        network: Network,
        request: &AggregatorQuoteRequest,
    ) -> Result<AggregatorQuote> {
        let mut url = self
            .base_url
            .join("/prices")
            .map_err(|e| ConvertError::Configuration(format!("bad paraswap endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("srcToken", &format!("{:?}", request.sell_token));
            query.append_pair("destToken", &format!("{:?}", request.buy_token));
            query.append_pair("srcDecimals", &request.sell_token_decimals.to_string());
            query.append_pair("destDecimals", &request.buy_token_decimals.to_string());
            query.append_pair("amount", &request.sell_amount.to_string());
            query.append_pair("side", "SELL");
            query.append_pair("network", &network.chain_id().to_string());
        }

        let dto: ParaswapPricesDto = get_json(&self.client, "paraswap", url).await?;
        let route: ParaswapPriceRoute = serde_json::from_value(dto.price_route.clone())
            .map_err(|e| ConvertError::ExternalApi(format!("paraswap returned malformed data: {e}")))?;

        let mut quote = AggregatorQuote {
            sell_amount: parse_dec("srcAmount", &route.src_amount)?,
            buy_amount: parse_dec("destAmount", &route.dest_amount)?,
            estimated_gas: route
                .gas_cost
                .as_deref()
                .map(|gas| parse_dec("gasCost", gas))
                .transpose()?
                .unwrap_or_default(),
            allowance_target: route
                .token_transfer_proxy
                .as_deref()
                .map(|proxy| parse_address("tokenTransferProxy", proxy))
                .transpose()?,
            to: None,
            data: None,
            value: None,
        };

        // The executable transaction is only buildable for a known taker.
        if let Some(taker) = request.taker {
            let tx = self
                .build_transaction(network, request, &dto.price_route, taker)
                .await?;
            quote.to = Some(parse_address("to", &tx.to)?);
            quote.data = Some(parse_calldata(&tx.data)?);
            quote.value = tx
                .value
                .as_deref()
                .map(|value| parse_dec("value", value))
                .transpose()?;
            if let Some(gas) = tx.gas.as_deref() {
                quote.estimated_gas = parse_dec("gas", gas)?;
            }
        }

        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Network;

    fn token(symbol: &str) -> Token {
        Token {
            address: Address::repeat_byte(0x22),
            symbol: symbol.to_string(),
            decimals: 18,
            chain_id: Network::Ethereum.chain_id(),
            is_native: false,
            is_wrapped_native: false,
            is_pool_share: false,
            base_symbol: None,
        }
    }

    #[test]
    fn classification_table() {
        assert_eq!(
            classify_pair(&token("USDC"), &token("DAI")),
            StablePairClass::SameCurrencyStable
        );
        assert_eq!(
            classify_pair(&token("USDC"), &token("EURS")),
            StablePairClass::CrossCurrencyStable
        );
        assert_eq!(
            classify_pair(&token("WETH"), &token("USDC")),
            StablePairClass::NonStable
        );
    }

    #[test]
    fn fee_table_matches_classes() {
        assert_eq!(aggregator_fee_bps(StablePairClass::SameCurrencyStable), 4);
        assert_eq!(aggregator_fee_bps(StablePairClass::CrossCurrencyStable), 10);
        assert_eq!(aggregator_fee_bps(StablePairClass::NonStable), 30);
    }

    #[test]
    fn network_partition_is_disjoint_and_total() {
        let zero_ex = ZeroExApi::new("https://api.0x.org").unwrap();
        let paraswap = ParaswapApi::new("https://apiv5.paraswap.io").unwrap();
        for network in [Network::Ethereum, Network::Arbitrum, Network::Polygon] {
            assert_ne!(
                zero_ex.serves(network),
                paraswap.serves(network),
                "exactly one aggregator must serve {network}"
            );
        }
    }
}
