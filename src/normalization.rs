//! Fixed-point normalization utilities: decimal rescaling between tokens and
//! the native-token normalizer that maps a chain's native asset to its
//! wrapped ERC-20 form so all downstream math operates on comparable
//! addresses.

use ethers::types::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::{ConvertError, Result};
use crate::settings::NetworkConfig;
use crate::types::Token;

/// Safe multiply then divide: `(a * b) / denom`, floored. A zero denominator
/// yields zero rather than panicking.
#[inline]
pub fn mul_div_floor(a: U256, b: U256, denom: U256) -> U256 {
    if a.is_zero() || b.is_zero() || denom.is_zero() {
        return U256::zero();
    }
    a.saturating_mul(b) / denom
}

/// `10^n`, or `None` when it exceeds `u128` (n > 38).
#[inline]
pub fn pow10(n: u8) -> Option<u128> {
    if n > 38 {
        return None;
    }
    let mut value = 1u128;
    for _ in 0..n {
        value = value.checked_mul(10)?;
    }
    Some(value)
}

/// Rescale a base-unit amount from one token's decimals to another's.
/// Downscaling truncates toward zero.
pub fn scale_amount(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
    if from_decimals == to_decimals {
        return amount;
    }
    if to_decimals > from_decimals {
        let factor = pow10(to_decimals - from_decimals).unwrap_or(u128::MAX);
        amount.saturating_mul(U256::from(factor))
    } else {
        let factor = pow10(from_decimals - to_decimals).unwrap_or(u128::MAX);
        amount / U256::from(factor)
    }
}

/// Render a base-unit amount as a human-decimal value for logging.
pub fn human_amount(amount: U256, decimals: u8) -> Decimal {
    let scale = match pow10(decimals) {
        Some(s) => Decimal::from(s),
        None => return Decimal::ZERO,
    };
    let amt = Decimal::from_str(&amount.to_string()).unwrap_or(Decimal::ZERO);
    if scale.is_zero() {
        Decimal::ZERO
    } else {
        amt / scale
    }
}

/// A token address after native normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedToken {
    pub address: ethers::types::Address,
    pub is_native: bool,
}

/// Map a native asset to its wrapped ERC-20 address; ERC-20 tokens pass
/// through unchanged. Pure and idempotent given the network's static token
/// configuration. Fails with a configuration error when a native token has
/// no designated wrapped form.
pub fn normalize_native(token: &Token, network: &NetworkConfig) -> Result<NormalizedToken> {
    if !token.is_native {
        return Ok(NormalizedToken {
            address: token.address,
            is_native: false,
        });
    }
    let wrapped = network.wrapped_native(&token.symbol).ok_or_else(|| {
        ConvertError::Configuration(format!("no wrapped-native token for {}", token.symbol))
    })?;
    Ok(NormalizedToken {
        address: wrapped.address,
        is_native: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProtocolConfig;
    use crate::types::Network;
    use ethers::types::Address;

    fn token(symbol: &str, decimals: u8, is_native: bool) -> Token {
        Token {
            address: if is_native {
                Address::zero()
            } else {
                Address::repeat_byte(0x11)
            },
            symbol: symbol.to_string(),
            decimals,
            chain_id: Network::Ethereum.chain_id(),
            is_native,
            is_wrapped_native: false,
            is_pool_share: false,
            base_symbol: None,
        }
    }

    #[test]
    fn scale_amount_up_and_down() {
        let amount = U256::from(5_000_000u64); // 5.0 at 6 decimals
        assert_eq!(
            scale_amount(amount, 6, 18),
            U256::from(5_000_000u64) * U256::exp10(12)
        );
        assert_eq!(
            scale_amount(scale_amount(amount, 6, 18), 18, 6),
            amount
        );
        assert_eq!(scale_amount(amount, 6, 6), amount);
    }

    #[test]
    fn downscale_truncates_toward_zero() {
        // 1 wei at 18 decimals is below the resolution of 6 decimals
        assert_eq!(scale_amount(U256::one(), 18, 6), U256::zero());
    }

    #[test]
    fn mul_div_floor_handles_zero_denominator() {
        assert_eq!(
            mul_div_floor(U256::from(10), U256::from(10), U256::zero()),
            U256::zero()
        );
    }

    #[test]
    fn erc20_token_passes_through() {
        let config = ProtocolConfig::default_config();
        let net = config.network(Network::Ethereum).unwrap();
        let usdc = token("USDC", 6, false);
        let normalized = normalize_native(&usdc, net).unwrap();
        assert_eq!(normalized.address, usdc.address);
        assert!(!normalized.is_native);
    }

    #[test]
    fn native_token_resolves_to_wrapped_address() {
        let config = ProtocolConfig::default_config();
        let net = config.network(Network::Ethereum).unwrap();
        let eth = token("ETH", 18, true);
        let normalized = normalize_native(&eth, net).unwrap();
        assert!(normalized.is_native);
        assert_eq!(normalized.address, net.wrapped_native("ETH").unwrap().address);
    }

    #[test]
    fn missing_wrapped_native_is_a_configuration_error() {
        let net = NetworkConfig::default();
        let eth = token("ETH", 18, true);
        let err = normalize_native(&eth, &net).unwrap_err();
        assert!(matches!(err, ConvertError::Configuration(_)));
    }
}
