//! Core type definitions for the TWAP order builder.
//!
//! Re-exports from alloy-primitives for Ethereum-compatible types.

use crate::amount::{parse_decimal, pow10, to_significant};
use crate::error::AmountError;

pub use alloy::primitives::{Address, Bytes, B256, U256, U512};

/// Unique identifier for a token (contract address).
/// For the native asset, use `Address::ZERO`.
pub type TokenId = Address;

/// Native asset identifier (zero address).
pub const NATIVE_TOKEN: TokenId = Address::ZERO;

/// Amount of tokens in the smallest unit (e.g. wei).
pub type Amount = U256;

/// A token the user can trade, with the metadata the solver needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency {
    /// Token contract address, or [`NATIVE_TOKEN`].
    pub address: TokenId,
    /// Number of decimals of the token's base unit.
    pub decimals: u8,
    /// Ticker used in user-facing messages.
    pub symbol: String,
}

impl Currency {
    /// An ERC-20 style token.
    pub fn token(address: TokenId, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.into(),
        }
    }

    /// The chain's native asset.
    pub fn native(decimals: u8, symbol: impl Into<String>) -> Self {
        Self::token(NATIVE_TOKEN, decimals, symbol)
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN
    }
}

/// An exact price as a reduced fraction. A limit price is the output
/// token per one input token, in whole-token units.
///
/// Constructors always reduce, so two prices compare equal exactly when
/// their values do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    pub numerator: U256,
    /// Never zero.
    pub denominator: U256,
}

impl Price {
    /// Create a new price. Panics if denominator is zero.
    pub fn new(numerator: U256, denominator: U256) -> Self {
        assert!(!denominator.is_zero(), "price denominator cannot be zero");
        let divisor = numerator.gcd(denominator);
        Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }

    pub fn from_u128(numerator: u128, denominator: u128) -> Self {
        Self::new(U256::from(numerator), U256::from(denominator))
    }

    /// Parse a decimal string such as `"1850.25"` into an exact ratio.
    pub fn parse(value: &str) -> Result<Self, AmountError> {
        let (mantissa, fraction_len) = parse_decimal(value)?;
        let denominator = pow10(fraction_len as u32).ok_or(AmountError::Overflow)?;
        Ok(Self::new(mantissa, denominator))
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// `1 / self`, or `None` for a zero price.
    pub fn invert(&self) -> Option<Self> {
        if self.numerator.is_zero() {
            return None;
        }
        Some(Self {
            numerator: self.denominator,
            denominator: self.numerator,
        })
    }

    /// Render the price rounded to `digits` significant digits.
    pub fn to_significant(&self, digits: usize) -> String {
        to_significant(self.numerator, self.denominator, digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id() {
        let native = Currency::native(18, "MATIC");
        assert!(native.is_native());

        let usdc = Currency::token(Address::repeat_byte(0x01), 6, "USDC");
        assert!(!usdc.is_native());
    }

    #[test]
    fn test_price_parse() {
        let price = Price::parse("1850.25").unwrap();
        assert_eq!(price.numerator, U256::from(7401u64));
        assert_eq!(price.denominator, U256::from(4u64));
        assert_eq!(price.to_significant(6), "1850.25");

        assert_eq!(Price::parse("2").unwrap(), Price::from_u128(2, 1));
        assert!(Price::parse("0").unwrap().is_zero());
        assert!(Price::parse("1.2.3").is_err());
    }

    #[test]
    fn test_price_is_reduced() {
        assert_eq!(Price::parse("0.50").unwrap(), Price::from_u128(1, 2));
        assert_eq!(Price::from_u128(6, 4), Price::from_u128(3, 2));
        assert_eq!(Price::parse("0.000").unwrap(), Price::from_u128(0, 7));
        assert_eq!(Price::from_u128(0, 7).denominator, U256::from(1u64));
    }

    #[test]
    fn test_price_invert() {
        let price = Price::from_u128(3, 4); // 0.75
        let inverted = price.invert().unwrap();
        assert_eq!(inverted.numerator, U256::from(4));
        assert_eq!(inverted.denominator, U256::from(3));
        assert_eq!(inverted.to_significant(6), "1.33333");

        assert_eq!(Price::from_u128(0, 1).invert(), None);
    }
}
