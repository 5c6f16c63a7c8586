//! Built-in Polygon token list.

use alloy::primitives::address;
use twap::{Currency, TokenList};

pub fn default_tokens() -> TokenList {
    TokenList::new()
        .with_token(Currency::native(18, "MATIC"))
        .with_token(Currency::token(
            address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270"),
            18,
            "WMATIC",
        ))
        .with_token(Currency::token(
            address!("7ceb23fd6bc0add59e62ac25578270cff1b9f619"),
            18,
            "WETH",
        ))
        .with_token(Currency::token(
            address!("2791bca1f2de4661ed88a30c99a7a9449aa84174"),
            6,
            "USDC",
        ))
        .with_token(Currency::token(
            address!("1bfd67037b42cf73acf2047067bd4f2c47d9bfd6"),
            8,
            "WBTC",
        ))
}

pub fn print_tokens(tokens: &TokenList) {
    let mut all: Vec<_> = tokens.iter().collect();
    all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    for currency in all {
        let kind = if currency.is_native() { " (native)" } else { "" };
        println!("{:<8} {} {:>2} decimals{}", currency.symbol, currency.address, currency.decimals, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let tokens = default_tokens();
        assert!(tokens.by_symbol("matic").unwrap().is_native());
        assert_eq!(tokens.by_symbol("USDC").unwrap().decimals, 6);
        assert_eq!(tokens.iter().count(), 5);
    }
}
