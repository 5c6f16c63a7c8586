//! Collaborators the order builder queries but does not own.

use crate::amount::TokenAmount;
use crate::types::{Address, Currency, Price, TokenId, U256};
use std::collections::HashMap;
use tracing::warn;

/// USD quotes per token. Best effort: a quote may be stale or missing.
pub trait PriceOracle {
    /// USD price of one whole token as a decimal string.
    fn quote_usd(&self, token: TokenId) -> Option<String>;
}

/// Token metadata source.
pub trait TokenMetadata {
    fn currency(&self, token: TokenId) -> Option<Currency>;

    fn decimals(&self, token: TokenId) -> Option<u8> {
        self.currency(token).map(|c| c.decimals)
    }
}

/// Account balances, used only for the max/half shortcuts and the
/// balance check of the submission gate.
pub trait BalanceLookup {
    fn balance_of(&self, account: Address, token: TokenId) -> Option<TokenAmount>;
}

/// ERC-20 allowances. `None` means the allowance is not known yet.
pub trait AllowanceLookup {
    fn allowance(&self, owner: Address, spender: Address, token: TokenId) -> Option<TokenAmount>;
}

/// Parse an oracle quote into an exact price. A malformed quote is logged
/// and treated as missing.
pub fn usd_price<O: PriceOracle + ?Sized>(oracle: &O, token: TokenId) -> Option<Price> {
    let quote = oracle.quote_usd(token)?;
    match Price::parse(&quote) {
        Ok(price) => Some(price),
        Err(e) => {
            warn!("ignoring USD quote {:?} for {}: {}", quote, token, e);
            None
        }
    }
}

/// Fixed USD quotes.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    quotes: HashMap<TokenId, String>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, token: TokenId, usd: impl Into<String>) -> Self {
        self.quotes.insert(token, usd.into());
        self
    }
}

impl PriceOracle for StaticOracle {
    fn quote_usd(&self, token: TokenId) -> Option<String> {
        self.quotes.get(&token).cloned()
    }
}

/// Known tokens by address.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tokens: HashMap<TokenId, Currency>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, currency: Currency) -> Self {
        self.tokens.insert(currency.address, currency);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.tokens.values()
    }

    /// Look a token up by its symbol, ignoring case.
    pub fn by_symbol(&self, symbol: &str) -> Option<&Currency> {
        self.tokens
            .values()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }
}

impl TokenMetadata for TokenList {
    fn currency(&self, token: TokenId) -> Option<Currency> {
        self.tokens.get(&token).cloned()
    }
}

/// Fixed balances and allowances in base units, resolved against a
/// [`TokenList`] for decimals.
#[derive(Debug, Clone, Default)]
pub struct StaticBalances {
    tokens: TokenList,
    balances: HashMap<(Address, TokenId), U256>,
    allowances: HashMap<(Address, Address, TokenId), U256>,
}

impl StaticBalances {
    pub fn new(tokens: TokenList) -> Self {
        Self {
            tokens,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn with_balance(mut self, account: Address, token: TokenId, raw: U256) -> Self {
        self.balances.insert((account, token), raw);
        self
    }

    pub fn with_allowance(mut self, owner: Address, spender: Address, token: TokenId, raw: U256) -> Self {
        self.allowances.insert((owner, spender, token), raw);
        self
    }
}

impl BalanceLookup for StaticBalances {
    fn balance_of(&self, account: Address, token: TokenId) -> Option<TokenAmount> {
        let decimals = self.tokens.decimals(token)?;
        let raw = self.balances.get(&(account, token)).copied().unwrap_or_default();
        Some(TokenAmount::new(raw, decimals))
    }
}

impl AllowanceLookup for StaticBalances {
    fn allowance(&self, owner: Address, spender: Address, token: TokenId) -> Option<TokenAmount> {
        let decimals = self.tokens.decimals(token)?;
        let raw = self.allowances.get(&(owner, spender, token)).copied().unwrap_or_default();
        Some(TokenAmount::new(raw, decimals))
    }
}
