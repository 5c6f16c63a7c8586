//! TWAP order builder configuration parameters.

use crate::time::MINUTE_MS;
use crate::types::{Address, Price};
use alloy::primitives::address;

/// Exchange the TWAP contract routes each chunk through.
pub const DEFAULT_EXCHANGE: Address = address!("1c5361ba8efe172e6d809839b3ece9ee8f47cf5d");

/// Configuration for the order builder.
#[derive(Debug, Clone)]
pub struct TwapConfig {
    /// Exchange passed as the first `ask` argument.
    pub exchange: Address,

    /// TWAP contract the order request is sent to.
    /// `Address::ZERO` means no contract is deployed on the current chain.
    pub twap_contract: Address,

    /// Floor applied to every derived interval, in milliseconds.
    pub min_interval_ms: u64,

    /// Smallest USD value any single chunk (including the last, partial one)
    /// must be worth.
    pub min_chunk_usd: Price,

    /// Slack added to the order deadline when it is encoded, in milliseconds.
    pub deadline_grace_ms: u64,

    /// Significant digits used when a limit price is re-rendered.
    pub price_display_digits: usize,
}

impl Default for TwapConfig {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE,
            twap_contract: Address::ZERO,
            min_interval_ms: MINUTE_MS,           // 1 minute
            min_chunk_usd: Price::from_u128(1, 1), // $1.00
            deadline_grace_ms: MINUTE_MS,
            price_display_digits: 6,
        }
    }
}

impl TwapConfig {
    /// Create a new configuration with a custom exchange.
    pub fn with_exchange(mut self, exchange: Address) -> Self {
        self.exchange = exchange;
        self
    }

    /// Create a new configuration targeting a deployed TWAP contract.
    pub fn with_twap_contract(mut self, contract: Address) -> Self {
        self.twap_contract = contract;
        self
    }

    /// Create a new configuration with a custom interval floor.
    pub fn with_min_interval_ms(mut self, min_interval_ms: u64) -> Self {
        self.min_interval_ms = min_interval_ms;
        self
    }

    /// Create a new configuration with a custom per-chunk USD floor.
    pub fn with_min_chunk_usd(mut self, min_chunk_usd: Price) -> Self {
        self.min_chunk_usd = min_chunk_usd;
        self
    }

    /// Create a new configuration with a custom deadline grace period.
    pub fn with_deadline_grace_ms(mut self, grace_ms: u64) -> Self {
        self.deadline_grace_ms = grace_ms;
        self
    }

    /// Clamp a derived interval to the configured floor.
    pub fn clamp_interval(&self, interval_ms: u64) -> u64 {
        interval_ms.max(self.min_interval_ms)
    }
}
