//! TWAP order builder: derives and validates the parameters of a
//! time-weighted average price order.
//!
//! This library provides:
//! - Exact decimal arithmetic over token base units
//! - Duration, interval, chunk size and chunk count solved from partial input
//! - Limit-price minimum output and a USD floor per chunk
//! - Assembly of the on-chain `ask` call and a submission session

pub mod amount;
pub mod config;
pub mod draft;
pub mod error;
pub mod external;
pub mod order;
pub mod pricing;
pub mod session;
pub mod solver;
pub mod time;
pub mod types;
pub mod validation;

pub use amount::{ceil_div, format_units, parse_units, TokenAmount};
pub use config::{TwapConfig, DEFAULT_EXCHANGE};
pub use draft::{DraftEdit, Field, IntervalMode, LimitPrice, TwapOrderDraft};
pub use error::{AmountError, AssemblyError, Result, TwapError};
pub use external::{AllowanceLookup, BalanceLookup, PriceOracle, StaticBalances, StaticOracle, TokenList, TokenMetadata};
pub use order::{AskArgs, OrderAssembler, OrderRequest, ASK_SELECTOR};
pub use session::{BalanceShortcut, OrderSession, SubmissionOutcome, SubmissionState};
pub use solver::{apply_edit, Solver};
pub use time::{TimeUnit, TimeValue};
pub use types::{Address, Amount, Currency, Price, TokenId, B256, U256, NATIVE_TOKEN};
pub use validation::{evaluate, SubmitStatus, ValidationContext, ValidationReport};
