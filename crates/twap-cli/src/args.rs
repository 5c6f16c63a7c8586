//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use twap::{Address, TimeUnit, TimeValue};

#[derive(Debug, Parser)]
#[command(name = "twap-cli", version, about = "Plan and encode TWAP orders")]
pub struct Cli {
    /// Default log level; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve an order schedule, validate it and print the `ask` calldata.
    Plan(PlanArgs),
    /// List the known tokens.
    Tokens,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Token to sell, by symbol.
    #[arg(long)]
    pub sell: String,

    /// Token to buy, by symbol.
    #[arg(long)]
    pub buy: String,

    /// Total amount to sell.
    #[arg(long)]
    pub amount: String,

    /// Order lifetime, e.g. `90m`, `1.5h`, `2d`.
    #[arg(long, value_parser = parse_time)]
    pub duration: TimeValue,

    /// Time between chunks.
    #[arg(long, value_parser = parse_time)]
    pub interval: Option<TimeValue>,

    /// Amount sold per chunk. Wins over `--interval`.
    #[arg(long)]
    pub chunk_size: Option<String>,

    /// Keep `--interval` as given when `--chunk-size` is also set,
    /// instead of re-deriving it from the chunk count.
    #[arg(long, requires = "interval")]
    pub manual: bool,

    /// Limit price, output per input unless `--invert` is set.
    #[arg(long)]
    pub limit_price: Option<String>,

    /// The limit price is quoted as input per output.
    #[arg(long)]
    pub invert: bool,

    /// USD price of one whole sell token.
    #[arg(long)]
    pub usd_price: Option<String>,

    /// Wallet balance of the sell token.
    #[arg(long, requires = "account")]
    pub balance: Option<String>,

    /// Amount of the sell token the TWAP contract may spend.
    #[arg(long, requires = "account")]
    pub allowance: Option<String>,

    /// Account placing the order.
    #[arg(long)]
    pub account: Option<Address>,

    /// TWAP contract address.
    #[arg(long)]
    pub contract: Option<Address>,

    /// Exchange the contract routes chunks through.
    #[arg(long)]
    pub exchange: Option<Address>,

    #[arg(long, default_value_t = 60_000)]
    pub min_interval_ms: u64,

    /// Smallest USD value of any chunk.
    #[arg(long, default_value = "1")]
    pub min_chunk_usd: String,

    /// Clock override in unix milliseconds.
    #[arg(long)]
    pub now_ms: Option<u64>,
}

/// Parse `<magnitude><unit>` (`90m`, `1.5 hours`, `2d`).
fn parse_time(value: &str) -> Result<TimeValue, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (magnitude, label) = value.split_at(split);
    if magnitude.is_empty() {
        return Err(format!("missing magnitude in {value:?}"));
    }

    let unit = if label.trim().is_empty() {
        TimeUnit::Minutes
    } else {
        TimeUnit::from_label(label).ok_or_else(|| format!("unknown time unit {:?}", label.trim()))?
    };
    let time = TimeValue::typed(unit, magnitude);
    if time.milliseconds.is_none() {
        return Err(format!("invalid time {value:?}"));
    }
    Ok(time)
}
