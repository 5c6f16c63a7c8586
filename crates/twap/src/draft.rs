//! The in-progress TWAP order and the edits that can be applied to it.

use crate::amount::parse_units;
use crate::time::{TimeUnit, TimeValue};
use crate::types::{Amount, Currency, Price, U256};

/// Which side of the trade a currency belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Input,
    Output,
}

impl Field {
    pub fn other(self) -> Self {
        match self {
            Field::Input => Field::Output,
            Field::Output => Field::Input,
        }
    }
}

/// Who owns the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalMode {
    /// Interval, chunk size and chunk count are derived from each other.
    #[default]
    Auto,
    /// The user pinned the schedule; duration edits no longer recompute it.
    Manual,
}

/// A limit price as typed, plus its exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitPrice {
    pub typed: String,
    pub price: Price,
}

/// Order-building session state.
///
/// The draft is a plain value: [`crate::Solver::apply`] maps a draft and an
/// edit to the next draft and never mutates its input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TwapOrderDraft {
    pub input_currency: Option<Currency>,
    pub output_currency: Option<Currency>,
    /// Total input amount as typed by the user.
    pub typed_value: String,
    /// Total order lifetime.
    pub duration: TimeValue,
    /// Time between chunk executions.
    pub interval: TimeValue,
    /// Input amount per chunk as a decimal string.
    pub chunk_size: Option<String>,
    /// Number of chunks, `ceil(typed_value / chunk_size)`.
    pub total_chunks: Option<U256>,
    pub limit_price: Option<LimitPrice>,
    /// Display orientation of the limit price: input per output when set.
    pub invert_limit_price: bool,
    /// Market execution when false.
    pub allow_limit_price: bool,
    pub interval_mode: IntervalMode,
    /// Absolute expiry in unix milliseconds.
    pub deadline: Option<u64>,
    /// Last validation message.
    pub error: Option<String>,
}

impl TwapOrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(&self, field: Field) -> Option<&Currency> {
        match field {
            Field::Input => self.input_currency.as_ref(),
            Field::Output => self.output_currency.as_ref(),
        }
    }

    pub(crate) fn currency_mut(&mut self, field: Field) -> &mut Option<Currency> {
        match field {
            Field::Input => &mut self.input_currency,
            Field::Output => &mut self.output_currency,
        }
    }

    /// Total input in base units, if a currency is selected and the typed
    /// value parses to a non-zero amount.
    pub fn input_amount(&self) -> Option<Amount> {
        let currency = self.input_currency.as_ref()?;
        parse_units(&self.typed_value, currency.decimals)
            .ok()
            .filter(|raw| !raw.is_zero())
    }

    /// Chunk size in base units, if it parses to a non-zero amount.
    pub fn chunk_amount(&self) -> Option<Amount> {
        let currency = self.input_currency.as_ref()?;
        parse_units(self.chunk_size.as_deref()?, currency.decimals)
            .ok()
            .filter(|raw| !raw.is_zero())
    }

    /// The price that constrains execution, `None` for a market order.
    pub fn effective_limit_price(&self) -> Option<&Price> {
        if !self.allow_limit_price {
            return None;
        }
        self.limit_price.as_ref().map(|limit| &limit.price)
    }

    /// The schedule may not complete before the deadline: the final chunk
    /// could be skipped. Advisory only.
    pub fn partial_fill_warning(&self) -> bool {
        match (self.interval.millis(), self.duration.millis(), self.total_chunks) {
            (Some(interval), Some(duration), Some(chunks)) => {
                U256::from(interval).saturating_mul(chunks) > U256::from(duration)
            }
            _ => false,
        }
    }

    /// Drop every field derived from the input amount.
    pub(crate) fn clear_schedule(&mut self) {
        self.chunk_size = None;
        self.total_chunks = None;
        self.interval = TimeValue::empty(TimeUnit::Minutes);
        self.interval_mode = IntervalMode::Auto;
    }
}

/// A single user edit to the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    /// Pick a token for one side; picking the other side's token swaps them.
    SelectCurrency { field: Field, currency: Currency },
    /// Swap input and output and start over.
    SwitchCurrencies,
    /// Change the total input amount.
    TypeInput(String),
    SetDuration(TimeValue),
    SetInterval(TimeValue),
    SetChunkSize(Option<String>),
    SetLimitPrice(Option<String>),
    SetAllowLimitPrice(bool),
    SetInvertLimitPrice(bool),
    SetIntervalMode(IntervalMode),
    SetError(Option<String>),
    /// Re-anchor the deadline at `now + duration`.
    UpdateDeadline,
    /// The native input was wrapped; the form restarts on the wrapped token.
    WrapDone,
    /// Clear the form after an order was placed.
    Reset,
}
