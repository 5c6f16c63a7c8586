//! Derivation of the order schedule from partial user input.
//!
//! Duration, interval, chunk size and chunk count are tied together by
//! `chunks = ceil(total / chunk_size)` and `interval ≈ duration / chunks`.
//! Each edit updates one of them and recomputes the others, unless the
//! draft is in [`IntervalMode::Manual`].

use crate::amount::{ceil_div, format_units, parse_units};
use crate::config::TwapConfig;
use crate::draft::{DraftEdit, Field, IntervalMode, LimitPrice, TwapOrderDraft};
use crate::error::{AmountError, Result};
use crate::time::{TimeUnit, TimeValue};
use crate::types::{Amount, Currency, Price, U256};
use tracing::debug;

/// Applies [`DraftEdit`]s to a [`TwapOrderDraft`].
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: TwapConfig,
}

impl Solver {
    pub fn new(config: TwapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TwapConfig {
        &self.config
    }

    /// Produce the draft that results from `edit`.
    ///
    /// `now_ms` is the current unix time in milliseconds and only feeds the
    /// deadline. On error the caller keeps `draft` as it was.
    pub fn apply(
        &self,
        draft: &TwapOrderDraft,
        edit: DraftEdit,
        now_ms: u64,
    ) -> Result<TwapOrderDraft> {
        let mut next = draft.clone();

        match edit {
            DraftEdit::SelectCurrency { field, currency } => {
                select_currency(&mut next, field, currency)
            }
            DraftEdit::SwitchCurrencies => switch_currencies(&mut next),
            DraftEdit::TypeInput(value) => type_input(&mut next, value)?,
            DraftEdit::SetDuration(value) => self.set_duration(&mut next, value, now_ms)?,
            DraftEdit::SetInterval(value) => self.set_interval(&mut next, value)?,
            DraftEdit::SetChunkSize(value) => self.set_chunk_size(&mut next, value)?,
            DraftEdit::SetLimitPrice(value) => set_limit_price(&mut next, value)?,
            DraftEdit::SetAllowLimitPrice(allow) => {
                next.allow_limit_price = allow;
                next.limit_price = None;
            }
            DraftEdit::SetInvertLimitPrice(invert) => self.set_invert(&mut next, invert),
            DraftEdit::SetIntervalMode(mode) => next.interval_mode = mode,
            DraftEdit::SetError(error) => next.error = error,
            DraftEdit::UpdateDeadline => next.deadline = deadline(now_ms, &next.duration),
            DraftEdit::WrapDone => {
                next.output_currency = None;
                next.typed_value.clear();
                next.clear_schedule();
            }
            DraftEdit::Reset => {
                next = TwapOrderDraft {
                    input_currency: next.input_currency.take(),
                    ..Default::default()
                };
            }
        }

        self.cap_interval(&mut next)?;
        self.enforce_chunk_bound(&mut next)?;
        Ok(next)
    }

    /// Chunk count for a given chunk size, and the interval that spreads
    /// those chunks over `duration_ms`.
    pub fn interval_for_chunk(
        &self,
        total: Amount,
        chunk: Amount,
        duration_ms: u64,
    ) -> Result<(U256, TimeValue)> {
        let chunks = ceil_div(total, chunk).ok_or(AmountError::DivisionByZero)?;
        // chunks >= 1 here, so the quotient never exceeds duration_ms
        let per_chunk = u64::try_from(U256::from(duration_ms) / chunks).unwrap_or(0);
        let interval = TimeValue::from_millis(self.config.clamp_interval(per_chunk));
        Ok((chunks, interval))
    }

    /// Chunk size (in base units) and chunk count for a given interval.
    ///
    /// The count is re-derived from the rounded-up chunk size so that
    /// `chunks == ceil(total / chunk)` always holds.
    pub fn chunk_for_interval(
        &self,
        total: Amount,
        duration_ms: u64,
        interval_ms: u64,
    ) -> Result<(Amount, U256)> {
        if interval_ms == 0 {
            return Err(AmountError::DivisionByZero.into());
        }
        let slots = U256::from(duration_ms.div_ceil(interval_ms));
        let chunk = ceil_div(total, slots).ok_or(AmountError::DivisionByZero)?;
        let chunks = ceil_div(total, chunk).ok_or(AmountError::DivisionByZero)?;
        Ok((chunk, chunks))
    }

    fn set_duration(
        &self,
        next: &mut TwapOrderDraft,
        value: TimeValue,
        now_ms: u64,
    ) -> Result<()> {
        ensure_parsed(&value)?;
        next.deadline = deadline(now_ms, &value);
        next.duration = value;

        let Some(duration_ms) = next.duration.millis() else {
            return Ok(());
        };
        if next.interval_mode == IntervalMode::Manual {
            debug!("duration changed in manual mode, schedule left as is");
            return Ok(());
        }
        let (Some(total), Some(decimals)) = (next.input_amount(), input_decimals(next)) else {
            return Ok(());
        };

        // chunk size wins over interval when both are set
        if let Some(chunk) = next.chunk_amount() {
            let (chunks, interval) = self.interval_for_chunk(total, chunk, duration_ms)?;
            debug!("duration {}ms over {} chunks -> interval {}", duration_ms, chunks, interval);
            next.total_chunks = Some(chunks);
            next.interval = interval;
        } else if let Some(interval_ms) = next.interval.millis() {
            self.apply_interval(next, total, decimals, duration_ms, interval_ms)?;
        }
        Ok(())
    }

    fn set_interval(&self, next: &mut TwapOrderDraft, value: TimeValue) -> Result<()> {
        ensure_parsed(&value)?;
        next.interval = match value.millis() {
            Some(ms) if ms < self.config.min_interval_ms => {
                debug!("interval {}ms raised to the {}ms floor", ms, self.config.min_interval_ms);
                TimeValue::from_millis(self.config.min_interval_ms)
            }
            _ => value,
        };
        let manual = next.interval_mode == IntervalMode::Manual;

        let Some(interval_ms) = next.interval.millis() else {
            if !manual {
                next.chunk_size = None;
                next.total_chunks = None;
            }
            return Ok(());
        };
        if manual {
            return Ok(());
        }
        let (Some(total), Some(decimals)) = (next.input_amount(), input_decimals(next)) else {
            return Ok(());
        };
        if let Some(duration_ms) = next.duration.millis() {
            self.apply_interval(next, total, decimals, duration_ms, interval_ms)?;
        }
        Ok(())
    }

    fn set_chunk_size(&self, next: &mut TwapOrderDraft, value: Option<String>) -> Result<()> {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let (Some(text), Some(decimals)) = (value.as_deref(), input_decimals(next)) {
            parse_units(text, decimals)?;
        }
        next.chunk_size = value;

        let (Some(total), Some(decimals)) = (next.input_amount(), input_decimals(next)) else {
            return Ok(());
        };
        let Some(mut chunk) = next.chunk_amount() else {
            next.total_chunks = None;
            return Ok(());
        };

        if chunk > total {
            debug!("chunk size {} exceeds order size {}, snapping", chunk, total);
            next.chunk_size = Some(format_units(total, decimals));
            chunk = total;
        }

        let chunks = ceil_div(total, chunk).ok_or(AmountError::DivisionByZero)?;
        next.total_chunks = Some(chunks);

        if let (Some(duration_ms), IntervalMode::Auto) = (next.duration.millis(), next.interval_mode) {
            let (_, interval) = self.interval_for_chunk(total, chunk, duration_ms)?;
            debug!("chunk size {} -> {} chunks every {}", chunk, chunks, interval);
            next.interval = interval;
        }
        Ok(())
    }

    fn set_invert(&self, next: &mut TwapOrderDraft, invert: bool) {
        if next.invert_limit_price == invert {
            return;
        }
        next.invert_limit_price = invert;
        next.limit_price = next.limit_price.take().and_then(|limit| {
            let price = limit.price.invert()?;
            Some(LimitPrice {
                typed: price.to_significant(self.config.price_display_digits),
                price,
            })
        });
    }

    fn apply_interval(
        &self,
        next: &mut TwapOrderDraft,
        total: Amount,
        decimals: u8,
        duration_ms: u64,
        interval_ms: u64,
    ) -> Result<()> {
        let (chunk, chunks) = self.chunk_for_interval(total, duration_ms, interval_ms)?;
        debug!(
            "duration {}ms every {}ms -> {} chunks of {}",
            duration_ms, interval_ms, chunks, chunk
        );
        next.chunk_size = Some(format_units(chunk, decimals));
        next.total_chunks = Some(chunks);
        Ok(())
    }

    /// An interval longer than the whole order is cut back to the duration,
    /// but never below the interval floor.
    fn cap_interval(&self, next: &mut TwapOrderDraft) -> Result<()> {
        let (Some(interval_ms), Some(duration_ms)) = (next.interval.millis(), next.duration.millis()) else {
            return Ok(());
        };
        let cap = self.config.clamp_interval(duration_ms);
        if interval_ms > cap {
            debug!("interval {}ms exceeds duration {}ms, capping", interval_ms, duration_ms);
            self.set_interval(next, TimeValue::from_millis(cap))?;
        }
        Ok(())
    }

    /// A chunk may never exceed the order; an oversized one collapses the
    /// order into a single chunk.
    fn enforce_chunk_bound(&self, next: &mut TwapOrderDraft) -> Result<()> {
        let (Some(total), Some(chunk), Some(decimals)) =
            (next.input_amount(), next.chunk_amount(), input_decimals(next))
        else {
            return Ok(());
        };
        if chunk > total {
            self.set_chunk_size(next, Some(format_units(total, decimals)))?;
        }
        Ok(())
    }
}

/// Apply an edit with the default configuration.
pub fn apply_edit(draft: &TwapOrderDraft, edit: DraftEdit, now_ms: u64) -> Result<TwapOrderDraft> {
    Solver::default().apply(draft, edit, now_ms)
}

fn input_decimals(draft: &TwapOrderDraft) -> Option<u8> {
    draft.input_currency.as_ref().map(|c| c.decimals)
}

/// A magnitude was typed but does not resolve to a duration.
fn ensure_parsed(value: &TimeValue) -> Result<()> {
    match (&value.magnitude, value.milliseconds) {
        (Some(magnitude), None) => Err(AmountError::Malformed(magnitude.clone()).into()),
        _ => Ok(()),
    }
}

fn deadline(now_ms: u64, duration: &TimeValue) -> Option<u64> {
    duration.millis().map(|ms| now_ms.saturating_add(ms))
}

fn type_input(next: &mut TwapOrderDraft, value: String) -> Result<()> {
    let value = value.trim().to_string();
    if let (false, Some(decimals)) = (value.is_empty(), input_decimals(next)) {
        parse_units(&value, decimals)?;
    }
    next.typed_value = value;
    next.clear_schedule();
    Ok(())
}

fn select_currency(next: &mut TwapOrderDraft, field: Field, currency: Currency) {
    if next.currency(field) == Some(&currency) {
        return;
    }

    let other = field.other();
    let swaps = next
        .currency(other)
        .is_some_and(|c| c.address == currency.address);
    if swaps {
        let previous = next.currency_mut(field).take();
        *next.currency_mut(other) = previous;
    }
    *next.currency_mut(field) = Some(currency);

    next.limit_price = None;
    if field == Field::Input || swaps {
        next.clear_schedule();
        // an amount typed for the old token may not fit the new one's decimals
        let fits = match &next.input_currency {
            Some(c) => parse_units(&next.typed_value, c.decimals).is_ok(),
            None => true,
        };
        if !fits {
            next.typed_value.clear();
        }
    }
}

fn switch_currencies(next: &mut TwapOrderDraft) {
    std::mem::swap(&mut next.input_currency, &mut next.output_currency);
    next.typed_value.clear();
    next.clear_schedule();
    next.duration = TimeValue::empty(TimeUnit::Minutes);
    next.deadline = None;
    next.limit_price = None;
    next.allow_limit_price = false;
}

fn set_limit_price(next: &mut TwapOrderDraft, value: Option<String>) -> Result<()> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    next.limit_price = match value {
        Some(typed) => {
            let price = Price::parse(&typed)?;
            (!price.is_zero()).then_some(LimitPrice { typed, price })
        }
        None => None,
    };
    Ok(())
}
