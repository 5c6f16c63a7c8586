//! Submission gating.
//!
//! Every check is re-derived from the current draft on each call, so a
//! verdict is never stale.

use crate::amount::TokenAmount;
use crate::config::TwapConfig;
use crate::draft::TwapOrderDraft;
use crate::error::{Result, TwapError};
use crate::pricing::{expected_output, is_chunk_economically_viable, minimum_amount_out, token_usd_value};
use crate::types::{Address, Price};
use std::fmt;

/// What stands between the draft and a submittable order, in the order
/// the checks run. Only [`SubmitStatus::Ready`] allows submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    ConnectWallet,
    SelectToken,
    EnterAmount,
    InsufficientBalance { symbol: String },
    /// The native asset must be wrapped before it can be sold.
    WrapRequired,
    FormIncomplete(&'static str),
    TradeSizeTooSmall { floor: String },
    LimitPriceMissing,
    /// The TWAP contract may not yet spend the input token.
    ApprovalRequired { symbol: String },
    Ready,
}

impl SubmitStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SubmitStatus::Ready)
    }

    /// The blocking error, if any.
    pub fn into_error(self) -> Option<TwapError> {
        match self {
            SubmitStatus::Ready => None,
            SubmitStatus::FormIncomplete(field) => Some(TwapError::IncompleteForm(field)),
            SubmitStatus::TradeSizeTooSmall { floor } => Some(TwapError::EconomicFloor { floor }),
            other => Some(TwapError::NotReady(other.to_string())),
        }
    }
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitStatus::ConnectWallet => write!(f, "Connect Wallet"),
            SubmitStatus::SelectToken => write!(f, "Select a token"),
            SubmitStatus::EnterAmount => write!(f, "Enter an amount"),
            SubmitStatus::InsufficientBalance { symbol } => write!(f, "Insufficient {symbol} balance"),
            SubmitStatus::WrapRequired => write!(f, "Wrap"),
            SubmitStatus::FormIncomplete(_) => write!(f, "Form Incomplete"),
            SubmitStatus::TradeSizeTooSmall { floor } => {
                write!(f, "Trade size must be equal to at least {floor} USD")
            }
            SubmitStatus::LimitPriceMissing => write!(f, "Enter a limit price"),
            SubmitStatus::ApprovalRequired { symbol } => write!(f, "Approve {symbol}"),
            SubmitStatus::Ready => write!(f, "Place order"),
        }
    }
}

/// Check that the schedule is complete: duration, chunk count and interval.
pub fn validate_inputs(draft: &TwapOrderDraft) -> Result<()> {
    if draft.duration.millis().is_none() {
        return Err(TwapError::IncompleteForm("duration"));
    }
    if draft.total_chunks.map_or(true, |chunks| chunks.is_zero()) {
        return Err(TwapError::IncompleteForm("total chunks"));
    }
    if draft.interval.millis().is_none() {
        return Err(TwapError::IncompleteForm("interval"));
    }
    Ok(())
}

/// Facts from outside the draft that the gate needs.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub account: Option<Address>,
    /// Balance of the input token, when known.
    pub input_balance: Option<TokenAmount>,
    /// USD price of one whole input token, when the oracle had a quote.
    pub input_usd: Option<Price>,
    /// What the TWAP contract may spend of the input token. `None` while
    /// unknown, which blocks submission.
    pub input_allowance: Option<TokenAmount>,
}

/// Verdict plus the derived figures shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub status: SubmitStatus,
    /// Advisory; never blocks submission.
    pub partial_fill_warning: bool,
    /// Minimum output per chunk.
    pub minimum_amount_out: Option<TokenAmount>,
    /// Output of the whole order at the limit price.
    pub expected_output: Option<TokenAmount>,
    /// USD value of the whole input.
    pub input_usd_value: Option<String>,
}

/// Run every check against `draft`.
pub fn evaluate(config: &TwapConfig, draft: &TwapOrderDraft, ctx: &ValidationContext) -> ValidationReport {
    let input = draft
        .input_amount()
        .zip(draft.input_currency.as_ref())
        .map(|(raw, currency)| TokenAmount::new(raw, currency.decimals));

    let (minimum_amount_out, expected) = match (&draft.input_currency, &draft.output_currency) {
        (Some(src), Some(dst)) => {
            // an enabled but empty limit has no minimum yet
            let priced = !(draft.allow_limit_price && draft.limit_price.is_none());
            let min_out = draft.chunk_amount().filter(|_| priced).and_then(|chunk| {
                let raw = minimum_amount_out(
                    chunk,
                    src.decimals,
                    draft.effective_limit_price(),
                    draft.invert_limit_price,
                    dst.decimals,
                )?;
                Some(TokenAmount::new(raw, dst.decimals))
            });
            let expected = input.as_ref().zip(draft.effective_limit_price()).and_then(|(amount, price)| {
                expected_output(amount, price, draft.invert_limit_price, dst.decimals)
            });
            (min_out, expected)
        }
        _ => (None, None),
    };

    ValidationReport {
        status: submit_status(config, draft, ctx),
        partial_fill_warning: draft.partial_fill_warning(),
        minimum_amount_out,
        expected_output: expected,
        input_usd_value: input
            .as_ref()
            .zip(ctx.input_usd.as_ref())
            .map(|(amount, usd)| token_usd_value(amount, usd)),
    }
}

fn submit_status(config: &TwapConfig, draft: &TwapOrderDraft, ctx: &ValidationContext) -> SubmitStatus {
    if ctx.account.is_none() {
        return SubmitStatus::ConnectWallet;
    }
    let (Some(src), Some(_)) = (&draft.input_currency, &draft.output_currency) else {
        return SubmitStatus::SelectToken;
    };
    let Some(total) = draft.input_amount() else {
        return SubmitStatus::EnterAmount;
    };
    if let Some(balance) = &ctx.input_balance {
        if balance.raw() < total {
            return SubmitStatus::InsufficientBalance {
                symbol: src.symbol.clone(),
            };
        }
    }
    if src.is_native() {
        return SubmitStatus::WrapRequired;
    }
    if let Err(TwapError::IncompleteForm(field)) = validate_inputs(draft) {
        return SubmitStatus::FormIncomplete(field);
    }

    let viable = draft.chunk_amount().is_some_and(|chunk| {
        is_chunk_economically_viable(chunk, total, ctx.input_usd.as_ref(), src.decimals, &config.min_chunk_usd)
    });
    if !viable {
        return SubmitStatus::TradeSizeTooSmall {
            floor: config.min_chunk_usd.to_significant(config.price_display_digits),
        };
    }
    if draft.allow_limit_price && draft.limit_price.is_none() {
        return SubmitStatus::LimitPriceMissing;
    }
    let approved = src.is_native() || ctx.input_allowance.as_ref().is_some_and(|a| a.raw() >= total);
    if !approved {
        return SubmitStatus::ApprovalRequired {
            symbol: src.symbol.clone(),
        };
    }
    SubmitStatus::Ready
}
