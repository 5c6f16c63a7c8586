//! Error types for the TWAP order builder.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TwapError>;

/// Failures while parsing or scaling a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed decimal: {0:?}")]
    Malformed(String),

    #[error("{value:?} uses more than {decimals} fractional digits")]
    TooManyDecimals { value: String, decimals: u8 },

    #[error("amount overflows 256 bits")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,
}

/// A required argument was missing when building the `ask` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("currencies missing")]
    MissingCurrencies,

    #[error("contract missing")]
    MissingContract,

    #[error("account missing")]
    MissingAccount,

    #[error("deadline missing")]
    MissingDeadline,

    #[error("interval missing")]
    MissingInterval,

    #[error("source bid amount missing")]
    MissingChunkSize,

    #[error("source amount missing")]
    MissingInputAmount,

    #[error("dest min amount missing")]
    MissingMinimumAmountOut,

    #[error("native input must be wrapped before placing an order")]
    NativeInput,

    #[error("{0} does not fit the contract argument")]
    OutOfRange(&'static str),
}

/// Top-level error for draft edits, validation and submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TwapError {
    #[error("invalid amount: {0}")]
    Parse(#[from] AmountError),

    #[error("Form Incomplete: {0} missing")]
    IncompleteForm(&'static str),

    #[error("Trade size must be equal to at least {floor} USD")]
    EconomicFloor { floor: String },

    #[error("order assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("an order submission is already pending")]
    SubmissionPending,

    #[error("order not ready: {0}")]
    NotReady(String),

    #[error("order submission failed: {0}")]
    Submission(String),
}
