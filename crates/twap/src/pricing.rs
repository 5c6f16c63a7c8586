//! Price conversions between the two sides of an order and the USD floor
//! every chunk has to clear.
//!
//! A limit price is quoted in whole tokens: output per input, or input per
//! output when the draft shows it inverted. Conversions run on `U512` so
//! the intermediate `amount * numerator * 10^decimals` product does not
//! overflow for any realistic input.

use crate::amount::{mul_div, narrow, pow10_wide, significant_wide, widen, TokenAmount};
use crate::types::{Amount, Price, U256, U512};
use tracing::debug;

/// Minimum output returned for market orders: any non-zero fill.
pub const MARKET_MIN_OUT: u64 = 1;

/// Significant digits a limit-priced minimum output is rounded to.
const MIN_OUT_SIGNIFICANT: u32 = 18;

/// Fractional digits kept when the significant-digit rounding does not
/// land on a whole base unit.
const FALLBACK_DIGITS: u8 = 6;

/// Significant digits for USD values.
const USD_DIGITS: usize = 5;

/// Minimum acceptable output, in output base units, for one chunk.
///
/// Without a limit price this is [`MARKET_MIN_OUT`]. Otherwise the chunk is
/// converted at the limit price and rounded half-up to
/// [`MIN_OUT_SIGNIFICANT`] significant digits. When that is not a whole
/// number of output base units, the value is instead rounded half-up to
/// `min(6, output_decimals)` fractional digits of the whole token.
///
/// Returns `None` for a zero inverted price or when the result overflows.
pub fn minimum_amount_out(
    chunk: Amount,
    input_decimals: u8,
    limit: Option<&Price>,
    invert: bool,
    output_decimals: u8,
) -> Option<Amount> {
    let Some(price) = limit else {
        return Some(U256::from(MARKET_MIN_OUT));
    };
    let (num, den) = orientation(price, invert)?;
    // below 2^512 for any two U256 factors
    let product = widen(chunk).checked_mul(widen(num))?;
    let den = widen(den);

    let significant = rescale(product, den, input_decimals, output_decimals)
        .and_then(|(n, d)| round_significant(n, d))
        .and_then(narrow);
    if significant.is_some() {
        return significant;
    }

    let digits = FALLBACK_DIGITS.min(output_decimals);
    debug!(
        "minimum output is not whole at {} significant digits, rounding to {} decimals",
        MIN_OUT_SIGNIFICANT, digits
    );
    let (n, d) = rescale(product, den, input_decimals, digits)?;
    let rounded = round_half_up(n, d)?;
    narrow(rounded.checked_mul(pow10_wide((output_decimals - digits) as u32)?)?)
}

/// What the whole input would buy at `price`.
pub fn expected_output(
    input: &TokenAmount,
    price: &Price,
    invert: bool,
    output_decimals: u8,
) -> Option<TokenAmount> {
    let (num, den) = orientation(price, invert)?;
    let raw = convert_exact(input.raw(), input.decimals(), num, den, output_decimals)?;
    Some(TokenAmount::new(raw, output_decimals))
}

/// Market price as input tokens per output token, in whole-token units.
/// `None` when the output is zero or the ratio does not fit.
pub fn market_price(input: &TokenAmount, output: &TokenAmount) -> Option<Price> {
    if output.is_zero() {
        return None;
    }
    let numerator = widen(input.raw()).checked_mul(pow10_wide(output.decimals() as u32)?)?;
    let denominator = widen(output.raw()).checked_mul(pow10_wide(input.decimals() as u32)?)?;
    let (numerator, denominator) = reduce(numerator, denominator);
    Some(Price::new(narrow(numerator)?, narrow(denominator)?))
}

/// USD value of `amount` given the USD price of one whole token, rendered
/// with five significant digits.
pub fn token_usd_value(amount: &TokenAmount, usd: &Price) -> String {
    let numerator = widen(amount.raw()).saturating_mul(widen(usd.numerator));
    let denominator = match pow10_wide(amount.decimals() as u32) {
        Some(unit) => widen(usd.denominator).saturating_mul(unit),
        None => return "0".to_string(),
    };
    significant_wide(numerator, denominator, USD_DIGITS)
}

/// Render `price` in the requested orientation: `1 / price` when `invert`
/// is set. `None` for a zero price that would have to be inverted.
pub fn toggle_price_display(price: &Price, invert: bool, digits: usize) -> Option<String> {
    let shown = if invert { price.invert()? } else { *price };
    Some(shown.to_significant(digits))
}

/// True when a chunk is larger than the whole order.
pub fn invalid_chunk_size(input: Amount, chunk: Amount) -> bool {
    chunk > input
}

/// Size of the smallest chunk the order will execute: the remainder of the
/// last chunk if the total does not divide evenly, else the chunk itself.
pub fn smallest_chunk(chunk: Amount, total: Amount) -> Option<Amount> {
    if chunk.is_zero() {
        return None;
    }
    let remainder = total % chunk;
    Some(if remainder.is_zero() { chunk } else { remainder })
}

/// Whether every chunk, the last one included, is worth at least `floor`
/// USD. A missing USD quote counts as worthless.
pub fn is_chunk_economically_viable(
    chunk: Amount,
    total: Amount,
    usd: Option<&Price>,
    decimals: u8,
    floor: &Price,
) -> bool {
    let (Some(smallest), Some(usd)) = (smallest_chunk(chunk, total), usd) else {
        return false;
    };
    let Some(unit) = pow10_wide(decimals as u32) else {
        return false;
    };

    // smallest * usd.num / (usd.den * unit) >= floor.num / floor.den
    let lhs = widen(smallest)
        .checked_mul(widen(usd.numerator))
        .and_then(|v| v.checked_mul(widen(floor.denominator)));
    let rhs = widen(floor.numerator)
        .checked_mul(widen(usd.denominator))
        .and_then(|v| v.checked_mul(unit));
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => lhs >= rhs,
        // only the side that overflowed can be the larger one
        (None, Some(_)) => true,
        _ => false,
    }
}

/// `(numerator, denominator)` of output per input.
fn orientation(price: &Price, invert: bool) -> Option<(U256, U256)> {
    if invert {
        let inverted = price.invert()?;
        Some((inverted.numerator, inverted.denominator))
    } else {
        Some((price.numerator, price.denominator))
    }
}

/// `floor(amount * num * 10^out / (den * 10^in))` in one step.
fn convert_exact(amount: Amount, input_decimals: u8, num: U256, den: U256, output_decimals: u8) -> Option<Amount> {
    let scaled = widen(num).checked_mul(pow10_wide(output_decimals as u32)?)?;
    let divisor = widen(den).checked_mul(pow10_wide(input_decimals as u32)?)?;
    narrow(mul_div(widen(amount), scaled, divisor)?)
}

/// `n / d` re-expressed from `from` to `to` decimal places, with the power
/// of ten on whichever side keeps the numbers small.
fn rescale(n: U512, d: U512, from: u8, to: u8) -> Option<(U512, U512)> {
    if to >= from {
        Some((n.checked_mul(pow10_wide((to - from) as u32)?)?, d))
    } else {
        Some((n, d.checked_mul(pow10_wide((from - to) as u32)?)?))
    }
}

/// `n / d` rounded half-up to the nearest integer. `d` must be non-zero.
fn round_half_up(n: U512, d: U512) -> Option<U512> {
    let two = U512::from(2u64);
    Some(n.checked_mul(two)?.checked_add(d)? / d.checked_mul(two)?)
}

/// `n / d` rounded half-up to [`MIN_OUT_SIGNIFICANT`] significant digits,
/// when the rounded value is an integer.
fn round_significant(n: U512, d: U512) -> Option<U512> {
    if n.is_zero() {
        return Some(U512::ZERO);
    }
    let whole = n / d;
    let digits = integer_digits(whole);
    if digits >= MIN_OUT_SIGNIFICANT {
        let unit = pow10_wide(digits - MIN_OUT_SIGNIFICANT)?;
        return round_half_up(n, d.checked_mul(unit)?)?.checked_mul(unit);
    }

    // zeros between the point and the first significant digit
    let mut zeros = 0;
    if whole.is_zero() {
        let ten = U512::from(10u64);
        let mut scaled = n.checked_mul(ten)?;
        while scaled < d {
            scaled = scaled.checked_mul(ten)?;
            zeros += 1;
        }
    }
    let scale = pow10_wide(MIN_OUT_SIGNIFICANT - digits + zeros)?;
    let rounded = round_half_up(n.checked_mul(scale)?, d)?;
    (rounded % scale).is_zero().then(|| rounded / scale)
}

fn integer_digits(mut value: U512) -> u32 {
    let ten = U512::from(10u64);
    let mut digits = 0;
    while !value.is_zero() {
        value /= ten;
        digits += 1;
    }
    digits
}

fn reduce(a: U512, b: U512) -> (U512, U512) {
    let divisor = a.gcd(b);
    if divisor.is_zero() {
        return (a, b);
    }
    (a / divisor, b / divisor)
}
