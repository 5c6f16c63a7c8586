//! Fixed-point decimal arithmetic over token base units.
//!
//! Amounts are carried as integers in the token's smallest unit (e.g. wei),
//! so every operation here is exact. Floating point never touches a value
//! that ends up in an order argument.

use crate::error::AmountError;
use crate::types::{U256, U512};

/// Largest power of ten that still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// A token quantity in base units together with the token's decimal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    /// Wrap an amount already expressed in base units.
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parse a user-typed decimal string for a token with `decimals` digits.
    pub fn parse(value: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self {
            raw: parse_units(value, decimals)?,
            decimals,
        })
    }

    /// Amount in base units.
    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Exact decimal rendering with trailing zeros stripped.
    pub fn to_exact(&self) -> String {
        format_units(self.raw, self.decimals)
    }

    /// Display rendering rounded half-up to `digits` significant digits.
    pub fn to_significant(&self, digits: usize) -> String {
        match pow10(self.decimals as u32) {
            Some(unit) => to_significant(self.raw, unit, digits),
            None => self.to_exact(),
        }
    }
}

/// Split a decimal string into its digits (as an integer) and the number of
/// significant fractional digits. Trailing fractional zeros are ignored.
pub fn parse_decimal(value: &str) -> Result<(U256, usize), AmountError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Malformed(value.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    let mantissa = if digits.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)?
    };

    Ok((mantissa, fraction.len()))
}

/// Parse a decimal string into base units of a token with `decimals` digits.
///
/// Rejects values with more fractional digits than the token supports
/// rather than truncating them.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, AmountError> {
    let (mantissa, fraction_len) = parse_decimal(value)?;
    if fraction_len > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            value: value.trim().to_string(),
            decimals,
        });
    }

    let scale = pow10((decimals as usize - fraction_len) as u32).ok_or(AmountError::Overflow)?;
    mantissa.checked_mul(scale).ok_or(AmountError::Overflow)
}

/// Render base units as an exact decimal string (`"1.5"`, `"0.000001"`, `"42"`).
pub fn format_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Ceiling division: the smallest `q` with `q * b >= a`.
/// Returns `None` when `b` is zero.
pub fn ceil_div(a: U256, b: U256) -> Option<U256> {
    if b.is_zero() {
        return None;
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Some(quotient)
    } else {
        Some(quotient + U256::from(1u64))
    }
}

/// Render `numerator / denominator` rounded half-up to `significant` digits.
pub fn to_significant(numerator: U256, denominator: U256, significant: usize) -> String {
    significant_wide(widen(numerator), widen(denominator), significant)
}

pub(crate) fn significant_wide(numerator: U512, denominator: U512, significant: usize) -> String {
    if denominator.is_zero() || numerator.is_zero() || significant == 0 {
        return "0".to_string();
    }

    let ten = U512::from(10u64);
    let whole = numerator / denominator;
    let mut remainder = numerator % denominator;

    // every produced digit; the first `point` of them are the integer part
    let mut digits: Vec<u8> = if whole.is_zero() {
        Vec::new()
    } else {
        whole.to_string().bytes().map(|b| b - b'0').collect()
    };
    let mut point = digits.len();
    let mut seen = point;

    while seen <= significant && !remainder.is_zero() {
        remainder = match remainder.checked_mul(ten) {
            Some(r) => r,
            None => break,
        };
        let digit = (remainder / denominator).as_limbs()[0] as u8;
        remainder %= denominator;
        digits.push(digit);
        if seen > 0 || digit != 0 {
            seen += 1;
        }
    }

    let first = digits.iter().position(|d| *d != 0).unwrap_or(0);
    let cut = first + significant;
    if digits.len() > cut {
        let round_up = digits[cut] >= 5;
        digits.truncate(cut);
        if round_up {
            let mut i = cut;
            loop {
                if i == 0 {
                    digits.insert(0, 1);
                    point += 1;
                    break;
                }
                i -= 1;
                if digits[i] == 9 {
                    digits[i] = 0;
                } else {
                    digits[i] += 1;
                    break;
                }
            }
        }
    }
    while digits.len() < point {
        digits.push(0);
    }

    let render = |ds: &[u8]| ds.iter().map(|d| (b'0' + d) as char).collect::<String>();
    let (whole, fraction) = digits.split_at(point);
    let whole = if whole.is_empty() {
        "0".to_string()
    } else {
        render(whole)
    };
    let fraction = render(fraction);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

/// `10^exp`, or `None` when it overflows 256 bits.
pub fn pow10(exp: u32) -> Option<U256> {
    let ten = U256::from(10u64);
    (0..exp).try_fold(U256::from(1u64), |acc, _| acc.checked_mul(ten))
}

pub(crate) fn pow10_wide(exp: u32) -> Option<U512> {
    let ten = U512::from(10u64);
    (0..exp).try_fold(U512::from(1u64), |acc, _| acc.checked_mul(ten))
}

pub(crate) fn widen(value: U256) -> U512 {
    let l = value.into_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

pub(crate) fn narrow(value: U512) -> Option<U256> {
    let l = value.into_limbs();
    if l[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// `floor(a * b / c)` over 512 bits; `None` on overflow or a zero divisor.
pub(crate) fn mul_div(a: U512, b: U512, c: U512) -> Option<U512> {
    if c.is_zero() {
        return None;
    }
    Some(a.checked_mul(b)? / c)
}
