//! Durations entered as a magnitude plus a unit.

use std::fmt;

pub const MINUTE_MS: u64 = 60_000;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;
pub const DAY_MS: u64 = 24 * HOUR_MS;

/// Longest value still rendered in minutes (59 minutes).
const MAX_MINUTES_MS: u64 = 3_540_000;
/// Values below one day render in hours.
const MAX_HOURS_MS: u64 = DAY_MS;

/// Unit a duration is typed or displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeUnit {
    #[default]
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in milliseconds.
    pub fn millis(self) -> u64 {
        match self {
            TimeUnit::Minutes => MINUTE_MS,
            TimeUnit::Hours => HOUR_MS,
            TimeUnit::Days => DAY_MS,
        }
    }

    /// Look up a unit by name (`"m"`, `"min"`, `"hours"`, `"d"`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    /// The unit a millisecond value is displayed in.
    pub fn canonical(milliseconds: u64) -> Self {
        if milliseconds <= MAX_MINUTES_MS {
            TimeUnit::Minutes
        } else if milliseconds < MAX_HOURS_MS {
            TimeUnit::Hours
        } else {
            TimeUnit::Days
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        f.write_str(label)
    }
}

/// Convert a typed magnitude into milliseconds.
///
/// Returns `None` when the magnitude is absent or is not a finite,
/// non-negative number.
pub fn to_milliseconds(unit: TimeUnit, magnitude: Option<&str>) -> Option<u64> {
    let value: f64 = magnitude?.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * unit.millis() as f64).round() as u64)
}

/// Like [`to_milliseconds`], but with the unit given by name.
/// An unrecognized unit yields `None` instead of an error.
pub fn labeled_to_milliseconds(label: &str, magnitude: Option<&str>) -> Option<u64> {
    to_milliseconds(TimeUnit::from_label(label)?, magnitude)
}

/// See [`TimeUnit::canonical`].
pub fn canonical_unit(milliseconds: u64) -> TimeUnit {
    TimeUnit::canonical(milliseconds)
}

/// Express milliseconds in `unit`, rounded half-up to two decimals with
/// trailing zeros stripped. `None` for an absent or zero value.
pub fn from_milliseconds(unit: TimeUnit, milliseconds: Option<u64>) -> Option<String> {
    let ms = milliseconds.filter(|ms| *ms > 0)? as u128;
    let unit_ms = unit.millis() as u128;
    let hundredths = (ms * 100 + unit_ms / 2) / unit_ms;

    let whole = hundredths / 100;
    let fraction = hundredths % 100;
    Some(match fraction {
        0 => whole.to_string(),
        f if f % 10 == 0 => format!("{whole}.{}", f / 10),
        f => format!("{whole}.{f:02}"),
    })
}

/// A duration as the user sees it: unit, typed magnitude and the resolved
/// millisecond value.
///
/// When both are present, `milliseconds == magnitude * unit.millis()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeValue {
    pub unit: TimeUnit,
    pub magnitude: Option<String>,
    pub milliseconds: Option<u64>,
}

impl TimeValue {
    /// A value with no magnitude yet.
    pub fn empty(unit: TimeUnit) -> Self {
        Self {
            unit,
            magnitude: None,
            milliseconds: None,
        }
    }

    /// A value typed by the user; the unit is kept as typed.
    pub fn typed(unit: TimeUnit, magnitude: &str) -> Self {
        let magnitude = magnitude.trim();
        if magnitude.is_empty() {
            return Self::empty(unit);
        }
        Self {
            unit,
            magnitude: Some(magnitude.to_string()),
            milliseconds: to_milliseconds(unit, Some(magnitude)),
        }
    }

    /// A computed value, re-expressed in its canonical unit.
    pub fn from_millis(milliseconds: u64) -> Self {
        let unit = TimeUnit::canonical(milliseconds);
        Self {
            unit,
            magnitude: from_milliseconds(unit, Some(milliseconds)),
            milliseconds: Some(milliseconds),
        }
    }

    /// The millisecond value, treating zero as unset.
    pub fn millis(&self) -> Option<u64> {
        self.milliseconds.filter(|ms| *ms > 0)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.magnitude {
            Some(magnitude) => write!(f, "{} {}", magnitude, self.unit),
            None => write!(f, "- {}", self.unit),
        }
    }
}
