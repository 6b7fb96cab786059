use std::fmt;

use serde::{Serialize, Serializer};

/// Hundredths of a percent in one whole.
const FULL_X100: u64 = 10_000;
/// Divisor splitting the integer and fractional parts for display.
const PERCENT_DIVISOR: u64 = 100;

/// A ratio stored as hundredths of a percent (`10_000` is 100%).
///
/// Integer storage keeps the report free of float rounding; values are
/// truncated, not rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u64);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(FULL_X100);

    /// `part / total` as a percentage. A zero `total` yields zero rather
    /// than dividing by zero.
    #[must_use]
    pub fn of(part: u64, total: u64) -> Self {
        let scaled = u128::from(part)
            .saturating_mul(u128::from(FULL_X100))
            .checked_div(u128::from(total))
            .unwrap_or(0);
        Self(u64::try_from(scaled).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}%",
            self.0 / PERCENT_DIVISOR,
            self.0 % PERCENT_DIVISOR
        )
    }
}

impl Serialize for Percentage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}
