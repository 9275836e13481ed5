use std::{
    fmt,
    ops::{Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// A money value in integer cents.
///
/// Transaction amounts and card limits are never negative once validated.
/// Invoice figures are signed: a refund larger than the purchases of a cycle
/// leaves a negative total, and spending past the limit leaves a negative
/// available credit.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let limit: MoneyCents = "1500,00".parse().unwrap();
/// assert_eq!(limit, MoneyCents::new(150_000));
/// assert_eq!(limit.to_string(), "1500.00");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the sum leaves the `i64` range.
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Reads user input such as `12`, `12.5`, `12,50` or `-3.00`.
///
/// Either `.` or `,` separates the cents, and at most two decimals are
/// accepted. Thousand separators are not.
impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (units, fraction) = digits.split_once(['.', ',']).unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(EngineError::InvalidAmount(format!("not an amount: {s:?}")));
        }
        if fraction.len() > 2 {
            return Err(EngineError::InvalidAmount(format!(
                "at most two decimals allowed: {s:?}"
            )));
        }

        let too_large = || EngineError::InvalidAmount(format!("amount too large: {s:?}"));
        let units: i64 = units.parse().map_err(|_| too_large())?;
        let fraction: i64 = format!("{fraction:0<2}").parse().map_err(|_| too_large())?;
        let cents = units
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(too_large)?;

        Ok(MoneyCents(if negative { -cents } else { cents }))
    }
}
