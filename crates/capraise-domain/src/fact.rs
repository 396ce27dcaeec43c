//! Fact module - values that are either validated or explicitly unknown
//!
//! Every field that lands in a store row is a [`Fact`]. There is exactly one
//! representation of "not known" ([`Fact::Unknown`], rendered as
//! [`UNKNOWN_MARKER`]); a zero amount or an empty string is never used for it.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Cell text used for every unknown value
pub const UNKNOWN_MARKER: &str = "-";

/// A value that is either validated or explicitly unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact<T> {
    /// Populated from a validated token
    Known(T),
    /// Not recoverable (yet)
    Unknown,
}

impl<T> Fact<T> {
    /// Whether the fact carries a value
    pub fn is_known(&self) -> bool {
        matches!(self, Fact::Known(_))
    }

    /// Whether the fact is the unknown marker
    pub fn is_unknown(&self) -> bool {
        matches!(self, Fact::Unknown)
    }

    /// Convert into an `Option`
    pub fn known(self) -> Option<T> {
        match self {
            Fact::Known(value) => Some(value),
            Fact::Unknown => None,
        }
    }

    /// Borrow the inner value
    pub fn as_ref(&self) -> Fact<&T> {
        match self {
            Fact::Known(value) => Fact::Known(value),
            Fact::Unknown => Fact::Unknown,
        }
    }

    /// Map a known value, keeping unknown as is
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fact<U> {
        match self {
            Fact::Known(value) => Fact::Known(f(value)),
            Fact::Unknown => Fact::Unknown,
        }
    }

    /// Keep this fact if known, otherwise fall back to `other`
    pub fn or(self, other: Fact<T>) -> Fact<T> {
        match self {
            Fact::Known(_) => self,
            Fact::Unknown => other,
        }
    }
}

impl<T: fmt::Display> Fact<T> {
    /// Render the fact as a store cell
    pub fn cell(&self) -> String {
        self.to_string()
    }
}

impl<T> Default for Fact<T> {
    fn default() -> Self {
        Fact::Unknown
    }
}

impl<T> From<Option<T>> for Fact<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Fact::Known(value),
            None => Fact::Unknown,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Fact<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Known(value) => value.fmt(f),
            Fact::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

/// Format an integer with comma thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A non-negative amount of won
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Create an amount from whole won
    pub fn new(won: u64) -> Self {
        Self(won)
    }

    /// Whole won
    pub fn won(&self) -> u64 {
        self.0
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&group_thousands(self.0))
    }
}

/// A calendar-valid date, always rendered `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactDate(NaiveDate);

impl FactDate {
    /// Build a date from its parts, `None` when the day does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl From<NaiveDate> for FactDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for FactDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Direction of a discount/premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Premium: issue price above the reference price
    Positive,
    /// Discount: issue price below the reference price
    Negative,
}

impl Sign {
    /// Direction implied by an issue price and a reference price
    ///
    /// `None` when the two prices are equal.
    pub fn from_prices(issue: Money, reference: Money) -> Option<Sign> {
        match issue.cmp(&reference) {
            std::cmp::Ordering::Greater => Some(Sign::Positive),
            std::cmp::Ordering::Less => Some(Sign::Negative),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A signed discount/premium rate in hundredths of a percent
///
/// Non-zero rates always render with an explicit sign (`-8.00%`, `+2.80%`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedRate {
    hundredths: i32,
}

impl SignedRate {
    /// The explicit zero rate
    pub fn zero() -> Self {
        Self { hundredths: 0 }
    }

    /// Build a rate from an unsigned magnitude and a direction
    pub fn new(magnitude_hundredths: u32, sign: Sign) -> Self {
        let magnitude = i32::try_from(magnitude_hundredths).unwrap_or(i32::MAX);
        let hundredths = match sign {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        };
        Self { hundredths }
    }

    /// Rate implied by an issue price relative to a reference price
    ///
    /// Rounded half away from zero to hundredths of a percent. `None` when
    /// the reference price is zero.
    pub fn between(issue: Money, reference: Money) -> Option<Self> {
        if reference.is_zero() {
            return None;
        }
        let reference = i128::from(reference.won());
        let numerator = (i128::from(issue.won()) - reference) * 10_000;
        let mut quotient = numerator / reference;
        let remainder = numerator % reference;
        if 2 * remainder.abs() >= reference {
            quotient += numerator.signum();
        }
        Some(Self {
            hundredths: i32::try_from(quotient).ok()?,
        })
    }

    /// Signed value in hundredths of a percent
    pub fn hundredths(&self) -> i32 {
        self.hundredths
    }

    /// Magnitude in hundredths of a percent
    pub fn magnitude(&self) -> u32 {
        self.hundredths.unsigned_abs()
    }

    /// Direction of the rate, `None` for zero
    pub fn sign(&self) -> Option<Sign> {
        match self.hundredths.signum() {
            1 => Some(Sign::Positive),
            -1 => Some(Sign::Negative),
            _ => None,
        }
    }

    /// Whether the rate is exactly zero
    pub fn is_zero(&self) -> bool {
        self.hundredths == 0
    }
}

impl fmt::Display for SignedRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.magnitude();
        let glyph = match self.sign() {
            Some(Sign::Positive) => "+",
            Some(Sign::Negative) => "-",
            None => "",
        };
        write!(f, "{}{}.{:02}%", glyph, magnitude / 100, magnitude % 100)
    }
}

/// An unsigned percentage in hundredths of a percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u32);

impl Percent {
    /// Create a percentage from hundredths of a percent
    pub fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Hundredths of a percent
    pub fn hundredths(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

/// Whether a contractual feature is mentioned in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// Mentioned
    Present,
    /// Document parsed, feature not mentioned
    Absent,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Present => f.write_str("있음"),
            Presence::Absent => f.write_str("없음"),
        }
    }
}
