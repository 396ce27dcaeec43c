//! Text normalization and per-type token validation
//!
//! Every parser here looks at one candidate string (the text following a
//! label) and answers with a [`Resolution`]: a validated value, an explicit
//! undetermined phrase, or no usable token at all.

use crate::config::ExtractorConfig;
use capraise_domain::{FactDate, Money, Sign};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// A validated value
    Value(T),
    /// The source explicitly says the value is undetermined or not applicable
    Undetermined,
    /// Nothing usable; the scan moves on to the next candidate
    NoToken,
}

impl<T> Resolution<T> {
    /// Whether the scan stops at this candidate
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::NoToken)
    }
}

/// NFKC-normalize, drop zero-width characters and collapse whitespace
pub fn normalize_text(raw: &str) -> String {
    let nfkc: String = raw
        .nfkc()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .collect();
    nfkc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text with whitespace removed and ASCII lowercased, mapped back to its source
///
/// Label patterns are matched against the stripped form, so `발 행 가 액` and
/// `Issue Price` match the same entries as `발행가액` and `issueprice`.
#[derive(Debug, Clone)]
pub struct StrippedText {
    /// The stripped text
    pub text: String,
    origin: Vec<usize>,
    source_len: usize,
}

impl StrippedText {
    /// Strip `source`
    pub fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len() + 1);
        for (offset, ch) in source.char_indices() {
            if ch.is_whitespace() {
                continue;
            }
            let lowered = ch.to_ascii_lowercase();
            for _ in 0..lowered.len_utf8() {
                origin.push(offset);
            }
            text.push(lowered);
        }
        origin.push(source.len());
        Self {
            text,
            origin,
            source_len: source.len(),
        }
    }

    /// Byte offset in the source of the stripped byte offset `index`
    pub fn source_offset(&self, index: usize) -> usize {
        self.origin.get(index).copied().unwrap_or(self.source_len)
    }
}

/// Text after `offset`, bounded to `max_chars` characters
pub fn window(text: &str, offset: usize, max_chars: usize) -> &str {
    let rest = text.get(offset..).unwrap_or("");
    match rest.char_indices().nth(max_chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

static LEADING_NOISE: Lazy<Regex> = Lazy::new(|| literal_regex(r"^(?:[\s:·]+|\([^()]{0,8}\)|(?:보통|기타|종류|우선)주식?)+"));

static UNDETERMINED: Lazy<Regex> = Lazy::new(|| {
    literal_regex(r"(?i)^(?:미정|미확정|해당\s*사항\s*없음|해당\s*없음|없음|-(?:\s*$|\s+[^\d\s.])|n/?a\b|undetermined|to\s+be\s+determined|tbd\b|not\s+applicable|none\b)")
});

static MONEY_TOKEN: Lazy<Regex> = Lazy::new(|| literal_regex(r"\d{1,3}(?:,\d{3})+|\d+"));

static SEPARATED_DATE: Lazy<Regex> = Lazy::new(|| literal_regex(r"(\d{4})\s*(?:[-./]|년)\s*(\d{1,2})\s*(?:[-./]|월)\s*(\d{1,2})\s*일?"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| literal_regex(r"\d+"));

static RATE_TOKEN: Lazy<Regex> = Lazy::new(|| literal_regex(r"([+\-−△▲]?)\s*(\d+(?:\.\d+)?)"));

/// Compile a pattern literal of this crate
pub(crate) fn literal_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern literal {}: {}", pattern, e))
}

/// Candidate with leading punctuation, unit parentheticals and share-class
/// qualifiers removed
pub fn candidate_head(candidate: &str) -> &str {
    match LEADING_NOISE.find(candidate) {
        Some(m) => &candidate[m.end()..],
        None => candidate,
    }
}

/// Whether the candidate opens with an undetermined/not-applicable phrase
pub fn is_undetermined(candidate: &str) -> bool {
    UNDETERMINED.is_match(candidate_head(candidate))
}

fn date_spans(text: &str, config: &ExtractorConfig) -> Vec<(usize, usize, FactDate)> {
    let mut spans = Vec::new();

    for caps in SEPARATED_DATE.captures_iter(text) {
        let (Some(whole), Some(y), Some(m), Some(d)) = (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        if preceded_by_digit(text, whole.start()) {
            continue;
        }
        if let Some(date) = checked_date(y.as_str(), m.as_str(), d.as_str(), config) {
            spans.push((whole.start(), whole.end(), date));
        }
    }

    for run in DIGIT_RUN.find_iter(text) {
        let digits = run.as_str();
        if digits.len() != 8 || spans.iter().any(|(s, e, _)| run.start() < *e && *s < run.end()) {
            continue;
        }
        if let Some(date) = checked_date(&digits[..4], &digits[4..6], &digits[6..], config) {
            spans.push((run.start(), run.end(), date));
        }
    }

    spans.sort_by_key(|(start, _, _)| *start);
    spans
}

fn checked_date(year: &str, month: &str, day: &str, config: &ExtractorConfig) -> Option<FactDate> {
    let year: u32 = year.parse().ok()?;
    if year < config.min_year || year > config.max_year {
        return None;
    }
    FactDate::from_ymd(i32::try_from(year).ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn preceded_by_digit(text: &str, offset: usize) -> bool {
    text[..offset].chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

/// First calendar-valid date in the candidate
pub fn parse_date(candidate: &str, config: &ExtractorConfig) -> Resolution<FactDate> {
    if is_undetermined(candidate) {
        return Resolution::Undetermined;
    }
    match date_spans(candidate, config).first() {
        Some((_, _, date)) => Resolution::Value(*date),
        None => Resolution::NoToken,
    }
}

/// First plausible price in the candidate
///
/// Percentages, decimals, dates, bare years and amounts below `min_price`
/// are never prices.
pub fn parse_money(candidate: &str, config: &ExtractorConfig) -> Resolution<Money> {
    if is_undetermined(candidate) {
        return Resolution::Undetermined;
    }
    let dates = date_spans(candidate, config);

    for token in MONEY_TOKEN.find_iter(candidate) {
        if dates.iter().any(|(s, e, _)| token.start() < *e && *s < token.end()) {
            continue;
        }
        let after = candidate[token.end()..].trim_start();
        if after.starts_with('%') {
            continue;
        }
        let mut following = candidate[token.end()..].chars();
        if following.next() == Some('.') && following.next().is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }
        if candidate[..token.start()].ends_with('.') && preceded_by_digit(candidate, token.start() - 1) {
            continue;
        }

        let digits = token.as_str();
        let Ok(value) = digits.replace(',', "").parse::<u64>() else {
            continue;
        };
        if digits.len() == 4 && is_plausible_year(value, config) {
            continue;
        }
        if value < config.min_price {
            continue;
        }
        return Resolution::Value(Money::new(value));
    }
    Resolution::NoToken
}

fn is_plausible_year(value: u64, config: &ExtractorConfig) -> bool {
    value >= u64::from(config.min_year) && value <= u64::from(config.max_year)
}

/// A rate token before sign resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRate {
    /// Magnitude in hundredths of a percent
    pub magnitude: u32,
    /// Explicit glyph on the token
    pub glyph: Option<Sign>,
}

/// First rate-shaped token in the candidate
///
/// An undetermined phrase resolves to `Undetermined`, which the engine turns
/// into an explicit zero. A magnitude above `max_rate_percent` is rejected.
pub fn parse_rate(candidate: &str, config: &ExtractorConfig) -> Resolution<RawRate> {
    if is_undetermined(candidate) {
        return Resolution::Undetermined;
    }
    let Some(caps) = RATE_TOKEN.captures(candidate_head(candidate)) else {
        return Resolution::NoToken;
    };
    let glyph = match caps.get(1).map(|m| m.as_str()) {
        Some("+") | Some("▲") => Some(Sign::Positive),
        Some("-") | Some("−") | Some("△") => Some(Sign::Negative),
        _ => None,
    };
    let Some(magnitude) = caps.get(2).and_then(|m| parse_hundredths(m.as_str())) else {
        return Resolution::NoToken;
    };
    if magnitude > config.max_rate_percent.saturating_mul(100) {
        return Resolution::NoToken;
    }
    Resolution::Value(RawRate { magnitude, glyph })
}

/// First `N%` within the text, at most `max_percent`
pub fn first_percent(text: &str, max_percent: u32) -> Option<u32> {
    static PERCENT: Lazy<Regex> = Lazy::new(|| {
        literal_regex(r"(\d{1,3}(?:\.\d+)?)\s*%")
    });
    PERCENT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| parse_hundredths(m.as_str())))
        .find(|hundredths| *hundredths <= max_percent.saturating_mul(100))
}

/// Parse a decimal number into hundredths, rounding half up on the third decimal
pub fn parse_hundredths(number: &str) -> Option<u32> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let whole: u32 = whole.parse().ok()?;
    let mut digits = fraction.chars().filter_map(|c| c.to_digit(10));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);
    whole
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths + u32::from(round_up))
}
