//! Declarative label-pattern table
//!
//! One entry per field. Patterns are matched against label text with all
//! whitespace removed and ASCII lowercased (see [`StrippedText`]), so the
//! table only needs one spelling per wording.

use crate::error::ExtractorError;
use crate::normalize::StrippedText;
use regex::Regex;

/// A field recovered from the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Board-resolution date
    BoardResolutionDate,
    /// Issue price per share
    IssuePrice,
    /// Reference price per share
    ReferencePrice,
    /// Discount/premium rate
    DiscountRate,
    /// Subscription date
    SubscriptionDate,
    /// Payment date
    PaymentDate,
    /// Dividend record date
    DividendRecordDate,
    /// Listing date
    ListingDate,
    /// Third-party allottee
    Allottee,
}

/// One row of the label table
#[derive(Debug, Clone, Copy)]
pub struct LabelPattern {
    /// Field the label introduces
    pub field: FieldKind,
    /// Regex a label must match
    pub include: &'static str,
    /// Regex a label must not match
    pub exclude: Option<&'static str>,
}

/// The default label table
pub const LABEL_PATTERNS: &[LabelPattern] = &[
    LabelPattern {
        field: FieldKind::BoardResolutionDate,
        include: r"이사회결의(\(결정\))?일|boardresolutiondate|dateofboardresolution",
        exclude: None,
    },
    LabelPattern {
        field: FieldKind::IssuePrice,
        include: r"발행가(액|격)?|issueprice|offer(ing)?price",
        exclude: Some(r"기준|reference|base|산정|방법|method|총|할인|할증|discount|premium|예정일|확정일|결정일"),
    },
    LabelPattern {
        field: FieldKind::ReferencePrice,
        include: r"기준(주가|발행가(액)?|가액|단가|주당가액)|referenceprice|baseprice|benchmarkprice",
        exclude: Some(r"할인|할증|discount|premium|산정|방법|method|기산일"),
    },
    LabelPattern {
        field: FieldKind::DiscountRate,
        include: r"(할인|할증)(율|률)(또는(할인|할증)(율|률))?|discount(rate)?|premium(rate)?",
        exclude: Some(r"산정방법|method"),
    },
    LabelPattern {
        field: FieldKind::SubscriptionDate,
        include: r"청약(예정)?(기)?일|subscriptiondate",
        exclude: None,
    },
    LabelPattern {
        field: FieldKind::PaymentDate,
        include: r"납입(예정)?(기)?일|paymentdate|dateofpayment",
        exclude: None,
    },
    LabelPattern {
        field: FieldKind::DividendRecordDate,
        include: r"배당기산일|dividend(record|base)date",
        exclude: None,
    },
    LabelPattern {
        field: FieldKind::ListingDate,
        include: r"상장(예정)?일|listingdate",
        exclude: None,
    },
    LabelPattern {
        field: FieldKind::Allottee,
        include: r"배정대상자|발행대상자|allottee",
        exclude: Some(r"선정|경위|관계|변동"),
    },
];

/// Characters of context checked against exclusions in free text
const CONTEXT_BEFORE: usize = 6;
const CONTEXT_AFTER: usize = 4;

#[derive(Debug)]
struct CompiledLabel {
    field: FieldKind,
    include: Regex,
    exclude: Option<Regex>,
}

/// Compiled label table
#[derive(Debug)]
pub struct LabelTable {
    labels: Vec<CompiledLabel>,
    max_label_chars: usize,
}

impl LabelTable {
    /// Compile a table
    pub fn new(patterns: &[LabelPattern], max_label_chars: usize) -> Result<Self, ExtractorError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| ExtractorError::Config(format!("invalid label pattern {}: {}", pattern, e)))
        };
        let labels = patterns
            .iter()
            .map(|p| {
                Ok(CompiledLabel {
                    field: p.field,
                    include: compile(p.include)?,
                    exclude: p.exclude.map(|pattern| compile(pattern)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, ExtractorError>>()?;
        Ok(Self {
            labels,
            max_label_chars,
        })
    }

    /// Compile the default table
    pub fn default_table(max_label_chars: usize) -> Result<Self, ExtractorError> {
        Self::new(LABEL_PATTERNS, max_label_chars)
    }

    fn for_field(&self, field: FieldKind) -> impl Iterator<Item = &CompiledLabel> {
        self.labels.iter().filter(move |l| l.field == field)
    }

    fn short_enough(&self, key: &str) -> bool {
        !key.is_empty() && key.chars().count() <= self.max_label_chars
    }

    /// Whether a stripped cell text is a label for `field`
    pub fn matches_cell(&self, field: FieldKind, key: &str) -> bool {
        self.short_enough(key) && self.for_field(field).any(|l| l.accepts(key))
    }

    /// Whether a stripped cell text is a label for any field
    pub fn is_label_cell(&self, key: &str) -> bool {
        self.short_enough(key) && self.labels.iter().any(|l| l.accepts(key))
    }

    /// Text of a label cell after the label itself
    pub fn remainder<'a>(&self, field: FieldKind, cell_text: &'a str) -> &'a str {
        let stripped = StrippedText::new(cell_text);
        self.for_field(field)
            .filter(|l| l.accepts(&stripped.text))
            .find_map(|l| l.include.find(&stripped.text))
            .map(|m| &cell_text[stripped.source_offset(m.end())..])
            .unwrap_or("")
    }

    /// Label occurrences for `field` in free text, as stripped byte ranges
    pub fn find_in_text(&self, field: FieldKind, stripped: &StrippedText) -> Vec<(usize, usize)> {
        let mut hits: Vec<(usize, usize)> = self
            .for_field(field)
            .flat_map(|label| {
                label
                    .include
                    .find_iter(&stripped.text)
                    .filter(|m| !label.excluded_in(&stripped.text, m.start(), m.end()))
                    .map(|m| (m.start(), m.end()))
                    .collect::<Vec<_>>()
            })
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Stripped byte offset of the earliest label of any field
    pub fn first_label_in_text(&self, stripped: &StrippedText) -> Option<usize> {
        self.labels
            .iter()
            .filter_map(|label| {
                label
                    .include
                    .find_iter(&stripped.text)
                    .find(|m| !label.excluded_in(&stripped.text, m.start(), m.end()))
                    .map(|m| m.start())
            })
            .min()
    }
}

impl CompiledLabel {
    fn accepts(&self, key: &str) -> bool {
        self.include.is_match(key) && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(key))
    }

    fn excluded_in(&self, text: &str, start: usize, end: usize) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        let from = text[..start]
            .char_indices()
            .rev()
            .take(CONTEXT_BEFORE)
            .last()
            .map_or(start, |(i, _)| i);
        let to = text[end..]
            .char_indices()
            .nth(CONTEXT_AFTER)
            .map_or(text.len(), |(i, _)| end + i);
        exclude.is_match(&text[from..to])
    }
}

/// Sign implied by rate-label wording: premium-only reads positive,
/// discount or combined wording reads negative
pub fn rate_label_sign(label: &str) -> capraise_domain::Sign {
    let discount = label.contains("할인") || label.contains("discount");
    let premium = label.contains("할증") || label.contains("premium");
    if premium && !discount {
        capraise_domain::Sign::Positive
    } else {
        capraise_domain::Sign::Negative
    }
}
