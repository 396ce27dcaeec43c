//! Filing module - metadata, typed facts and extracted facts for one disclosure

use crate::category::{MarketSegment, ReportCategory};
use crate::fact::{Fact, FactDate, Money, Percent, Presence, SignedRate};
use std::fmt;

/// Receipt number of a filing
///
/// Globally unique and immutable; the identity key for deduplication and
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilingKey(String);

impl FilingKey {
    /// Create a key from a receipt number
    ///
    /// # Examples
    ///
    /// ```
    /// use capraise_domain::FilingKey;
    ///
    /// let key = FilingKey::new("20240305000123").unwrap();
    /// assert_eq!(key.as_str(), "20240305000123");
    /// assert!(FilingKey::new("").is_err());
    /// ```
    pub fn new(receipt_no: impl Into<String>) -> Result<Self, String> {
        let receipt_no = receipt_no.into().trim().to_string();
        if receipt_no.is_empty() {
            return Err("receipt number is empty".to_string());
        }
        if !receipt_no.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("receipt number is not numeric: {}", receipt_no));
        }
        Ok(Self(receipt_no))
    }

    /// The receipt number
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory-level metadata of a filing
#[derive(Debug, Clone, PartialEq)]
pub struct FilingMetadata {
    /// Identity key
    pub key: FilingKey,

    /// Issuer name
    pub company_name: String,

    /// Market the issuer is listed on
    pub market: MarketSegment,

    /// Category derived from the report title
    pub category: ReportCategory,

    /// Raw report title as published
    pub report_title: String,

    /// Issuer code used to query the detail endpoint
    pub issuer_code: String,

    /// Date the filing was received
    pub receipt_date: Fact<FactDate>,
}

/// Amounts raised per declared funding purpose
///
/// The detail endpoint reports absent purposes as `-`, which is a declared
/// zero rather than an unknown amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundingPurposes {
    /// Facility investment
    pub facility: Money,
    /// Business acquisition
    pub business_acquisition: Money,
    /// Operating funds
    pub operating: Money,
    /// Debt repayment
    pub debt_repayment: Money,
    /// Acquisition of other companies' securities
    pub other_securities: Money,
    /// Anything else
    pub other: Money,
}

impl FundingPurposes {
    fn labelled(&self) -> [(&'static str, Money); 6] {
        [
            ("시설", self.facility),
            ("영업양수", self.business_acquisition),
            ("운영", self.operating),
            ("채무상환", self.debt_repayment),
            ("타법인증권", self.other_securities),
            ("기타", self.other),
        ]
    }

    /// Sum of all purposes
    pub fn total(&self) -> Money {
        let won = self
            .labelled()
            .iter()
            .fold(0u64, |acc, (_, amount)| acc.saturating_add(amount.won()));
        Money::new(won)
    }

    /// Comma-separated labels of the non-zero purposes, in fixed order
    pub fn summary(&self) -> Option<String> {
        let labels: Vec<&str> = self
            .labelled()
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(label, _)| *label)
            .collect();
        if labels.is_empty() {
            None
        } else {
            Some(labels.join(", "))
        }
    }
}

/// Typed facts of a rights issue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RightsIssueTerms {
    /// Issuance method (e.g. 제3자배정증자)
    pub method: Fact<String>,
    /// New common shares
    pub new_common_shares: Fact<u64>,
    /// New shares of other classes
    pub new_other_shares: Fact<u64>,
    /// Common shares outstanding before the issue
    pub prior_common_shares: Fact<u64>,
    /// Other shares outstanding before the issue
    pub prior_other_shares: Fact<u64>,
    /// Funding purposes
    pub funding: FundingPurposes,
}

impl RightsIssueTerms {
    /// Total new shares, known when at least one class is known
    pub fn new_shares(&self) -> Fact<u64> {
        sum_known(self.new_common_shares, self.new_other_shares)
    }

    /// Total shares before the issue, known when at least one class is known
    pub fn prior_shares(&self) -> Fact<u64> {
        sum_known(self.prior_common_shares, self.prior_other_shares)
    }
}

fn sum_known(a: Fact<u64>, b: Fact<u64>) -> Fact<u64> {
    match (a, b) {
        (Fact::Unknown, Fact::Unknown) => Fact::Unknown,
        (a, b) => Fact::Known(
            a.known()
                .unwrap_or(0)
                .saturating_add(b.known().unwrap_or(0)),
        ),
    }
}

/// Typed facts of a convertible or exchangeable bond
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondTerms {
    /// Series number (회차)
    pub series: Fact<String>,
    /// Bond kind description
    pub kind: Fact<String>,
    /// Face amount
    pub face_amount: Fact<Money>,
    /// Coupon rate as published
    pub coupon_rate: Fact<String>,
    /// Yield to maturity as published
    pub yield_to_maturity: Fact<String>,
    /// Maturity date
    pub maturity_date: Fact<FactDate>,
    /// Conversion or exchange price
    pub exercise_price: Fact<Money>,
    /// Shares issuable on exercise
    pub exercise_shares: Fact<u64>,
    /// Ratio of exercise shares to total shares, as published
    pub share_ratio: Fact<String>,
    /// First day the exercise right can be claimed
    pub exercise_start: Fact<FactDate>,
    /// Last day the exercise right can be claimed
    pub exercise_end: Fact<FactDate>,
    /// Lowest price the exercise price may be reset to
    pub refixing_floor: Fact<Money>,
    /// Offering method (public / private)
    pub offering_method: Fact<String>,
    /// Payment date
    pub payment_date: Fact<FactDate>,
    /// Board-resolution date
    pub board_resolution_date: Fact<FactDate>,
    /// Funding purposes
    pub funding: FundingPurposes,
}

impl BondTerms {
    /// Product name such as `제3회차 무기명식 이권부 무보증 사모 전환사채`
    pub fn product_name(&self) -> Fact<String> {
        match (&self.series, &self.kind) {
            (Fact::Known(series), Fact::Known(kind)) => Fact::Known(format!("제{}회차 {}", series, kind)),
            (Fact::Known(series), Fact::Unknown) => Fact::Known(format!("제{}회차", series)),
            (Fact::Unknown, kind) => kind.clone(),
        }
    }
}

/// Machine-provided facts, by category family
#[derive(Debug, Clone, PartialEq)]
pub enum TypedFacts {
    /// Rights-issue detail record
    RightsIssue(RightsIssueTerms),
    /// Convertible/exchangeable bond detail record
    Bond(BondTerms),
}

/// One record returned by the detail endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    /// Identity key the record belongs to
    pub key: FilingKey,
    /// Issuer name as reported by the detail endpoint
    pub company_name: String,
    /// The typed facts
    pub facts: TypedFacts,
}

/// Cell text standing for "see the source document"
pub const SEE_SOURCE_MARKER: &str = "원문참조";

/// Investor/allottee description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Investor {
    /// Named private placement, with the allottee snippet when found
    ThirdParty {
        /// Bounded snippet naming the allottee
        allottee: Option<String>,
    },
    /// Pro-rata allotment to existing holders
    Shareholders,
    /// General public offering
    PublicOffering,
    /// Nothing recognizable; see the source document
    SeeSource,
}

impl fmt::Display for Investor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Investor::ThirdParty { allottee: Some(name) } => write!(f, "제3자배정: {}", name),
            Investor::ThirdParty { allottee: None } => write!(f, "제3자배정 ({})", SEE_SOURCE_MARKER),
            Investor::Shareholders => f.write_str("주주배정"),
            Investor::PublicOffering => f.write_str("일반공모"),
            Investor::SeeSource => f.write_str(SEE_SOURCE_MARKER),
        }
    }
}

/// Embedded options of an equity-linked bond
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BondOptions {
    /// Holder's early-redemption right (put)
    pub put_option: Fact<Presence>,
    /// Issuer's call right
    pub call_option: Fact<Presence>,
    /// Share of the issue the call may cover
    pub call_ratio: Fact<Percent>,
    /// Yield guaranteed when the call is exercised
    pub yield_to_call: Fact<Percent>,
}

/// Facts recovered from the document body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFacts {
    /// Board-resolution date
    pub board_resolution_date: Fact<FactDate>,
    /// Issue price per share
    pub issue_price: Fact<Money>,
    /// Reference (benchmark) price per share
    pub reference_price: Fact<Money>,
    /// Signed discount/premium rate
    pub discount_rate: Fact<SignedRate>,
    /// Subscription date
    pub subscription_date: Fact<FactDate>,
    /// Payment date
    pub payment_date: Fact<FactDate>,
    /// Dividend record (base) date of the new shares
    pub dividend_record_date: Fact<FactDate>,
    /// Listing date of the new shares
    pub listing_date: Fact<FactDate>,
    /// Investor/allottee description
    pub investor: Fact<Investor>,
    /// Bond options, unknown for rights issues
    pub bond_options: BondOptions,
}

impl ExtractedFacts {
    /// Every field unknown
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Number of known fields, for logging
    pub fn known_count(&self) -> usize {
        [
            self.board_resolution_date.is_known(),
            self.issue_price.is_known(),
            self.reference_price.is_known(),
            self.discount_rate.is_known(),
            self.subscription_date.is_known(),
            self.payment_date.is_known(),
            self.dividend_record_date.is_known(),
            self.listing_date.is_known(),
            self.investor.is_known(),
            self.bond_options.put_option.is_known(),
            self.bond_options.call_option.is_known(),
            self.bond_options.call_ratio.is_known(),
            self.bond_options.yield_to_call.is_known(),
        ]
        .iter()
        .filter(|known| **known)
        .count()
    }
}

/// Raw document container as downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArchive {
    /// Archive bytes (a ZIP of markup documents, or bare markup)
    pub bytes: Vec<u8>,
}

impl DocumentArchive {
    /// Wrap downloaded bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was downloaded
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_key_validation() {
        assert!(FilingKey::new("20240305000123").is_ok());
        assert!(FilingKey::new("  20240305000123 ").is_ok());
        assert!(FilingKey::new("2024-03").is_err());
        assert!(FilingKey::new("   ").is_err());
    }

    #[test]
    fn test_funding_summary_and_total() {
        let funding = FundingPurposes {
            facility: Money::new(1_000_000_000),
            operating: Money::new(500_000_000),
            ..Default::default()
        };
        assert_eq!(funding.total(), Money::new(1_500_000_000));
        assert_eq!(funding.summary().as_deref(), Some("시설, 운영"));
        assert_eq!(FundingPurposes::default().summary(), None);
    }

    #[test]
    fn test_new_shares_sum() {
        let terms = RightsIssueTerms {
            new_common_shares: Fact::Known(1_000),
            new_other_shares: Fact::Unknown,
            ..Default::default()
        };
        assert_eq!(terms.new_shares(), Fact::Known(1_000));
        assert_eq!(RightsIssueTerms::default().prior_shares(), Fact::Unknown);
    }

    #[test]
    fn test_product_name() {
        let terms = BondTerms {
            series: Fact::Known("3".to_string()),
            kind: Fact::Known("무기명식 이권부 무보증 사모 전환사채".to_string()),
            ..Default::default()
        };
        assert_eq!(
            terms.product_name(),
            Fact::Known("제3회차 무기명식 이권부 무보증 사모 전환사채".to_string())
        );
        assert_eq!(BondTerms::default().product_name(), Fact::Unknown);
    }

    #[test]
    fn test_investor_display() {
        let investor = Investor::ThirdParty {
            allottee: Some("주식회사 한빛투자".to_string()),
        };
        assert_eq!(investor.to_string(), "제3자배정: 주식회사 한빛투자");
        assert_eq!(Investor::SeeSource.to_string(), "원문참조");
    }

    #[test]
    fn test_known_count() {
        let mut facts = ExtractedFacts::unknown();
        assert_eq!(facts.known_count(), 0);
        facts.issue_price = Fact::Known(Money::new(9_200));
        assert_eq!(facts.known_count(), 1);
    }
}
