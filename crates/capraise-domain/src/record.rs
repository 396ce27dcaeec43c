//! Filing record - metadata, typed facts and extracted facts merged into one row

use crate::category::ReportCategory;
use crate::fact::{Fact, Money, Percent, UNKNOWN_MARKER};
use crate::filing::{BondTerms, ExtractedFacts, FilingMetadata, RightsIssueTerms, TypedFacts};
use crate::schema::{Column, RowSchema};

/// One store row, cells in schema order
pub type Row = Vec<String>;

/// Link prefix for the source document; the receipt number is appended
pub const DEFAULT_SOURCE_LINK_BASE: &str = "https://dart.fss.or.kr/dsaf001/main.do?rcpNo=";

/// Everything known about one filing in the current run
///
/// Ephemeral: rebuilt every run and projected onto its category's
/// [`RowSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilingRecord {
    /// Directory metadata
    pub metadata: FilingMetadata,
    /// Facts from the detail endpoint
    pub typed: TypedFacts,
    /// Facts recovered from the document body
    pub extracted: ExtractedFacts,
}

impl FilingRecord {
    /// Category of the record
    pub fn category(&self) -> ReportCategory {
        self.metadata.category
    }

    /// Project the record onto the default schema of its category
    pub fn to_row(&self, link_base: &str) -> Row {
        self.to_row_with(&RowSchema::for_category(self.category()), link_base)
    }

    /// Project the record onto a given schema
    pub fn to_row_with(&self, schema: &RowSchema, link_base: &str) -> Row {
        schema
            .columns()
            .iter()
            .map(|column| self.cell(*column, link_base))
            .collect()
    }

    fn rights(&self) -> Option<&RightsIssueTerms> {
        match &self.typed {
            TypedFacts::RightsIssue(terms) => Some(terms),
            TypedFacts::Bond(_) => None,
        }
    }

    fn bond(&self) -> Option<&BondTerms> {
        match &self.typed {
            TypedFacts::Bond(terms) => Some(terms),
            TypedFacts::RightsIssue(_) => None,
        }
    }

    /// Render one column
    ///
    /// Columns that do not apply to the record's family render as unknown.
    pub fn cell(&self, column: Column, link_base: &str) -> String {
        let meta = &self.metadata;
        let ext = &self.extracted;
        let rights = self.rights();
        let bond = self.bond();

        match column {
            Column::Key => meta.key.to_string(),
            Column::CompanyName => meta.company_name.clone(),
            Column::Market => meta.market.label().to_string(),
            Column::ReportTitle => meta.report_title.clone(),
            Column::BoardResolutionDate => bond
                .map(|b| b.board_resolution_date)
                .unwrap_or_default()
                .or(ext.board_resolution_date)
                .cell(),

            Column::IssueMethod => rights.map(|r| r.method.cell()).unwrap_or_else(marker),
            Column::ShareClass => rights
                .map(|r| match r.new_common_shares {
                    Fact::Known(n) if n > 0 => "보통주".to_string(),
                    _ => "기타주".to_string(),
                })
                .unwrap_or_else(marker),
            Column::NewShares => rights
                .map(|r| r.new_shares().map(Money::new).cell())
                .unwrap_or_else(marker),
            Column::IssuePrice => ext.issue_price.cell(),
            Column::ReferencePrice => ext.reference_price.cell(),
            Column::FundingTotal => rights
                .map(|r| eok_won(r.funding.total()))
                .or_else(|| bond.map(|b| eok_won(b.funding.total())))
                .unwrap_or_else(marker),
            Column::DiscountRate => ext.discount_rate.cell(),
            Column::PriorShares => rights
                .map(|r| r.prior_shares().map(Money::new).cell())
                .unwrap_or_else(marker),
            Column::IssueRatio => rights
                .map(|r| issue_ratio(r.new_shares(), r.prior_shares()).cell())
                .unwrap_or_else(marker),
            Column::SubscriptionDate => ext.subscription_date.cell(),
            Column::DividendRecordDate => ext.dividend_record_date.cell(),
            Column::ListingDate => ext.listing_date.cell(),

            Column::BondType => self.category().short_code().to_string(),
            Column::FaceAmount => bond.map(|b| b.face_amount.cell()).unwrap_or_else(marker),
            Column::Coupon => bond.map(|b| b.coupon_rate.cell()).unwrap_or_else(marker),
            Column::YieldToMaturity => bond
                .map(|b| b.yield_to_maturity.cell())
                .unwrap_or_else(marker),
            Column::Maturity => bond.map(|b| b.maturity_date.cell()).unwrap_or_else(marker),
            Column::ExerciseStart => bond.map(|b| b.exercise_start.cell()).unwrap_or_else(marker),
            Column::ExerciseEnd => bond.map(|b| b.exercise_end.cell()).unwrap_or_else(marker),
            Column::PutOption => ext.bond_options.put_option.cell(),
            Column::CallOption => ext.bond_options.call_option.cell(),
            Column::CallRatio => ext.bond_options.call_ratio.cell(),
            Column::YieldToCall => ext.bond_options.yield_to_call.cell(),
            Column::OfferingMethod => bond
                .map(|b| b.offering_method.cell())
                .unwrap_or_else(marker),
            Column::ProductName => bond.map(|b| b.product_name().cell()).unwrap_or_else(marker),
            Column::ExercisePrice => bond.map(|b| b.exercise_price.cell()).unwrap_or_else(marker),
            Column::ExerciseShares => bond
                .map(|b| b.exercise_shares.map(Money::new).cell())
                .unwrap_or_else(marker),
            Column::ShareRatio => bond.map(|b| b.share_ratio.cell()).unwrap_or_else(marker),
            Column::RefixingFloor => bond.map(|b| b.refixing_floor.cell()).unwrap_or_else(marker),
            Column::PaymentDate => bond
                .map(|b| b.payment_date)
                .unwrap_or_default()
                .or(ext.payment_date)
                .cell(),

            Column::FundingPurpose => rights
                .map(|r| r.funding)
                .or_else(|| bond.map(|b| b.funding))
                .and_then(|funding| funding.summary())
                .unwrap_or_else(marker),
            Column::Investor => ext.investor.cell(),
            Column::SourceLink => format!("{}{}", link_base, meta.key),
        }
    }
}

fn marker() -> String {
    UNKNOWN_MARKER.to_string()
}

/// Amount in 억원 (10^8 won), two decimals, rounded half up
fn eok_won(amount: Money) -> String {
    let hundredths = (u128::from(amount.won()) + 500_000) / 1_000_000;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// New shares as a percentage of prior shares
fn issue_ratio(new: Fact<u64>, prior: Fact<u64>) -> Fact<Percent> {
    match (new, prior) {
        (Fact::Known(new), Fact::Known(prior)) if prior > 0 => {
            let hundredths = (u128::from(new) * 10_000 + u128::from(prior) / 2) / u128::from(prior);
            u32::try_from(hundredths)
                .map(Percent::from_hundredths)
                .ok()
                .into()
        }
        _ => Fact::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::MarketSegment;
    use crate::fact::{FactDate, Sign, SignedRate};
    use crate::filing::{FilingKey, FundingPurposes, Investor};

    fn metadata(category: ReportCategory) -> FilingMetadata {
        FilingMetadata {
            key: FilingKey::new("20240305000123").unwrap(),
            company_name: "한빛전자".to_string(),
            market: MarketSegment::Kosdaq,
            category,
            report_title: "주요사항보고서(유상증자결정)".to_string(),
            issuer_code: "00123456".to_string(),
            receipt_date: Fact::Unknown,
        }
    }

    fn rights_record() -> FilingRecord {
        let terms = RightsIssueTerms {
            method: Fact::Known("제3자배정증자".to_string()),
            new_common_shares: Fact::Known(1_000_000),
            new_other_shares: Fact::Unknown,
            prior_common_shares: Fact::Known(10_000_000),
            prior_other_shares: Fact::Known(0),
            funding: FundingPurposes {
                operating: Money::new(9_200_000_000),
                ..Default::default()
            },
        };
        let extracted = ExtractedFacts {
            issue_price: Fact::Known(Money::new(9_200)),
            reference_price: Fact::Known(Money::new(10_000)),
            discount_rate: Fact::Known(SignedRate::new(800, Sign::Negative)),
            payment_date: Fact::Known(FactDate::from_ymd(2024, 4, 1).unwrap()),
            investor: Fact::Known(Investor::ThirdParty {
                allottee: Some("한빛투자".to_string()),
            }),
            ..Default::default()
        };
        FilingRecord {
            metadata: metadata(ReportCategory::RightsIssue),
            typed: TypedFacts::RightsIssue(terms),
            extracted,
        }
    }

    #[test]
    fn test_rights_issue_row() {
        let row = rights_record().to_row(DEFAULT_SOURCE_LINK_BASE);
        assert_eq!(row.len(), 21);
        assert_eq!(row[0], "20240305000123");
        assert_eq!(row[2], "코스닥");
        assert_eq!(row[4], UNKNOWN_MARKER);
        assert_eq!(row[6], "보통주");
        assert_eq!(row[7], "1,000,000");
        assert_eq!(row[8], "9,200");
        assert_eq!(row[9], "10,000");
        assert_eq!(row[10], "92.00");
        assert_eq!(row[11], "-8.00%");
        assert_eq!(row[13], "10.00%");
        assert_eq!(row[15], "2024-04-01");
        assert_eq!(row[18], "운영");
        assert_eq!(row[19], "제3자배정: 한빛투자");
        assert!(row[20].ends_with("rcpNo=20240305000123"));
    }

    #[test]
    fn test_typed_dates_win_for_bonds() {
        let terms = BondTerms {
            board_resolution_date: Fact::Known(FactDate::from_ymd(2024, 3, 4).unwrap()),
            payment_date: Fact::Unknown,
            ..Default::default()
        };
        let extracted = ExtractedFacts {
            board_resolution_date: Fact::Known(FactDate::from_ymd(2024, 3, 1).unwrap()),
            payment_date: Fact::Known(FactDate::from_ymd(2024, 3, 20).unwrap()),
            ..Default::default()
        };
        let record = FilingRecord {
            metadata: metadata(ReportCategory::ConvertibleBond),
            typed: TypedFacts::Bond(terms),
            extracted,
        };
        assert_eq!(record.cell(Column::BoardResolutionDate, ""), "2024-03-04");
        assert_eq!(record.cell(Column::PaymentDate, ""), "2024-03-20");
        assert_eq!(record.cell(Column::BondType, ""), "CB");
        assert_eq!(record.cell(Column::FundingPurpose, ""), UNKNOWN_MARKER);
    }

    #[test]
    fn test_issue_ratio_unknown_without_prior_shares() {
        assert_eq!(issue_ratio(Fact::Known(10), Fact::Known(0)), Fact::Unknown);
        assert_eq!(issue_ratio(Fact::Known(10), Fact::Unknown), Fact::Unknown);
        assert_eq!(
            issue_ratio(Fact::Known(1), Fact::Known(3)),
            Fact::Known(Percent::from_hundredths(3_333))
        );
    }

    #[test]
    fn test_eok_won_rounding() {
        assert_eq!(eok_won(Money::new(0)), "0.00");
        assert_eq!(eok_won(Money::new(150_000_000)), "1.50");
        assert_eq!(eok_won(Money::new(123_456_789)), "1.23");
    }
}
