//! Row schema - the positional column layout of each category table
//!
//! Column order is part of the store contract: reconciliation compares rows
//! position by position. Header labels are deployment configuration and may
//! be overridden, but the column count never changes.

use crate::category::ReportCategory;

/// One column of a category table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Column {
    // Shared head
    Key,
    CompanyName,
    Market,
    ReportTitle,
    BoardResolutionDate,

    // Rights issue
    IssueMethod,
    ShareClass,
    NewShares,
    IssuePrice,
    ReferencePrice,
    FundingTotal,
    DiscountRate,
    PriorShares,
    IssueRatio,
    SubscriptionDate,
    DividendRecordDate,
    ListingDate,

    // Bonds
    BondType,
    FaceAmount,
    Coupon,
    YieldToMaturity,
    Maturity,
    ExerciseStart,
    ExerciseEnd,
    PutOption,
    CallOption,
    CallRatio,
    YieldToCall,
    OfferingMethod,
    ProductName,
    ExercisePrice,
    ExerciseShares,
    ShareRatio,
    RefixingFloor,

    // Both families
    PaymentDate,

    // Shared tail
    FundingPurpose,
    Investor,
    SourceLink,
}

impl Column {
    /// Default header label
    pub fn label(&self) -> &'static str {
        match self {
            Column::Key => "접수번호",
            Column::CompanyName => "회사명",
            Column::Market => "시장구분",
            Column::ReportTitle => "보고서명",
            Column::BoardResolutionDate => "이사회결의일",
            Column::IssueMethod => "증자방식",
            Column::ShareClass => "발행상품",
            Column::NewShares => "신규발행주식수",
            Column::IssuePrice => "확정발행가(원)",
            Column::ReferencePrice => "기준주가",
            Column::FundingTotal => "자금조달총액(억원)",
            Column::DiscountRate => "할인(할증)률",
            Column::PriorShares => "증자전주식수",
            Column::IssueRatio => "증자비율",
            Column::SubscriptionDate => "청약일",
            Column::DividendRecordDate => "배당기산일",
            Column::ListingDate => "상장일",
            Column::BondType => "구분",
            Column::FaceAmount => "권면총액(원)",
            Column::Coupon => "Coupon",
            Column::YieldToMaturity => "YTM",
            Column::Maturity => "만기",
            Column::ExerciseStart => "행사청구시작",
            Column::ExerciseEnd => "행사청구종료",
            Column::PutOption => "Put Option",
            Column::CallOption => "Call Option",
            Column::CallRatio => "Call 비율",
            Column::YieldToCall => "YTC",
            Column::OfferingMethod => "모집방식",
            Column::ProductName => "발행상품",
            Column::ExercisePrice => "행사가액(원)",
            Column::ExerciseShares => "행사주식수",
            Column::ShareRatio => "주식총수대비비율",
            Column::RefixingFloor => "Refixing Floor",
            Column::PaymentDate => "납입일",
            Column::FundingPurpose => "자금용도",
            Column::Investor => "투자자",
            Column::SourceLink => "링크",
        }
    }

    /// Columns this column's cell is computed from
    ///
    /// The discount rate is implied by the two prices whenever the filing
    /// states no rate of its own.
    pub fn derived_from(&self) -> &'static [Column] {
        match self {
            Column::DiscountRate => &[Column::IssuePrice, Column::ReferencePrice],
            _ => &[],
        }
    }
}

const HEAD: [Column; 5] = [
    Column::Key,
    Column::CompanyName,
    Column::Market,
    Column::ReportTitle,
    Column::BoardResolutionDate,
];

const TAIL: [Column; 3] = [Column::FundingPurpose, Column::Investor, Column::SourceLink];

const RIGHTS_ISSUE_BODY: [Column; 13] = [
    Column::IssueMethod,
    Column::ShareClass,
    Column::NewShares,
    Column::IssuePrice,
    Column::ReferencePrice,
    Column::FundingTotal,
    Column::DiscountRate,
    Column::PriorShares,
    Column::IssueRatio,
    Column::SubscriptionDate,
    Column::PaymentDate,
    Column::DividendRecordDate,
    Column::ListingDate,
];

const BOND_BODY: [Column; 18] = [
    Column::BondType,
    Column::FaceAmount,
    Column::Coupon,
    Column::YieldToMaturity,
    Column::Maturity,
    Column::ExerciseStart,
    Column::ExerciseEnd,
    Column::PutOption,
    Column::CallOption,
    Column::CallRatio,
    Column::YieldToCall,
    Column::OfferingMethod,
    Column::ProductName,
    Column::ExercisePrice,
    Column::ExerciseShares,
    Column::ShareRatio,
    Column::RefixingFloor,
    Column::PaymentDate,
];

/// Column layout of one category table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    category: ReportCategory,
    columns: Vec<Column>,
    labels: Vec<String>,
}

impl RowSchema {
    /// Layout for a category with the default header labels
    pub fn for_category(category: ReportCategory) -> Self {
        let body: &[Column] = if category.is_bond() {
            &BOND_BODY
        } else {
            &RIGHTS_ISSUE_BODY
        };
        let columns: Vec<Column> = HEAD
            .iter()
            .chain(body.iter())
            .chain(TAIL.iter())
            .copied()
            .collect();
        let labels = columns.iter().map(|c| c.label().to_string()).collect();
        Self {
            category,
            columns,
            labels,
        }
    }

    /// Replace the header labels
    ///
    /// Fails when the label count does not match the column count.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, String> {
        if labels.len() != self.columns.len() {
            return Err(format!(
                "{} header has {} columns, {} labels given",
                self.category,
                self.columns.len(),
                labels.len()
            ));
        }
        self.labels = labels;
        Ok(self)
    }

    /// Category the layout belongs to
    pub fn category(&self) -> ReportCategory {
        self.category
    }

    /// Columns in store order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header row (row 0 of the table)
    pub fn header(&self) -> Vec<String> {
        self.labels.clone()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the identity-key column
    pub fn key_position(&self) -> usize {
        0
    }

    /// Position of `column`, if the layout carries it
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_shares_head_and_tail() {
        for category in ReportCategory::ALL {
            let schema = RowSchema::for_category(category);
            let columns = schema.columns();
            assert_eq!(&columns[..5], &HEAD);
            assert_eq!(&columns[columns.len() - 3..], &TAIL);
            assert_eq!(columns[schema.key_position()], Column::Key);
        }
    }

    #[test]
    fn test_rate_is_derived_from_prices() {
        let schema = RowSchema::for_category(ReportCategory::RightsIssue);
        let inputs = Column::DiscountRate.derived_from();
        assert_eq!(inputs, &[Column::IssuePrice, Column::ReferencePrice]);
        assert!(inputs.iter().all(|c| schema.position(*c).is_some()));
        assert!(Column::IssuePrice.derived_from().is_empty());
        assert_eq!(schema.position(Column::Key), Some(0));
    }

    #[test]
    fn test_schema_widths() {
        assert_eq!(RowSchema::for_category(ReportCategory::RightsIssue).width(), 21);
        assert_eq!(RowSchema::for_category(ReportCategory::ConvertibleBond).width(), 26);
        assert_eq!(RowSchema::for_category(ReportCategory::ExchangeableBond).width(), 26);
    }

    #[test]
    fn test_label_override_requires_same_width() {
        let schema = RowSchema::for_category(ReportCategory::RightsIssue);
        assert!(schema.clone().with_labels(vec!["a".to_string()]).is_err());

        let labels: Vec<String> = (0..21).map(|i| format!("c{}", i)).collect();
        let schema = schema.with_labels(labels).unwrap();
        assert_eq!(schema.header()[0], "c0");
    }
}
