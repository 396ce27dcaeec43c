//! Report categories and market segments

use std::fmt;

/// Category of a capital-raising disclosure
///
/// Each category has its own detail endpoint, title keyword and store table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportCategory {
    /// New shares issued for cash (유상증자)
    RightsIssue,

    /// Bonds convertible into the issuer's shares (전환사채)
    ConvertibleBond,

    /// Bonds exchangeable for shares the issuer holds (교환사채)
    ExchangeableBond,
}

impl ReportCategory {
    /// Every category, in processing order
    pub const ALL: [ReportCategory; 3] = [
        ReportCategory::RightsIssue,
        ReportCategory::ConvertibleBond,
        ReportCategory::ExchangeableBond,
    ];

    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::RightsIssue => "rights_issue",
            ReportCategory::ConvertibleBond => "convertible_bond",
            ReportCategory::ExchangeableBond => "exchangeable_bond",
        }
    }

    /// Parse a category from a string
    ///
    /// Accepts the canonical name, a dashed variant and the short code.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "rights_issue" | "ri" | "유상증자" => Some(ReportCategory::RightsIssue),
            "convertible_bond" | "cb" | "전환사채" => Some(ReportCategory::ConvertibleBond),
            "exchangeable_bond" | "eb" | "교환사채" => Some(ReportCategory::ExchangeableBond),
            _ => None,
        }
    }

    /// Keyword that identifies the category in a raw report title
    pub fn title_keyword(&self) -> &'static str {
        match self {
            ReportCategory::RightsIssue => "유상증자결정",
            ReportCategory::ConvertibleBond => "전환사채권발행결정",
            ReportCategory::ExchangeableBond => "교환사채권발행결정",
        }
    }

    /// Default store table for the category
    pub fn default_table(&self) -> &'static str {
        match self {
            ReportCategory::RightsIssue => "유상증자",
            ReportCategory::ConvertibleBond => "전환사채",
            ReportCategory::ExchangeableBond => "교환사채",
        }
    }

    /// Short code shown in bond rows
    pub fn short_code(&self) -> &'static str {
        match self {
            ReportCategory::RightsIssue => "RI",
            ReportCategory::ConvertibleBond => "CB",
            ReportCategory::ExchangeableBond => "EB",
        }
    }

    /// Whether the category describes an equity-linked bond
    pub fn is_bond(&self) -> bool {
        !matches!(self, ReportCategory::RightsIssue)
    }

    /// Detect the category from a raw report title
    ///
    /// Titles are compared with whitespace removed, since filers space the
    /// words inconsistently.
    pub fn from_title(title: &str) -> Option<Self> {
        let compact: String = title.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL
            .into_iter()
            .find(|category| compact.contains(category.title_keyword()))
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid report category: {}", s))
    }
}

/// Market segment the issuer is listed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketSegment {
    /// KOSPI main board (`Y`)
    Kospi,
    /// KOSDAQ (`K`)
    Kosdaq,
    /// KONEX (`N`)
    Konex,
    /// Unlisted or unrecognized (`E`)
    Other,
}

impl MarketSegment {
    /// Map the directory's one-letter class code
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "Y" => MarketSegment::Kospi,
            "K" => MarketSegment::Kosdaq,
            "N" => MarketSegment::Konex,
            _ => MarketSegment::Other,
        }
    }

    /// One-letter class code
    pub fn code(&self) -> &'static str {
        match self {
            MarketSegment::Kospi => "Y",
            MarketSegment::Kosdaq => "K",
            MarketSegment::Konex => "N",
            MarketSegment::Other => "E",
        }
    }

    /// Label written to the store
    pub fn label(&self) -> &'static str {
        match self {
            MarketSegment::Kospi => "유가",
            MarketSegment::Kosdaq => "코스닥",
            MarketSegment::Konex => "코넥스",
            MarketSegment::Other => "기타",
        }
    }
}

impl fmt::Display for MarketSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(ReportCategory::parse("rights-issue"), Some(ReportCategory::RightsIssue));
        assert_eq!(ReportCategory::parse("CB"), Some(ReportCategory::ConvertibleBond));
        assert_eq!(ReportCategory::parse("exchangeable_bond"), Some(ReportCategory::ExchangeableBond));
        assert_eq!(ReportCategory::parse("warrant"), None);
    }

    #[test]
    fn test_category_from_title() {
        assert_eq!(
            ReportCategory::from_title("주요사항보고서(유상증자결정)"),
            Some(ReportCategory::RightsIssue)
        );
        assert_eq!(
            ReportCategory::from_title("[기재정정]주요사항보고서(전환사채권 발행결정)"),
            Some(ReportCategory::ConvertibleBond)
        );
        assert_eq!(
            ReportCategory::from_title("주요사항보고서(교환사채권발행결정)"),
            Some(ReportCategory::ExchangeableBond)
        );
        assert_eq!(ReportCategory::from_title("주요사항보고서(자기주식취득결정)"), None);
    }

    #[test]
    fn test_market_segment_codes() {
        assert_eq!(MarketSegment::from_code("Y"), MarketSegment::Kospi);
        assert_eq!(MarketSegment::from_code("K").label(), "코스닥");
        assert_eq!(MarketSegment::from_code(""), MarketSegment::Other);
    }
}
