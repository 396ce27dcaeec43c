//! Detail endpoints and the mapping of their records to typed facts
//!
//! DART returns every field as a string. Absent values come back as `-` or
//! blank; those become [`Fact::Unknown`], except funding-purpose amounts
//! where `-` is a declared zero.

use crate::error::{DartError, Result};
use crate::session::{compact_date, DartSession};
use crate::{STATUS_NO_DATA, STATUS_OK};
use capraise_domain::{
    BondTerms, DateRange, DetailFetcher, Fact, FactDate, FilingKey, FundingPurposes, Money,
    ReportCategory, RightsIssueTerms, TypedFacts, TypedRecord,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Detail endpoint of a category
pub fn endpoint(category: ReportCategory) -> &'static str {
    match category {
        ReportCategory::RightsIssue => "piicDecsn.json",
        ReportCategory::ConvertibleBond => "cvbdIsDecsn.json",
        ReportCategory::ExchangeableBond => "exbdIsDecsn.json",
    }
}

/// Field names that differ between convertible and exchangeable bonds
struct ExerciseFields {
    price: &'static str,
    shares: &'static str,
    ratio: &'static str,
    start: &'static str,
    end: &'static str,
    refixing_floor: Option<&'static str>,
}

const CONVERTIBLE: ExerciseFields = ExerciseFields {
    price: "cv_prc",
    shares: "cvisstk_cnt",
    ratio: "cvisstk_tisstk_vs",
    start: "cvrqpd_bgd",
    end: "cvrqpd_edd",
    refixing_floor: Some("act_mktprcfl_cvprc_lwtrsprc"),
};

const EXCHANGEABLE: ExerciseFields = ExerciseFields {
    price: "ex_prc",
    shares: "extg_stkcnt",
    ratio: "extg_tisstk_vs",
    start: "exrqpd_bgd",
    end: "exrqpd_edd",
    refixing_floor: None,
};

/// Response of a detail endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    list: Vec<BTreeMap<String, Value>>,
}

impl DetailResponse {
    pub(crate) fn into_records(self, category: ReportCategory) -> Result<Vec<TypedRecord>> {
        match self.status.as_str() {
            STATUS_OK => {}
            STATUS_NO_DATA => return Ok(Vec::new()),
            _ => {
                return Err(DartError::Status {
                    code: self.status,
                    message: self.message,
                })
            }
        }

        Ok(self
            .list
            .iter()
            .filter_map(|raw| match map_record(category, &Fields(raw)) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping {} detail record: {}", category, e);
                    None
                }
            })
            .collect())
    }
}

/// String view over one raw detail record
pub struct Fields<'a>(pub &'a BTreeMap<String, Value>);

impl Fields<'_> {
    /// Trimmed text of a field; `-` and blank are absent
    pub fn text(&self, name: &str) -> Option<String> {
        let text = match self.0.get(name)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if text.is_empty() || text == "-" {
            None
        } else {
            Some(text)
        }
    }

    fn fact_text(&self, name: &str) -> Fact<String> {
        self.text(name).into()
    }

    fn count(&self, name: &str) -> Fact<u64> {
        self.text(name).and_then(|t| parse_count(&t)).into()
    }

    /// Positive amount; zero is reported as absent
    fn amount(&self, name: &str) -> Fact<Money> {
        self.text(name)
            .and_then(|t| parse_count(&t))
            .filter(|won| *won > 0)
            .map(Money::new)
            .into()
    }

    /// Funding amount; absent is a declared zero
    fn funding_amount(&self, name: &str) -> Money {
        Money::new(self.text(name).and_then(|t| parse_count(&t)).unwrap_or(0))
    }

    fn date(&self, name: &str) -> Fact<FactDate> {
        self.text(name).map_or(Fact::Unknown, |t| parse_date(&t))
    }

    fn funding(&self) -> FundingPurposes {
        FundingPurposes {
            facility: self.funding_amount("fdpp_fclt"),
            business_acquisition: self.funding_amount("fdpp_bsninh"),
            operating: self.funding_amount("fdpp_op"),
            debt_repayment: self.funding_amount("fdpp_dtrp"),
            other_securities: self.funding_amount("fdpp_ocsa"),
            other: self.funding_amount("fdpp_etc"),
        }
    }
}

/// Integer from a published count or amount (`1,000,000`, `1000000.0`)
pub fn parse_count(text: &str) -> Option<u64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    if whole.is_empty() || !fraction.chars().all(|c| c == '0') {
        return None;
    }
    whole.parse().ok()
}

/// Date in any DART spelling: `2024년 03월 05일`, `2024-03-05`,
/// `2024.03.05` or `20240305`
pub fn parse_date(text: &str) -> Fact<FactDate> {
    let groups: Vec<&str> = text
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .collect();
    let parts = match groups.as_slice() {
        [compact] if compact.len() == 8 => (&compact[..4], &compact[4..6], &compact[6..]),
        [year, month, day, ..] if year.len() == 4 => (*year, *month, *day),
        _ => return Fact::Unknown,
    };
    let (Ok(year), Ok(month), Ok(day)) = (parts.0.parse(), parts.1.parse(), parts.2.parse()) else {
        return Fact::Unknown;
    };
    FactDate::from_ymd(year, month, day).into()
}

/// Map one raw detail record to a [`TypedRecord`]
pub fn map_record(category: ReportCategory, fields: &Fields<'_>) -> std::result::Result<TypedRecord, String> {
    let key = FilingKey::new(fields.text("rcept_no").unwrap_or_default())?;
    let company_name = fields.text("corp_name").unwrap_or_default();

    let facts = match category {
        ReportCategory::RightsIssue => TypedFacts::RightsIssue(RightsIssueTerms {
            method: fields.fact_text("ic_mthn"),
            new_common_shares: fields.count("nstk_ostk_cnt"),
            new_other_shares: fields.count("nstk_estk_cnt"),
            prior_common_shares: fields.count("bfic_tisstk_ostk"),
            prior_other_shares: fields.count("bfic_tisstk_estk"),
            funding: fields.funding(),
        }),
        ReportCategory::ConvertibleBond => TypedFacts::Bond(bond_terms(fields, &CONVERTIBLE)),
        ReportCategory::ExchangeableBond => TypedFacts::Bond(bond_terms(fields, &EXCHANGEABLE)),
    };

    Ok(TypedRecord {
        key,
        company_name,
        facts,
    })
}

fn bond_terms(fields: &Fields<'_>, exercise: &ExerciseFields) -> BondTerms {
    BondTerms {
        series: fields.fact_text("bd_tm"),
        kind: fields.fact_text("bd_knd"),
        face_amount: fields.amount("bd_fta"),
        coupon_rate: fields.fact_text("bd_intr_ex"),
        yield_to_maturity: fields.fact_text("bd_intr_sf"),
        maturity_date: fields.date("bd_mtd"),
        exercise_price: fields.amount(exercise.price),
        exercise_shares: fields.count(exercise.shares).known().filter(|n| *n > 0).into(),
        share_ratio: fields.fact_text(exercise.ratio),
        exercise_start: fields.date(exercise.start),
        exercise_end: fields.date(exercise.end),
        refixing_floor: exercise
            .refixing_floor
            .map_or(Fact::Unknown, |name| fields.amount(name)),
        offering_method: fields.fact_text("bdis_mthn"),
        payment_date: fields.date("pymd"),
        board_resolution_date: fields.date("bddd"),
        funding: fields.funding(),
    }
}

/// [`DetailFetcher`] over the category detail endpoints
#[derive(Debug)]
pub struct DartDetailFetcher<'a> {
    session: &'a DartSession,
}

impl<'a> DartDetailFetcher<'a> {
    /// Create a fetcher on `session`
    pub fn new(session: &'a DartSession) -> Self {
        Self { session }
    }
}

impl DetailFetcher for DartDetailFetcher<'_> {
    type Error = DartError;

    fn fetch_details(
        &self,
        issuer_code: &str,
        category: ReportCategory,
        range: &DateRange,
    ) -> Result<Vec<TypedRecord>> {
        let bgn_de = compact_date(range.start);
        let end_de = compact_date(range.end);
        let response: DetailResponse = self.session.get_json(
            endpoint(category),
            &[
                ("corp_code", issuer_code),
                ("bgn_de", bgn_de.as_str()),
                ("end_de", end_de.as_str()),
            ],
        )?;
        let records = response.into_records(category)?;
        debug!("{} {} detail record(s) for issuer {}", records.len(), category, issuer_code);
        Ok(records)
    }
}
