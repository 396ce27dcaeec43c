//! Integration tests for capraise-reconciler
//!
//! These tests run the whole pipeline against the DART mock and the
//! in-memory store: append/skip/overwrite decisions, healing across runs,
//! deferrals and write failures.

use capraise_dart::MockDart;
use capraise_domain::{
    BondTerms, Column, DateRange, DocumentArchive, Fact, FactDate, FilingKey, FilingSummary,
    FundingPurposes, MarketSegment, Money, ReportCategory, RightsIssueTerms, RowSchema,
    TypedFacts, TypedRecord,
};
use capraise_extractor::{ExtractorConfig, FieldExtractor};
use capraise_reconciler::{
    Outcome, Pipeline, ReconcilerConfig, ReconcilerError, RunReport,
};
use capraise_store::{MemorySheetStore, SqliteSheetStore};
use tempfile::TempDir;

const ISSUER: &str = "00123456";

const RIGHTS_ISSUE_DOCUMENT: &str = r#"<DOCUMENT>
<BODY>
<TABLE BORDER="1">
<TR><TD>5. 증자방식</TD><TD>제3자배정증자</TD></TR>
<TR><TD>6. 신주 발행가액</TD><TD>보통주식 (원)</TD><TE ALIGN="RIGHT">9,200</TE></TR>
<TR><TD>7. 기준주가</TD><TD>보통주식 (원)</TD><TE ALIGN="RIGHT">10,000</TE></TR>
<TR><TD>8. 할인율 또는 할증율 (%)</TD><TD>해당사항없음</TD></TR>
<TR><TD>9. 납입일</TD><TD>2024년 04월 01일</TD></TR>
<TR><TD>14. 이사회결의일(결정일)</TD><TD>2024년 03월 05일</TD></TR>
</TABLE>
</BODY>
</DOCUMENT>"#;

const CONVERTIBLE_BOND_DOCUMENT: &str = r#"<DOCUMENT>
<BODY>
<P>[조기상환청구권(Put Option)에 관한 사항] 사채권자는 조기상환을 청구할 수 있다.</P>
<P>[매도청구권(Call Option)에 관한 사항] 발행회사는 권면총액의 30%를 한도로 매도를 청구할 수 있으며, 수익률 연 3.0%를 가산한다.</P>
</BODY>
</DOCUMENT>"#;

fn march() -> DateRange {
    DateRange::new(
        FactDate::from_ymd(2024, 3, 1).unwrap(),
        FactDate::from_ymd(2024, 3, 31).unwrap(),
    )
    .unwrap()
}

fn key(n: u32) -> FilingKey {
    FilingKey::new(format!("2024030500{:04}", n)).unwrap()
}

fn summary(n: u32, title: &str) -> FilingSummary {
    FilingSummary {
        key: key(n),
        company_name: format!("회사{}", n),
        market: MarketSegment::Kosdaq,
        report_title: title.to_string(),
        issuer_code: ISSUER.to_string(),
        receipt_date: FactDate::from_ymd(2024, 3, 5).into(),
    }
}

fn rights_detail(n: u32) -> TypedRecord {
    TypedRecord {
        key: key(n),
        company_name: format!("회사{}", n),
        facts: TypedFacts::RightsIssue(RightsIssueTerms {
            method: Fact::Known("제3자배정증자".to_string()),
            new_common_shares: Fact::Known(1_000_000),
            new_other_shares: Fact::Unknown,
            prior_common_shares: Fact::Known(10_000_000),
            prior_other_shares: Fact::Unknown,
            funding: FundingPurposes {
                operating: Money::new(9_200_000_000),
                ..Default::default()
            },
        }),
    }
}

fn rights_filing(dart: &MockDart, n: u32) -> FilingSummary {
    dart.add_details(ISSUER, ReportCategory::RightsIssue, vec![rights_detail(n)]);
    dart.add_document(key(n), document(RIGHTS_ISSUE_DOCUMENT));
    summary(n, "주요사항보고서(유상증자결정)")
}

fn document(markup: &str) -> DocumentArchive {
    DocumentArchive::new(markup.as_bytes().to_vec())
}

fn config(categories: &[&str]) -> ReconcilerConfig {
    ReconcilerConfig {
        categories: categories.iter().map(|c| c.to_string()).collect(),
        pacing_ms: 0,
        ..Default::default()
    }
}

fn run_with(config: ReconcilerConfig, dart: &MockDart, store: &MemorySheetStore) -> RunReport {
    try_run(config, dart, store).unwrap()
}

fn try_run(
    config: ReconcilerConfig,
    dart: &MockDart,
    store: &MemorySheetStore,
) -> capraise_reconciler::Result<RunReport> {
    let extractor = FieldExtractor::new(ExtractorConfig::default()).unwrap();
    let mut pipeline = Pipeline::new(
        config,
        extractor,
        dart.clone(),
        dart.clone(),
        dart.clone(),
        store.clone(),
    )?;
    pipeline.run(&march())
}

fn run(dart: &MockDart, store: &MemorySheetStore) -> RunReport {
    run_with(config(&["rights_issue"]), dart, store)
}

fn column(category: ReportCategory, column: Column) -> usize {
    RowSchema::for_category(category)
        .columns()
        .iter()
        .position(|c| *c == column)
        .unwrap()
}

fn outcomes(report: &RunReport) -> Vec<&Outcome> {
    report.outcomes.iter().map(|o| &o.outcome).collect()
}

#[test]
fn test_distinct_filings_are_both_appended() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1), rights_filing(&dart, 2)]);

    let report = run(&dart, &store);

    assert_eq!(outcomes(&report), [&Outcome::Appended, &Outcome::Appended]);
    let rows = store.snapshot("유상증자");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], key(1).as_str());
    assert_eq!(rows[2][0], key(2).as_str());
    assert_eq!(report.metrics.get(ReportCategory::RightsIssue).appended, 2);
    // One detail query per issuer, one download per filing
    assert_eq!(dart.detail_calls(), 1);
    assert_eq!(dart.document_calls(), 2);
}

#[test]
fn test_rerun_skips_without_writing() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1)]);

    run(&dart, &store);
    let before = store.snapshot("유상증자");
    store.reset_counters();

    let report = run(&dart, &store);
    assert_eq!(outcomes(&report), [&Outcome::Skipped]);
    assert_eq!(store.write_calls(), 0);
    assert_eq!(store.snapshot("유상증자"), before);
}

#[test]
fn test_row_contents() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1)]);
    run(&dart, &store);

    let category = ReportCategory::RightsIssue;
    let row = &store.snapshot("유상증자")[1];
    assert_eq!(row.len(), RowSchema::for_category(category).width());
    assert_eq!(row[column(category, Column::Market)], "코스닥");
    assert_eq!(row[column(category, Column::IssuePrice)], "9,200");
    assert_eq!(row[column(category, Column::ReferencePrice)], "10,000");
    assert_eq!(row[column(category, Column::DiscountRate)], "-8.00%");
    assert_eq!(row[column(category, Column::NewShares)], "1,000,000");
    assert_eq!(row[column(category, Column::IssueRatio)], "10.00%");
    assert_eq!(row[column(category, Column::FundingTotal)], "92.00");
    assert_eq!(row[column(category, Column::FundingPurpose)], "운영");
    assert_eq!(row[column(category, Column::BoardResolutionDate)], "2024-03-05");
    assert_eq!(
        row[column(category, Column::SourceLink)],
        format!("https://dart.fss.or.kr/dsaf001/main.do?rcpNo={}", key(1))
    );
}

#[test]
fn test_failed_download_is_deferred() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1), rights_filing(&dart, 2)]);
    dart.fail_document(key(1));

    let report = run(&dart, &store);

    assert!(matches!(report.outcomes[0].outcome, Outcome::Deferred(_)));
    assert_eq!(report.outcomes[1].outcome, Outcome::Appended);
    let rows = store.snapshot("유상증자");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row[0] != key(1).as_str()));
    assert_eq!(report.metrics.get(ReportCategory::RightsIssue).deferred, 1);
}

#[test]
fn test_missing_or_failed_detail_is_deferred() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_document(key(1), document(RIGHTS_ISSUE_DOCUMENT));
    dart.add_page(vec![summary(1, "주요사항보고서(유상증자결정)")]);

    let report = run(&dart, &store);
    assert!(matches!(report.outcomes[0].outcome, Outcome::Deferred(_)));
    assert_eq!(dart.document_calls(), 0);

    dart.add_details(ISSUER, ReportCategory::RightsIssue, vec![rights_detail(1)]);
    dart.fail_details(ISSUER);
    let report = run(&dart, &store);
    assert!(matches!(report.outcomes[0].outcome, Outcome::Deferred(_)));
    assert_eq!(store.snapshot("유상증자").len(), 1);
}

#[test]
fn test_malformed_document_heals_on_later_run() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    let category = ReportCategory::RightsIssue;
    let price = column(category, Column::IssuePrice);
    let method = column(category, Column::IssueMethod);

    dart.add_details(ISSUER, category, vec![rights_detail(1)]);
    dart.add_page(vec![summary(1, "주요사항보고서(유상증자결정)")]);
    dart.add_document(key(1), DocumentArchive::new(b"%PDF-1.4 scanned".to_vec()));

    // Typed facts are persisted even though the body is unreadable
    let report = run(&dart, &store);
    assert_eq!(outcomes(&report), [&Outcome::Appended]);
    assert_eq!(report.metrics.get(category).malformed, 1);
    let row = store.snapshot("유상증자")[1].clone();
    assert_eq!(row[price], "-");
    assert_eq!(row[method], "제3자배정증자");

    // The readable document fills the unknown cells in place
    dart.add_document(key(1), document(RIGHTS_ISSUE_DOCUMENT));
    let report = run(&dart, &store);
    assert_eq!(outcomes(&report), [&Outcome::Overwritten]);
    assert_eq!(store.snapshot("유상증자")[1][price], "9,200");

    // A later unreadable copy never erases what was recovered
    dart.add_document(key(1), DocumentArchive::new(b"%PDF-1.4 scanned".to_vec()));
    let report = run(&dart, &store);
    assert_eq!(outcomes(&report), [&Outcome::Skipped]);
    let rows = store.snapshot("유상증자");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][price], "9,200");
}

#[test]
fn test_write_failure_is_counted_and_retried_next_run() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1), rights_filing(&dart, 2)]);
    store.fail_appends(true);

    let report = run(&dart, &store);
    assert!(report
        .outcomes
        .iter()
        .all(|o| matches!(o.outcome, Outcome::WriteFailed(_))));
    assert_eq!(report.metrics.get(ReportCategory::RightsIssue).failed_writes, 2);

    store.fail_appends(false);
    let report = run(&dart, &store);
    assert_eq!(outcomes(&report), [&Outcome::Appended, &Outcome::Appended]);
    assert_eq!(store.snapshot("유상증자").len(), 3);
}

#[test]
fn test_dry_run_writes_no_rows() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(vec![rights_filing(&dart, 1)]);

    let report = run_with(
        ReconcilerConfig {
            dry_run: true,
            ..config(&["rights_issue"])
        },
        &dart,
        &store,
    );

    assert!(report.dry_run);
    assert_eq!(outcomes(&report), [&Outcome::Appended]);
    assert_eq!(store.write_calls(), 0);
    assert_eq!(store.snapshot("유상증자").len(), 1);
}

#[test]
fn test_directory_filtering_and_paging() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    let first = rights_filing(&dart, 1);
    dart.add_page(vec![
        first.clone(),
        summary(7, "주요사항보고서(전환사채권발행결정)"),
        summary(8, "임원ㆍ주요주주특정증권등소유상황보고서"),
    ]);
    // The same filing listed again on the next page
    dart.add_page(vec![first, rights_filing(&dart, 2)]);

    let report = run(&dart, &store);

    assert_eq!(dart.list_calls(), 2);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.metrics.get(ReportCategory::RightsIssue).seen, 2);
    assert_eq!(store.snapshot("유상증자").len(), 3);
}

#[test]
fn test_bond_category_row() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    let category = ReportCategory::ConvertibleBond;
    dart.add_details(
        ISSUER,
        category,
        vec![TypedRecord {
            key: key(3),
            company_name: "미래모빌리티".to_string(),
            facts: TypedFacts::Bond(BondTerms {
                series: Fact::Known("3".to_string()),
                kind: Fact::Known("무기명식 이권부 무보증 사모 전환사채".to_string()),
                face_amount: Fact::Known(Money::new(5_000_000_000)),
                exercise_price: Fact::Known(Money::new(12_500)),
                board_resolution_date: FactDate::from_ymd(2024, 3, 5).into(),
                ..Default::default()
            }),
        }],
    );
    dart.add_document(key(3), document(CONVERTIBLE_BOND_DOCUMENT));
    dart.add_page(vec![summary(3, "주요사항보고서(전환사채권발행결정)")]);

    let report = run_with(config(&["rights_issue", "convertible_bond"]), &dart, &store);

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].category, category);
    assert_eq!(store.snapshot("유상증자").len(), 1);
    let row = &store.snapshot("전환사채")[1];
    assert_eq!(row[column(category, Column::BondType)], "CB");
    assert_eq!(row[column(category, Column::FaceAmount)], "5,000,000,000");
    assert_eq!(row[column(category, Column::ExercisePrice)], "12,500");
    assert_eq!(row[column(category, Column::PutOption)], "있음");
    assert_eq!(row[column(category, Column::CallRatio)], "30.00%");
    assert_eq!(row[column(category, Column::BoardResolutionDate)], "2024-03-05");
}

#[test]
fn test_directory_failure_is_fatal() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    dart.add_page(Vec::new());
    dart.fail_page(1);

    let result = try_run(config(&["rights_issue"]), &dart, &store);
    assert!(matches!(result, Err(ReconcilerError::Locator(_))));
}

#[test]
fn test_unreadable_store_is_fatal() {
    let dart = MockDart::new();
    let store = MemorySheetStore::new();
    store.fail_reads(true);

    let result = try_run(config(&["rights_issue"]), &dart, &store);
    assert!(matches!(result, Err(ReconcilerError::Store(_))));
    assert_eq!(dart.list_calls(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = try_run(config(&["warrants"]), &MockDart::new(), &MemorySheetStore::new());
    assert!(matches!(result, Err(ReconcilerError::Config(_))));
}

#[test]
fn test_sqlite_store_is_idempotent_across_processes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("capraise.db");
    let dart = MockDart::new();
    dart.add_page(vec![rights_filing(&dart, 1), rights_filing(&dart, 2)]);

    let mut reports = Vec::new();
    for _ in 0..2 {
        let mut pipeline = Pipeline::new(
            config(&["rights_issue"]),
            FieldExtractor::new(ExtractorConfig::default()).unwrap(),
            dart.clone(),
            dart.clone(),
            dart.clone(),
            SqliteSheetStore::new(&path).unwrap(),
        )
        .unwrap();
        reports.push(pipeline.run(&march()).unwrap());
    }

    assert_eq!(reports[0].metrics.total_written(), 2);
    assert_eq!(reports[1].metrics.total_written(), 0);
    assert_eq!(reports[1].metrics.get(ReportCategory::RightsIssue).skipped, 2);
    assert_ne!(reports[0].run_id, reports[1].run_id);
}
