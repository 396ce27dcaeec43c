//! Flow tests for the FieldExtractor

#[cfg(test)]
mod tests {
    use crate::{ExtractionStatus, ExtractorConfig, FieldExtractor};
    use capraise_domain::{
        DocumentArchive, Fact, FilingKey, Investor, Percent, Presence, ReportCategory,
    };
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const RIGHTS_ISSUE: &str = r#"<DOCUMENT>
<DOCUMENT-NAME>유상증자결정</DOCUMENT-NAME>
<BODY>
<TABLE BORDER="1">
<TR><TD>1. 신주의 종류와 수</TD><TD>보통주식 (주)</TD><TE ALIGN="RIGHT">1,000,000</TE></TR>
<TR><TD>5. 증자방식</TD><TD COLSPAN="2">제3자배정증자</TD></TR>
<TR><TD>6. 신주 발행가액</TD><TD>보통주식 (원)</TD><TE ALIGN="RIGHT">9,200</TE></TR>
<TR><TD>7. 기준주가</TD><TD>보통주식 (원)</TD><TE ALIGN="RIGHT">10,000</TE></TR>
<TR><TD>8. 할인율 또는 할증율 (%)</TD><TD COLSPAN="2">8.0</TD></TR>
<TR><TD>9. 납입일</TD><TD COLSPAN="2">2024년 04월 01일</TD></TR>
<TR><TD>10. 신주의 배당기산일</TD><TD COLSPAN="2">2024년 01월 01일</TD></TR>
<TR><TD>11. 청약예정일</TD><TD COLSPAN="2">2024년 03월 28일</TD></TR>
<TR><TD>13. 신주의 상장 예정일</TD><TD COLSPAN="2">2024년 04월 15일</TD></TR>
<TR><TD>14. 이사회결의일(결정일)</TD><TD COLSPAN="2">2024년 03월 05일</TD></TR>
</TABLE>
<P>【제3자배정 대상자별 선정경위, 거래내역, 배정내역 등】</P>
<TABLE BORDER="1">
<TR><TH>배정대상자</TH><TH>회사 또는 최대주주와의 관계</TH><TH>배정주식수(주)</TH></TR>
<TR><TD>주식회사 한빛투자</TD><TD>-</TD><TE ALIGN="RIGHT">1,000,000</TE></TR>
</TABLE>
</BODY>
</DOCUMENT>"#;

    const CONVERTIBLE_BOND: &str = r#"<DOCUMENT>
<DOCUMENT-NAME>전환사채권발행결정</DOCUMENT-NAME>
<BODY>
<TABLE BORDER="1">
<TR><TD>1. 사채의 종류</TD><TD>회차</TD><TD>3</TD><TD>종류</TD><TD>무기명식 이권부 무보증 사모 전환사채</TD></TR>
<TR><TD>10. 청약일</TD><TD COLSPAN="4">2024년 03월 07일</TD></TR>
<TR><TD>11. 납입일</TD><TD COLSPAN="4">2024년 03월 08일</TD></TR>
<TR><TD>20. 이사회결의일(결정일)</TD><TD COLSPAN="4">2024년 03월 05일</TD></TR>
</TABLE>
<P>[조기상환청구권(Put Option)에 관한 사항] 사채권자는 발행일로부터 2년이 되는 날부터 조기상환을 청구할 수 있다.</P>
<P>[매도청구권(Call Option)에 관한 사항] 발행회사는 사채 권면총액의 30%를 한도로 매도를 청구할 수 있으며, 매수가격은 연 복리 수익률 3.0%를 가산한 금액으로 한다.</P>
<TABLE BORDER="1">
<TR><TH>발행대상자명</TH><TH>회사 또는 최대주주와의 관계</TH><TH>발행권면총액(원)</TH></TR>
<TR><TD>미래에셋증권 주식회사</TD><TD>-</TD><TE ALIGN="RIGHT">5,000,000,000</TE></TR>
</TABLE>
</BODY>
</DOCUMENT>"#;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(ExtractorConfig::default()).unwrap()
    }

    fn bare(markup: &str) -> DocumentArchive {
        DocumentArchive::new(markup.as_bytes().to_vec())
    }

    fn zipped(entries: &[(&str, Vec<u8>)]) -> DocumentArchive {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        DocumentArchive::new(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn test_rights_issue_flow() {
        let extraction = extractor().extract(&bare(RIGHTS_ISSUE), ReportCategory::RightsIssue, None);
        assert_eq!(extraction.status, ExtractionStatus::Parsed);
        assert_eq!(extraction.documents, 1);

        let facts = &extraction.facts;
        assert_eq!(facts.issue_price.cell(), "9,200");
        assert_eq!(facts.reference_price.cell(), "10,000");
        assert_eq!(facts.discount_rate.cell(), "-8.00%");
        assert_eq!(facts.payment_date.cell(), "2024-04-01");
        assert_eq!(facts.dividend_record_date.cell(), "2024-01-01");
        assert_eq!(facts.subscription_date.cell(), "2024-03-28");
        assert_eq!(facts.listing_date.cell(), "2024-04-15");
        assert_eq!(facts.board_resolution_date.cell(), "2024-03-05");
        assert_eq!(
            facts.investor,
            Fact::Known(Investor::ThirdParty {
                allottee: Some("주식회사 한빛투자".to_string())
            })
        );
        assert!(facts.bond_options.put_option.is_unknown());
        assert!(facts.bond_options.call_ratio.is_unknown());
    }

    #[test]
    fn test_convertible_bond_flow() {
        let extraction = extractor().extract(
            &bare(CONVERTIBLE_BOND),
            ReportCategory::ConvertibleBond,
            None,
        );
        let facts = &extraction.facts;

        assert_eq!(facts.subscription_date.cell(), "2024-03-07");
        assert_eq!(facts.payment_date.cell(), "2024-03-08");
        assert_eq!(facts.board_resolution_date.cell(), "2024-03-05");
        assert!(facts.issue_price.is_unknown());
        assert!(facts.discount_rate.is_unknown());
        assert!(facts.listing_date.is_unknown());

        let options = &facts.bond_options;
        assert_eq!(options.put_option, Fact::Known(Presence::Present));
        assert_eq!(options.call_option, Fact::Known(Presence::Present));
        assert_eq!(options.call_ratio, Fact::Known(Percent::from_hundredths(3_000)));
        assert_eq!(options.yield_to_call, Fact::Known(Percent::from_hundredths(300)));

        // Private bond placement without third-party wording still names the allottee
        assert_eq!(
            facts.investor,
            Fact::Known(Investor::ThirdParty {
                allottee: Some("미래에셋증권".to_string())
            })
        );
    }

    #[test]
    fn test_zip_with_euc_kr_main_document() {
        let key = FilingKey::new("20240305000123").unwrap();
        let (encoded, _, _) = encoding_rs::EUC_KR.encode(RIGHTS_ISSUE);
        let archive = zipped(&[
            ("20240305000123_00760.xml", b"<DOCUMENT><P>Attachment</P></DOCUMENT>".to_vec()),
            ("20240305000123.xml", encoded.into_owned()),
            ("logo.jpg", vec![0xff, 0xd8, 0xff]),
        ]);

        let extraction = extractor().extract(&archive, ReportCategory::RightsIssue, Some(&key));
        assert_eq!(extraction.status, ExtractionStatus::Parsed);
        assert_eq!(extraction.documents, 2);
        assert_eq!(extraction.facts.issue_price.cell(), "9,200");
        assert_eq!(extraction.facts.payment_date.cell(), "2024-04-01");
    }

    #[test]
    fn test_malformed_containers() {
        let extractor = extractor();
        for archive in [
            DocumentArchive::new(Vec::new()),
            DocumentArchive::new(b"%PDF-1.4 not a filing".to_vec()),
            DocumentArchive::new(b"PK\x03\x04 truncated".to_vec()),
            zipped(&[("readme.txt", b"no markup here".to_vec())]),
        ] {
            let extraction = extractor.extract(&archive, ReportCategory::RightsIssue, None);
            assert!(extraction.is_malformed());
            assert_eq!(extraction.facts.known_count(), 0);
        }
    }

    #[test]
    fn test_shareholder_allotment_without_allottee() {
        let markup = "<table><tr><td>증자방식</td><td>주주배정후 실권주 일반공모</td></tr>\
                      <tr><td>발행가액</td><td>미정</td></tr></table>";
        let extraction = extractor().extract(&bare(markup), ReportCategory::RightsIssue, None);
        assert_eq!(extraction.facts.investor, Fact::Known(Investor::Shareholders));
        assert!(extraction.facts.issue_price.is_unknown());
    }

    #[test]
    fn test_unrecognized_investor_is_see_source() {
        let markup = "<p>기타 사항은 첨부 서류를 참조</p>";
        let extraction = extractor().extract(&bare(markup), ReportCategory::RightsIssue, None);
        assert_eq!(extraction.facts.investor, Fact::Known(Investor::SeeSource));
    }
}
