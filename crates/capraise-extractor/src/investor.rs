//! Allotment type detection and allottee snippets

use crate::config::ExtractorConfig;
use crate::normalize::{is_undetermined, literal_regex, Resolution};
use once_cell::sync::Lazy;
use regex::Regex;

/// Allotment type phrases, matched against stripped text
static THIRD_PARTY: Lazy<Regex> = Lazy::new(|| literal_regex(r"제3자배정|thirdparty(allotment|placement)|privateplacement"));
static SHAREHOLDERS: Lazy<Regex> = Lazy::new(|| literal_regex(r"주주배정|rightsoffering|shareholderallotment"));
static PUBLIC_OFFERING: Lazy<Regex> = Lazy::new(|| literal_regex(r"일반공모|publicoffering"));

/// Entity names that can stand for an allottee; the leftmost match wins
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    literal_regex(
        r"(?:주식회사|유한회사)\s*[^\s,()\d\-][^\s,()]*|\(주\)[^\s,()]+|[^\s,()]+주식회사|[^\s,()]*(?:투자조합|조합|펀드|합자회사|파트너스|인베스트먼트|캐피탈|증권|자산운용|은행)[^\s,()]*|[A-Z][\w&.\-]*(?:\s+[A-Z][\w&.\-]*)*\s+(?:Inc|Ltd|LLC|LP|L\.P|Fund|Partners|Capital)\.?",
    )
});

/// `X 주식회사`, tried only when no other form matches since the token before
/// a spaced suffix is often a column heading
static SPACED_SUFFIX_ENTITY: Lazy<Regex> = Lazy::new(|| literal_regex(r"[^\s,()\d\-][^\s,()]*\s+주식회사"));

/// Allotment type named in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allotment {
    /// Third-party allotment or private placement
    ThirdParty,
    /// Allotment to existing shareholders
    Shareholders,
    /// General public offering
    PublicOffering,
}

/// Detect the allotment type from stripped full text
///
/// Third-party wording wins over shareholder wording, which wins over
/// public-offering wording.
pub fn detect_allotment(stripped: &str) -> Option<Allotment> {
    if THIRD_PARTY.is_match(stripped) {
        Some(Allotment::ThirdParty)
    } else if SHAREHOLDERS.is_match(stripped) {
        Some(Allotment::Shareholders)
    } else if PUBLIC_OFFERING.is_match(stripped) {
        Some(Allotment::PublicOffering)
    } else {
        None
    }
}

/// First entity name in the candidate, bounded to `investor_snippet_chars`
pub fn parse_allottee(candidate: &str, config: &ExtractorConfig) -> Resolution<String> {
    if is_undetermined(candidate) {
        return Resolution::Undetermined;
    }
    match ENTITY.find(candidate).or_else(|| SPACED_SUFFIX_ENTITY.find(candidate)) {
        Some(m) => {
            let snippet: String = m.as_str().chars().take(config.investor_snippet_chars).collect();
            Resolution::Value(snippet.trim().to_string())
        }
        None => Resolution::NoToken,
    }
}
