//! Embedded bond options: put, call, call ratio and yield-to-call

use crate::config::ExtractorConfig;
use crate::markup::Corpus;
use crate::normalize::{first_percent, literal_regex, window};
use capraise_domain::{BondOptions, Fact, Percent, Presence};
use once_cell::sync::Lazy;
use regex::Regex;

static PUT_OPTION: Lazy<Regex> = Lazy::new(|| literal_regex(r"조기상환청구권|putoption"));
static CALL_OPTION: Lazy<Regex> = Lazy::new(|| literal_regex(r"(?i)매\s*도\s*청\s*구\s*권|call\s*option"));
static CALL_YIELD: Lazy<Regex> = Lazy::new(|| literal_regex(r"(?i)수\s*익\s*률|yield"));

fn presence(found: bool) -> Fact<Presence> {
    Fact::Known(if found { Presence::Present } else { Presence::Absent })
}

/// Scan a parsed bond document for its embedded options
pub fn scan_bond_options(corpus: &Corpus, config: &ExtractorConfig) -> BondOptions {
    let put_option = presence(PUT_OPTION.is_match(&corpus.stripped.text));

    let Some(call) = CALL_OPTION.find(&corpus.text) else {
        return BondOptions {
            put_option,
            call_option: presence(false),
            call_ratio: Fact::Unknown,
            yield_to_call: Fact::Unknown,
        };
    };

    let call_ratio = first_percent(
        window(&corpus.text, call.end(), config.call_ratio_window_chars),
        100,
    )
    .map(Percent::from_hundredths)
    .into();

    let after_call = &corpus.text[call.end()..];
    let yield_to_call = CALL_YIELD
        .find(after_call)
        .and_then(|y| first_percent(window(after_call, y.end(), config.yield_to_call_window_chars), 100))
        .map(Percent::from_hundredths)
        .into();

    BondOptions {
        put_option,
        call_option: presence(true),
        call_ratio,
        yield_to_call,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MarkupDocument;

    fn corpus(text: &str) -> Corpus {
        let documents = [MarkupDocument {
            name: "doc.xml".to_string(),
            markup: format!("<p>{}</p>", text),
        }];
        Corpus::from_documents(&documents).unwrap()
    }

    #[test]
    fn test_call_ratio_and_yield() {
        let corpus = corpus(
            "조기상환청구권(Put Option)에 관한 사항 ... 매도청구권(Call Option)에 관한 사항: \
             발행가액의 30%를 한도로 하며, 연 복리 수익률 3.5%를 가산한 금액",
        );
        let options = scan_bond_options(&corpus, &ExtractorConfig::default());
        assert_eq!(options.put_option, Fact::Known(Presence::Present));
        assert_eq!(options.call_option, Fact::Known(Presence::Present));
        assert_eq!(options.call_ratio, Fact::Known(Percent::from_hundredths(3_000)));
        assert_eq!(options.yield_to_call, Fact::Known(Percent::from_hundredths(350)));
    }

    #[test]
    fn test_absent_options() {
        let corpus = corpus("사채의 만기는 2027년 3월 5일로 한다");
        let options = scan_bond_options(&corpus, &ExtractorConfig::default());
        assert_eq!(options.put_option, Fact::Known(Presence::Absent));
        assert_eq!(options.call_option, Fact::Known(Presence::Absent));
        assert!(options.call_ratio.is_unknown());
        assert!(options.yield_to_call.is_unknown());
    }

    #[test]
    fn test_call_ratio_outside_window_is_unknown() {
        let filler = "가".repeat(200);
        let corpus = corpus(&format!("매도청구권 {} 30%", filler));
        let options = scan_bond_options(&corpus, &ExtractorConfig::default());
        assert_eq!(options.call_option, Fact::Known(Presence::Present));
        assert!(options.call_ratio.is_unknown());
    }
}
