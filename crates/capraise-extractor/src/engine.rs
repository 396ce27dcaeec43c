//! The field extraction engine
//!
//! Each field is recovered with the same two tiers:
//!
//! 1. **Structural**: a table cell matching the field's label; the candidate
//!    is the following cells of the same row, up to the next label cell.
//! 2. **Free text**: only when no structural candidate resolves; a bounded
//!    window after each label occurrence in the full text, cut at the next
//!    label of any field.
//!
//! The first candidate that resolves, to a value or to an explicit
//! undetermined phrase, wins. Nothing is ever copied from another row.

use crate::archive::{unpack, MarkupDocument};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::investor::{detect_allotment, parse_allottee, Allotment};
use crate::markup::Corpus;
use crate::normalize::{parse_date, parse_money, parse_rate, window, RawRate, Resolution, StrippedText};
use crate::options::scan_bond_options;
use crate::patterns::{rate_label_sign, FieldKind, LabelTable};
use capraise_domain::{
    DocumentArchive, ExtractedFacts, Fact, FactDate, FilingKey, Investor, Money, ReportCategory,
    Sign, SignedRate,
};
use tracing::{debug, warn};

/// Whether the document container could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// At least one document carried usable markup
    Parsed,
    /// Unreadable container or no usable markup; every field is unknown
    Malformed,
}

/// Result of extracting one filing
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Recovered facts
    pub facts: ExtractedFacts,
    /// Container status
    pub status: ExtractionStatus,
    /// Number of markup documents scanned
    pub documents: usize,
}

impl Extraction {
    fn malformed() -> Self {
        Self {
            facts: ExtractedFacts::unknown(),
            status: ExtractionStatus::Malformed,
            documents: 0,
        }
    }

    /// Whether the container was unreadable
    pub fn is_malformed(&self) -> bool {
        self.status == ExtractionStatus::Malformed
    }
}

/// A resolved candidate and the label that introduced it
#[derive(Debug, Clone)]
struct Hit<T> {
    resolution: Resolution<T>,
    label: String,
}

impl<T> Hit<T> {
    fn into_fact(self) -> Fact<T> {
        match self.resolution {
            Resolution::Value(value) => Fact::Known(value),
            Resolution::Undetermined | Resolution::NoToken => Fact::Unknown,
        }
    }
}

/// Extracts [`ExtractedFacts`] from document containers
#[derive(Debug)]
pub struct FieldExtractor {
    config: ExtractorConfig,
    labels: LabelTable,
}

impl FieldExtractor {
    /// Create an extractor, validating the configuration
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let labels = LabelTable::default_table(config.max_label_chars)?;
        Ok(Self { config, labels })
    }

    /// Create an extractor with a custom label table
    pub fn with_labels(config: ExtractorConfig, labels: LabelTable) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self { config, labels })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract facts from a downloaded container
    ///
    /// Never fails: an unreadable container yields a `Malformed` extraction
    /// with every field unknown.
    pub fn extract(
        &self,
        archive: &DocumentArchive,
        category: ReportCategory,
        key: Option<&FilingKey>,
    ) -> Extraction {
        match unpack(archive, key) {
            Ok(documents) => self.extract_documents(&documents, category),
            Err(e) => {
                warn!("Malformed document container ({} bytes): {}", archive.len(), e);
                Extraction::malformed()
            }
        }
    }

    /// Extract facts from already decoded documents, main document first
    pub fn extract_documents(&self, documents: &[MarkupDocument], category: ReportCategory) -> Extraction {
        let Some(corpus) = Corpus::from_documents(documents) else {
            warn!("No usable markup in {} document(s)", documents.len());
            return Extraction::malformed();
        };

        let facts = self.extract_corpus(&corpus, category);
        debug!(
            "Extracted {} known fields from {} document(s), {} table rows",
            facts.known_count(),
            documents.len(),
            corpus.rows.len()
        );
        Extraction {
            facts,
            status: ExtractionStatus::Parsed,
            documents: documents.len(),
        }
    }

    fn extract_corpus(&self, corpus: &Corpus, category: ReportCategory) -> ExtractedFacts {
        let config = &self.config;
        let money = |field| self.resolve(corpus, field, |c| parse_money(c, config));
        let date = |field| -> Fact<FactDate> {
            self.resolve(corpus, field, |c| parse_date(c, config))
                .map_or(Fact::Unknown, Hit::into_fact)
        };

        let issue_price = money(FieldKind::IssuePrice).map_or(Fact::Unknown, Hit::into_fact);
        let reference_price = money(FieldKind::ReferencePrice).map_or(Fact::Unknown, Hit::into_fact);
        let rate_hit = self.resolve(corpus, FieldKind::DiscountRate, |c| parse_rate(c, config));
        let discount_rate = settle_rate(rate_hit, issue_price, reference_price);

        let bond_options = if category.is_bond() {
            scan_bond_options(corpus, config)
        } else {
            Default::default()
        };

        ExtractedFacts {
            board_resolution_date: date(FieldKind::BoardResolutionDate),
            issue_price,
            reference_price,
            discount_rate,
            subscription_date: date(FieldKind::SubscriptionDate),
            payment_date: date(FieldKind::PaymentDate),
            dividend_record_date: date(FieldKind::DividendRecordDate),
            listing_date: date(FieldKind::ListingDate),
            investor: Fact::Known(self.investor(corpus, category)),
            bond_options,
        }
    }

    fn investor(&self, corpus: &Corpus, category: ReportCategory) -> Investor {
        let allottee = || {
            self.resolve(corpus, FieldKind::Allottee, |c| parse_allottee(c, &self.config))
                .and_then(|hit| hit.into_fact().known())
        };

        match detect_allotment(&corpus.stripped.text) {
            Some(Allotment::ThirdParty) => Investor::ThirdParty { allottee: allottee() },
            allotment => {
                // Private bond placements name the allottee without the wording
                if category.is_bond() {
                    if let Some(name) = allottee() {
                        return Investor::ThirdParty { allottee: Some(name) };
                    }
                }
                match allotment {
                    Some(Allotment::Shareholders) => Investor::Shareholders,
                    Some(Allotment::PublicOffering) => Investor::PublicOffering,
                    _ => Investor::SeeSource,
                }
            }
        }
    }

    /// Run both tiers for one field
    fn resolve<T>(
        &self,
        corpus: &Corpus,
        field: FieldKind,
        parse: impl Fn(&str) -> Resolution<T>,
    ) -> Option<Hit<T>> {
        self.resolve_structural(corpus, field, &parse)
            .or_else(|| self.resolve_free_text(corpus, field, &parse))
    }

    fn resolve_structural<T>(
        &self,
        corpus: &Corpus,
        field: FieldKind,
        parse: &impl Fn(&str) -> Resolution<T>,
    ) -> Option<Hit<T>> {
        for row in &corpus.rows {
            for (i, cell) in row.iter().enumerate() {
                if !self.labels.matches_cell(field, &cell.key) {
                    continue;
                }
                let following: Vec<&str> = row[i + 1..]
                    .iter()
                    .take_while(|next| !self.labels.is_label_cell(&next.key))
                    .map(|next| next.text.as_str())
                    .filter(|text| !text.is_empty())
                    .collect();
                let candidate = if following.is_empty() {
                    self.labels.remainder(field, &cell.text).to_string()
                } else {
                    following.join(" ")
                };

                let resolution = parse(&candidate);
                if resolution.is_resolved() {
                    return Some(Hit {
                        resolution,
                        label: cell.key.clone(),
                    });
                }
            }
        }
        None
    }

    fn resolve_free_text<T>(
        &self,
        corpus: &Corpus,
        field: FieldKind,
        parse: &impl Fn(&str) -> Resolution<T>,
    ) -> Option<Hit<T>> {
        for (start, end) in self.labels.find_in_text(field, &corpus.stripped) {
            let offset = corpus.stripped.source_offset(end);
            let look_ahead = window(&corpus.text, offset, self.config.window_chars);
            let stripped_window = StrippedText::new(look_ahead);
            let look_ahead = match self.labels.first_label_in_text(&stripped_window) {
                Some(next) => &look_ahead[..stripped_window.source_offset(next)],
                None => look_ahead,
            };

            let resolution = parse(look_ahead);
            if resolution.is_resolved() {
                return Some(Hit {
                    resolution,
                    label: corpus.stripped.text[start..end].to_string(),
                });
            }
        }
        None
    }
}

/// Settle the sign of a rate candidate against the two prices
///
/// Sign priority: explicit glyph, then issue vs. reference price, then label
/// wording. When both prices are known and differ, a glyph pointing the
/// other way downgrades the rate to unknown and an explicit zero is replaced
/// by the rate the prices imply. Equal prices mean a zero rate.
fn settle_rate(hit: Option<Hit<RawRate>>, issue: Fact<Money>, reference: Fact<Money>) -> Fact<SignedRate> {
    let Some(hit) = hit else {
        return Fact::Unknown;
    };

    let prices = match (issue, reference) {
        (Fact::Known(issue), Fact::Known(reference)) => Some((issue, reference)),
        _ => None,
    };
    let implied = prices.and_then(|(issue, reference)| SignedRate::between(issue, reference));
    let direction = prices.map(|(issue, reference)| Sign::from_prices(issue, reference));

    let raw = match hit.resolution {
        Resolution::Value(raw) if raw.magnitude > 0 => raw,
        Resolution::Value(_) | Resolution::Undetermined => {
            return Fact::Known(implied.unwrap_or_else(SignedRate::zero));
        }
        Resolution::NoToken => return Fact::Unknown,
    };

    match direction {
        Some(None) => Fact::Known(SignedRate::zero()),
        Some(Some(direction)) => match raw.glyph {
            Some(glyph) if glyph != direction => {
                warn!(
                    "Rate sign contradicts prices ({:?} vs {:?} implied); leaving unknown",
                    glyph, direction
                );
                Fact::Unknown
            }
            _ => Fact::Known(SignedRate::new(raw.magnitude, direction)),
        },
        None => {
            let sign = raw.glyph.unwrap_or_else(|| rate_label_sign(&hit.label));
            Fact::Known(SignedRate::new(raw.magnitude, sign))
        }
    }
}
