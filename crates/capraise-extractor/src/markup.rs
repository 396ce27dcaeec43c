//! Markup parsing into table rows and normalized full text

use crate::archive::MarkupDocument;
use crate::normalize::{literal_regex, normalize_text, StrippedText};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// DART's custom cell tags, rewritten to `td` before parsing
static CUSTOM_CELL_TAG: Lazy<Regex> = Lazy::new(|| literal_regex(r"(?i)<(/?)t[eu]([\s>/])"));

static ROW_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("tr").ok());

/// One table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Normalized cell text
    pub text: String,
    /// Cell text with whitespace removed and ASCII lowercased
    pub key: String,
}

impl Cell {
    /// Build a cell from raw text
    pub fn new(raw: &str) -> Self {
        let text = normalize_text(raw);
        let key = StrippedText::new(&text).text;
        Self { text, key }
    }
}

/// Everything the engine scans: table rows of all documents in order plus
/// their normalized full text
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Table rows, documents in order
    pub rows: Vec<Vec<Cell>>,
    /// Normalized full text
    pub text: String,
    /// Stripped full text for label matching
    pub stripped: StrippedText,
}

impl Corpus {
    /// Parse documents; `None` when none carries any text
    pub fn from_documents(documents: &[MarkupDocument]) -> Option<Self> {
        let mut rows = Vec::new();
        let mut texts = Vec::new();
        for document in documents {
            let (doc_rows, text) = parse_markup(&document.markup);
            if text.is_empty() {
                continue;
            }
            rows.extend(doc_rows);
            texts.push(text);
        }
        if texts.is_empty() {
            return None;
        }
        let text = texts.join(" ");
        let stripped = StrippedText::new(&text);
        Some(Self {
            rows,
            text,
            stripped,
        })
    }
}

/// Parse one markup document into rows of cells and normalized text
pub fn parse_markup(markup: &str) -> (Vec<Vec<Cell>>, String) {
    let rewritten = CUSTOM_CELL_TAG.replace_all(markup, "<${1}td${2}");
    let html = Html::parse_document(&rewritten);

    let rows = match ROW_SELECTOR.as_ref() {
        Some(selector) => html
            .select(selector)
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| Cell::new(&cell.text().collect::<Vec<_>>().join(" ")))
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect(),
        None => Vec::new(),
    };

    let text = normalize_text(&html.root_element().text().collect::<Vec<_>>().join(" "));
    (rows, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_cell_tags_become_cells() {
        let markup = r#"<TABLE><TR><TU>기준주가</TU><TE ALIGN="RIGHT">10,000</TE></TR></TABLE>"#;
        let (rows, text) = parse_markup(markup);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0][0].key, "기준주가");
        assert_eq!(rows[0][1].text, "10,000");
        assert_eq!(text, "기준주가 10,000");
    }

    #[test]
    fn test_nested_rows_keep_direct_cells_only() {
        let markup = "<table><tr><td>A</td><td><table><tr><td>B</td><td>C</td></tr></table></td></tr></table>";
        let (rows, _) = parse_markup(markup);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].iter().map(|c| c.text.as_str()).collect::<Vec<_>>(), ["B", "C"]);
    }

    #[test]
    fn test_corpus_skips_empty_documents() {
        let documents = vec![
            MarkupDocument {
                name: "a.xml".to_string(),
                markup: "<html></html>".to_string(),
            },
            MarkupDocument {
                name: "b.xml".to_string(),
                markup: "<p>납입일 2024-04-01</p>".to_string(),
            },
        ];
        let corpus = Corpus::from_documents(&documents).unwrap();
        assert_eq!(corpus.text, "납입일 2024-04-01");
        assert!(Corpus::from_documents(&documents[..1]).is_none());
    }
}
