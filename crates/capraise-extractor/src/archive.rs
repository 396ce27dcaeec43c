//! Unpack a downloaded document container into decoded markup documents

use crate::error::ExtractorError;
use capraise_domain::{DocumentArchive, FilingKey};
use std::io::{Cursor, Read};
use tracing::{debug, warn};

const ZIP_MAGIC: &[u8] = b"PK";
const MARKUP_EXTENSIONS: [&str; 3] = [".xml", ".html", ".htm"];

/// One decoded markup document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    /// Entry name inside the container
    pub name: String,
    /// Decoded markup
    pub markup: String,
}

/// Unpack every markup document, main document first
///
/// The main document is `<key>.xml`; without a key, the entry whose stem is
/// all digits. Attachments follow in name order. A container that is not a
/// ZIP archive but starts with markup is taken as a single document.
pub fn unpack(
    archive: &DocumentArchive,
    key: Option<&FilingKey>,
) -> Result<Vec<MarkupDocument>, ExtractorError> {
    if archive.is_empty() {
        return Err(ExtractorError::Archive("empty container".to_string()));
    }

    if !archive.bytes.starts_with(ZIP_MAGIC) {
        let markup = decode(&archive.bytes).ok_or_else(|| ExtractorError::Encoding {
            name: "document".to_string(),
        })?;
        if !markup.trim_start().starts_with('<') {
            return Err(ExtractorError::Archive(
                "container is neither ZIP nor markup".to_string(),
            ));
        }
        return Ok(vec![MarkupDocument {
            name: "document.xml".to_string(),
            markup,
        }]);
    }

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes.as_slice()))?;
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.is_dir() || !is_markup_name(file.name()) {
            continue;
        }
        let name = file.name().to_string();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        entries.push((name, bytes));
    }

    let total = entries.len();
    entries.sort_by(|(a, _), (b, _)| (!is_main(a, key), a).cmp(&(!is_main(b, key), b)));

    let mut documents = Vec::with_capacity(total);
    for (name, bytes) in entries {
        match decode(&bytes) {
            Some(markup) => documents.push(MarkupDocument { name, markup }),
            None => warn!("Skipping undecodable document {}", name),
        }
    }

    if documents.is_empty() {
        return Err(ExtractorError::NoMarkup(total));
    }

    debug!("Unpacked {} of {} markup documents", documents.len(), total);
    Ok(documents)
}

fn is_markup_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    MARKUP_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn stem(name: &str) -> &str {
    let file = name.rsplit('/').next().unwrap_or(name);
    file.split('.').next().unwrap_or(file)
}

fn is_main(name: &str, key: Option<&FilingKey>) -> bool {
    let stem = stem(name);
    match key {
        Some(key) => stem == key.as_str(),
        None => !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()),
    }
}

/// Decode as UTF-8, falling back to EUC-KR
pub fn decode(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }
    encoding_rs::EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, &[u8])]) -> DocumentArchive {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, bytes) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(bytes).unwrap();
            }
            writer.finish().unwrap();
        }
        DocumentArchive::new(buffer.into_inner())
    }

    #[test]
    fn test_main_document_comes_first() {
        let archive = zip_of(&[
            ("20240305000123_00760.xml", b"<p>attachment</p>"),
            ("20240305000123.xml", b"<p>main</p>"),
            ("readme.txt", b"ignored"),
        ]);
        let key = FilingKey::new("20240305000123").unwrap();
        let documents = unpack(&archive, Some(&key)).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].name, "20240305000123.xml");
        assert_eq!(documents[1].name, "20240305000123_00760.xml");
    }

    #[test]
    fn test_main_document_without_key() {
        let archive = zip_of(&[("b_attach.xml", b"<p>b</p>"), ("20240305000123.xml", b"<p>a</p>")]);
        let documents = unpack(&archive, None).unwrap();
        assert_eq!(documents[0].name, "20240305000123.xml");
    }

    #[test]
    fn test_bare_markup_is_one_document() {
        let archive = DocumentArchive::new(b"  <html><body>x</body></html>".to_vec());
        let documents = unpack(&archive, None).unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[test]
    fn test_status_text_is_rejected() {
        let archive = DocumentArchive::new(b"{\"status\":\"013\"}".to_vec());
        assert!(matches!(unpack(&archive, None), Err(ExtractorError::Archive(_))));
        assert!(unpack(&DocumentArchive::new(Vec::new()), None).is_err());
    }

    #[test]
    fn test_truncated_zip_is_rejected() {
        let archive = DocumentArchive::new(b"PK\x03\x04garbage".to_vec());
        assert!(unpack(&archive, None).is_err());
    }

    #[test]
    fn test_zip_without_markup() {
        let archive = zip_of(&[("notes.txt", b"hello")]);
        assert!(matches!(unpack(&archive, None), Err(ExtractorError::NoMarkup(0))));
    }

    #[test]
    fn test_euc_kr_fallback() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("<p>유상증자</p>");
        assert!(std::str::from_utf8(&encoded).is_err());
        assert_eq!(decode(&encoded).as_deref(), Some("<p>유상증자</p>"));
    }
}
