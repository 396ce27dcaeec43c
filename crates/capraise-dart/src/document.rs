//! Document archive download (`document.xml`)

use crate::error::{DartError, Result};
use crate::session::DartSession;
use capraise_domain::{DocumentArchive, DocumentRetriever, FilingKey};
use tracing::debug;

const ZIP_MAGIC: &[u8] = b"PK";

/// [`DocumentRetriever`] over the DART original-document endpoint
#[derive(Debug)]
pub struct DartDocumentRetriever<'a> {
    session: &'a DartSession,
}

impl<'a> DartDocumentRetriever<'a> {
    /// Create a retriever on `session`
    pub fn new(session: &'a DartSession) -> Self {
        Self { session }
    }
}

impl DocumentRetriever for DartDocumentRetriever<'_> {
    type Error = DartError;

    fn fetch_document(&self, key: &FilingKey) -> Result<DocumentArchive> {
        let body = self
            .session
            .get("document.xml", &[("rcept_no", key.as_str())])?;
        let archive = classify_body(body)?;
        debug!("Downloaded {} bytes for {}", archive.len(), key);
        Ok(archive)
    }
}

/// A ZIP body is the archive; anything else is an error envelope
pub(crate) fn classify_body(body: Vec<u8>) -> Result<DocumentArchive> {
    if body.starts_with(ZIP_MAGIC) {
        return Ok(DocumentArchive::new(body));
    }

    let text = String::from_utf8_lossy(&body);
    if let Some(code) = element(&text, "status") {
        return Err(DartError::Status {
            code: code.to_string(),
            message: element(&text, "message").unwrap_or_default().to_string(),
        });
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        if let Some(code) = value.get("status").and_then(|s| s.as_str()) {
            return Err(DartError::Status {
                code: code.to_string(),
                message: value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    Err(DartError::InvalidResponse(format!(
        "document body is neither an archive nor a status ({} bytes)",
        body.len()
    )))
}

/// Text of the first `<name>…</name>` element
fn element<'t>(text: &'t str, name: &str) -> Option<&'t str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;
    Some(text[start..start + len].trim())
}
