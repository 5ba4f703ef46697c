// src/extract.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Seam for PDF text extraction. Infallible outward: a document that cannot
/// be parsed contributes an empty string, so matching simply finds nothing.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> String;
}

/// Production extractor over `pdf-extract`. Text comes back in page order;
/// whitespace runs are collapsed so keyword substrings survive PDF line
/// breaks and column layouts.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> String {
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) => collapse_whitespace(&text),
            Err(e) => {
                tracing::warn!(target: "extract", error = %e, "pdf text extraction failed, treating as empty");
                String::new()
            }
        }
    }
}

/// Collapse any whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re.replace_all(s, " ").trim().to_string()
}
