// src/resolver.rs
// Resolves a gazette URL to raw PDF bytes, following at most one
// HTML → PDF-link hop.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Anchor-text hints that rank a PDF link ahead of its siblings on a gazette
/// landing page.
const LINK_TEXT_HINTS: [&str; 6] = [
    "edital", "anexo", "completo", "gabarito", "resultado", "aviso",
];

#[derive(Debug, Error)]
pub enum ResolveError {
    /// Network failure, timeout, or non-2xx status.
    #[error("source unreachable: {0}")]
    Unreachable(String),
    /// The URL answered, but no PDF could be resolved from it.
    #[error("unresolvable content: {0}")]
    Unresolvable(String),
}

/// A resolved gazette document.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub bytes: Vec<u8>,
    /// Last path segment of the URL that actually served the PDF. Matched
    /// alongside the extracted text, since many gazettes put the edital
    /// number in the filename.
    pub filename: String,
}

/// Seam for the check pipeline; `HttpResolver` is the production
/// implementation, tests substitute canned documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ResolvedDocument, ResolveError>;
}

pub struct HttpResolver {
    client: reqwest::Client,
}

impl HttpResolver {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edital-watch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, ResolveError> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ResolveError::Unreachable(e.to_string()))
    }
}

#[async_trait]
impl DocumentSource for HttpResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedDocument, ResolveError> {
        let resp = self.fetch(url).await?;
        let page_url = resp.url().clone();
        let content_type = declared_content_type(&resp);
        let body = resp
            .bytes()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;

        if is_pdf(&content_type, &body) {
            return Ok(ResolvedDocument {
                filename: last_path_segment(&page_url),
                bytes: body.to_vec(),
            });
        }

        if !content_type.contains("text/html") {
            return Err(ResolveError::Unresolvable(format!(
                "unexpected content type `{content_type}` at {page_url}"
            )));
        }

        // Landing page: pick the best-ranked PDF anchor and follow it.
        let page = String::from_utf8_lossy(&body);
        let link = find_pdf_link(&page, &page_url).ok_or_else(|| {
            ResolveError::Unresolvable(format!("no qualifying PDF link on {page_url}"))
        })?;
        tracing::debug!(target: "resolver", link = %link, "following PDF link from landing page");

        let resp = self.fetch(link.as_str()).await?;
        let served_url = resp.url().clone();
        let content_type = declared_content_type(&resp);
        let body = resp
            .bytes()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;

        if !is_pdf(&content_type, &body) {
            return Err(ResolveError::Unresolvable(format!(
                "link {link} served `{content_type}`, not a PDF"
            )));
        }

        Ok(ResolvedDocument {
            filename: last_path_segment(&served_url),
            bytes: body.to_vec(),
        })
    }
}

fn declared_content_type(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// True if the declared content type or the magic bytes say PDF. Gazette
/// servers routinely mislabel PDFs as octet-stream, so the body gets a vote.
pub fn is_pdf(content_type: &str, head: &[u8]) -> bool {
    content_type.contains("application/pdf") || head.starts_with(b"%PDF-")
}

pub fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default()
        .to_string()
}

/// Scan a landing page for anchors ending in `.pdf` (case-insensitive) and
/// pick the winner: anchors whose visible text carries one of
/// `LINK_TEXT_HINTS` rank ahead of all others; within a rank, document order
/// wins. Relative hrefs resolve against `base`; malformed ones are skipped.
pub fn find_pdf_link(html: &str, base: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    let mut hinted: Vec<Url> = Vec::new();
    let mut plain: Vec<Url> = Vec::new();

    for a in doc.select(&anchors) {
        let href = match a.value().attr("href") {
            Some(h) => h,
            None => continue,
        };
        if !href.to_ascii_lowercase().ends_with(".pdf") {
            continue;
        }
        let link = match base.join(href) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!(target: "resolver", href, error = %e, "skipping malformed link");
                continue;
            }
        };
        let text = a.text().collect::<String>().to_lowercase();
        if LINK_TEXT_HINTS.iter().any(|hint| text.contains(hint)) {
            hinted.push(link);
        } else {
            plain.push(link);
        }
    }

    hinted.into_iter().next().or_else(|| plain.into_iter().next())
}
