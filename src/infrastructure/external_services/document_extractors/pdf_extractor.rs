use async_trait::async_trait;
use lopdf::{Dictionary, Document, Object};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use regex::Regex;
use reqwest::{Client, Error as ReqwestError};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent, ExtractedPage,
    ExtractionOptions,
};
use crate::domain::value_objects::DocumentMetadata;

const MAX_PDF_SIZE: usize = 100 * 1024 * 1024;

static HORIZONTAL_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("whitespace pattern"));

/// Downloads a PDF over HTTP(S) and extracts its text page by page.
pub struct PdfUrlExtractor {
    client: Client,
    max_file_size: usize,
}

impl PdfUrlExtractor {
    pub fn new(timeout_secs: u64) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_file_size: MAX_PDF_SIZE,
        })
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>, DocumentExtractionError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DocumentExtractionError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocumentExtractionError::DownloadFailed(format!(
                "HTTP {} from {}",
                status, url
            )));
        }

        let expected = response.content_length().unwrap_or(0) as usize;
        if expected > self.max_file_size {
            return Err(DocumentExtractionError::TooLarge(expected));
        }

        // Content-Length is optional, so the limit is enforced while reading.
        let mut data = Vec::with_capacity(expected);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DocumentExtractionError::DownloadFailed(e.to_string()))?
        {
            let received = data.len() + chunk.len();
            if received > self.max_file_size {
                return Err(DocumentExtractionError::TooLarge(received));
            }
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }
}

#[async_trait]
impl DocumentExtractor for PdfUrlExtractor {
    async fn extract_from_url(
        &self,
        url: &str,
        options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        let parsed =
            Url::parse(url).map_err(|e| DocumentExtractionError::InvalidUrl(e.to_string()))?;

        tracing::info!("Downloading PDF from {}", parsed);
        let data = self.download(&parsed).await?;
        tracing::debug!("Downloaded {} bytes", data.len());

        let name = document_name(&parsed);
        let mut content = tokio::task::spawn_blocking(move || {
            extract_document(&name, &data, &options)
        })
        .await
        .map_err(|e| DocumentExtractionError::ExtractionFailed(e.to_string()))??;

        content.metadata.set_source_url(url);
        Ok(content)
    }
}

fn extract_document(
    name: &str,
    data: &[u8],
    options: &ExtractionOptions,
) -> Result<ExtractedContent, DocumentExtractionError> {
    if !data.starts_with(b"%PDF") {
        return Err(DocumentExtractionError::UnsupportedFormat(
            "response is not a PDF document".to_string(),
        ));
    }

    let doc = Document::load_mem(data)
        .map_err(|e| DocumentExtractionError::CorruptedFile(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(DocumentExtractionError::ExtractionFailed(
            "PDF is encrypted".to_string(),
        ));
    }

    let (pages, errors) = extract_pages(&doc, options);

    let mut metadata = if options.extract_metadata {
        extract_metadata_from_doc(&doc)
    } else {
        DocumentMetadata::new()
    };
    metadata.set_property("page_count", serde_json::Value::from(pages.len()));

    if !errors.is_empty() {
        tracing::warn!("{} page(s) of '{}' could not be read", errors.len(), name);
        metadata.set_property(
            "extraction_errors",
            serde_json::Value::Array(errors.into_iter().map(serde_json::Value::String).collect()),
        );
    }

    Ok(ExtractedContent {
        name: name.to_string(),
        pages,
        metadata,
    })
}

fn extract_pages(doc: &Document, options: &ExtractionOptions) -> (Vec<ExtractedPage>, Vec<String>) {
    let page_numbers: Vec<u32> = doc
        .get_pages()
        .into_keys()
        .take(options.max_pages.unwrap_or(usize::MAX))
        .collect();

    let extracted: Vec<Result<ExtractedPage, String>> = page_numbers
        .into_par_iter()
        .map(|page_number| {
            doc.extract_text(&[page_number])
                .map(|text| ExtractedPage {
                    page_number,
                    text: clean_text(&text),
                })
                .map_err(|e| format!("Failed to extract text from page {}: {}", page_number, e))
        })
        .collect();

    let mut pages = Vec::new();
    let mut errors = Vec::new();
    for result in extracted {
        match result {
            Ok(page) => pages.push(page),
            Err(e) => errors.push(e),
        }
    }

    (pages, errors)
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn extract_metadata_from_doc(doc: &Document) -> DocumentMetadata {
    let mut metadata = DocumentMetadata::new();

    let Some(info) = info_dictionary(doc) else {
        return metadata;
    };

    for (key, property) in [
        (b"Title".as_slice(), "title"),
        (b"Author".as_slice(), "author"),
        (b"Subject".as_slice(), "subject"),
    ] {
        let value = info
            .get(key)
            .and_then(Object::as_str)
            .map(|raw| String::from_utf8_lossy(raw).trim().to_string());

        if let Ok(value) = value {
            if !value.is_empty() {
                metadata.set_property(property, serde_json::Value::String(value));
            }
        }
    }

    metadata
}

/// Last path segment of the URL without its extension, with spaces replaced
/// by underscores.
pub fn document_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let stem = segment.split('.').next().unwrap_or_default().trim();

    if stem.is_empty() {
        url.host_str().unwrap_or("document").to_string()
    } else {
        stem.replace(' ', "_")
    }
}

/// Strips NUL bytes and collapses runs of horizontal whitespace. Runs of
/// blank lines become a single paragraph break (`"\n\n"`).
pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut paragraph_break = false;

    for line in text.replace('\0', "").lines() {
        let line = HORIZONTAL_WHITESPACE.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            paragraph_break = !cleaned.is_empty();
            continue;
        }

        if !cleaned.is_empty() {
            cleaned.push_str(if paragraph_break { "\n\n" } else { "\n" });
        }
        cleaned.push_str(line);
        paragraph_break = false;
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, body::Bytes, routing::get};
    use tokio::net::TcpListener;

    use crate::application::ports::TextSplitter;
    use crate::infrastructure::external_services::RecursiveSplitter;

    #[test]
    fn test_document_name_from_url() {
        let url = Url::parse("https://phi-public.s3.amazonaws.com/recipes/ThaiRecipes.pdf").unwrap();
        assert_eq!(document_name(&url), "ThaiRecipes");

        let url = Url::parse("https://example.com/docs/curries.v2.pdf?download=1").unwrap();
        assert_eq!(document_name(&url), "curries");

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(document_name(&url), "example.com");
    }

    #[test]
    fn test_clean_text() {
        let raw = "\n  Pad   Thai\t\tRecipe\0\n\n   \n  Ingredients:  rice noodles  \n  palm sugar\n\n";
        assert_eq!(
            clean_text(raw),
            "Pad Thai Recipe\n\nIngredients: rice noodles\npalm sugar"
        );
    }

    #[test]
    fn test_cleaned_paragraphs_split_first() {
        let text = clean_text("Green curry paste\n\n\nRed curry paste");
        let chunks = RecursiveSplitter::default().split_text(&text, 20);

        assert_eq!(chunks, vec!["Green curry paste", "Red curry paste"]);
    }

    async fn serve_pdf_in_chunks(chunks: usize) -> Url {
        let app = Router::new().route(
            "/big.pdf",
            get(move || async move {
                let parts: Vec<Result<Bytes, std::io::Error>> = (0..chunks)
                    .map(|_| Ok(Bytes::from_static(b"%PDF-1.4")))
                    .collect();
                Body::from_stream(futures::stream::iter(parts))
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{}/big.pdf", addr)).unwrap()
    }

    fn extractor_with_limit(max_file_size: usize) -> PdfUrlExtractor {
        PdfUrlExtractor {
            client: Client::new(),
            max_file_size,
        }
    }

    #[tokio::test]
    async fn test_download_stops_at_size_limit_without_content_length() {
        let url = serve_pdf_in_chunks(4).await;

        let result = extractor_with_limit(16).download(&url).await;

        assert!(matches!(result, Err(DocumentExtractionError::TooLarge(24))));
    }

    #[tokio::test]
    async fn test_download_within_size_limit() {
        let url = serve_pdf_in_chunks(2).await;

        let data = extractor_with_limit(16).download(&url).await.unwrap();

        assert_eq!(data, b"%PDF-1.4%PDF-1.4".to_vec());
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let result = extract_document(
            "page",
            b"<html>not a pdf</html>",
            &ExtractionOptions::default(),
        );

        assert!(matches!(
            result,
            Err(DocumentExtractionError::UnsupportedFormat(_))
        ));
    }

}
