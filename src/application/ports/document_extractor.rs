use async_trait::async_trait;

use crate::domain::value_objects::DocumentMetadata;

#[derive(Debug)]
pub enum DocumentExtractionError {
    InvalidUrl(String),
    DownloadFailed(String),
    UnsupportedFormat(String),
    CorruptedFile(String),
    ExtractionFailed(String),
    TooLarge(usize),
}

impl std::fmt::Display for DocumentExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentExtractionError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            DocumentExtractionError::DownloadFailed(msg) => write!(f, "Download failed: {}", msg),
            DocumentExtractionError::UnsupportedFormat(format) => {
                write!(f, "Unsupported format: {}", format)
            }
            DocumentExtractionError::CorruptedFile(msg) => write!(f, "Corrupted file: {}", msg),
            DocumentExtractionError::ExtractionFailed(msg) => {
                write!(f, "Extraction failed: {}", msg)
            }
            DocumentExtractionError::TooLarge(size) => {
                write!(f, "Document too large: {} bytes", size)
            }
        }
    }
}

impl std::error::Error for DocumentExtractionError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Document name, derived from the last URL path segment without extension.
    pub name: String,
    pub pages: Vec<ExtractedPage>,
    pub metadata: DocumentMetadata,
}

impl ExtractedContent {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|page| page.text.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub extract_metadata: bool,
    pub max_pages: Option<usize>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            extract_metadata: true,
            max_pages: None,
        }
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Downloads the document at `url` and extracts its text page by page.
    async fn extract_from_url(
        &self,
        url: &str,
        options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError>;
}
