use serde::{Deserialize, Serialize};

use crate::core::error::PageFailure;

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Direct,
    Ocr,
}

/// Resolved text for a single page, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub source: TextSource,
    pub text: String,
}

impl PageText {
    pub fn direct(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            source: TextSource::Direct,
            text: text.into(),
        }
    }

    pub fn ocr(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            source: TextSource::Ocr,
            text: text.into(),
        }
    }

    pub fn marker(&self) -> String {
        match self.source {
            TextSource::Direct => format!("--- Page {} ---", self.page_number),
            TextSource::Ocr => format!("--- Page {} (OCR) ---", self.page_number),
        }
    }

    fn push_block(&self, out: &mut String) {
        out.push('\n');
        out.push_str(&self.marker());
        out.push('\n');
        out.push_str(&self.text);
    }
}

/// Exactly one of: text from a single source, or the reason there is none.
pub type PageOutcome = Result<PageText, PageFailure>;

/// Per-page outcomes for one document, in page order.
#[derive(Debug, Default)]
pub struct DocumentExtraction {
    pub pages: Vec<PageOutcome>,
}

impl DocumentExtraction {
    pub fn new(pages: Vec<PageOutcome>) -> Self {
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn resolved(&self) -> impl Iterator<Item = &PageText> {
        self.pages.iter().filter_map(|page| page.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageFailure> {
        self.pages.iter().filter_map(|page| page.as_ref().err())
    }

    pub fn count_from(&self, source: TextSource) -> usize {
        self.resolved().filter(|page| page.source == source).count()
    }

    /// Page blocks joined in order, trimmed. Pages without text contribute nothing.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for page in self.resolved() {
            page.push_block(&mut out);
        }
        out.trim().to_string()
    }
}
