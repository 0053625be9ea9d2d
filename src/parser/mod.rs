pub mod pdf_reader;
pub mod text_extractor;

pub use pdf_reader::{LopdfBackend, PdfReader};

use std::path::Path;

use crate::core::error::PdfError;
use crate::ocr::RenderedPage;

/// Opens PDF files for page-by-page access.
pub trait PdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError>;
}

/// An opened PDF. Pages are numbered from 1.
pub trait PdfDocument {
    fn page_count(&self) -> u32;

    /// Text embedded in the page's content stream; empty when there is none.
    fn direct_text(&self, page_number: u32) -> Result<String, PdfError>;

    fn render_page(&self, page_number: u32, dpi: u32) -> Result<RenderedPage, PdfError>;
}
