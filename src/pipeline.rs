use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::core::error::{DocumentFailure, PageFailure};
use crate::core::model::{DocumentExtraction, PageOutcome, PageText};
use crate::ocr::{OcrEngine, RenderedPage};
use crate::parser::text_extractor::has_text;
use crate::parser::{PdfBackend, PdfDocument};

/// Rendering resolution used for OCR.
pub const DEFAULT_DPI: u32 = 150;

/// Decides, per page, between the text layer and OCR.
pub struct PageTextResolver<'a> {
    ocr: &'a dyn OcrEngine,
    dpi: u32,
}

impl<'a> PageTextResolver<'a> {
    pub fn new(ocr: &'a dyn OcrEngine, dpi: u32) -> Self {
        Self { ocr, dpi }
    }

    /// Direct text wins when it is non-blank; otherwise the page is rendered and OCR'd once.
    pub fn resolve(&self, document: &dyn PdfDocument, page_number: u32) -> PageOutcome {
        match document.direct_text(page_number) {
            Ok(text) if has_text(&text) => return Ok(PageText::direct(page_number, text)),
            Ok(_) => {}
            Err(err) => debug!("No usable text layer on page {}: {}", page_number, err),
        }

        let image = document
            .render_page(page_number, self.dpi)
            .map_err(|source| PageFailure::Render {
                page_number,
                source,
            })?;

        let recognized = self.ocr.recognize(&image);
        discard_image(&image);
        let tokens = recognized.map_err(|source| PageFailure::Ocr {
            page_number,
            source,
        })?;

        let fragments: Vec<&str> = tokens
            .iter()
            .map(|token| token.text.as_str())
            .filter(|text| !text.is_empty())
            .collect();
        if fragments.is_empty() {
            return Err(PageFailure::NoTextFound { page_number });
        }

        Ok(PageText::ocr(page_number, fragments.join("\n")))
    }
}

/// Page images are removed as soon as OCR is done with them.
fn discard_image(image: &RenderedPage) {
    match fs::remove_file(&image.path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => debug!("Could not remove {}: {}", image.path.display(), err),
    }
}

/// Resolves every page of one document.
pub struct DocumentExtractor<'a> {
    backend: &'a dyn PdfBackend,
    resolver: PageTextResolver<'a>,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(backend: &'a dyn PdfBackend, ocr: &'a dyn OcrEngine, dpi: u32) -> Self {
        Self {
            backend,
            resolver: PageTextResolver::new(ocr, dpi),
        }
    }

    /// Page failures are logged as warnings and kept in the result; only a
    /// document that cannot be opened is an `Err`.
    pub fn extract(&self, path: &Path) -> Result<DocumentExtraction, DocumentFailure> {
        let document = self.backend.open(path).map_err(|source| DocumentFailure {
            name: display_name(path),
            source,
        })?;

        let pages = (1..=document.page_count())
            .map(|page_number| {
                let outcome = self.resolver.resolve(document.as_ref(), page_number);
                if let Err(failure) = &outcome {
                    warn!("{}", failure);
                }
                outcome
            })
            .collect();

        Ok(DocumentExtraction::new(pages))
    }

    /// Like [`extract`](Self::extract), but a document failure is logged and yields "".
    pub fn extract_text(&self, path: &Path) -> String {
        text_or_empty(&self.extract(path))
    }
}

/// The document's text, or "" after logging why it could not be opened.
pub fn text_or_empty(extraction: &Result<DocumentExtraction, DocumentFailure>) -> String {
    match extraction {
        Ok(extraction) => extraction.text(),
        Err(failure) => {
            error!("{}", failure);
            String::new()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageSummary {
    pub page: u32,
    pub has_text_layer: bool,
    pub chars: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub file: String,
    pub pages: u32,
    pub needs_ocr: usize,
    pub page_details: Vec<PageSummary>,
}

/// Reports which pages carry a text layer without running OCR.
pub fn inspect_document(
    backend: &dyn PdfBackend,
    path: &Path,
) -> Result<DocumentSummary, DocumentFailure> {
    let document = backend.open(path).map_err(|source| DocumentFailure {
        name: display_name(path),
        source,
    })?;

    let page_details: Vec<PageSummary> = (1..=document.page_count())
        .map(|page| {
            let text = document.direct_text(page).unwrap_or_default();
            PageSummary {
                page,
                has_text_layer: has_text(&text),
                chars: text.trim().chars().count(),
            }
        })
        .collect();

    Ok(DocumentSummary {
        file: display_name(path),
        pages: document.page_count(),
        needs_ocr: page_details.iter().filter(|p| !p.has_text_layer).count(),
        page_details,
    })
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
