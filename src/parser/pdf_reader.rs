use std::path::{Path, PathBuf};

use lopdf::Document;
use once_cell::unsync::OnceCell;
use tempfile::TempDir;
use tracing::debug;

use crate::core::error::PdfError;
use crate::ocr::{PageRenderer, RenderedPage};
use crate::parser::text_extractor::extract_page_text;
use crate::parser::{PdfBackend, PdfDocument};

/// Text layer through `lopdf`, page images through `pdftoppm`.
#[derive(Debug, Clone, Default)]
pub struct LopdfBackend {
    renderer: PageRenderer,
}

impl LopdfBackend {
    pub fn new(renderer: PageRenderer) -> Self {
        Self { renderer }
    }
}

impl PdfBackend for LopdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
        let reader = PdfReader::new(path.to_path_buf(), self.renderer.clone())?;
        Ok(Box::new(reader))
    }
}

/// An opened PDF plus a scratch directory for its rendered pages.
///
/// The scratch directory is created on the first render and removed with the reader.
#[derive(Debug)]
pub struct PdfReader {
    path: PathBuf,
    document: Document,
    page_count: u32,
    renderer: PageRenderer,
    scratch: OnceCell<TempDir>,
}

impl PdfReader {
    pub fn new(path: PathBuf, renderer: PageRenderer) -> Result<Self, PdfError> {
        let document = Document::load(&path)?;
        let page_count = u32::try_from(document.get_pages().len())
            .map_err(|_| PdfError::Unsupported("too many pages".to_string()))?;
        debug!("Opened {} ({} page(s))", path.display(), page_count);

        Ok(Self {
            path,
            document,
            page_count,
            renderer,
            scratch: OnceCell::new(),
        })
    }

    fn scratch_dir(&self) -> Result<&Path, PdfError> {
        let scratch = self
            .scratch
            .get_or_try_init(|| tempfile::Builder::new().prefix("pdfsweep-").tempdir())?;
        Ok(scratch.path())
    }

    fn check_page(&self, page_number: u32) -> Result<(), PdfError> {
        if page_number == 0 || page_number > self.page_count {
            return Err(PdfError::PageOutOfRange(page_number));
        }
        Ok(())
    }
}

impl PdfDocument for PdfReader {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn direct_text(&self, page_number: u32) -> Result<String, PdfError> {
        self.check_page(page_number)?;
        Ok(extract_page_text(&self.document, page_number)?)
    }

    fn render_page(&self, page_number: u32, dpi: u32) -> Result<RenderedPage, PdfError> {
        self.check_page(page_number)?;
        let scratch = self.scratch_dir()?;
        let rendered = self
            .renderer
            .render_page(&self.path, page_number, dpi, scratch)?;
        Ok(rendered)
    }
}
