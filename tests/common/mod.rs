#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdfsweep::core::error::{OcrError, PdfError, RenderError};
use pdfsweep::core::geometry::BBox;
use pdfsweep::export::FileStore;
use pdfsweep::ocr::{OcrEngine, OcrToken, RenderedPage};
use pdfsweep::parser::{PdfBackend, PdfDocument};

/// How a fake page behaves under the resolver.
#[derive(Debug, Clone)]
pub enum FakePage {
    Direct(&'static str),
    Scanned(Vec<&'static str>),
    Blank,
    RenderFails,
    OcrFails,
}

fn render_path(pdf: &Path, page_number: u32) -> PathBuf {
    PathBuf::from(format!("{}#page{}.png", pdf.display(), page_number))
}

/// PDFs known by path; any other path fails to open like a corrupt file.
#[derive(Debug, Default)]
pub struct FakeBackend {
    docs: HashMap<PathBuf, Vec<FakePage>>,
    opened: RefCell<Vec<PathBuf>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pdf(mut self, path: impl Into<PathBuf>, pages: Vec<FakePage>) -> Self {
        self.docs.insert(path.into(), pages);
        self
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.borrow().clone()
    }

    /// An OCR engine that answers for every scanned page this backend renders.
    pub fn ocr(&self) -> FakeOcr {
        let mut replies = HashMap::new();
        for (path, pages) in &self.docs {
            for (idx, page) in pages.iter().enumerate() {
                let reply = match page {
                    FakePage::Scanned(lines) => Ok(lines.clone()),
                    FakePage::Blank => Ok(Vec::new()),
                    FakePage::OcrFails => Err(()),
                    FakePage::Direct(_) | FakePage::RenderFails => continue,
                };
                replies.insert(render_path(path, idx as u32 + 1), reply);
            }
        }
        FakeOcr {
            replies,
            calls: RefCell::new(Vec::new()),
            available: true,
        }
    }
}

impl PdfBackend for FakeBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfError> {
        self.opened.borrow_mut().push(path.to_path_buf());
        match self.docs.get(path) {
            Some(pages) => Ok(Box::new(FakeDocument {
                path: path.to_path_buf(),
                pages: pages.clone(),
            })),
            None => Err(PdfError::Unsupported("file is not a PDF".to_string())),
        }
    }
}

struct FakeDocument {
    path: PathBuf,
    pages: Vec<FakePage>,
}

impl FakeDocument {
    fn page(&self, page_number: u32) -> Result<&FakePage, PdfError> {
        self.pages
            .get(page_number as usize - 1)
            .ok_or(PdfError::PageOutOfRange(page_number))
    }
}

impl PdfDocument for FakeDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn direct_text(&self, page_number: u32) -> Result<String, PdfError> {
        match self.page(page_number)? {
            FakePage::Direct(text) => Ok(text.to_string()),
            _ => Ok(String::new()),
        }
    }

    fn render_page(&self, page_number: u32, _dpi: u32) -> Result<RenderedPage, PdfError> {
        if let FakePage::RenderFails = self.page(page_number)? {
            return Err(RenderError::Failed {
                program: "fake-render".to_string(),
                status: "exit status: 99".to_string(),
                stderr: "Syntax Error: broken xref".to_string(),
            }
            .into());
        }
        Ok(RenderedPage {
            path: render_path(&self.path, page_number),
            width: 1240,
            height: 1754,
        })
    }
}

/// Records every image it is asked to recognize.
#[derive(Debug)]
pub struct FakeOcr {
    replies: HashMap<PathBuf, Result<Vec<&'static str>, ()>>,
    calls: RefCell<Vec<PathBuf>>,
    available: bool,
}

impl FakeOcr {
    pub fn empty() -> Self {
        Self {
            replies: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            available: true,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl OcrEngine for FakeOcr {
    fn check_available(&self) -> Result<String, OcrError> {
        if self.available {
            Ok("fake-ocr 1.0".to_string())
        } else {
            Err(OcrError::Unavailable {
                program: "fake-ocr".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            })
        }
    }

    fn recognize(&self, image: &RenderedPage) -> Result<Vec<OcrToken>, OcrError> {
        self.calls.borrow_mut().push(image.path.clone());
        match self.replies.get(&image.path) {
            Some(Ok(lines)) => Ok(lines
                .iter()
                .enumerate()
                .map(|(idx, line)| OcrToken {
                    text: line.to_string(),
                    bbox: BBox::from_origin(100.0, 100.0 + 40.0 * idx as f32, 600.0, 32.0),
                    confidence: 0.9,
                })
                .collect()),
            Some(Err(())) => Err(OcrError::Failed {
                program: "fake-ocr".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "recognition crashed".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// In-memory [`FileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, String>>,
    fail_moves: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.insert_dirs(parent);
        }
        self.files.borrow_mut().insert(path, contents.to_string());
        self
    }

    pub fn failing_moves(self) -> Self {
        self.fail_moves.set(true);
        self
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn files_in(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        self.files
            .borrow()
            .keys()
            .filter(|path| path.parent() == Some(dir.as_ref()))
            .cloned()
            .collect()
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.borrow().iter().cloned().collect()
    }

    fn insert_dirs(&self, path: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
    }

    fn require_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if self.dirs.borrow().contains(parent) => Ok(()),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no parent directory for {}", path.display()),
            )),
        }
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path) || self.files.borrow().contains_key(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.insert_dirs(path);
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.dirs.borrow().contains(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
        }
        Ok(self.files_in(dir))
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.require_parent(path)?;
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.fail_moves.get() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"));
        }
        self.require_parent(to)?;
        let contents = self
            .files
            .borrow_mut()
            .remove(from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        self.files.borrow_mut().insert(to.to_path_buf(), contents);
        Ok(())
    }
}

/// Writes a PDF with one page per entry; an empty entry makes a page with no text layer.
pub fn write_pdf(path: &Path, pages: &[&str]) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            vec![
                Operation::new("re", vec![0.into(), 0.into(), 10.into(), 10.into()]),
                Operation::new("f", vec![]),
            ]
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}
