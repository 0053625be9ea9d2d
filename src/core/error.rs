use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while rasterizing a page for OCR.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to invoke {program}; is poppler-utils installed?")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("expected rendered image not found: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("rendered image is unreadable: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures reported by a PDF backend.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("unsupported PDF: {0}")]
    Unsupported(String),

    #[error("page {0} is out of range")]
    PageOutOfRange(u32),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures reported by an OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine `{program}` is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("OCR engine `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("malformed OCR output at line {line}: {reason}")]
    MalformedOutput { line: usize, reason: String },
}

/// Why a page contributed no text.
#[derive(Debug, Error)]
pub enum PageFailure {
    #[error("No text found on page {page_number}")]
    NoTextFound { page_number: u32 },

    #[error("Could not OCR page {page_number}: {source}")]
    Render {
        page_number: u32,
        #[source]
        source: PdfError,
    },

    #[error("Could not OCR page {page_number}: {source}")]
    Ocr {
        page_number: u32,
        #[source]
        source: OcrError,
    },
}

impl PageFailure {
    pub fn page_number(&self) -> u32 {
        match self {
            PageFailure::NoTextFound { page_number }
            | PageFailure::Render { page_number, .. }
            | PageFailure::Ocr { page_number, .. } => *page_number,
        }
    }

    /// `NoTextFound` is a recorded outcome; the others are faults that were recovered.
    pub fn is_fault(&self) -> bool {
        !matches!(self, PageFailure::NoTextFound { .. })
    }
}

/// A document that could not be opened or iterated at all.
#[derive(Debug, Error)]
#[error("Error processing {name}: {source}")]
pub struct DocumentFailure {
    pub name: String,
    #[source]
    pub source: PdfError,
}

/// The filesystem stage a batch was in when it halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStep {
    Scanning,
    CreatingRunDir,
    Writing,
    Moving,
}

impl fmt::Display for FileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            FileStep::Scanning => "scan",
            FileStep::CreatingRunDir => "create",
            FileStep::Writing => "write",
            FileStep::Moving => "move",
        };
        f.write_str(verb)
    }
}

/// Faults that halt a batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to {step} {}: {source}", path.display())]
    Filesystem {
        step: FileStep,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    pub fn filesystem(step: FileStep, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| BatchError::Filesystem { step, path, source }
    }

    pub fn step(&self) -> FileStep {
        match self {
            BatchError::Filesystem { step, .. } => *step,
        }
    }
}
