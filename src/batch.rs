use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info};

use crate::core::error::{BatchError, DocumentFailure, FileStep, OcrError};
use crate::core::model::DocumentExtraction;
use crate::export::{FileStore, RunLayout, TextExporter};
use crate::logging::RunLog;
use crate::ocr::OcrEngine;
use crate::parser::PdfBackend;
use crate::pipeline::{display_name, text_or_empty, DocumentExtractor, DEFAULT_DPI};

const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dpi: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            dpi: DEFAULT_DPI,
        }
    }
}

impl BatchConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, dpi: u32) -> Self {
        Self {
            input_dir,
            output_dir,
            dpi,
        }
    }
}

/// What happened to one input file.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub text_path: PathBuf,
    pub moved_to: PathBuf,
    pub text: String,
    pub extraction: Result<DocumentExtraction, DocumentFailure>,
}

impl FileReport {
    pub fn name(&self) -> String {
        display_name(&self.source)
    }

    pub fn succeeded(&self) -> bool {
        self.extraction.is_ok()
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub layout: RunLayout,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Files attempted, including those whose extraction failed.
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|file| !file.succeeded()).count()
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    NoFilesFound,
    DependencyMissing(OcrError),
    Completed(BatchReport),
}

impl BatchOutcome {
    pub fn processed(&self) -> usize {
        match self {
            BatchOutcome::Completed(report) => report.processed(),
            BatchOutcome::NoFilesFound | BatchOutcome::DependencyMissing(_) => 0,
        }
    }
}

/// Drives one batch: scan, check the OCR engine, create the run directory, then
/// extract, write, and move each file in turn.
pub struct BatchRunner<'a> {
    config: BatchConfig,
    store: &'a dyn FileStore,
    ocr: &'a dyn OcrEngine,
    extractor: DocumentExtractor<'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        config: BatchConfig,
        store: &'a dyn FileStore,
        backend: &'a dyn PdfBackend,
        ocr: &'a dyn OcrEngine,
    ) -> Self {
        let extractor = DocumentExtractor::new(backend, ocr, config.dpi);
        Self {
            config,
            store,
            ocr,
            extractor,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn run(&self, run_log: Option<&RunLog>) -> Result<BatchOutcome, BatchError> {
        self.run_at(Local::now().naive_local(), run_log)
    }

    /// Same as [`run`](Self::run) with the run directory named after `started`.
    pub fn run_at(
        &self,
        started: NaiveDateTime,
        run_log: Option<&RunLog>,
    ) -> Result<BatchOutcome, BatchError> {
        self.ensure_roots()?;

        let files = self.discover()?;
        if files.is_empty() {
            return Ok(BatchOutcome::NoFilesFound);
        }

        let engine = match self.ocr.check_available() {
            Ok(engine) => engine,
            Err(err) => {
                error!("❌ OCR engine not available: {}", err);
                info!("⚠️  Process aborted due to missing dependencies.");
                return Ok(BatchOutcome::DependencyMissing(err));
            }
        };

        let layout = self.create_run_dir(started)?;
        if let Some(run_log) = run_log {
            run_log
                .attach(&layout.log_file)
                .map_err(BatchError::filesystem(FileStep::CreatingRunDir, &layout.log_file))?;
        }

        info!("PDF OCR - Processing PDFs from {} folder", self.config.input_dir.display());
        info!("Input folder:  {}", absolute(&self.config.input_dir).display());
        info!("Output folder: {}", absolute(&layout.root).display());
        info!("✓ OCR engine available: {}", engine);
        info!("Found {} PDF file(s). Starting OCR...", files.len());

        let exporter = TextExporter::new(self.store, layout.processed_dir.clone());
        let total = files.len();
        let mut reports = Vec::with_capacity(total);
        for (idx, path) in files.into_iter().enumerate() {
            reports.push(self.process_file(idx + 1, total, path, &layout, &exporter)?);
        }

        info!("✓ Completed! {} PDF(s) processed.", reports.len());
        info!("Results saved to: {}/", layout.name());

        Ok(BatchOutcome::Completed(BatchReport {
            layout,
            files: reports,
        }))
    }

    /// Extracting → Writing → Moving → Logged. Nothing is retried or rolled back.
    fn process_file(
        &self,
        index: usize,
        total: usize,
        source: PathBuf,
        layout: &RunLayout,
        exporter: &TextExporter<'_>,
    ) -> Result<FileReport, BatchError> {
        let name = display_name(&source);
        info!("[{}/{}] Processing: {}", index, total, name);

        let extraction = self.extractor.extract(&source);
        let text = text_or_empty(&extraction);

        let text_path = exporter
            .export(&source, &text)
            .map_err(BatchError::filesystem(FileStep::Writing, exporter.output_path(&source)))?;

        let moved_to = match source.file_name() {
            Some(file_name) => layout.original_dir.join(file_name),
            None => layout.original_dir.join(&name),
        };
        self.store
            .move_file(&source, &moved_to)
            .map_err(BatchError::filesystem(FileStep::Moving, &source))?;

        info!("  ✓ Saved: {}", display_name(&text_path));

        Ok(FileReport {
            source,
            text_path,
            moved_to,
            text,
            extraction,
        })
    }

    fn ensure_roots(&self) -> Result<(), BatchError> {
        for dir in [&self.config.input_dir, &self.config.output_dir] {
            self.store
                .create_dir_all(dir)
                .map_err(BatchError::filesystem(FileStep::Scanning, dir))?;
        }
        Ok(())
    }

    /// PDFs directly inside the input folder, sorted by name.
    pub fn discover(&self) -> Result<Vec<PathBuf>, BatchError> {
        let mut files: Vec<PathBuf> = self
            .store
            .list_files(&self.config.input_dir)
            .map_err(BatchError::filesystem(FileStep::Scanning, &self.config.input_dir))?
            .into_iter()
            .filter(|path| is_pdf(path))
            .collect();
        files.sort();
        Ok(files)
    }

    /// `<output>/<YYYYMMDD_HHMMSS>`, suffixed `_2`, `_3`, ... if a prior run already used it.
    fn create_run_dir(&self, started: NaiveDateTime) -> Result<RunLayout, BatchError> {
        let label = started.format(RUN_DIR_FORMAT).to_string();
        let mut root = self.config.output_dir.join(&label);
        let mut attempt = 1;
        while self.store.exists(&root) {
            attempt += 1;
            root = self.config.output_dir.join(format!("{label}_{attempt}"));
        }

        let layout = RunLayout::new(root);
        for dir in [&layout.original_dir, &layout.processed_dir] {
            self.store
                .create_dir_all(dir)
                .map_err(BatchError::filesystem(FileStep::CreatingRunDir, dir))?;
        }
        Ok(layout)
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
