pub mod local_store;
pub mod text_export;

use std::io;
use std::path::{Path, PathBuf};

pub use local_store::LocalFileStore;
pub use text_export::TextExporter;

/// The filesystem operations a batch performs, so runs can be driven against a fake.
pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Regular files directly inside `dir`; no recursion.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Creates or truncates `path`.
    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Directories of one run: `<output>/<YYYYMMDD_HHMMSS>/{original,processed}` plus the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub root: PathBuf,
    pub original_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub log_file: PathBuf,
}

impl RunLayout {
    pub const ORIGINAL: &'static str = "original";
    pub const PROCESSED: &'static str = "processed";
    pub const LOG_FILE: &'static str = "ocr_log.txt";

    pub fn new(root: PathBuf) -> Self {
        Self {
            original_dir: root.join(Self::ORIGINAL),
            processed_dir: root.join(Self::PROCESSED),
            log_file: root.join(Self::LOG_FILE),
            root,
        }
    }

    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
