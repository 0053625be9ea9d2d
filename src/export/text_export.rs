use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use crate::export::FileStore;

/// Writes a document's extracted text to `<out_dir>/<stem>.txt`.
pub struct TextExporter<'a> {
    store: &'a dyn FileStore,
    out_dir: PathBuf,
}

impl<'a> TextExporter<'a> {
    pub fn new(store: &'a dyn FileStore, out_dir: PathBuf) -> Self {
        Self { store, out_dir }
    }

    /// The stem keeps its original bytes; only `.txt` is appended.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let mut name = source
            .file_stem()
            .unwrap_or(OsStr::new("document"))
            .to_os_string();
        name.push(".txt");
        self.out_dir.join(name)
    }

    /// Overwrites any existing file of the same name.
    pub fn export(&self, source: &Path, text: &str) -> io::Result<PathBuf> {
        let path = self.output_path(source);
        self.store.write_text(&path, text)?;
        Ok(path)
    }
}
