use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::export::FileStore;

/// [`FileStore`] on the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }

    fn write_text(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                // rename cannot cross filesystems; fall back to copy + delete
                debug!(
                    "rename {} -> {} failed ({}), copying instead",
                    from.display(),
                    to.display(),
                    rename_err
                );
                if fs::copy(from, to).is_err() {
                    return Err(rename_err);
                }
                fs::remove_file(from)
            }
        }
    }
}
