use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::core::error::RenderError;

/// A page rasterized to disk, ready for OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Rasterizes single PDF pages through poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    program: String,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Renders `page_number` (1-based) of `pdf_path` into `out_dir` at `dpi`.
    pub fn render_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<RenderedPage, RenderError> {
        fs::create_dir_all(out_dir)?;

        // -singlefile drops pdftoppm's page-number suffix, so the output is <prefix>.png
        let prefix = out_dir.join(format!("page_{:04}", page_number));
        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image_path = rendered_path(&prefix);
        if !image_path.exists() {
            return Err(RenderError::MissingOutput(image_path));
        }

        let (width, height) = image::image_dimensions(&image_path)?;
        debug!(
            "Rendered page {} at {} DPI ({}x{})",
            page_number, dpi, width, height
        );

        Ok(RenderedPage {
            path: image_path,
            width,
            height,
        })
    }
}

fn rendered_path(prefix: &Path) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".png");
    PathBuf::from(name)
}
