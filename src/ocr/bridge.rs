use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::OcrError;
use crate::core::geometry::BBox;
use crate::ocr::renderer::RenderedPage;
use crate::ocr::OcrEngine;

/// One recognized line of text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrToken {
    pub text: String,
    pub bbox: BBox,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    0.5
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub program: String,
    pub lang: String,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            lang: "eng".to_string(),
            dpi: crate::pipeline::DEFAULT_DPI,
        }
    }
}

/// OCR through the `tesseract` CLI in TSV mode.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl OcrEngine for TesseractEngine {
    fn check_available(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.config.program)
            .arg("--version")
            .output()
            .map_err(|source| OcrError::Unavailable {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program: self.config.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let version = String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or(self.config.program.as_str())
            .trim()
            .to_string();
        Ok(version)
    }

    fn recognize(&self, image: &RenderedPage) -> Result<Vec<OcrToken>, OcrError> {
        let output = Command::new(&self.config.program)
            .arg(&image.path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.lang)
            .arg("--dpi")
            .arg(self.config.dpi.to_string())
            .arg("tsv")
            .output()
            .map_err(|source| OcrError::Unavailable {
                program: self.config.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program: self.config.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let tokens = parse_tsv(&stdout)?;
        debug!(
            "Recognized {} line(s) in {}",
            tokens.len(),
            image.path.display()
        );
        Ok(tokens)
    }
}

const WORD_LEVEL: u32 = 5;
const TSV_COLUMNS: usize = 11;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
struct LineKey {
    page: u32,
    block: u32,
    paragraph: u32,
    line: u32,
}

struct LineAccumulator {
    key: LineKey,
    words: Vec<String>,
    bbox: BBox,
    confidence_sum: f32,
}

impl LineAccumulator {
    fn finish(self) -> OcrToken {
        let count = self.words.len().max(1) as f32;
        OcrToken {
            text: self.words.join(" "),
            bbox: self.bbox,
            confidence: (self.confidence_sum / count / 100.0).clamp(0.0, 1.0),
        }
    }
}

/// Groups tesseract's word rows into one token per text line, in reading order.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left, top,
/// width, height, conf, text.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrToken>, OcrError> {
    let mut tokens = Vec::new();
    let mut current: Option<LineAccumulator> = None;

    for (idx, raw) in tsv.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() || raw.starts_with("level") {
            continue;
        }

        let fields: Vec<&str> = raw.split('\t').collect();
        if fields.len() < TSV_COLUMNS {
            return Err(OcrError::MalformedOutput {
                line: line_no,
                reason: format!("expected at least {TSV_COLUMNS} columns, got {}", fields.len()),
            });
        }

        let level = parse_int(fields[0], line_no, "level")?;
        if level != WORD_LEVEL {
            continue;
        }

        let text = fields.get(11).map(|t| t.trim()).unwrap_or("");
        let confidence = parse_float(fields[10], line_no, "conf")?;
        if text.is_empty() || confidence < 0.0 {
            continue;
        }

        let key = LineKey {
            page: parse_int(fields[1], line_no, "page_num")?,
            block: parse_int(fields[2], line_no, "block_num")?,
            paragraph: parse_int(fields[3], line_no, "par_num")?,
            line: parse_int(fields[4], line_no, "line_num")?,
        };
        let bbox = BBox::from_origin(
            parse_float(fields[6], line_no, "left")?,
            parse_float(fields[7], line_no, "top")?,
            parse_float(fields[8], line_no, "width")?,
            parse_float(fields[9], line_no, "height")?,
        );

        match current.as_mut() {
            Some(acc) if acc.key == key => {
                acc.words.push(text.to_string());
                acc.bbox = acc.bbox.union(&bbox);
                acc.confidence_sum += confidence;
            }
            _ => {
                if let Some(done) = current.take() {
                    tokens.push(done.finish());
                }
                current = Some(LineAccumulator {
                    key,
                    words: vec![text.to_string()],
                    bbox,
                    confidence_sum: confidence,
                });
            }
        }
    }

    if let Some(done) = current {
        tokens.push(done.finish());
    }
    Ok(tokens)
}

fn parse_int(field: &str, line: usize, column: &str) -> Result<u32, OcrError> {
    field.trim().parse().map_err(|_| OcrError::MalformedOutput {
        line,
        reason: format!("invalid {column}: {field:?}"),
    })
}

fn parse_float(field: &str, line: usize, column: &str) -> Result<f32, OcrError> {
    field.trim().parse().map_err(|_| OcrError::MalformedOutput {
        line,
        reason: format!("invalid {column}: {field:?}"),
    })
}
