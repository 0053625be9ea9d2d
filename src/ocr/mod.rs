pub mod bridge;
pub mod renderer;

pub use bridge::{OcrConfig, OcrToken, TesseractEngine};
pub use renderer::{PageRenderer, RenderedPage};

use crate::core::error::OcrError;

/// Recognizes text regions in a rendered page image.
///
/// Constructed once per process and shared by reference; initialization may be
/// expensive.
pub trait OcrEngine {
    /// Verifies the engine can run, returning a short description of it.
    fn check_available(&self) -> Result<String, OcrError>;

    fn recognize(&self, image: &RenderedPage) -> Result<Vec<OcrToken>, OcrError>;
}
