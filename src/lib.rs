pub mod batch;
pub mod core;
pub mod export;
pub mod logging;
pub mod ocr;
pub mod parser;
pub mod pipeline;

pub use batch::{BatchConfig, BatchOutcome, BatchReport, BatchRunner};
pub use crate::core::model::{DocumentExtraction, PageText, TextSource};
pub use pipeline::{DocumentExtractor, PageTextResolver};
