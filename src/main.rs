use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use pdfsweep::batch::{BatchConfig, BatchOutcome, BatchRunner};
use pdfsweep::export::LocalFileStore;
use pdfsweep::logging::{init_logging, RunLog};
use pdfsweep::ocr::{OcrConfig, PageRenderer, TesseractEngine};
use pdfsweep::parser::LopdfBackend;
use pdfsweep::pipeline::{inspect_document, DEFAULT_DPI};

#[derive(Parser, Debug)]
#[command(name = "pdfsweep")]
#[command(version, about = "Extract text from a folder of PDFs, falling back to OCR for image-only pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every PDF in the input folder (the default)
    Run(RunArgs),

    /// Show which pages of a PDF carry a text layer
    Info {
        /// Input PDF file path
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Folder scanned for PDFs
    #[arg(short, long, default_value = "input")]
    input: PathBuf,

    /// Root for timestamped run folders
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Rendering DPI for OCR
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,

    /// Tesseract language(s), e.g. "eng" or "eng+deu"
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Tesseract executable
    #[arg(long, default_value = "tesseract")]
    tesseract: String,

    /// pdftoppm executable
    #[arg(long, default_value = "pdftoppm")]
    pdftoppm: String,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input"),
            output: PathBuf::from("output"),
            dpi: DEFAULT_DPI,
            lang: "eng".to_string(),
            tesseract: "tesseract".to_string(),
            pdftoppm: "pdftoppm".to_string(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run_batch(RunArgs::default()),
        Some(Commands::Run(args)) => run_batch(args),
        Some(Commands::Info { input, json }) => show_info(input, json),
    }
}

fn run_batch(args: RunArgs) -> Result<()> {
    let run_log = RunLog::new();
    init_logging(run_log.clone())?;

    // One engine for the whole run.
    let ocr = TesseractEngine::new(OcrConfig {
        program: args.tesseract,
        lang: args.lang,
        dpi: args.dpi,
    });
    let backend = LopdfBackend::new(PageRenderer::new(args.pdftoppm));
    let store = LocalFileStore::new();
    let config = BatchConfig::new(args.input, args.output, args.dpi);

    let runner = BatchRunner::new(config, &store, &backend, &ocr);
    let outcome = runner
        .run(Some(&run_log))
        .context("batch halted on a filesystem error")?;
    run_log.detach();

    if let BatchOutcome::NoFilesFound = outcome {
        println!(
            "No PDF files found in {} folder.",
            runner.config().input_dir.display()
        );
    }

    Ok(())
}

fn show_info(input: PathBuf, json: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let backend = LopdfBackend::default();
    let summary = inspect_document(&backend, &input)
        .with_context(|| format!("Failed to open PDF: {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("PDF Information");
    println!("===============");
    println!("File: {}", input.display());
    println!("Pages: {}", summary.pages);
    println!("Pages needing OCR: {}", summary.needs_ocr);
    for page in &summary.page_details {
        let source = if page.has_text_layer {
            "text layer"
        } else {
            "needs OCR"
        };
        println!("  page {:>4}: {} ({} chars)", page.page, source, page.chars);
    }

    Ok(())
}
