//! Command-line front end: parses arguments into `Options`, wires up
//! logging, and hands off to the library entry point.

use clap::{ArgAction, Parser, ValueEnum};
use ocrsandwich_core::options::{MetadataOverrides, OutputType, PdfRenderer};
use ocrsandwich_core::Options;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Add an OCR text layer to a scanned or image-only PDF.
#[derive(Parser, Debug)]
#[command(name = "ocrsandwich", version, about)]
struct Cli {
    /// Input PDF, or `-` to read from stdin.
    input_file: PathBuf,

    /// Output PDF, or `-` to write to stdout.
    output_file: PathBuf,

    /// Language(s) to OCR, e.g. `-l eng -l fra`. Defaults to `eng`.
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    language: Vec<String>,

    /// Target PDF flavour for the assembled output.
    #[arg(long, value_enum, default_value_t = OutputTypeArg::PdfA2)]
    output_type: OutputTypeArg,

    /// Text-layer placement strategy.
    #[arg(long, value_enum, default_value_t = PdfRendererArg::Sandwich)]
    pdf_renderer: PdfRendererArg,

    /// OCR every page, even ones that already contain text.
    #[arg(long)]
    force_ocr: bool,

    /// Skip OCR on pages that already contain text instead of failing.
    #[arg(long)]
    skip_text: bool,

    /// Strip any existing text layer and OCR from scratch.
    #[arg(long)]
    redo_ocr: bool,

    /// Auto-rotate pages detected as misoriented.
    #[arg(long)]
    rotate_pages: bool,

    /// Deskew pages before OCR.
    #[arg(long)]
    deskew: bool,

    /// Clean pages (despeckle) before OCR, discarding the cleaned raster
    /// afterwards.
    #[arg(long)]
    clean: bool,

    /// Use the cleaned raster in the final output too, not just for OCR.
    /// Requires `--clean`.
    #[arg(long)]
    clean_final: bool,

    /// Remove detected background from photo scans.
    #[arg(long)]
    remove_background: bool,

    /// Force rasterisation at this DPI regardless of the page's native
    /// resolution (0 disables oversampling).
    #[arg(long, default_value_t = 0)]
    oversample: u32,

    /// Image optimisation level: 0 (off) to 3 (most aggressive).
    #[arg(long, default_value_t = 0)]
    optimize: u8,

    /// JPEG recompression quality for `--optimize` levels 2+.
    #[arg(long, default_value_t = 85)]
    jpeg_quality: u8,

    /// PNG/indexed quantisation quality for `--optimize` levels 2+.
    #[arg(long, default_value_t = 85)]
    png_quality: u8,

    /// Allow lossy JBIG2 symbol-dictionary sharing.
    #[arg(long)]
    jbig2_lossy: bool,

    /// Number of consecutive pages sharing one JBIG2 symbol dictionary.
    #[arg(long, default_value_t = 10)]
    jbig2_page_group_size: u32,

    /// Number of worker threads; 0 uses the number of logical CPUs.
    #[arg(short = 'j', long, default_value_t = 0)]
    jobs: usize,

    /// Write recognised text to this file alongside the PDF.
    #[arg(long, value_name = "FILE")]
    sidecar: Option<PathBuf>,

    /// Linearise the output for fast web viewing.
    #[arg(long)]
    fast_web_view: bool,

    /// Override the output's Title metadata field.
    #[arg(long, value_name = "TEXT")]
    title: Option<String>,

    /// Override the output's Author metadata field.
    #[arg(long, value_name = "TEXT")]
    author: Option<String>,

    /// Override the output's Subject metadata field.
    #[arg(long, value_name = "TEXT")]
    subject: Option<String>,

    /// Override the output's Keywords metadata field.
    #[arg(long, value_name = "TEXT")]
    keywords: Option<String>,

    /// Restrict processing to these pages, e.g. `1-3,5,7-9`.
    #[arg(long, value_name = "RANGES")]
    pages: Option<String>,

    /// Keep the per-page working directory instead of deleting it on exit.
    #[arg(long)]
    keep_temporary_files: bool,

    /// Show a progress bar while processing.
    #[arg(long)]
    progress_bar: bool,

    /// Continue past pages whose rasteriser fails instead of aborting the
    /// whole run.
    #[arg(long)]
    continue_on_soft_render_error: bool,

    /// Increase log verbosity; repeatable (`-v`, `-vv`).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output below warnings.
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputTypeArg {
    Pdf,
    PdfA1,
    PdfA2,
    PdfA3,
}

impl From<OutputTypeArg> for OutputType {
    fn from(value: OutputTypeArg) -> Self {
        match value {
            OutputTypeArg::Pdf => OutputType::Pdf,
            OutputTypeArg::PdfA1 => OutputType::PdfA1,
            OutputTypeArg::PdfA2 => OutputType::PdfA2,
            OutputTypeArg::PdfA3 => OutputType::PdfA3,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PdfRendererArg {
    Auto,
    Hocr,
    Sandwich,
}

impl From<PdfRendererArg> for PdfRenderer {
    fn from(value: PdfRendererArg) -> Self {
        match value {
            PdfRendererArg::Auto => PdfRenderer::Auto,
            PdfRendererArg::Hocr => PdfRenderer::Hocr,
            PdfRendererArg::Sandwich => PdfRenderer::Sandwich,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let options = build_options(cli);
    ocrsandwich_core::run(options)
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn build_options(cli: Cli) -> Options {
    let language = if cli.language.is_empty() {
        vec!["eng".to_string()]
    } else {
        cli.language
    };

    Options {
        input_file: cli.input_file,
        output_file: cli.output_file,
        language,
        output_type: cli.output_type.into(),
        pdf_renderer: cli.pdf_renderer.into(),
        force_ocr: cli.force_ocr,
        skip_text: cli.skip_text,
        redo_ocr: cli.redo_ocr,
        rotate_pages: cli.rotate_pages,
        deskew: cli.deskew,
        clean: cli.clean,
        clean_final: cli.clean_final,
        remove_background: cli.remove_background,
        oversample: cli.oversample,
        optimize: cli.optimize,
        jpeg_quality: cli.jpeg_quality,
        png_quality: cli.png_quality,
        jbig2_lossy: cli.jbig2_lossy,
        jbig2_page_group_size: cli.jbig2_page_group_size,
        jobs: cli.jobs,
        sidecar: cli.sidecar,
        fast_web_view: cli.fast_web_view,
        metadata_overrides: MetadataOverrides {
            title: cli.title,
            author: cli.author,
            subject: cli.subject,
            keywords: cli.keywords,
        },
        pages: cli.pages,
        keep_temporary_files: cli.keep_temporary_files,
        progress_bar: cli.progress_bar,
        continue_on_soft_render_error: cli.continue_on_soft_render_error,
    }
}
