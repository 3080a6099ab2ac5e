//! Job options and the scoped working directory (`WorkContext`) every stage
//! of the pipeline reads from and writes artifacts into.

use crate::error::{CoreError, CoreResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

/// `output_type`: target PDF flavour for the assembled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    Pdf,
    #[default]
    PdfA2,
    PdfA1,
    PdfA3,
}

/// `pdf_renderer`: text-layer placement strategy. Only `Sandwich` is fully
/// implemented; `Hocr`/`Auto` normalise to it with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfRenderer {
    Auto,
    Hocr,
    #[default]
    Sandwich,
}

impl PdfRenderer {
    /// Normalises `auto`/`hocr` to `sandwich`, the only renderer this crate
    /// implements end to end, per the original's `auto -> sandwich` rule.
    pub fn normalise(self) -> Self {
        match self {
            PdfRenderer::Auto | PdfRenderer::Hocr => PdfRenderer::Sandwich,
            PdfRenderer::Sandwich => PdfRenderer::Sandwich,
        }
    }
}

/// Full option surface from spec §6. Populated by the CLI; `core` never
/// reads argv or environment variables itself.
#[derive(Debug, Clone)]
pub struct Options {
    pub input_file: PathBuf,
    pub output_file: PathBuf,

    pub language: Vec<String>,
    pub output_type: OutputType,
    pub pdf_renderer: PdfRenderer,

    pub force_ocr: bool,
    pub skip_text: bool,
    pub redo_ocr: bool,

    pub rotate_pages: bool,
    pub deskew: bool,
    pub clean: bool,
    pub clean_final: bool,
    pub remove_background: bool,
    pub oversample: u32,

    pub optimize: u8,
    pub jpeg_quality: u8,
    pub png_quality: u8,
    pub jbig2_lossy: bool,
    pub jbig2_page_group_size: u32,

    pub jobs: usize,

    pub sidecar: Option<PathBuf>,
    pub fast_web_view: bool,
    pub metadata_overrides: MetadataOverrides,

    pub pages: Option<String>,

    pub keep_temporary_files: bool,
    pub progress_bar: bool,
    pub continue_on_soft_render_error: bool,
}

/// Metadata fields the caller may override on the assembled output. Values
/// containing private-use-area or non-BMP characters are rejected by the
/// Assembler (spec §4.4).
#[derive(Debug, Clone, Default)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            input_file: PathBuf::new(),
            output_file: PathBuf::new(),
            language: vec!["eng".to_string()],
            output_type: OutputType::default(),
            pdf_renderer: PdfRenderer::default(),
            force_ocr: false,
            skip_text: false,
            redo_ocr: false,
            rotate_pages: false,
            deskew: false,
            clean: false,
            clean_final: false,
            remove_background: false,
            oversample: 0,
            optimize: 0,
            jpeg_quality: 85,
            png_quality: 85,
            jbig2_lossy: false,
            jbig2_page_group_size: 10,
            jobs: num_cpus::get(),
            sidecar: None,
            fast_web_view: false,
            metadata_overrides: MetadataOverrides::default(),
            pages: None,
            keep_temporary_files: false,
            progress_bar: false,
            continue_on_soft_render_error: false,
        }
    }
}

/// The kind of intermediate artifact a pipeline stage produces, used to
/// build the `{page_no:06d}.*` filenames from spec §3/§4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Origin,
    Raster,
    Preproc,
    Ocr,
    Merged,
}

impl ArtifactKind {
    fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Origin => "origin.pdf",
            ArtifactKind::Raster => "raster.png",
            ArtifactKind::Preproc => "preproc.png",
            ArtifactKind::Ocr => "ocr.pdf",
            ArtifactKind::Merged => "merged.pdf",
        }
    }
}

/// A scoped acquisition of the Job's working directory: created at Job
/// start, removed on every exit path (`Drop`) unless `keep()` was called.
pub struct WorkContext {
    dir: Option<TempDir>,
    keep_files: bool,
}

impl WorkContext {
    pub fn new() -> CoreResult<Self> {
        let prefix = format!("ocrsandwich-{}-", process::id());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir()
            .map_err(|e| CoreError::Internal(format!("failed to create working directory: {e}")))?;
        debug!(path = %dir.path().display(), "created working directory");
        Ok(WorkContext {
            dir: Some(dir),
            keep_files: false,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.as_ref().expect("working directory already torn down").path()
    }

    /// Builds the `{page_no:06d}.<kind>` path for a page's intermediate
    /// artifact. This filename is the sole ordering channel between workers
    /// and the Assembler (spec §3).
    pub fn path_for(&self, page_no: u32, kind: ArtifactKind) -> PathBuf {
        self.path().join(format!("{page_no:06}.{}", kind.extension()))
    }

    /// Suppresses directory removal on drop (`keep_temporary_files`).
    pub fn keep(&mut self) {
        self.keep_files = true;
    }
}

impl Drop for WorkContext {
    fn drop(&mut self) {
        if self.keep_files {
            if let Some(dir) = self.dir.take() {
                let path = dir.into_path();
                debug!(path = %path.display(), "keeping working directory");
            }
        }
    }
}

/// The top-level unit of work: input/output paths, resolved options, worker
/// count, and the scoped working directory. Destroyed when the output is
/// written or the Job fails.
pub struct Job {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub options: Options,
    pub worker_count: NonZeroUsize,
    /// Shared so per-page worker closures (which must be `'static`, per
    /// `pool::process_pages`) can each hold a handle without cloning the
    /// directory itself.
    pub context: Arc<WorkContext>,
    abort: AtomicBool,
}

impl Job {
    /// Resolves `jobs == 0` to `num_cpus::get()` and creates the scoped
    /// working directory. Mutual-exclusivity of `force_ocr`/`skip_text`/
    /// `redo_ocr` is checked by `Validator`, not here.
    pub fn new(options: Options) -> CoreResult<Self> {
        let worker_count = NonZeroUsize::new(options.jobs).unwrap_or_else(|| {
            NonZeroUsize::new(num_cpus::get()).expect("num_cpus::get() is never zero")
        });

        let input_path = options.input_file.clone();
        let output_path = options.output_file.clone();
        let mut context = WorkContext::new()?;
        if options.keep_temporary_files {
            context.keep();
        }

        Ok(Job {
            input_path,
            output_path,
            options,
            worker_count,
            context: Arc::new(context),
            abort: AtomicBool::new(false),
        })
    }

    /// Signals cancellation to in-flight and not-yet-started page tasks
    /// (spec §5 Cancellation).
    pub fn abort(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}
