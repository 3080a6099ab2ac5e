//! The single entry point this crate exposes (spec.md §6): `run(options)`
//! drives validation, the per-page worker pool, assembly, and image
//! optimisation, then writes the result without ever touching
//! `output_file` until the whole run has succeeded.

use crate::assembler::Assembler;
use crate::classifier::{self, PageAction};
use crate::error::{CoreError, CoreResult};
use crate::optimizer::ImageOptimiser;
use crate::options::{Job, Options};
use crate::parser::PdfReader;
use crate::pdf_info::PdfInfo;
use crate::pipeline::PagePipeline;
use crate::pool::process_pages;
use std::fs::File;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

/// Runs a full OCR job: validate, classify, process pages in parallel,
/// assemble, optimise, publish. Returns the stable process exit code from
/// spec.md §6 regardless of success or failure; never panics on a
/// recoverable error.
pub fn run(options: Options) -> ExitCode {
    match run_inner(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn run_inner(options: Options) -> CoreResult<()> {
    let requested_pages = crate::validator::Validator::validate(&options)?;

    let job = Job::new(options)?;
    process_job(&job, &requested_pages)
}

fn process_job(job: &Job, requested_pages: &Option<std::collections::BTreeSet<u32>>) -> CoreResult<()> {
    let options = &job.options;

    let forbid_prior_ocr = !options.force_ocr && !options.redo_ocr;
    let pdf_info = PdfInfo::load(&job.input_path, forbid_prior_ocr)?;

    let page_nos = selected_pages(&pdf_info, requested_pages);

    let finalized: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let cancelled = Arc::new(AtomicBool::new(false));

    let jobs: Vec<(u32, Box<dyn FnOnce() -> Result<(), CoreError> + Send>)> = page_nos
        .iter()
        .map(|&page_no| {
            let input_path = job.input_path.clone();
            let options = options.clone();
            let context = Arc::clone(&job.context);
            let pdf_info = pdf_info.clone();
            let finalized = Arc::clone(&finalized);
            let job_closure: Box<dyn FnOnce() -> Result<(), CoreError> + Send> = Box::new(move || {
                let document = PdfReader::<File>::open_document(&input_path)
                    .map_err(|e| CoreError::InputFile(e.to_string()))?;
                let page_info = pdf_info
                    .pages
                    .get(page_no as usize)
                    .ok_or_else(|| CoreError::Internal(format!("no PageInfo for page {page_no}")))?;
                let action = classifier::classify(page_info, &options);
                if let PageAction::Error { reason } = &action {
                    return Err(CoreError::OcrConfig(reason.clone()));
                }

                let pipeline = PagePipeline::new(&context, &options);
                pipeline.run(&document, page_no, &action)?;

                finalized.lock().unwrap().push(page_no);
                Ok(())
            });
            (page_no, job_closure)
        })
        .collect();

    if !jobs.is_empty() {
        let outcomes = process_pages(jobs, job.worker_count.get(), Arc::clone(&cancelled), || CoreError::Cancelled);
        for (page_no, outcome) in outcomes {
            if let Err(e) = outcome {
                job.abort();
                return Err(CoreError::Internal(format!("page {page_no} failed: {e}")));
            }
        }
    }

    let mut ordered_pages = Arc::try_unwrap(finalized).unwrap().into_inner().unwrap();
    ordered_pages.sort_unstable();

    let assembled_path = job.context.path().join("assembled.pdf");
    let assembler = Assembler::new(&job.context);
    assembler.assemble(
        &ordered_pages,
        options.output_type,
        options.fast_web_view,
        &options.metadata_overrides,
        &assembled_path,
    )?;

    let optimiser = ImageOptimiser::new(options, job.context.path().to_path_buf());
    let optimized_path = job.context.path().join("optimized.pdf");
    optimiser.optimise(&assembled_path, &optimized_path)?;

    publish(&optimized_path, &job.output_path)
}

/// Intersects every page the classifier would process with the caller's
/// `--pages` selection, if any was given (an empty intersection just means
/// nothing to do, not an error).
fn selected_pages(pdf_info: &PdfInfo, requested: &Option<std::collections::BTreeSet<u32>>) -> Vec<u32> {
    let all: Vec<u32> = (0..pdf_info.pages.len() as u32).collect();
    match requested {
        Some(pages) => all.into_iter().filter(|p| pages.contains(p)).collect(),
        None => all,
    }
}

/// Writes `source` to `output_path` via a named temp file in the same
/// directory, then renames atomically, so a crash mid-write never leaves a
/// partial file at the real output path (spec.md §5: "partial outputs are
/// never published").
fn publish(source: &std::path::Path, output_path: &std::path::Path) -> CoreResult<()> {
    if output_path.as_os_str() == "-" {
        let bytes = std::fs::read(source).map_err(|e| CoreError::Internal(e.to_string()))?;
        use std::io::Write;
        std::io::stdout()
            .write_all(&bytes)
            .map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
        return Ok(());
    }

    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
    let bytes = std::fs::read(source).map_err(|e| CoreError::Internal(e.to_string()))?;
    use std::io::Write;
    temp.write_all(&bytes).map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
    temp.persist(output_path)
        .map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
    Ok(())
}
