//! Up-front checks that run once, before the worker pool starts (spec.md
//! §4.6): fail fast on bad option combinations or missing external tools
//! rather than discovering them mid-pipeline on page 40 of 200.
//!
//! Check ordering and the page-range parsing rules are grounded on
//! `original_source/python/ocrmypdf/_validation.py`'s `check_options`
//! (mutual-exclusivity and sidecar/stdout checks before
//! `check_dependency_versions`'s tool probing) and its `_pages_from_ranges`;
//! `is_file_writable` mirrors `helpers.py`'s racy create-then-delete test.

use crate::error::{CoreError, CoreResult};
use crate::external;
use crate::options::Options;
use std::collections::BTreeSet;
use std::path::Path;

/// Runs every up-front check against `options`, in the order a caller
/// should see failures: option combinations first (cheap, no subprocess),
/// then tool presence (one `probe_version` per tool actually needed), then
/// path writability last (only matters once everything else passed).
pub struct Validator;

impl Validator {
    /// Returns the parsed page set (if `pages` was set) so the caller
    /// doesn't have to re-parse `options.pages` itself.
    pub fn validate(options: &Options) -> CoreResult<Option<BTreeSet<u32>>> {
        check_mode_exclusivity(options)?;
        check_sidecar(options)?;
        let pages = match &options.pages {
            Some(ranges) => Some(parse_page_ranges(ranges)?),
            None => None,
        };

        check_dependency_versions(options)?;

        check_output_writable(&options.output_file)?;
        check_input_readable(&options.input_file)?;

        Ok(pages)
    }
}

/// At most one of `force_ocr`, `skip_text`, `redo_ocr`.
fn check_mode_exclusivity(options: &Options) -> CoreResult<()> {
    let exclusive = [options.force_ocr, options.skip_text, options.redo_ocr]
        .iter()
        .filter(|b| **b)
        .count();
    if exclusive >= 2 {
        return Err(CoreError::BadArgs(
            "choose only one of force_ocr, skip_text, redo_ocr".to_string(),
        ));
    }
    if !options.clean && options.clean_final {
        // clean_final implies clean; Options itself doesn't enforce this,
        // so a caller setting clean_final without clean is a bad argument
        // rather than a silent promotion.
        return Err(CoreError::BadArgs(
            "clean_final requires clean to also be set".to_string(),
        ));
    }
    Ok(())
}

/// `--sidecar` is incompatible with writing the final PDF to stdout.
fn check_sidecar(options: &Options) -> CoreResult<()> {
    if options.sidecar.is_some() && is_stdout(&options.output_file) {
        return Err(CoreError::BadArgs(
            "sidecar is incompatible with stdout output".to_string(),
        ));
    }
    Ok(())
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Parses `"1-3,5,7-9"` into a sorted set of 0-based page indices,
/// rejecting non-positive or malformed entries.
fn parse_page_ranges(ranges: &str) -> CoreResult<BTreeSet<u32>> {
    let mut pages = BTreeSet::new();
    for group in ranges.split(',') {
        let group = group.trim();
        if group.is_empty() {
            continue;
        }
        match group.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| CoreError::BadArgs(format!("invalid page range: {group}")))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| CoreError::BadArgs(format!("invalid page range: {group}")))?;
                if start == 0 || end == 0 || start > end {
                    return Err(CoreError::BadArgs(format!("invalid page range: {group}")));
                }
                for page in start..=end {
                    pages.insert(page - 1);
                }
            }
            None => {
                let page: u32 = group
                    .parse()
                    .map_err(|_| CoreError::BadArgs(format!("invalid page number: {group}")))?;
                if page == 0 {
                    return Err(CoreError::BadArgs(format!("invalid page number: {group}")));
                }
                pages.insert(page - 1);
            }
        }
    }
    Ok(pages)
}

/// Probes only the tools the selected options actually need, per spec.md
/// §6: "absence is missing_dependency only when required by selected
/// options."
fn check_dependency_versions(options: &Options) -> CoreResult<()> {
    external::ocr_engine::probe_version()?;
    external::postscript::probe_version()?;

    if options.fast_web_view {
        external::linearizer::probe_version()?;
    }
    if options.optimize >= 1 {
        external::jbig2enc::probe_version()?;
    }
    if options.optimize >= 2 {
        external::quantizer::probe_version()?;
    }
    if options.deskew || options.clean || options.remove_background {
        external::descanner::probe_version()?;
    }
    Ok(())
}

fn check_output_writable(output_file: &Path) -> CoreResult<()> {
    if is_stdout(output_file) {
        return Ok(());
    }
    if !is_file_writable(output_file) {
        return Err(CoreError::OutputFileAccess(format!(
            "{} is not a writable file",
            output_file.display()
        )));
    }
    Ok(())
}

fn check_input_readable(input_file: &Path) -> CoreResult<()> {
    if is_stdout(input_file) {
        return Ok(());
    }
    if !input_file.is_file() {
        return Err(CoreError::InputFile(format!(
            "{} does not exist or is not a file",
            input_file.display()
        )));
    }
    Ok(())
}

/// Intentionally racy writability probe: open for write (creating the file
/// if absent, or opening it in place if present), then remove it again if
/// it was newly created. We only ever write to the output location if we
/// succeed and can replace it atomically, so this check just needs to rule
/// out permission/path problems before the run starts.
fn is_file_writable(path: &Path) -> bool {
    if path.exists() {
        return std::fs::OpenOptions::new().write(true).open(path).is_ok();
    }
    match std::fs::OpenOptions::new().write(true).create(true).open(path) {
        Ok(_) => {
            let _ = std::fs::remove_file(path);
            true
        }
        Err(_) => false,
    }
}
