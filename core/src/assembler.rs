//! Waits for every page's `{page_no:06d}.merged.pdf`, concatenates them in
//! ascending order, then applies `output_type`/`fast_web_view` (spec.md
//! §4.4). Runs once, after the worker pool has finished every page.

use crate::error::{CoreError, CoreResult};
use crate::operations::merge::{merge_pdfs, MergeInput, MergeOptions, MetadataMode};
use crate::options::{ArtifactKind, MetadataOverrides, OutputType, WorkContext};
use std::path::Path;
use std::time::Duration;

const EXTERNAL_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// Merges finalised pages and applies the assembled output's flavour and
/// web-view linearisation.
pub struct Assembler<'a> {
    context: &'a WorkContext,
}

impl<'a> Assembler<'a> {
    pub fn new(context: &'a WorkContext) -> Self {
        Assembler { context }
    }

    /// Concatenates `{page_no:06d}.merged.pdf` for every page in `page_nos`
    /// (already sorted ascending by the worker pool), applies
    /// `output_type`'s PDF/A conversion and `fast_web_view`'s linearisation,
    /// and writes the final bytes to `output_path`.
    pub fn assemble(
        &self,
        page_nos: &[u32],
        output_type: OutputType,
        fast_web_view: bool,
        metadata_overrides: &MetadataOverrides,
        output_path: &Path,
    ) -> CoreResult<()> {
        validate_metadata_overrides(metadata_overrides)?;

        let inputs: Vec<MergeInput> = page_nos
            .iter()
            .map(|&page_no| MergeInput::new(self.context.path_for(page_no, ArtifactKind::Merged)))
            .collect();

        let metadata_mode = if has_overrides(metadata_overrides) {
            MetadataMode::Custom {
                title: metadata_overrides.title.clone(),
                author: metadata_overrides.author.clone(),
                subject: metadata_overrides.subject.clone(),
                keywords: metadata_overrides.keywords.clone(),
            }
        } else {
            MetadataMode::FromFirst
        };

        let merge_options = MergeOptions {
            page_ranges: None,
            preserve_bookmarks: true,
            preserve_forms: false,
            optimize: false,
            metadata_mode,
        };

        let merged_path = self.context.path().join("assembled.merged.pdf");
        merge_pdfs(inputs, &merged_path, merge_options)
            .map_err(|e| CoreError::PdfMergeFailed(e.to_string()))?;

        let pdfa_path = self.context.path().join("assembled.pdfa.pdf");
        let after_pdfa = match pdfa_level(output_type) {
            Some(level) => {
                crate::external::postscript::to_pdfa(&merged_path, &pdfa_path, level, EXTERNAL_TOOL_TIMEOUT)
                    .map_err(|_| {
                        // Re-tag as `PdfAConversionFailed` (exit code 10) rather than
                        // the raw subprocess error (exit code 7); the distinction
                        // matters to callers per spec.md §6's exit table.
                        CoreError::PdfAConversionFailed(format!(
                            "gs failed to convert {} to PDF/A-{level}",
                            merged_path.display()
                        ))
                    })?;
                pdfa_path.as_path()
            }
            None => merged_path.as_path(),
        };

        if fast_web_view {
            let linearized_path = self.context.path().join("assembled.linearized.pdf");
            crate::external::linearizer::linearize(after_pdfa, &linearized_path, EXTERNAL_TOOL_TIMEOUT)?;
            std::fs::copy(&linearized_path, output_path)
                .map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
        } else {
            std::fs::copy(after_pdfa, output_path)
                .map_err(|e| CoreError::OutputFileAccess(e.to_string()))?;
        }

        Ok(())
    }
}

fn pdfa_level(output_type: OutputType) -> Option<u8> {
    match output_type {
        OutputType::Pdf => None,
        OutputType::PdfA1 => Some(1),
        OutputType::PdfA2 => Some(2),
        OutputType::PdfA3 => Some(3),
    }
}

fn has_overrides(overrides: &MetadataOverrides) -> bool {
    overrides.title.is_some()
        || overrides.author.is_some()
        || overrides.subject.is_some()
        || overrides.keywords.is_some()
}

/// Rejects metadata override values containing private-use-area or
/// non-BMP (astral-plane) characters (spec.md §4.4).
fn validate_metadata_overrides(overrides: &MetadataOverrides) -> CoreResult<()> {
    for (field, value) in [
        ("title", &overrides.title),
        ("author", &overrides.author),
        ("subject", &overrides.subject),
        ("keywords", &overrides.keywords),
    ] {
        if let Some(value) = value {
            if let Some(c) = value.chars().find(|c| is_disallowed_char(*c)) {
                return Err(CoreError::Metadata(format!(
                    "{field} contains disallowed character U+{:04X}",
                    c as u32
                )));
            }
        }
    }
    Ok(())
}

fn is_disallowed_char(c: char) -> bool {
    let cp = c as u32;
    let private_use = (0xE000..=0xF8FF).contains(&cp)
        || (0xF0000..=0xFFFFD).contains(&cp)
        || (0x100000..=0x10FFFD).contains(&cp);
    let non_bmp = cp > 0xFFFF;
    private_use || non_bmp
}
