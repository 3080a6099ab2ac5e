//! Maps a [`PageInfo`] to a [`PageAction`] (spec.md §4.2). Pure function,
//! no I/O: unit-testable as a truth table.

use crate::options::Options;
use crate::pdf_info::PageInfo;

/// The minimum native image DPI below which OCR quality is considered
/// unreliable, unless the caller has opted in via `oversample`.
const MIN_RELIABLE_DPI: f64 = 70.0;

/// The DPI floor applied when a page's native resolution can't be measured
/// (vector-only pages) or falls below it.
const DEFAULT_DPI: f64 = 300.0;

/// What a [`PagePipeline`](crate::pipeline::PagePipeline) should do with one
/// page, chosen once by [`classify`] and never revised.
#[derive(Debug, Clone, PartialEq)]
pub enum PageAction {
    /// Page already has text and the caller didn't ask to re-OCR: leave it
    /// byte-identical.
    Skip,
    /// Rasterise the page at `dpi` and OCR the raster.
    OcrRaster { dpi: f64 },
    /// Page is a single full-page image with no text or vectors: OCR the
    /// image's pixel data directly, skipping rasterisation.
    OcrImageOnly { xref: (u32, u16) },
    /// `force_ocr`: rasterise and OCR regardless of existing content.
    Force { dpi: f64 },
    /// `redo_ocr`: strip the existing text layer, rasterise visible
    /// imagery, OCR, and splice a fresh layer.
    RedoOcr,
    /// Classification failed; the page can't be processed as configured.
    Error { reason: String },
}

/// Resolves the DPI to rasterise/upsample at: the page's `min_dpi` (or
/// [`DEFAULT_DPI`] if unmeasurable), floored at 300 and then clamped to the
/// configured `oversample` lower bound.
fn resolve_dpi(min_dpi: Option<f64>, oversample: u32) -> f64 {
    let base = min_dpi.unwrap_or(DEFAULT_DPI).max(DEFAULT_DPI);
    if oversample > 0 {
        base.max(oversample as f64)
    } else {
        base
    }
}

/// `Some(reason)` if the page's native resolution is too low to OCR
/// reliably and the caller hasn't opted in via `oversample`.
fn low_dpi_error(min_dpi: Option<f64>, oversample: u32) -> Option<String> {
    match min_dpi {
        Some(dpi) if dpi < MIN_RELIABLE_DPI && oversample == 0 => Some(format!(
            "page's native image resolution ({dpi:.0} dpi) is below the {MIN_RELIABLE_DPI:.0} dpi \
             reliability floor; pass --oversample to upsample and OCR anyway"
        )),
        _ => None,
    }
}

/// Implements the decision table in spec.md §4.2 exactly, evaluated top to
/// bottom: the first matching row wins.
pub fn classify(page: &PageInfo, options: &Options) -> PageAction {
    if page.has_text && !options.force_ocr && !options.redo_ocr {
        return PageAction::Skip;
    }

    if page.has_text && options.redo_ocr {
        return PageAction::RedoOcr;
    }

    if options.force_ocr {
        if let Some(reason) = low_dpi_error(page.min_dpi, options.oversample) {
            return PageAction::Error { reason };
        }
        let dpi = resolve_dpi(page.min_dpi, options.oversample);
        return PageAction::Force { dpi };
    }

    // Remaining rows only apply to pages without a text layer.
    debug_assert!(!page.has_text);

    if let Some(reason) = low_dpi_error(page.min_dpi, options.oversample) {
        return PageAction::Error { reason };
    }

    if !page.has_vector && page.images.len() == 1 {
        return PageAction::OcrImageOnly {
            xref: page.images[0].xref,
        };
    }

    let dpi = resolve_dpi(page.min_dpi, options.oversample);
    PageAction::OcrRaster { dpi }
}
