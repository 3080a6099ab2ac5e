//! A frozen, read-only snapshot of the input PDF, taken once up front
//! (spec.md §3/§4.1). [`PdfInfo::load`] is the only entry point; every
//! [`PageInfo`] it produces is immutable once built.

use crate::error::{CoreError, CoreResult};
use crate::parser::content::{ContentOperation, ContentParser};
use crate::parser::objects::{PdfDictionary, PdfName, PdfObject};
use crate::parser::page_tree::ParsedPage;
use crate::parser::{PdfDocument, PdfReader};
use std::fs::File;
use std::path::Path;

/// One image XObject referenced from a page's `/Resources/XObject`
/// dictionary, excluding soft masks and inline images.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub xref: (u32, u16),
    pub width_px: u32,
    pub height_px: u32,
    pub bpc: u8,
    pub colorspace_kind: String,
    pub filter_stack: Vec<String>,
    pub dpi: f64,
}

/// Immutable per-page description (spec.md §3). Attributes are computed
/// once by [`PdfInfo::load`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PageInfo {
    pub page_no: u32,
    pub width_pts: f64,
    pub height_pts: f64,
    pub rotation: i32,
    pub images: Vec<ImageEntry>,
    pub has_text: bool,
    pub has_vector: bool,
    pub userunit: f64,
    pub min_dpi: Option<f64>,
    pub prior_ocr_detected: bool,
}

/// A read-only view of the whole input, built once by [`PdfInfo::load`].
#[derive(Debug, Clone)]
pub struct PdfInfo {
    pub pages: Vec<PageInfo>,
}

impl PdfInfo {
    /// Parses `path` once, producing the ordered per-page snapshot. Fails
    /// with [`CoreError::InputFile`] if the file isn't a readable PDF,
    /// [`CoreError::EncryptedPdf`] if it requires a password the empty-
    /// password attempt didn't satisfy, or [`CoreError::PriorOcrFound`] when
    /// `forbid_prior_ocr` is set and an OCR-characteristic invisible text
    /// layer is detected on any page.
    pub fn load(path: &Path, forbid_prior_ocr: bool) -> CoreResult<Self> {
        let document = PdfReader::<File>::open_document(path)
            .map_err(|e| CoreError::InputFile(format!("{}: {e}", path.display())))?;

        if document.is_encrypted_and_locked() {
            return Err(CoreError::EncryptedPdf);
        }

        let page_count = document
            .page_count()
            .map_err(|e| CoreError::InputFile(format!("{}: {e}", path.display())))?;

        let mut pages = Vec::with_capacity(page_count as usize);
        for page_no in 0..page_count {
            let info = load_page_info(&document, page_no)
                .map_err(|e| CoreError::InputFile(format!("{}: page {page_no}: {e}", path.display())))?;
            if forbid_prior_ocr && info.prior_ocr_detected {
                return Err(CoreError::PriorOcrFound);
            }
            pages.push(info);
        }

        Ok(PdfInfo { pages })
    }
}

fn load_page_info<R: std::io::Read + std::io::Seek>(
    document: &PdfDocument<R>,
    page_no: u32,
) -> crate::error::Result<PageInfo> {
    let page = document.get_page(page_no)?;
    let (width_pts, height_pts) = page_dimensions(&page);
    let userunit = page
        .dict
        .get("UserUnit")
        .and_then(|o| o.as_real().or_else(|| o.as_integer().map(|i| i as f64)))
        .unwrap_or(1.0);

    let images = collect_images(document, &page, width_pts, height_pts)?;
    let streams = document.get_page_content_streams(&page)?;

    let mut has_text = false;
    let mut has_vector = false;
    let mut prior_ocr_detected = false;
    for stream in &streams {
        let ops = ContentParser::parse(stream)?;
        scan_content_ops(&ops, &mut has_text, &mut has_vector, &mut prior_ocr_detected);
    }

    let min_dpi = images.iter().map(|i| i.dpi).fold(None, |acc, dpi| {
        Some(acc.map_or(dpi, |m: f64| m.min(dpi)))
    });

    Ok(PageInfo {
        page_no,
        width_pts,
        height_pts,
        rotation: page.rotation,
        images,
        has_text,
        has_vector,
        userunit,
        min_dpi,
        prior_ocr_detected,
    })
}

fn page_dimensions(page: &ParsedPage) -> (f64, f64) {
    let [x0, y0, x1, y1] = page.media_box;
    ((x1 - x0).abs(), (y1 - y0).abs())
}

/// Enumerates image XObjects on `page`'s resources, excluding soft masks
/// (`/SMask`) and anything that isn't `/Subtype /Image`, and computes each
/// image's effective DPI against the page's crop/media box (the smaller of
/// the two axes, per spec.md §4.1).
fn collect_images<R: std::io::Read + std::io::Seek>(
    document: &PdfDocument<R>,
    page: &ParsedPage,
    width_pts: f64,
    height_pts: f64,
) -> crate::error::Result<Vec<ImageEntry>> {
    let mut images = Vec::new();
    let resources = match document.get_page_resources(page)? {
        Some(r) => r,
        None => return Ok(images),
    };

    let xobjects = match resources.get("XObject").and_then(|o| o.as_dict()) {
        Some(dict) => dict.clone(),
        None => return Ok(images),
    };

    let soft_masks = soft_mask_refs(document, &xobjects)?;

    for (_name, obj) in xobjects.0.iter() {
        let xref = match obj.as_reference() {
            Some(r) => r,
            None => continue,
        };
        if soft_masks.contains(&xref) {
            continue;
        }
        let resolved = document.get_object(xref.0, xref.1)?;
        let stream = match &resolved {
            PdfObject::Stream(s) => s,
            _ => continue,
        };
        if !is_image_subtype(&stream.dict) {
            continue;
        }

        let width_px = get_u32(&stream.dict, "Width").unwrap_or(0);
        let height_px = get_u32(&stream.dict, "Height").unwrap_or(0);
        if width_px == 0 || height_px == 0 {
            continue;
        }
        let bpc = get_u32(&stream.dict, "BitsPerComponent").unwrap_or(8) as u8;
        let colorspace_kind = colorspace_kind(&stream.dict);
        let filter_stack = filter_stack(&stream.dict);

        let dpi_x = if width_pts > 0.0 { width_px as f64 * 72.0 / width_pts } else { 0.0 };
        let dpi_y = if height_pts > 0.0 { height_px as f64 * 72.0 / height_pts } else { 0.0 };
        let dpi = match (dpi_x > 0.0, dpi_y > 0.0) {
            (true, true) => dpi_x.min(dpi_y),
            (true, false) => dpi_x,
            (false, true) => dpi_y,
            (false, false) => 0.0,
        };

        images.push(ImageEntry {
            xref,
            width_px,
            height_px,
            bpc,
            colorspace_kind,
            filter_stack,
            dpi,
        });
    }

    Ok(images)
}

/// The set of object references used as an `/SMask` by any image XObject
/// in `xobjects`, so they're excluded from the page's own image inventory.
fn soft_mask_refs<R: std::io::Read + std::io::Seek>(
    document: &PdfDocument<R>,
    xobjects: &PdfDictionary,
) -> crate::error::Result<std::collections::HashSet<(u32, u16)>> {
    let mut masks = std::collections::HashSet::new();
    for (_name, obj) in xobjects.0.iter() {
        let xref = match obj.as_reference() {
            Some(r) => r,
            None => continue,
        };
        let resolved = document.get_object(xref.0, xref.1)?;
        if let PdfObject::Stream(stream) = &resolved {
            if let Some(smask_ref) = stream.dict.get("SMask").and_then(|o| o.as_reference()) {
                masks.insert(smask_ref);
            }
        }
    }
    Ok(masks)
}

fn is_image_subtype(dict: &PdfDictionary) -> bool {
    matches!(
        dict.0.get(&PdfName("Subtype".to_string())),
        Some(PdfObject::Name(name)) if name.0 == "Image"
    )
}

fn get_u32(dict: &PdfDictionary, key: &str) -> Option<u32> {
    dict.get(key).and_then(|o| o.as_integer()).map(|i| i as u32)
}

fn colorspace_kind(dict: &PdfDictionary) -> String {
    match dict.get("ColorSpace") {
        Some(PdfObject::Name(name)) => name.0.clone(),
        Some(PdfObject::Array(arr)) => arr
            .get(0)
            .and_then(|o| o.as_name())
            .map(|n| n.0.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        _ => "DeviceGray".to_string(),
    }
}

fn filter_stack(dict: &PdfDictionary) -> Vec<String> {
    match dict.get("Filter") {
        Some(PdfObject::Name(name)) => vec![name.0.clone()],
        Some(PdfObject::Array(arr)) => arr.0.iter().filter_map(|o| o.as_name().map(|n| n.0.clone())).collect(),
        _ => Vec::new(),
    }
}

/// Sets `has_text` on any text-showing operator, `has_vector` on any
/// non-text drawing operator, and `prior_ocr_detected` when a text-showing
/// operator appears under render mode 3 (invisible) inside a marked-content
/// sequence tagged `/Artifact` — the OCR engines' own text-layer signature.
fn scan_content_ops(
    ops: &[ContentOperation],
    has_text: &mut bool,
    has_vector: &mut bool,
    prior_ocr_detected: &mut bool,
) {
    let mut render_mode = 0;
    let mut artifact_depth: u32 = 0;
    let mut marked_content_depth: u32 = 0;

    for op in ops {
        match op {
            ContentOperation::SetTextRenderMode(mode) => render_mode = *mode,
            ContentOperation::BeginMarkedContent(tag) => {
                marked_content_depth += 1;
                if tag == "Artifact" {
                    artifact_depth += 1;
                }
            }
            ContentOperation::BeginMarkedContentWithProps(tag, _) => {
                marked_content_depth += 1;
                if tag == "Artifact" {
                    artifact_depth += 1;
                }
            }
            ContentOperation::EndMarkedContent => {
                if artifact_depth > 0 && marked_content_depth == artifact_depth {
                    artifact_depth -= 1;
                }
                marked_content_depth = marked_content_depth.saturating_sub(1);
            }
            ContentOperation::ShowText(_)
            | ContentOperation::ShowTextArray(_)
            | ContentOperation::NextLineShowText(_)
            | ContentOperation::SetSpacingNextLineShowText(_, _, _) => {
                *has_text = true;
                if render_mode == 3 && artifact_depth > 0 {
                    *prior_ocr_detected = true;
                }
            }
            ContentOperation::MoveTo(_, _)
            | ContentOperation::LineTo(_, _)
            | ContentOperation::CurveTo(_, _, _, _, _, _)
            | ContentOperation::CurveToV(_, _, _, _)
            | ContentOperation::CurveToY(_, _, _, _)
            | ContentOperation::Rectangle(_, _, _, _)
            | ContentOperation::Stroke
            | ContentOperation::Fill
            | ContentOperation::FillEvenOdd
            | ContentOperation::FillStroke
            | ContentOperation::FillStrokeEvenOdd
            | ContentOperation::CloseFillStroke
            | ContentOperation::CloseFillStrokeEvenOdd
            | ContentOperation::Clip
            | ContentOperation::ClipEvenOdd => {
                *has_vector = true;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_helpers::create_minimal_pdf_with_content;
    use std::io::Cursor;

    #[test]
    fn blank_page_has_no_text_or_vectors() {
        let bytes = create_minimal_pdf_with_content(b"");
        let reader = PdfReader::new(Cursor::new(bytes)).unwrap();
        let document = reader.into_document();
        let info = load_page_info(&document, 0).unwrap();
        assert!(!info.has_text);
        assert!(!info.has_vector);
        assert!(info.images.is_empty());
        assert!(info.min_dpi.is_none());
    }

    #[test]
    fn text_showing_operator_sets_has_text() {
        let bytes = create_minimal_pdf_with_content(b"BT /F1 12 Tf (Hello) Tj ET");
        let reader = PdfReader::new(Cursor::new(bytes)).unwrap();
        let document = reader.into_document();
        let info = load_page_info(&document, 0).unwrap();
        assert!(info.has_text);
        assert!(!info.has_vector);
    }

    #[test]
    fn path_painting_operator_sets_has_vector() {
        let bytes = create_minimal_pdf_with_content(b"10 10 100 100 re S");
        let reader = PdfReader::new(Cursor::new(bytes)).unwrap();
        let document = reader.into_document();
        let info = load_page_info(&document, 0).unwrap();
        assert!(info.has_vector);
        assert!(!info.has_text);
    }

    #[test]
    fn invisible_artifact_text_is_detected_as_prior_ocr() {
        let content = b"/Artifact BMC BT 3 Tr (scanned) Tj ET EMC";
        let bytes = create_minimal_pdf_with_content(content);
        let reader = PdfReader::new(Cursor::new(bytes)).unwrap();
        let document = reader.into_document();
        let info = load_page_info(&document, 0).unwrap();
        assert!(info.prior_ocr_detected);
    }

    #[test]
    fn normal_visible_text_is_not_flagged_as_prior_ocr() {
        let content = b"BT (Hello) Tj ET";
        let bytes = create_minimal_pdf_with_content(content);
        let reader = PdfReader::new(Cursor::new(bytes)).unwrap();
        let document = reader.into_document();
        let info = load_page_info(&document, 0).unwrap();
        assert!(!info.prior_ocr_detected);
    }
}
