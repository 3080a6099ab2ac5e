//! Stream filter dispatch: resolves `/Filter` (+ `/DecodeParms`) from a
//! stream dictionary and applies the matching decoder from
//! [`filter_impls`](super::filter_impls).

use super::filter_impls;
use super::objects::{PdfDictionary, PdfObject};
use super::{ParseError, ParseOptions, ParseResult};

/// Image-only filters pass raw bytes through; the image decoder (DCT/JBIG2/
/// JPX libraries) is responsible for making sense of them downstream.
fn is_image_filter(name: &str) -> bool {
    matches!(name, "DCTDecode" | "CCITTFaxDecode" | "JBIG2Decode" | "JPXDecode")
}

fn filter_names(dict: &PdfDictionary) -> Vec<String> {
    match dict.get("Filter") {
        Some(PdfObject::Name(n)) => vec![n.0.clone()],
        Some(PdfObject::Array(arr)) => arr
            .0
            .iter()
            .filter_map(|o| o.as_name().map(|n| n.0.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_parms(dict: &PdfDictionary, index: usize, count: usize) -> Option<PdfDictionary> {
    match dict.get("DecodeParms").or_else(|| dict.get("DP")) {
        Some(PdfObject::Dictionary(d)) if count <= 1 => Some(d.clone()),
        Some(PdfObject::Array(arr)) => arr.get(index).and_then(|o| o.as_dict()).cloned(),
        _ => None,
    }
}

/// Apply every filter named in `dict`'s `/Filter` entry (in order) to `data`.
pub fn decode_stream(
    data: &[u8],
    dict: &PdfDictionary,
    options: &ParseOptions,
) -> ParseResult<Vec<u8>> {
    let names = filter_names(dict);
    let mut current = data.to_vec();

    for (index, name) in names.iter().enumerate() {
        let result = apply_one(&current, name, decode_parms(dict, index, names.len()).as_ref());
        match result {
            Ok(decoded) => current = decoded,
            Err(e) => {
                if options.ignore_corrupt_streams {
                    return Ok(Vec::new());
                }
                if options.recover_from_stream_errors && name == "FlateDecode" {
                    if let Ok(decoded) = filter_impls::flate_decode(&current[current.len().min(2)..]) {
                        current = decoded;
                        continue;
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(current)
}

fn apply_one(data: &[u8], name: &str, parms: Option<&PdfDictionary>) -> ParseResult<Vec<u8>> {
    if is_image_filter(name) {
        return Ok(data.to_vec());
    }

    let decoded = match name {
        "FlateDecode" | "Fl" => filter_impls::flate_decode(data)?,
        "ASCIIHexDecode" | "AHx" => filter_impls::ascii_hex_decode(data)?,
        "ASCII85Decode" | "A85" => filter_impls::ascii85_decode(data)?,
        "RunLengthDecode" | "RL" => filter_impls::run_length_decode(data)?,
        "LZWDecode" | "LZW" => filter_impls::lzw_decode(data)?,
        "Crypt" => data.to_vec(),
        other => {
            return Err(ParseError::StreamDecodeError(format!(
                "unsupported filter: {other}"
            )))
        }
    };

    match parms {
        Some(p) if matches!(name, "FlateDecode" | "Fl" | "LZWDecode" | "LZW") => {
            apply_predictor_from_parms(&decoded, p)
        }
        _ => Ok(decoded),
    }
}

fn apply_predictor_from_parms(data: &[u8], parms: &PdfDictionary) -> ParseResult<Vec<u8>> {
    let predictor = parms.get("Predictor").and_then(|o| o.as_integer()).unwrap_or(1);
    if predictor <= 1 {
        return Ok(data.to_vec());
    }
    let colors = parms.get("Colors").and_then(|o| o.as_integer()).unwrap_or(1) as usize;
    let bpc = parms
        .get("BitsPerComponent")
        .and_then(|o| o.as_integer())
        .unwrap_or(8) as usize;
    let columns = parms.get("Columns").and_then(|o| o.as_integer()).unwrap_or(1) as usize;
    filter_impls::apply_predictor(data, predictor, colors, bpc, columns)
}
