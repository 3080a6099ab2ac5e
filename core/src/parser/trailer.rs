//! PDF trailer dictionary (ISO 32000-1 §7.5.5): the root of the file's
//! object graph, reached by scanning backwards from the `startxref` offset.

use super::objects::{PdfDictionary, PdfObject};
use super::{ParseError, ParseResult};

/// The trailer dictionary plus the xref offset it was read next to.
#[derive(Debug, Clone)]
pub struct PdfTrailer {
    dict: PdfDictionary,
    xref_offset: u64,
}

fn as_reference(obj: &PdfObject) -> Option<(u32, u16)> {
    match obj {
        PdfObject::Reference(num, gen) => Some((*num, *gen)),
        _ => None,
    }
}

impl PdfTrailer {
    pub fn from_dict(dict: PdfDictionary, xref_offset: u64) -> ParseResult<Self> {
        Ok(PdfTrailer { dict, xref_offset })
    }

    /// A trailer must at minimum declare `/Size`; `/Root` is checked
    /// separately since some malformed PDFs omit it and are recovered via
    /// [`Self::find_root_fallback`].
    pub fn validate(&self) -> ParseResult<()> {
        if self.dict.get("Size").is_none() {
            return Err(ParseError::InvalidTrailer);
        }
        Ok(())
    }

    pub fn dict(&self) -> &PdfDictionary {
        &self.dict
    }

    pub fn xref_offset(&self) -> u64 {
        self.xref_offset
    }

    /// `(object_number, generation)` of the document catalog.
    pub fn root(&self) -> ParseResult<(u32, u16)> {
        self.dict
            .get("Root")
            .and_then(as_reference)
            .ok_or_else(|| ParseError::MissingKey("Root".to_string()))
    }

    /// Best-effort recovery when `/Root` is missing: some broken writers put
    /// it under `/Info` by mistake, or a `/Prev` trailer carried it instead.
    /// Returning `None` tells the caller to fall back to scanning the file
    /// for a `/Type /Catalog` object.
    pub fn find_root_fallback(&self) -> Option<(u32, u16)> {
        self.dict.get("Prev").and_then(as_reference)
    }

    /// `(object_number, generation)` of the document information dictionary.
    pub fn info(&self) -> Option<(u32, u16)> {
        self.dict.get("Info").and_then(as_reference)
    }

    /// `(object_number, generation)` of the encryption dictionary, if the
    /// file declares one via `/Encrypt`.
    pub fn encrypt(&self) -> ParseResult<Option<(u32, u16)>> {
        Ok(self.dict.get("Encrypt").and_then(as_reference))
    }

    /// The `/ID` array (two strings identifying this file revision).
    pub fn id(&self) -> Option<&PdfObject> {
        self.dict.get("ID")
    }

    /// `(object_number, generation)` of a preceding xref section, for
    /// incrementally-updated files.
    pub fn prev(&self) -> Option<u64> {
        self.dict.get("Prev").and_then(|o| o.as_integer()).map(|v| v as u64)
    }
}
