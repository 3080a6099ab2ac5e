//! Type0 (Composite) Font Parsing Utilities
//!
//! This module provides detection and extraction utilities for Type0 fonts
//! per ISO 32000-1 Section 9.7 (CIDFonts and CMaps).
//!
//! ## Type0 Font Hierarchy
//!
//! ```text
//! Type0 Font Dict
//!   ├── /Subtype /Type0
//!   ├── /DescendantFonts [ ref_to_CIDFont ]
//!   └── /ToUnicode (optional) ref_to_CMap
//!
//! CIDFont Dict
//!   ├── /Subtype /CIDFontType0 or /CIDFontType2
//!   ├── /CIDSystemInfo { Registry, Ordering, Supplement }
//!   ├── /FontDescriptor ref_to_descriptor
//!   └── /W (widths) or /DW (default width)
//!
//! FontDescriptor Dict
//!   └── /FontFile2 (TrueType) or /FontFile3 (CFF)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocrsandwich_core::fonts::type0_parsing::{detect_type0_font, extract_descendant_fonts_ref};
//! use ocrsandwich_core::pdf_objects::Dictionary;
//!
//! let font_dict: Dictionary = /* from PDF */;
//!
//! if detect_type0_font(&font_dict) {
//!     if let Some(refs) = extract_descendant_fonts_ref(&font_dict) {
//!         // refs contains ObjectIds to CIDFont dictionaries
//!     }
//! }
//! ```

use crate::pdf_objects::{Dictionary, Object, ObjectId, Stream};

// =============================================================================
// Security Constants
// =============================================================================

/// Maximum font stream size (10MB) to prevent zip bombs and memory exhaustion.
/// Real-world embedded fonts rarely exceed 5MB.
pub const MAX_FONT_STREAM_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Phase 1: Detection Types and Functions
// =============================================================================

/// CIDFont subtype indicating outline format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CIDFontSubtype {
    /// CIDFontType0 - CFF (Compact Font Format) outlines
    /// Used for PostScript-based CID fonts
    Type0,
    /// CIDFontType2 - TrueType outlines
    /// Used for TrueType-based CID fonts (most common)
    Type2,
}

/// Detect if a font dictionary is a Type0 (composite) font
///
/// A Type0 font has `/Subtype /Type0` in its dictionary.
///
/// # Arguments
/// * `dict` - The font dictionary to check
///
/// # Returns
/// `true` if the dictionary represents a Type0 font, `false` otherwise
///
/// # Example
/// ```rust,ignore
/// use ocrsandwich_core::fonts::type0_parsing::detect_type0_font;
///
/// if detect_type0_font(&font_dict) {
///     println!("This is a Type0 composite font");
/// }
/// ```
pub fn detect_type0_font(dict: &Dictionary) -> bool {
    // Check for /Subtype /Type0
    if let Some(Object::Name(subtype)) = dict.get("Subtype") {
        return subtype.as_str() == "Type0";
    }
    false
}

/// Extract the DescendantFonts references from a Type0 font dictionary
///
/// The `/DescendantFonts` entry is an array containing a single reference
/// to a CIDFont dictionary (per ISO 32000-1, Type0 fonts have exactly one descendant).
///
/// # Arguments
/// * `dict` - The Type0 font dictionary
///
/// # Returns
/// `Some(Vec<ObjectId>)` containing the descendant font references,
/// or `None` if the entry doesn't exist or is invalid.
///
/// # Note
/// While the spec requires exactly one descendant, this function returns
/// a Vec to handle malformed PDFs that might have multiple.
pub fn extract_descendant_fonts_ref(dict: &Dictionary) -> Option<Vec<ObjectId>> {
    let descendants = dict.get("DescendantFonts")?;

    match descendants {
        Object::Array(arr) => {
            let refs: Vec<ObjectId> = arr
                .iter()
                .filter_map(|obj| {
                    if let Object::Reference(id) = obj {
                        Some(*id)
                    } else {
                        None
                    }
                })
                .collect();

            if refs.is_empty() {
                None
            } else {
                Some(refs)
            }
        }
        // Some PDFs might inline the dictionary instead of using a reference
        Object::Reference(id) => Some(vec![*id]),
        _ => None,
    }
}

/// Detect the CIDFont subtype from a CIDFont dictionary
///
/// CIDFonts have either `/Subtype /CIDFontType0` (CFF outlines)
/// or `/Subtype /CIDFontType2` (TrueType outlines).
///
/// # Arguments
/// * `dict` - The CIDFont dictionary
///
/// # Returns
/// `Some(CIDFontSubtype)` if the dictionary is a valid CIDFont,
/// `None` if it's not a CIDFont or has an unknown subtype.
pub fn detect_cidfont_subtype(dict: &Dictionary) -> Option<CIDFontSubtype> {
    if let Some(Object::Name(subtype)) = dict.get("Subtype") {
        match subtype.as_str() {
            "CIDFontType0" => Some(CIDFontSubtype::Type0),
            "CIDFontType2" => Some(CIDFontSubtype::Type2),
            _ => None,
        }
    } else {
        None
    }
}

/// Extract the ToUnicode CMap reference from a font dictionary
///
/// The `/ToUnicode` entry provides a CMap that maps character codes
/// to Unicode values, essential for text extraction from Type0 fonts.
///
/// # Arguments
/// * `dict` - The font dictionary (Type0 or other)
///
/// # Returns
/// `Some(ObjectId)` if a ToUnicode reference exists,
/// `None` if the entry doesn't exist or is not a reference.
pub fn extract_tounicode_ref(dict: &Dictionary) -> Option<ObjectId> {
    if let Some(Object::Reference(id)) = dict.get("ToUnicode") {
        Some(*id)
    } else {
        None
    }
}

// =============================================================================
// Phase 2: Hierarchy Resolution Types and Functions
// =============================================================================

/// Font file type indicating the stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFileType {
    /// FontFile - Type 1 font data (PostScript)
    Type1,
    /// FontFile2 - TrueType font data
    TrueType,
    /// FontFile3 - CFF or OpenType font data
    CFF,
}

/// Information about a resolved Type0 font hierarchy
#[derive(Debug, Clone)]
pub struct Type0FontInfo {
    /// The Type0 font dictionary
    pub type0_dict: Dictionary,
    /// The CIDFont dictionary (from DescendantFonts)
    pub cidfont_dict: Option<Dictionary>,
    /// CIDFont subtype (Type0=CFF, Type2=TrueType)
    pub cidfont_subtype: Option<CIDFontSubtype>,
    /// The FontDescriptor dictionary
    pub font_descriptor: Option<Dictionary>,
    /// The embedded font stream (FontFile, FontFile2, or FontFile3)
    pub font_stream: Option<Stream>,
    /// Type of embedded font file
    pub font_file_type: Option<FontFileType>,
    /// ToUnicode CMap stream (if present)
    pub tounicode_stream: Option<Stream>,
}

impl Type0FontInfo {
    /// Create a new Type0FontInfo with just the Type0 dictionary
    pub fn new(type0_dict: Dictionary) -> Self {
        Self {
            type0_dict,
            cidfont_dict: None,
            cidfont_subtype: None,
            font_descriptor: None,
            font_stream: None,
            font_file_type: None,
            tounicode_stream: None,
        }
    }

    /// Check if the font has embedded data
    pub fn has_embedded_font(&self) -> bool {
        self.font_stream.is_some()
    }

    /// Check if ToUnicode CMap is available
    pub fn has_tounicode(&self) -> bool {
        self.tounicode_stream.is_some()
    }
}

/// Extract the FontDescriptor reference from a font dictionary (CIDFont or simple font)
///
/// # Arguments
/// * `dict` - The font dictionary (CIDFont, Type1, TrueType, etc.)
///
/// # Returns
/// `Some(ObjectId)` if a FontDescriptor reference exists,
/// `None` if the entry doesn't exist or is not a reference.
pub fn extract_font_descriptor_ref(dict: &Dictionary) -> Option<ObjectId> {
    if let Some(Object::Reference(id)) = dict.get("FontDescriptor") {
        Some(*id)
    } else {
        None
    }
}

/// Extract the embedded font file reference from a FontDescriptor dictionary
///
/// Checks for FontFile, FontFile2, and FontFile3 entries (in that order).
///
/// # Arguments
/// * `descriptor` - The FontDescriptor dictionary
///
/// # Returns
/// `Some((ObjectId, FontFileType))` if a font file reference exists,
/// `None` if no font file is embedded.
pub fn extract_font_file_ref(descriptor: &Dictionary) -> Option<(ObjectId, FontFileType)> {
    // Check in order of precedence
    if let Some(Object::Reference(id)) = descriptor.get("FontFile") {
        return Some((*id, FontFileType::Type1));
    }
    if let Some(Object::Reference(id)) = descriptor.get("FontFile2") {
        return Some((*id, FontFileType::TrueType));
    }
    if let Some(Object::Reference(id)) = descriptor.get("FontFile3") {
        return Some((*id, FontFileType::CFF));
    }
    None
}

/// Extract the W (widths) array reference from a CIDFont dictionary
///
/// # Arguments
/// * `cidfont` - The CIDFont dictionary
///
/// # Returns
/// `Some(ObjectId)` if a W array reference exists,
/// `None` if the entry doesn't exist or is not a reference.
pub fn extract_widths_ref(cidfont: &Dictionary) -> Option<ObjectId> {
    if let Some(Object::Reference(id)) = cidfont.get("W") {
        Some(*id)
    } else {
        None
    }
}

/// Extract the default width (DW) from a CIDFont dictionary
///
/// # Arguments
/// * `cidfont` - The CIDFont dictionary
///
/// # Returns
/// The default width value, or 1000 if not specified (per ISO 32000-1)
pub fn extract_default_width(cidfont: &Dictionary) -> i64 {
    if let Some(obj) = cidfont.get("DW") {
        obj.as_integer().unwrap_or(1000)
    } else {
        1000 // Default per ISO 32000-1
    }
}

// =============================================================================
// Phase 3: Full Hierarchy Resolution
// =============================================================================

/// Resolve the complete Type0 font hierarchy using a resolver function
///
/// This function walks the entire Type0 font hierarchy:
/// `Type0 → DescendantFonts → CIDFont → FontDescriptor → FontFile`
///
/// It also resolves the optional ToUnicode CMap stream.
///
/// # Arguments
/// * `type0_dict` - The Type0 font dictionary
/// * `resolver` - A function that resolves ObjectId references to Objects
///
/// # Returns
/// `Some(Type0FontInfo)` with all resolved components, or `None` if not a Type0 font.
///
/// # Security
///
/// This function implements two security protections:
///
/// 1. **Circular reference detection**: Uses a HashSet to track visited ObjectIds.
///    If a circular reference is detected, the function returns partial info and
///    logs a warning via `tracing::warn`. This prevents infinite loops and stack
///    overflow from malicious PDFs.
///
/// 2. **Font stream size validation**: Rejects font streams larger than
///    [`MAX_FONT_STREAM_SIZE`] (10MB) to prevent zip bomb and memory exhaustion
///    attacks. Oversized streams are logged and `font_stream` is set to `None`.
///
/// # Example
/// ```rust,ignore
/// use ocrsandwich_core::fonts::type0_parsing::resolve_type0_hierarchy;
///
/// let info = resolve_type0_hierarchy(&font_dict, |id| document.get_object(id));
/// if let Some(info) = info {
///     if info.has_embedded_font() {
///         // Process embedded font data
///     }
/// }
/// ```
pub fn resolve_type0_hierarchy<F>(type0_dict: &Dictionary, resolver: F) -> Option<Type0FontInfo>
where
    F: Fn(ObjectId) -> Option<Object>,
{
    use std::collections::HashSet;

    // Must be a Type0 font
    if !detect_type0_font(type0_dict) {
        return None;
    }

    let mut info = Type0FontInfo::new(type0_dict.clone());
    let mut visited = HashSet::new(); // Track visited ObjectIds for circular ref detection

    // Step 1: Resolve DescendantFonts → CIDFont
    if let Some(refs) = extract_descendant_fonts_ref(type0_dict) {
        // Type0 fonts have exactly one descendant (per ISO 32000-1)
        if let Some(cidfont_ref) = refs.first() {
            // Check for circular reference
            if visited.contains(cidfont_ref) {
                tracing::warn!("Circular reference detected at CIDFont {:?}", cidfont_ref);
                return Some(info);
            }
            visited.insert(*cidfont_ref);

            if let Some(Object::Dictionary(cidfont)) = resolver(*cidfont_ref) {
                // Detect CIDFont subtype
                info.cidfont_subtype = detect_cidfont_subtype(&cidfont);

                // Step 2: Resolve CIDFont → FontDescriptor
                if let Some(desc_ref) = extract_font_descriptor_ref(&cidfont) {
                    // Check for circular reference
                    if visited.contains(&desc_ref) {
                        tracing::warn!(
                            "Circular reference detected at FontDescriptor {:?}",
                            desc_ref
                        );
                        info.cidfont_dict = Some(cidfont);
                        return Some(info);
                    }
                    visited.insert(desc_ref);

                    if let Some(Object::Dictionary(descriptor)) = resolver(desc_ref) {
                        // Step 3: Resolve FontDescriptor → FontFile stream
                        if let Some((file_ref, file_type)) = extract_font_file_ref(&descriptor) {
                            // Check for circular reference
                            if visited.contains(&file_ref) {
                                tracing::warn!(
                                    "Circular reference detected at FontFile {:?}",
                                    file_ref
                                );
                                info.font_descriptor = Some(descriptor);
                                info.cidfont_dict = Some(cidfont);
                                return Some(info);
                            }
                            visited.insert(file_ref);

                            if let Some(Object::Stream(stream)) = resolver(file_ref) {
                                // Security: Validate stream size to prevent zip bombs
                                if stream.data.len() > MAX_FONT_STREAM_SIZE {
                                    tracing::warn!(
                                        "Font stream size {} exceeds limit {} for {:?}",
                                        stream.data.len(),
                                        MAX_FONT_STREAM_SIZE,
                                        file_ref
                                    );
                                    // Don't set font_stream/font_file_type for oversized streams
                                } else {
                                    info.font_stream = Some(stream);
                                    info.font_file_type = Some(file_type);
                                }
                            }
                        }

                        info.font_descriptor = Some(descriptor);
                    }
                }

                info.cidfont_dict = Some(cidfont);
            }
        }
    }

    // Step 4: Resolve ToUnicode CMap stream (optional but important for text extraction)
    if let Some(tounicode_ref) = extract_tounicode_ref(type0_dict) {
        // Check for circular reference (ToUnicode pointing to already-visited object)
        if visited.contains(&tounicode_ref) {
            tracing::warn!(
                "Circular reference detected at ToUnicode {:?}",
                tounicode_ref
            );
            return Some(info);
        }

        if let Some(Object::Stream(stream)) = resolver(tounicode_ref) {
            info.tounicode_stream = Some(stream);
        }
    }

    Some(info)
}
