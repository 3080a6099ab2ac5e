//! CJK font detection for Type0/CIDFont embedding
//!
//! Some CJK TrueType fonts render incorrectly in Preview.app and other
//! renderers unless their descendant font is forced to `CIDFontType2` and
//! `CIDSystemInfo` names the font's home registry/ordering rather than the
//! generic `Adobe-Identity-0`. This module recognises those fonts by name.

use std::collections::HashMap;

/// A recognised CJK font family, identified by common base-font name
/// fragments (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CjkFontType {
    SimplifiedChinese,
    TraditionalChinese,
    Japanese,
    Korean,
}

impl CjkFontType {
    /// Detect a CJK font family from its PDF base-font name.
    pub fn detect_from_name(font_name: &str) -> Option<Self> {
        let lower = font_name.to_ascii_lowercase();
        const SIMPLIFIED: &[&str] = &["simsun", "simhei", "stsong", "stheiti", "noto sans sc", "source han sans sc"];
        const TRADITIONAL: &[&str] = &["mingliu", "pmingliu", "stkaiti", "noto sans tc", "source han sans tc"];
        const JAPANESE: &[&str] = &["ms-mincho", "msmincho", "ms-gothic", "msgothic", "meiryo", "noto sans jp", "source han sans jp", "hiragino"];
        const KOREAN: &[&str] = &["malgun", "gulim", "batang", "noto sans kr", "source han sans kr"];

        if SIMPLIFIED.iter().any(|n| lower.contains(n)) {
            Some(Self::SimplifiedChinese)
        } else if TRADITIONAL.iter().any(|n| lower.contains(n)) {
            Some(Self::TraditionalChinese)
        } else if JAPANESE.iter().any(|n| lower.contains(n)) {
            Some(Self::Japanese)
        } else if KOREAN.iter().any(|n| lower.contains(n)) {
            Some(Self::Korean)
        } else {
            None
        }
    }

    /// `(Registry, Ordering, Supplement)` for this font's `CIDSystemInfo`.
    pub fn cid_system_info(&self) -> (&'static str, &'static str, u8) {
        match self {
            Self::SimplifiedChinese => ("Adobe", "GB1", 5),
            Self::TraditionalChinese => ("Adobe", "CNS1", 7),
            Self::Japanese => ("Adobe", "Japan1", 7),
            Self::Korean => ("Adobe", "Korea1", 2),
        }
    }

    /// Recognised CJK fonts render with incorrect glyph positions in
    /// Preview.app under `CIDFontType0`; forcing `CIDFontType2` fixes it.
    pub fn should_use_cidfonttype2_for_preview_compatibility(font_name: &str) -> bool {
        Self::detect_from_name(font_name).is_some()
    }
}

/// Raw bytes plus the subset/CID bookkeeping needed to embed a font program.
#[derive(Debug, Clone)]
pub struct EmbeddedFontData {
    pub font_program: Vec<u8>,
    pub cid_to_gid: HashMap<u16, u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_simplified_chinese() {
        assert_eq!(
            CjkFontType::detect_from_name("SimSun"),
            Some(CjkFontType::SimplifiedChinese)
        );
    }

    #[test]
    fn detects_japanese_case_insensitive() {
        assert_eq!(
            CjkFontType::detect_from_name("MS-MINCHO"),
            Some(CjkFontType::Japanese)
        );
    }

    #[test]
    fn non_cjk_font_is_none() {
        assert_eq!(CjkFontType::detect_from_name("Helvetica"), None);
    }

    #[test]
    fn cid_system_info_matches_registry() {
        assert_eq!(CjkFontType::Korean.cid_system_info(), ("Adobe", "Korea1", 2));
    }
}
