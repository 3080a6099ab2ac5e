//! Field-level types shared by the classic and stream-based xref parsers.

/// Entry type tag from the first field (`type`) of a cross-reference stream
/// subsection (ISO 32000-1 Table 18).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntryType {
    /// Type 0: free object.
    Free,
    /// Type 1: object with a byte offset into the file.
    Uncompressed,
    /// Type 2: object stored inside an object stream.
    Compressed,
    /// Any other type value; readers must treat it as in-use per the spec.
    Custom(u8),
}

impl XRefEntryType {
    pub fn from_value(value: u64) -> Self {
        match value {
            0 => XRefEntryType::Free,
            1 => XRefEntryType::Uncompressed,
            2 => XRefEntryType::Compressed,
            other => XRefEntryType::Custom(other as u8),
        }
    }

    /// Whether objects of this type should be treated as reachable/in-use.
    pub fn is_in_use(&self) -> bool {
        !matches!(self, XRefEntryType::Free)
    }
}

/// The three raw fields of one xref-stream subsection entry, decoded
/// according to the section's `/W` widths but not yet interpreted.
#[derive(Debug, Clone, Copy)]
pub struct XRefEntryInfo {
    pub entry_type: XRefEntryType,
    pub field2: u64,
    pub field3: u64,
}

impl XRefEntryInfo {
    pub fn new(entry_type: XRefEntryType, field2: u64, field3: u64) -> Self {
        XRefEntryInfo {
            entry_type,
            field2,
            field3,
        }
    }

    /// For `Compressed` entries, `(stream_object_number, index_within_stream)`.
    pub fn get_compressed_info(&self) -> Option<(u32, u32)> {
        match self.entry_type {
            XRefEntryType::Compressed => Some((self.field2 as u32, self.field3 as u32)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_type_values() {
        assert_eq!(XRefEntryType::from_value(0), XRefEntryType::Free);
        assert_eq!(XRefEntryType::from_value(1), XRefEntryType::Uncompressed);
        assert_eq!(XRefEntryType::from_value(2), XRefEntryType::Compressed);
        assert_eq!(XRefEntryType::from_value(9), XRefEntryType::Custom(9));
    }

    #[test]
    fn only_free_entries_are_not_in_use() {
        assert!(!XRefEntryType::Free.is_in_use());
        assert!(XRefEntryType::Uncompressed.is_in_use());
        assert!(XRefEntryType::Compressed.is_in_use());
        assert!(XRefEntryType::Custom(5).is_in_use());
    }

    #[test]
    fn compressed_info_only_for_compressed_entries() {
        let info = XRefEntryInfo::new(XRefEntryType::Compressed, 10, 3);
        assert_eq!(info.get_compressed_info(), Some((10, 3)));
        let info = XRefEntryInfo::new(XRefEntryType::Uncompressed, 10, 3);
        assert_eq!(info.get_compressed_info(), None);
    }
}
