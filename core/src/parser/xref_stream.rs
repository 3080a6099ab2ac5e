//! Cross-reference stream parsing (PDF 1.5+, ISO 32000-1 §7.5.8).
//!
//! Cross-reference streams replace the plain-text `xref` table with a
//! compact binary encoding and additionally allow objects to live inside
//! object streams (`/Type 2` entries).

use super::objects::PdfDictionary;
use super::xref_types::{XRefEntryInfo, XRefEntryType};
use super::{ParseError, ParseOptions, ParseResult};
use std::io::{Read, Seek};

/// One decoded subsection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    Free {
        next_free_object: u32,
        generation: u16,
    },
    InUse {
        offset: u64,
        generation: u16,
    },
    Compressed {
        stream_object_number: u32,
        index_within_stream: u32,
    },
}

/// A parsed cross-reference stream.
pub struct XRefStream {
    dict: PdfDictionary,
    data: Vec<u8>,
    field_widths: [usize; 3],
    index: Vec<(u32, u32)>,
}

fn read_field(data: &[u8], width: usize) -> u64 {
    let mut value: u64 = 0;
    for &b in data.iter().take(width) {
        value = (value << 8) | b as u64;
    }
    value
}

impl XRefStream {
    /// `reader` is accepted for symmetry with the rest of the parsing
    /// pipeline (resolving a `/Prev` chain needs it); the stream's own data
    /// has already been decoded by the caller.
    pub fn parse<R: Read + Seek>(
        _reader: &mut R,
        dict: PdfDictionary,
        data: Vec<u8>,
        _options: &ParseOptions,
    ) -> ParseResult<Self> {
        let w_array = dict
            .get("W")
            .and_then(|o| o.as_array())
            .ok_or_else(|| ParseError::MissingKey("W".to_string()))?;
        if w_array.len() != 3 {
            return Err(ParseError::SyntaxError {
                position: 0,
                message: "W array must have exactly 3 elements".to_string(),
            });
        }
        let mut field_widths = [0usize; 3];
        for (i, slot) in field_widths.iter_mut().enumerate() {
            *slot = w_array
                .get(i)
                .and_then(|o| o.as_integer())
                .ok_or_else(|| ParseError::SyntaxError {
                    position: 0,
                    message: "W values must be integers".to_string(),
                })? as usize;
        }

        let size = dict
            .get("Size")
            .and_then(|o| o.as_integer())
            .ok_or_else(|| ParseError::MissingKey("Size".to_string()))? as u32;

        let index = match dict.get("Index").and_then(|o| o.as_array()) {
            Some(arr) => {
                let mut pairs = Vec::new();
                let mut i = 0;
                while i + 1 < arr.len() {
                    let first = arr
                        .get(i)
                        .and_then(|o| o.as_integer())
                        .ok_or(ParseError::InvalidXRef)? as u32;
                    let count = arr
                        .get(i + 1)
                        .and_then(|o| o.as_integer())
                        .ok_or(ParseError::InvalidXRef)? as u32;
                    pairs.push((first, count));
                    i += 2;
                }
                pairs
            }
            None => vec![(0, size)],
        };

        Ok(XRefStream {
            dict,
            data,
            field_widths,
            index,
        })
    }

    pub fn dict(&self) -> &PdfDictionary {
        &self.dict
    }

    /// Decode every subsection into `(object_number, entry)` pairs.
    pub fn to_xref_entries(&self) -> ParseResult<Vec<(u32, XRefEntry)>> {
        let [w0, w1, w2] = self.field_widths;
        let record_len = w0 + w1 + w2;
        let mut offset = 0;
        let mut entries = Vec::new();

        for &(first_obj_num, count) in &self.index {
            for i in 0..count {
                if offset + record_len > self.data.len() {
                    return Err(ParseError::SyntaxError {
                        position: offset,
                        message: "xref stream data truncated".to_string(),
                    });
                }
                let field1 = if w0 == 0 {
                    1 // default type is 1 (in use) when /W[0] is 0
                } else {
                    read_field(&self.data[offset..], w0)
                };
                offset += w0;
                let field2 = read_field(&self.data[offset..], w1);
                offset += w1;
                let field3 = read_field(&self.data[offset..], w2);
                offset += w2;

                let info = XRefEntryInfo::new(XRefEntryType::from_value(field1), field2, field3);
                let entry = match info.entry_type {
                    XRefEntryType::Free => XRefEntry::Free {
                        next_free_object: info.field2 as u32,
                        generation: info.field3 as u16,
                    },
                    XRefEntryType::Uncompressed => XRefEntry::InUse {
                        offset: info.field2,
                        generation: info.field3 as u16,
                    },
                    XRefEntryType::Compressed | XRefEntryType::Custom(_) => {
                        if let Some((stream_object_number, index_within_stream)) =
                            info.get_compressed_info()
                        {
                            XRefEntry::Compressed {
                                stream_object_number,
                                index_within_stream,
                            }
                        } else {
                            XRefEntry::InUse {
                                offset: info.field2,
                                generation: info.field3 as u16,
                            }
                        }
                    }
                };
                entries.push((first_obj_num + i, entry));
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dict_with(size: i64, w: [i64; 3]) -> PdfDictionary {
        use super::super::objects::{PdfArray, PdfObject};
        let mut dict = PdfDictionary::new();
        dict.insert("Size".to_string(), PdfObject::Integer(size));
        let mut w_arr = PdfArray::new();
        for v in w {
            w_arr.0.push(PdfObject::Integer(v));
        }
        dict.insert("W".to_string(), PdfObject::Array(w_arr));
        dict
    }

    #[test]
    fn decodes_single_subsection() {
        let dict = dict_with(2, [1, 1, 1]);
        // object 0: free, next=0, gen=0 ; object 1: in-use, offset=10, gen=0
        let data = vec![0, 0, 0, 1, 10, 0];
        let mut cursor = Cursor::new(Vec::new());
        let stream = XRefStream::parse(&mut cursor, dict, data, &ParseOptions::default()).unwrap();
        let entries = stream.to_xref_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].1, XRefEntry::Free { .. }));
        assert!(matches!(entries[1].1, XRefEntry::InUse { offset: 10, .. }));
    }
}
