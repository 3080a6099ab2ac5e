//! Single-byte text-string decoding (ISO 32000-1 Annex D): PDFDocEncoding,
//! WinAnsiEncoding, MacRomanEncoding, plus UTF-16BE for strings that carry
//! the `\xFE\xFF` byte-order mark.

/// Named encodings a PDF text string may declare (via a font's `/Encoding`
/// entry) or that the caller may force with [`ParseOptions::preferred_encoding`](super::ParseOptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingType {
    PdfDoc,
    WinAnsi,
    MacRoman,
    Utf16Be,
    /// Plain ASCII / Latin-1 passthrough, used as a last resort.
    Standard,
}

/// Controls how [`EnhancedDecoder`] behaves on invalid byte sequences.
#[derive(Debug, Clone)]
pub struct EncodingOptions {
    pub encoding: EncodingType,
    /// Replace invalid sequences with U+FFFD instead of failing.
    pub lenient: bool,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        EncodingOptions {
            encoding: EncodingType::PdfDoc,
            lenient: true,
        }
    }
}

/// Outcome of a decode attempt, including how many replacement characters
/// were substituted in lenient mode (for [`super::ParseWarning::InvalidEncoding`]).
#[derive(Debug, Clone)]
pub struct EncodingResult {
    pub text: String,
    pub encoding_used: EncodingType,
    pub replacement_count: usize,
}

// WinAnsiEncoding (CP1252) deviates from Latin-1 only in the 0x80-0x9F range.
const WIN_ANSI_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

// MacRomanEncoding's upper half (0x80-0xFF), per Apple's mapping.
const MAC_ROMAN_HIGH: [char; 128] = [
    '\u{00C4}', '\u{00C5}', '\u{00C7}', '\u{00C9}', '\u{00D1}', '\u{00D6}', '\u{00DC}', '\u{00E1}',
    '\u{00E0}', '\u{00E2}', '\u{00E4}', '\u{00E3}', '\u{00E5}', '\u{00E7}', '\u{00E9}', '\u{00E8}',
    '\u{00EA}', '\u{00EB}', '\u{00ED}', '\u{00EC}', '\u{00EE}', '\u{00EF}', '\u{00F1}', '\u{00F3}',
    '\u{00F2}', '\u{00F4}', '\u{00F6}', '\u{00F5}', '\u{00FA}', '\u{00F9}', '\u{00FB}', '\u{00FC}',
    '\u{2020}', '\u{00B0}', '\u{00A2}', '\u{00A3}', '\u{00A7}', '\u{2022}', '\u{00B6}', '\u{00DF}',
    '\u{00AE}', '\u{00A9}', '\u{2122}', '\u{00B4}', '\u{00A8}', '\u{2260}', '\u{00C6}', '\u{00D8}',
    '\u{221E}', '\u{00B1}', '\u{2264}', '\u{2265}', '\u{00A5}', '\u{00B5}', '\u{2202}', '\u{2211}',
    '\u{220F}', '\u{03C0}', '\u{222B}', '\u{00AA}', '\u{00BA}', '\u{03A9}', '\u{00E6}', '\u{00F8}',
    '\u{00BF}', '\u{00A1}', '\u{00AC}', '\u{221A}', '\u{0192}', '\u{2248}', '\u{2206}', '\u{00AB}',
    '\u{00BB}', '\u{2026}', '\u{00A0}', '\u{00C0}', '\u{00C3}', '\u{00D5}', '\u{0152}', '\u{0153}',
    '\u{2013}', '\u{2014}', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00F7}', '\u{25CA}',
    '\u{00FF}', '\u{0178}', '\u{2044}', '\u{20AC}', '\u{2039}', '\u{203A}', '\u{FB01}', '\u{FB02}',
    '\u{2021}', '\u{00B7}', '\u{201A}', '\u{201E}', '\u{2030}', '\u{00C2}', '\u{00CA}', '\u{00C1}',
    '\u{00CB}', '\u{00C8}', '\u{00CD}', '\u{00CE}', '\u{00CF}', '\u{00CC}', '\u{00D3}', '\u{00D4}',
    '\u{FFFD}', '\u{00D2}', '\u{00DA}', '\u{00DB}', '\u{00D9}', '\u{0131}', '\u{02C6}', '\u{02DC}',
    '\u{00AF}', '\u{02D8}', '\u{02D9}', '\u{02DA}', '\u{00B8}', '\u{02DD}', '\u{02DB}', '\u{02C7}',
];

fn decode_win_ansi(bytes: &[u8]) -> (String, usize) {
    let mut out = String::with_capacity(bytes.len());
    let mut replacements = 0;
    for &b in bytes {
        let c = if b < 0x80 {
            b as char
        } else {
            let mapped = WIN_ANSI_HIGH[(b - 0x80) as usize];
            if mapped == '\u{FFFD}' {
                replacements += 1;
            }
            mapped
        };
        out.push(c);
    }
    (out, replacements)
}

fn decode_mac_roman(bytes: &[u8]) -> (String, usize) {
    let mut out = String::with_capacity(bytes.len());
    let mut replacements = 0;
    for &b in bytes {
        let c = if b < 0x80 {
            b as char
        } else {
            let mapped = MAC_ROMAN_HIGH[(b - 0x80) as usize];
            if mapped == '\u{FFFD}' {
                replacements += 1;
            }
            mapped
        };
        out.push(c);
    }
    (out, replacements)
}

fn decode_pdf_doc(bytes: &[u8]) -> (String, usize) {
    // PDFDocEncoding matches Latin-1 closely enough for the ranges actually
    // emitted by the scanners/renderers this crate targets.
    decode_win_ansi(bytes)
}

fn decode_utf16be(bytes: &[u8]) -> (String, usize) {
    let body = if bytes.starts_with(&[0xFE, 0xFF]) {
        &bytes[2..]
    } else {
        bytes
    };
    let units: Vec<u16> = body
        .chunks(2)
        .map(|pair| {
            if pair.len() == 2 {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                0xFFFD
            }
        })
        .collect();
    let mut replacements = 0;
    let text = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                replacements += 1;
                '\u{FFFD}'
            })
        })
        .collect();
    (text, replacements)
}

/// Decodes single-byte PDF text strings to Unicode using a fixed encoding.
pub struct CharacterDecoder;

impl CharacterDecoder {
    pub fn decode(bytes: &[u8], encoding: EncodingType) -> String {
        match encoding {
            EncodingType::PdfDoc => decode_pdf_doc(bytes).0,
            EncodingType::WinAnsi => decode_win_ansi(bytes).0,
            EncodingType::MacRoman => decode_mac_roman(bytes).0,
            EncodingType::Utf16Be => decode_utf16be(bytes).0,
            EncodingType::Standard => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Decodes PDF text strings with auto-detection of the UTF-16BE BOM and
/// optional lenient replacement-character recovery.
pub struct EnhancedDecoder;

impl EnhancedDecoder {
    pub fn decode(bytes: &[u8], options: &EncodingOptions) -> EncodingResult {
        if bytes.starts_with(&[0xFE, 0xFF]) {
            let (text, replacement_count) = decode_utf16be(bytes);
            return EncodingResult {
                text,
                encoding_used: EncodingType::Utf16Be,
                replacement_count,
            };
        }

        let (text, replacement_count) = match options.encoding {
            EncodingType::PdfDoc => decode_pdf_doc(bytes),
            EncodingType::WinAnsi => decode_win_ansi(bytes),
            EncodingType::MacRoman => decode_mac_roman(bytes),
            EncodingType::Utf16Be => decode_utf16be(bytes),
            EncodingType::Standard => (bytes.iter().map(|&b| b as char).collect(), 0),
        };

        EncodingResult {
            text,
            encoding_used: options.encoding,
            replacement_count,
        }
    }
}
