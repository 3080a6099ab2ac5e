//! PDF file header (`%PDF-x.y`) parsing.

use super::{ParseError, ParseResult};
use std::io::{BufRead, Seek, SeekFrom};

/// PDF version declared in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl PdfVersion {
    pub const V1_0: PdfVersion = PdfVersion { major: 1, minor: 0 };
    pub const V1_7: PdfVersion = PdfVersion { major: 1, minor: 7 };
    pub const V2_0: PdfVersion = PdfVersion { major: 2, minor: 0 };
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for PdfVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| ParseError::UnsupportedVersion(s.to_string()))?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| ParseError::UnsupportedVersion(s.to_string()))?;
        Ok(PdfVersion { major, minor })
    }
}

/// The `%PDF-x.y` header line, plus the offset of the first object after it.
#[derive(Debug, Clone)]
pub struct PdfHeader {
    pub version: PdfVersion,
    /// Byte offset immediately following the header line (and any binary
    /// marker comment), where object parsing may resume.
    pub body_offset: u64,
}

const MAX_HEADER_SCAN: u64 = 1024;

impl PdfHeader {
    /// Parse the header from the start of `reader`. Per the spec the header
    /// must begin at byte 0, but some generators prepend junk bytes, so the
    /// marker is searched for within the first [`MAX_HEADER_SCAN`] bytes.
    pub fn parse<R: BufRead + Seek>(reader: &mut R) -> ParseResult<Self> {
        let start = reader.stream_position()?;
        let mut buf = vec![0u8; MAX_HEADER_SCAN as usize];
        let mut total = 0usize;
        loop {
            let filled = reader.fill_buf()?;
            if filled.is_empty() {
                break;
            }
            let n = filled.len().min(buf.len() - total);
            buf[total..total + n].copy_from_slice(&filled[..n]);
            reader.consume(n);
            total += n;
            if total >= buf.len() {
                break;
            }
        }
        buf.truncate(total);

        let marker = b"%PDF-";
        let marker_pos = buf
            .windows(marker.len())
            .position(|w| w == marker)
            .ok_or(ParseError::InvalidHeader)?;

        let after_marker = marker_pos + marker.len();
        let line_end = buf[after_marker..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map(|p| after_marker + p)
            .unwrap_or(buf.len());

        let version_str = std::str::from_utf8(&buf[after_marker..line_end])
            .map_err(|_| ParseError::InvalidHeader)?;
        let version: PdfVersion = version_str.parse()?;

        let mut body_offset = line_end as u64;
        // Skip the newline terminator(s).
        if buf.get(line_end) == Some(&b'\r') {
            body_offset += 1;
            if buf.get(line_end + 1) == Some(&b'\n') {
                body_offset += 1;
            }
        } else if buf.get(line_end) == Some(&b'\n') {
            body_offset += 1;
        }

        reader.seek(SeekFrom::Start(start + body_offset))?;

        Ok(PdfHeader {
            version,
            body_offset: start + body_offset,
        })
    }
}
