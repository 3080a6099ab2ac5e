//! Fixture builders shared by the parser submodules' `#[cfg(test)]` blocks.

/// A minimal well-formed one-page PDF 1.4 file with a classic (non-stream)
/// cross-reference table, offsets computed by hand for the fixed body below.
pub fn create_minimal_pdf() -> Vec<u8> {
    b"%PDF-1.4\n\
1 0 obj\n\
<< /Type /Catalog /Pages 2 0 R >>\n\
endobj\n\
2 0 obj\n\
<< /Type /Pages /Kids [3 0 R] /Count 1 >>\n\
endobj\n\
3 0 obj\n\
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\n\
endobj\n\
xref\n\
0 4\n\
0000000000 65535 f \n\
0000000009 00000 n \n\
0000000058 00000 n \n\
0000000115 00000 n \n\
trailer\n\
<< /Size 4 /Root 1 0 R >>\n\
startxref\n\
186\n\
%%EOF\n"
        .to_vec()
}

/// Same layout as [`create_minimal_pdf`] but with the header version string
/// replaced, for exercising [`super::header::PdfVersion`] parsing.
pub fn create_pdf_with_version(version: &str) -> Vec<u8> {
    let mut data = create_minimal_pdf();
    let header = format!("%PDF-{version}\n");
    let old_header_len = "%PDF-1.4\n".len();
    data.splice(0..old_header_len, header.into_bytes());
    data
}

/// A page whose `/Contents` is a single `FlateDecode`d stream, for testing
/// content-stream retrieval end to end.
pub fn create_minimal_pdf_with_content(content: &[u8]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).expect("in-memory compression cannot fail");
    let compressed = encoder.finish().expect("in-memory compression cannot fail");

    let mut body = Vec::new();
    body.extend_from_slice(b"%PDF-1.4\n");
    let obj1_offset = body.len();
    body.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    let obj2_offset = body.len();
    body.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    let obj3_offset = body.len();
    body.extend_from_slice(
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>\nendobj\n",
    );
    let obj4_offset = body.len();
    body.extend_from_slice(format!("4 0 obj\n<< /Filter /FlateDecode /Length {} >>\nstream\n", compressed.len()).as_bytes());
    body.extend_from_slice(&compressed);
    body.extend_from_slice(b"\nendstream\nendobj\n");
    let xref_offset = body.len();
    body.extend_from_slice(b"xref\n0 5\n0000000000 65535 f \n");
    for offset in [obj1_offset, obj2_offset, obj3_offset, obj4_offset] {
        body.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    body.extend_from_slice(b"trailer\n<< /Size 5 /Root 1 0 R >>\nstartxref\n");
    body.extend_from_slice(format!("{xref_offset}\n").as_bytes());
    body.extend_from_slice(b"%%EOF\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_pdf_starts_with_header() {
        assert!(create_minimal_pdf().starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn versioned_pdf_carries_requested_version() {
        let data = create_pdf_with_version("1.7");
        assert!(data.starts_with(b"%PDF-1.7"));
    }
}
