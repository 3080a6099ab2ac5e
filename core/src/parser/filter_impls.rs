//! Concrete stream filter implementations (ISO 32000-1 §7.4).

use super::{ParseError, ParseResult};

/// `/FlateDecode`: zlib-wrapped deflate, optionally with PNG/TIFF predictors
/// applied afterwards by the caller via [`apply_predictor`].
pub fn flate_decode(data: &[u8]) -> ParseResult<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) => {
            // Some broken writers omit the zlib header/checksum; retry as
            // raw deflate.
            let mut raw = flate2::read::DeflateDecoder::new(data);
            out.clear();
            raw.read_to_end(&mut out)
                .map_err(|e| ParseError::StreamDecodeError(e.to_string()))?;
            Ok(out)
        }
    }
}

/// `/ASCIIHexDecode`: two hex digits per byte, terminated by `>`.
pub fn ascii_hex_decode(data: &[u8]) -> ParseResult<Vec<u8>> {
    let mut digits = Vec::with_capacity(data.len());
    for &b in data {
        if b == b'>' {
            break;
        }
        if b.is_ascii_hexdigit() {
            digits.push(b);
        } else if !b.is_ascii_whitespace() {
            return Err(ParseError::StreamDecodeError(format!(
                "invalid hex digit {b:#04x}"
            )));
        }
    }
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).unwrap_or("00");
            u8::from_str_radix(s, 16).map_err(|_| ParseError::StreamDecodeError(s.to_string()))
        })
        .collect()
}

/// `/ASCII85Decode`: base-85 groups of 5 ASCII chars -> 4 bytes.
pub fn ascii85_decode(data: &[u8]) -> ParseResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut group = [0u32; 5];
    let mut count = 0;

    let trimmed: Vec<u8> = data
        .iter()
        .copied()
        .take_while(|&b| !(b == b'~'))
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let mut i = 0;
    while i < trimmed.len() {
        let b = trimmed[i];
        if b == b'z' && count == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            i += 1;
            continue;
        }
        if !(b'!'..=b'u').contains(&b) {
            return Err(ParseError::StreamDecodeError(format!(
                "invalid ascii85 byte {b:#04x}"
            )));
        }
        group[count] = (b - b'!') as u32;
        count += 1;
        i += 1;
        if count == 5 {
            let value = group.iter().fold(0u32, |acc, &d| acc.wrapping_mul(85).wrapping_add(d));
            out.extend_from_slice(&value.to_be_bytes());
            count = 0;
        }
    }

    if count > 0 {
        for slot in group.iter_mut().skip(count) {
            *slot = 84;
        }
        let value = group.iter().fold(0u32, |acc, &d| acc.wrapping_mul(85).wrapping_add(d));
        let bytes = value.to_be_bytes();
        out.extend_from_slice(&bytes[..count - 1]);
    }

    Ok(out)
}

/// `/RunLengthDecode`: length-prefixed literal/repeat runs.
pub fn run_length_decode(data: &[u8]) -> ParseResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let length = data[i];
        i += 1;
        if length == 128 {
            break;
        } else if length < 128 {
            let count = length as usize + 1;
            if i + count > data.len() {
                return Err(ParseError::StreamDecodeError(
                    "run-length literal run truncated".to_string(),
                ));
            }
            out.extend_from_slice(&data[i..i + count]);
            i += count;
        } else {
            if i >= data.len() {
                return Err(ParseError::StreamDecodeError(
                    "run-length repeat run truncated".to_string(),
                ));
            }
            let count = 257 - length as usize;
            out.extend(std::iter::repeat(data[i]).take(count));
            i += 1;
        }
    }
    Ok(out)
}

/// `/LZWDecode` with the PDF-specific early-change variable-width codes.
pub fn lzw_decode(data: &[u8]) -> ParseResult<Vec<u8>> {
    const CLEAR: u32 = 256;
    const EOD: u32 = 257;

    let mut table: Vec<Vec<u8>> = (0..256).map(|b| vec![b as u8]).collect();
    table.push(Vec::new()); // 256 = clear
    table.push(Vec::new()); // 257 = eod

    let mut out = Vec::new();
    let mut code_width = 9u32;
    let mut bit_buffer: u32 = 0;
    let mut bits_in_buffer = 0u32;
    let mut pos = 0usize;
    let mut prev: Option<Vec<u8>> = None;

    loop {
        while bits_in_buffer < code_width {
            if pos >= data.len() {
                return Ok(out);
            }
            bit_buffer = (bit_buffer << 8) | data[pos] as u32;
            bits_in_buffer += 8;
            pos += 1;
        }
        let code = (bit_buffer >> (bits_in_buffer - code_width)) & ((1 << code_width) - 1);
        bits_in_buffer -= code_width;

        if code == CLEAR {
            table.truncate(258);
            code_width = 9;
            prev = None;
            continue;
        }
        if code == EOD {
            break;
        }

        let entry = if (code as usize) < table.len() {
            table[code as usize].clone()
        } else if let Some(ref p) = prev {
            let mut e = p.clone();
            e.push(p[0]);
            e
        } else {
            return Err(ParseError::StreamDecodeError(
                "invalid LZW code sequence".to_string(),
            ));
        };

        out.extend_from_slice(&entry);

        if let Some(p) = prev.take() {
            let mut new_entry = p;
            new_entry.push(entry[0]);
            table.push(new_entry);
        }
        prev = Some(entry);

        let next_size = table.len() + 1;
        if next_size > 4096 {
            // table full, caller should see a Clear before more codes
        } else if next_size > 2048 {
            code_width = 12;
        } else if next_size > 1024 {
            code_width = 11;
        } else if next_size > 512 {
            code_width = 10;
        }
    }

    Ok(out)
}

/// PNG predictors (`/Predictor >= 10`) and the TIFF predictor (`= 2`),
/// applied to `FlateDecode`/`LZWDecode` output per `/DecodeParms`.
pub fn apply_predictor(
    data: &[u8],
    predictor: i64,
    colors: usize,
    bits_per_component: usize,
    columns: usize,
) -> ParseResult<Vec<u8>> {
    if predictor <= 1 {
        return Ok(data.to_vec());
    }

    let bytes_per_pixel = (colors * bits_per_component).div_ceil(8).max(1);
    let row_bytes = (colors * bits_per_component * columns).div_ceil(8);

    if predictor == 2 {
        // TIFF predictor: each sample is the delta from the one bytes_per_pixel back.
        let mut out = data.to_vec();
        for row in out.chunks_mut(row_bytes) {
            for i in bytes_per_pixel..row.len() {
                row[i] = row[i].wrapping_add(row[i - bytes_per_pixel]);
            }
        }
        return Ok(out);
    }

    // PNG predictors: each row is prefixed with a filter-type byte.
    let stride = row_bytes + 1;
    let mut out = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];

    for chunk in data.chunks(stride) {
        if chunk.is_empty() {
            continue;
        }
        let filter_type = chunk[0];
        let mut row = chunk[1..].to_vec();
        if row.len() < row_bytes {
            row.resize(row_bytes, 0);
        }

        for i in 0..row.len() {
            let a = if i >= bytes_per_pixel { row[i - bytes_per_pixel] } else { 0 };
            let b = prev_row[i];
            let c = if i >= bytes_per_pixel { prev_row[i - bytes_per_pixel] } else { 0 };
            row[i] = match filter_type {
                0 => row[i],
                1 => row[i].wrapping_add(a),
                2 => row[i].wrapping_add(b),
                3 => row[i].wrapping_add(((a as u16 + b as u16) / 2) as u8),
                4 => row[i].wrapping_add(paeth(a, b, c)),
                other => {
                    return Err(ParseError::StreamDecodeError(format!(
                        "unsupported PNG predictor filter type {other}"
                    )))
                }
            };
        }

        out.extend_from_slice(&row);
        prev_row = row;
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i32 + b as i32 - c as i32;
    let pa = (p - a as i32).abs();
    let pb = (p - b as i32).abs();
    let pc = (p - c as i32).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_hex_round_trips_simple_bytes() {
        let decoded = ascii_hex_decode(b"48656C6C6F>").unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn run_length_expands_literal_and_repeat_runs() {
        // 2 literal bytes "AB", then repeat 'C' 3 times, then EOD
        let data = vec![1, b'A', b'B', 254, b'C', 128];
        let decoded = run_length_decode(&data).unwrap();
        assert_eq!(decoded, b"ABCCC");
    }

    #[test]
    fn ascii85_decodes_known_vector() {
        let decoded = ascii85_decode(b"87cURD_*#4DfTZ)+T").unwrap();
        assert_eq!(decoded, b"Hello, World");
    }

    #[test]
    fn flate_decode_round_trips_zlib_data() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"some repeated text some repeated text").unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = flate_decode(&compressed).unwrap();
        assert_eq!(decoded, b"some repeated text some repeated text");
    }
}
