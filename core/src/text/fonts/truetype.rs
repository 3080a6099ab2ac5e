//! Low-level TrueType/OpenType table access for font embedding
//!
//! Mirrors the table-directory walk in `fonts::ttf_parser::TtfParser`, but
//! exposes every `cmap` subtable (rather than just the best one) and scales
//! glyph widths into the 1000-unit PDF glyph space, which is what the
//! Type0/CIDFont writer needs to build `W` arrays and `CIDToGIDMap`s.

use crate::parser::{ParseError, ParseResult};
use std::collections::HashMap;

type Result<T> = ParseResult<T>;

fn syntax_error(message: impl Into<String>) -> ParseError {
    ParseError::SyntaxError {
        position: 0,
        message: message.into(),
    }
}

/// A table directory entry: byte offset and length within the font file.
#[derive(Debug, Clone, Copy)]
pub struct TableRecord {
    pub offset: u32,
    pub length: u32,
}

/// One `cmap` subtable: a platform/encoding pair plus its character mappings.
#[derive(Debug, Clone)]
pub struct CmapSubtable {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Unicode code point -> glyph index.
    pub mappings: HashMap<u32, u16>,
}

/// A single glyph's metrics, as needed for width-array generation.
#[derive(Debug, Clone, Copy)]
pub struct GlyphInfo {
    pub glyph_id: u16,
    pub advance_width: u16,
}

/// A parsed sfnt-wrapped TrueType or OpenType font.
pub struct TrueTypeFont {
    data: Vec<u8>,
    tables: HashMap<String, TableRecord>,
    pub units_per_em: u16,
    /// Glyph count, from `maxp`.
    pub num_glyphs: u16,
    /// `indexToLocFormat` from `head`: 0 = short (`loca` entries are
    /// offset/2 as u16), 1 = long (`loca` entries are u32 offsets).
    pub loca_format: u16,
}

impl TrueTypeFont {
    /// Parse the table directory and the `head`/`maxp` tables; everything
    /// else is fetched lazily by the table-specific methods.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        if data.len() < 12 {
            return Err(syntax_error("TrueType data too small"));
        }
        let num_tables = u16::from_be_bytes([data[4], data[5]]) as usize;
        let mut tables = HashMap::with_capacity(num_tables);
        let mut offset = 12usize;
        for _ in 0..num_tables {
            if offset + 16 > data.len() {
                return Err(syntax_error("Truncated table directory"));
            }
            let tag = String::from_utf8_lossy(&data[offset..offset + 4]).to_string();
            let table_offset = u32::from_be_bytes(data[offset + 8..offset + 12].try_into().unwrap());
            let length = u32::from_be_bytes(data[offset + 12..offset + 16].try_into().unwrap());
            tables.insert(
                tag,
                TableRecord {
                    offset: table_offset,
                    length,
                },
            );
            offset += 16;
        }

        let units_per_em = tables
            .get("head")
            .and_then(|t| {
                let start = t.offset as usize;
                data.get(start + 18..start + 20)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
            })
            .unwrap_or(1000);

        let loca_format = tables
            .get("head")
            .and_then(|t| {
                let start = t.offset as usize;
                data.get(start + 50..start + 52)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
            })
            .unwrap_or(0);

        let num_glyphs = tables
            .get("maxp")
            .and_then(|t| {
                let start = t.offset as usize;
                data.get(start + 4..start + 6)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
            })
            .unwrap_or(0);

        Ok(Self {
            data,
            tables,
            units_per_em: if units_per_em == 0 { 1000 } else { units_per_em },
            num_glyphs,
            loca_format,
        })
    }

    fn table_bytes(&self, tag: &str) -> Option<&[u8]> {
        let record = self.tables.get(tag)?;
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize)?;
        self.data.get(start..end)
    }

    fn table(&self, tag: &str) -> Option<&[u8]> {
        self.table_bytes(tag)
    }

    /// Table directory entry for `tag` (4-byte ASCII, e.g. `b"head"`).
    pub fn get_table(&self, tag: &[u8]) -> Result<TableRecord> {
        let name = String::from_utf8_lossy(tag).to_string();
        self.tables
            .get(&name)
            .copied()
            .ok_or_else(|| syntax_error(format!("Missing {name} table")))
    }

    /// Raw outline data for one glyph from `glyf`, sliced via `loca`.
    pub fn get_glyph_data(&self, glyph_id: u16) -> Result<Vec<u8>> {
        let loca = self
            .table_bytes("loca")
            .ok_or_else(|| syntax_error("Missing loca table"))?;
        let glyf = self
            .table_bytes("glyf")
            .ok_or_else(|| syntax_error("Missing glyf table"))?;

        let (start, end) = if self.loca_format == 0 {
            let idx = glyph_id as usize * 2;
            let read = |i: usize| -> Result<u32> {
                loca.get(i..i + 2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]) as u32 * 2)
                    .ok_or_else(|| syntax_error("Truncated loca table"))
            };
            (read(idx)?, read(idx + 2)?)
        } else {
            let idx = glyph_id as usize * 4;
            let read = |i: usize| -> Result<u32> {
                loca.get(i..i + 4)
                    .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
                    .ok_or_else(|| syntax_error("Truncated loca table"))
            };
            (read(idx)?, read(idx + 4)?)
        };

        if end < start {
            return Err(syntax_error("Invalid loca range"));
        }
        glyf.get(start as usize..end as usize)
            .map(|b| b.to_vec())
            .ok_or_else(|| syntax_error("Glyph data out of bounds"))
    }

    /// `(advance_width, left_side_bearing)` for one glyph, from `hmtx`.
    pub fn get_glyph_metrics(&self, glyph_id: u16) -> Result<(u16, i16)> {
        let hhea = self
            .table_bytes("hhea")
            .ok_or_else(|| syntax_error("Missing hhea table"))?;
        if hhea.len() < 36 {
            return Err(syntax_error("Invalid hhea table"));
        }
        let num_h_metrics = u16::from_be_bytes([hhea[34], hhea[35]]) as usize;
        let hmtx = self
            .table_bytes("hmtx")
            .ok_or_else(|| syntax_error("Missing hmtx table"))?;

        let idx = (glyph_id as usize).min(num_h_metrics.saturating_sub(1));
        let rec = idx * 4;
        let record = hmtx
            .get(rec..rec + 4)
            .ok_or_else(|| syntax_error("Truncated hmtx table"))?;
        let advance = u16::from_be_bytes([record[0], record[1]]);
        let lsb = i16::from_be_bytes([record[2], record[3]]);
        Ok((advance, lsb))
    }

    /// Parse every `cmap` subtable present in the font.
    pub fn parse_cmap(&self) -> Result<Vec<CmapSubtable>> {
        let cmap = self
            .table("cmap")
            .ok_or_else(|| syntax_error("Missing cmap table"))?;
        if cmap.len() < 4 {
            return Err(syntax_error("Invalid cmap table"));
        }
        let num_tables = u16::from_be_bytes([cmap[2], cmap[3]]) as usize;
        if cmap.len() < 4 + num_tables * 8 {
            return Err(syntax_error("Incomplete cmap table"));
        }

        let mut subtables = Vec::with_capacity(num_tables);
        for i in 0..num_tables {
            let rec = 4 + i * 8;
            let platform_id = u16::from_be_bytes([cmap[rec], cmap[rec + 1]]);
            let encoding_id = u16::from_be_bytes([cmap[rec + 2], cmap[rec + 3]]);
            let subtable_offset =
                u32::from_be_bytes([cmap[rec + 4], cmap[rec + 5], cmap[rec + 6], cmap[rec + 7]])
                    as usize;
            let mappings = Self::parse_cmap_subtable(cmap, subtable_offset).unwrap_or_default();
            subtables.push(CmapSubtable {
                platform_id,
                encoding_id,
                mappings,
            });
        }
        Ok(subtables)
    }

    fn parse_cmap_subtable(cmap: &[u8], offset: usize) -> Result<HashMap<u32, u16>> {
        if offset + 2 > cmap.len() {
            return Err(syntax_error("Invalid cmap subtable offset"));
        }
        let format = u16::from_be_bytes([cmap[offset], cmap[offset + 1]]);
        match format {
            0 => Self::parse_format_0(cmap, offset),
            4 => Self::parse_format_4(cmap, offset),
            12 => Self::parse_format_12(cmap, offset),
            _ => Ok(HashMap::new()),
        }
    }

    fn parse_format_0(cmap: &[u8], offset: usize) -> Result<HashMap<u32, u16>> {
        let table = cmap
            .get(offset..offset + 262)
            .ok_or_else(|| syntax_error("Truncated cmap format 0"))?;
        let mut map = HashMap::new();
        for (code, &glyph) in table[6..262].iter().enumerate() {
            if glyph != 0 {
                map.insert(code as u32, glyph as u16);
            }
        }
        Ok(map)
    }

    fn parse_format_4(cmap: &[u8], offset: usize) -> Result<HashMap<u32, u16>> {
        let seg_count_x2 = u16::from_be_bytes(
            cmap.get(offset + 6..offset + 8)
                .ok_or_else(|| syntax_error("Truncated cmap format 4"))?
                .try_into()
                .unwrap(),
        ) as usize;
        let seg_count = seg_count_x2 / 2;

        let end_codes = offset + 14;
        let start_codes = end_codes + seg_count_x2 + 2; // +2 skips reservedPad
        let id_deltas = start_codes + seg_count_x2;
        let id_range_offsets = id_deltas + seg_count_x2;

        let mut map = HashMap::new();
        for seg in 0..seg_count {
            let read_u16 = |base: usize| -> Option<u16> {
                cmap.get(base + seg * 2..base + seg * 2 + 2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]))
            };
            let end_code = read_u16(end_codes).unwrap_or(0);
            let start_code = read_u16(start_codes).unwrap_or(0);
            let id_delta = read_u16(id_deltas).unwrap_or(0) as i32;
            let id_range_offset = read_u16(id_range_offsets).unwrap_or(0);

            if start_code > end_code || end_code == 0xFFFF && start_code == 0xFFFF {
                continue;
            }

            for code in start_code..=end_code {
                let glyph = if id_range_offset == 0 {
                    ((code as i32 + id_delta) & 0xFFFF) as u16
                } else {
                    let glyph_index_addr = id_range_offsets
                        + seg * 2
                        + id_range_offset as usize
                        + (code - start_code) as usize * 2;
                    match cmap.get(glyph_index_addr..glyph_index_addr + 2) {
                        Some(b) => {
                            let raw = u16::from_be_bytes([b[0], b[1]]);
                            if raw == 0 {
                                0
                            } else {
                                ((raw as i32 + id_delta) & 0xFFFF) as u16
                            }
                        }
                        None => 0,
                    }
                };
                if glyph != 0 {
                    map.insert(code as u32, glyph);
                }
            }
        }
        Ok(map)
    }

    fn parse_format_12(cmap: &[u8], offset: usize) -> Result<HashMap<u32, u16>> {
        let num_groups = u32::from_be_bytes(
            cmap.get(offset + 12..offset + 16)
                .ok_or_else(|| syntax_error("Truncated cmap format 12"))?
                .try_into()
                .unwrap(),
        ) as usize;

        let mut map = HashMap::new();
        let mut group_offset = offset + 16;
        for _ in 0..num_groups {
            let group = cmap
                .get(group_offset..group_offset + 12)
                .ok_or_else(|| syntax_error("Truncated cmap format 12 group"))?;
            let start_char = u32::from_be_bytes(group[0..4].try_into().unwrap());
            let end_char = u32::from_be_bytes(group[4..8].try_into().unwrap());
            let start_glyph = u32::from_be_bytes(group[8..12].try_into().unwrap());
            for (i, code) in (start_char..=end_char).enumerate() {
                map.insert(code, (start_glyph as usize + i) as u16);
            }
            group_offset += 12;
        }
        Ok(map)
    }

    /// Advance widths, scaled to PDF's 1000-units-per-em space, keyed by
    /// the Unicode code points present in `char_to_glyph`.
    pub fn get_glyph_widths(&self, char_to_glyph: &HashMap<u32, u16>) -> Result<HashMap<u32, u16>> {
        let hhea = self
            .table("hhea")
            .ok_or_else(|| syntax_error("Missing hhea table"))?;
        if hhea.len() < 36 {
            return Err(syntax_error("Invalid hhea table"));
        }
        let num_h_metrics = u16::from_be_bytes([hhea[34], hhea[35]]) as usize;

        let hmtx = self
            .table("hmtx")
            .ok_or_else(|| syntax_error("Missing hmtx table"))?;

        let mut glyph_widths: HashMap<u16, u16> = HashMap::new();
        let mut last_width = 0u16;
        for glyph_id in 0..num_h_metrics {
            let rec = glyph_id * 4;
            if rec + 2 > hmtx.len() {
                break;
            }
            let advance = u16::from_be_bytes([hmtx[rec], hmtx[rec + 1]]);
            glyph_widths.insert(glyph_id as u16, advance);
            last_width = advance;
        }

        let scale = 1000.0 / self.units_per_em as f64;
        let mut out = HashMap::with_capacity(char_to_glyph.len());
        for (&code, &glyph) in char_to_glyph {
            let raw = glyph_widths.get(&glyph).copied().unwrap_or(last_width);
            out.insert(code, (raw as f64 * scale).round() as u16);
        }
        Ok(out)
    }
}
