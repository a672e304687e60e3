//! Synthetic IMG containers and a small tile format for tests.

#![allow(dead_code)]

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use img_reader::{
    Coordinates, ImgError, ImgOptions, ImgReader, Point, Poly, Polys, RectC, Result, SubFileStream,
    SubFileType, TileFormat, TileSource,
};

pub const DIRECTORY_OFFSET: usize = 0x200;
pub const RECORD_SIZE: usize = 512;

/// One sub-file to place in a container.
pub struct FileSpec {
    pub name: [u8; 8],
    pub code: [u8; 3],
    pub data: Vec<u8>,
    /// Blocks listed per directory record; more blocks spill into further parts.
    pub blocks_per_record: usize,
}

/// A directory record written verbatim, with explicit block numbers.
pub struct RawRecord {
    pub name: [u8; 8],
    pub code: [u8; 3],
    pub size: u32,
    pub part: u16,
    pub blocks: Vec<u16>,
}

pub struct ImgBuilder {
    pub key: u8,
    pub exponents: (u8, u8),
    pub description1: Vec<u8>,
    pub description2: Vec<u8>,
    pub leading_unused: usize,
    pub files: Vec<FileSpec>,
    pub raw_records: Vec<RawRecord>,
    pub signature: [u8; 6],
    pub identifier: [u8; 6],
}

impl Default for ImgBuilder {
    fn default() -> Self {
        Self {
            key: 0,
            exponents: (9, 0),
            description1: b"Test map            ".to_vec(),
            description2: b"                              \0".to_vec(),
            leading_unused: 0,
            files: Vec::new(),
            raw_records: Vec::new(),
            signature: *b"DSKIMG",
            identifier: *b"GARMIN",
        }
    }
}

pub fn name8(s: &str) -> [u8; 8] {
    let mut name = [b' '; 8];
    name[..s.len()].copy_from_slice(s.as_bytes());
    name
}

pub fn code3(s: &str) -> [u8; 3] {
    s.as_bytes().try_into().expect("3-letter code")
}

impl ImgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: u8) -> Self {
        self.key = key;
        self
    }

    pub fn exponents(mut self, e1: u8, e2: u8) -> Self {
        self.exponents = (e1, e2);
        self
    }

    pub fn leading_unused(mut self, blocks: usize) -> Self {
        self.leading_unused = blocks;
        self
    }

    pub fn file(mut self, name: &str, code: &str, data: Vec<u8>) -> Self {
        self.files.push(FileSpec {
            name: name8(name),
            code: code3(code),
            data,
            blocks_per_record: 240,
        });
        self
    }

    pub fn file_split(mut self, name: &str, code: &str, data: Vec<u8>, blocks_per_record: usize) -> Self {
        self.files.push(FileSpec {
            name: name8(name),
            code: code3(code),
            data,
            blocks_per_record,
        });
        self
    }

    pub fn raw_record(mut self, name: &str, code: &str, part: u16, blocks: Vec<u16>) -> Self {
        self.raw_records.push(RawRecord {
            name: name8(name),
            code: code3(code),
            size: 0,
            part,
            blocks,
        });
        self
    }

    pub fn block_size(&self) -> usize {
        1 << (self.exponents.0 + self.exponents.1)
    }

    /// Lays out header, directory and data blocks, then applies the XOR key.
    pub fn build(&self) -> Vec<u8> {
        let block_size = self.block_size();

        let mut records: Vec<(RawRecord, Option<(usize, usize)>)> = Vec::new();
        for (i, file) in self.files.iter().enumerate() {
            let blocks = file.data.len().div_ceil(block_size);
            let parts = blocks.div_ceil(file.blocks_per_record).max(1);
            for part in 0..parts {
                let first = part * file.blocks_per_record;
                let count = file.blocks_per_record.min(blocks - first.min(blocks));
                records.push((
                    RawRecord {
                        name: file.name,
                        code: file.code,
                        size: file.data.len() as u32,
                        part: part as u16,
                        blocks: Vec::new(),
                    },
                    Some((i, count)),
                ));
            }
        }
        for raw in &self.raw_records {
            records.push((
                RawRecord {
                    name: raw.name,
                    code: raw.code,
                    size: raw.size,
                    part: raw.part,
                    blocks: raw.blocks.clone(),
                },
                None,
            ));
        }

        let size_block = DIRECTORY_OFFSET + self.leading_unused * RECORD_SIZE;
        let first_record = size_block + RECORD_SIZE;
        let directory_end = first_record + records.len() * RECORD_SIZE;
        let mut next_block = directory_end.div_ceil(block_size);

        // Assign consecutive blocks to each file's parts.
        let mut file_blocks: Vec<Vec<u16>> = vec![Vec::new(); self.files.len()];
        for (record, spec) in records.iter_mut() {
            if let Some((file, count)) = spec {
                for _ in 0..*count {
                    record.blocks.push(next_block as u16);
                    file_blocks[*file].push(next_block as u16);
                    next_block += 1;
                }
            }
        }

        let mut out = vec![0u8; next_block.max(1) * block_size];
        out.resize(out.len().max(directory_end), 0);

        out[0x10..0x16].copy_from_slice(&self.signature);
        out[0x41..0x47].copy_from_slice(&self.identifier);
        out[0x49..0x49 + self.description1.len()].copy_from_slice(&self.description1);
        out[0x61] = self.exponents.0;
        out[0x62] = self.exponents.1;
        out[0x65..0x65 + self.description2.len()].copy_from_slice(&self.description2);

        out[size_block] = 1;
        out[size_block + 12..size_block + 16].copy_from_slice(&(directory_end as u32).to_le_bytes());

        for (i, (record, _)) in records.iter().enumerate() {
            let at = first_record + i * RECORD_SIZE;
            out[at] = 1;
            out[at + 1..at + 9].copy_from_slice(&record.name);
            out[at + 9..at + 12].copy_from_slice(&record.code);
            out[at + 12..at + 16].copy_from_slice(&record.size.to_le_bytes());
            out[at + 16..at + 18].copy_from_slice(&record.part.to_le_bytes());
            for slot in 0..240 {
                let value = record.blocks.get(slot).copied().unwrap_or(0xFFFF);
                out[at + 0x20 + slot * 2..at + 0x22 + slot * 2].copy_from_slice(&value.to_le_bytes());
            }
        }

        for (file, blocks) in self.files.iter().zip(&file_blocks) {
            for (chunk, block) in file.data.chunks(block_size).zip(blocks) {
                let at = *block as usize * block_size;
                out[at..at + chunk.len()].copy_from_slice(chunk);
            }
        }

        if self.key != 0 {
            for byte in out.iter_mut().skip(1) {
                *byte ^= self.key;
            }
        }
        out[0] = self.key;
        out
    }

    pub fn open<F: TileFormat>(&self) -> Result<ImgReader<F>> {
        self.open_with(ImgOptions::default())
    }

    pub fn open_with<F: TileFormat>(&self, options: ImgOptions) -> Result<ImgReader<F>> {
        ImgReader::<F>::from_reader(Cursor::new(self.build()), "synthetic.img", options)
    }
}

// ---- Real TRE headers, for the bounds-only format ----

pub fn degrees_to_units(deg: f64) -> i32 {
    (deg * (1u32 << 24) as f64 / 360.0).round() as i32
}

fn push_i24(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes()[..3]);
}

/// A minimal topology header with the given bounds in degrees.
pub fn tre_header(west: f64, south: f64, east: f64, north: f64) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0x74u16.to_le_bytes());
    out.extend_from_slice(b"GARMIN TRE");
    out.resize(0x15, 0);
    push_i24(&mut out, degrees_to_units(north));
    push_i24(&mut out, degrees_to_units(east));
    push_i24(&mut out, degrees_to_units(south));
    push_i24(&mut out, degrees_to_units(west));
    out.resize(0x74, 0);
    out
}

/// A combined sub-file holding the given sections, in TRE/RGN/LBL/NET order.
pub fn gmp_payload(tre: &[u8], rgn: &[u8], lbl: &[u8], net: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; 0x40];
    out[..2].copy_from_slice(&0x31u16.to_le_bytes());
    out[2..12].copy_from_slice(b"GARMIN GMP");
    let mut offsets = [0u32; 4];
    for (i, section) in [tre, rgn, lbl, net].iter().enumerate() {
        if !section.is_empty() {
            offsets[i] = out.len() as u32;
            out.extend_from_slice(section);
        }
    }
    for (i, offset) in offsets.iter().enumerate() {
        out[0x19 + i * 4..0x1D + i * 4].copy_from_slice(&offset.to_le_bytes());
    }
    out
}

// ---- A test tile format with a trivial payload layout ----
//
// TRE: "TTRE", bounds (4 x f64: left, bottom, right, top), u32 count,
//      then per subdivision: bounds (4 x f64) and u8 detail level.
// RGN: u32 count, then per feature: u32 subdiv, u8 class (0 polygon,
//      1 line, 2 point), u32 type, f64 lon, f64 lat.

pub struct TestSubDiv {
    pub bounds: RectC,
    pub bits: u8,
}

pub struct TestTopology {
    pub bounds: RectC,
    pub subdivs: Vec<TestSubDiv>,
    pub clears: usize,
}

pub struct TestFormat;

fn read_rect<R: Read>(r: &mut R) -> std::io::Result<RectC> {
    let left = r.read_f64::<LittleEndian>()?;
    let bottom = r.read_f64::<LittleEndian>()?;
    let right = r.read_f64::<LittleEndian>()?;
    let top = r.read_f64::<LittleEndian>()?;
    Ok(RectC::from_min_max([left, bottom], [right, top]))
}

struct Feature {
    subdiv: u32,
    class: u8,
    kind: u32,
    at: Coordinates,
}

fn read_features(tile: &mut TileSource<'_>) -> Result<Vec<Feature>> {
    let mut rgn = tile.stream(SubFileType::Rgn).ok_or(ImgError::MissingSubFile(SubFileType::Rgn))?;
    rgn.seek(SeekFrom::Start(0))?;
    let count = rgn.read_u32::<LittleEndian>()?;
    let mut features = Vec::new();
    for _ in 0..count {
        features.push(Feature {
            subdiv: rgn.read_u32::<LittleEndian>()?,
            class: rgn.read_u8()?,
            kind: rgn.read_u32::<LittleEndian>()?,
            at: Coordinates::new(rgn.read_f64::<LittleEndian>()?, rgn.read_f64::<LittleEndian>()?),
        });
    }
    Ok(features)
}

impl TileFormat for TestFormat {
    const DEBUG_NAME: &'static str = "test";
    type Topology = TestTopology;

    fn parse_topology(tre: &mut SubFileStream<'_>) -> Result<Self::Topology> {
        let mut tag = [0u8; 4];
        tre.read_exact(&mut tag)?;
        if &tag != b"TTRE" {
            return Err(ImgError::InvalidSubFile {
                kind: SubFileType::Tre,
                reason: "bad tag".to_string(),
            });
        }
        let bounds = read_rect(tre)?;
        let count = tre.read_u32::<LittleEndian>()?;
        let mut subdivs = Vec::new();
        for _ in 0..count {
            let bounds = read_rect(tre)?;
            let bits = tre.read_u8()?;
            subdivs.push(TestSubDiv { bounds, bits });
        }
        Ok(TestTopology {
            bounds,
            subdivs,
            clears: 0,
        })
    }

    fn bounds(topology: &Self::Topology) -> RectC {
        topology.bounds
    }

    fn subdivs(
        topology: &mut Self::Topology,
        _tile: &mut TileSource<'_>,
        rect: &RectC,
        bits: u8,
    ) -> Result<Vec<u32>> {
        Ok(topology
            .subdivs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.bits <= bits && s.bounds.intersects(rect))
            .map(|(i, _)| i as u32)
            .collect())
    }

    fn decode_polys(_topology: &Self::Topology, tile: &mut TileSource<'_>, subdiv: u32) -> Result<Polys> {
        let mut polys = Polys::default();
        for f in read_features(tile)?.into_iter().filter(|f| f.subdiv == subdiv) {
            let poly = Poly {
                kind: f.kind,
                label: None,
                points: vec![f.at],
            };
            match f.class {
                0 => polys.polygons.push(poly),
                1 => polys.lines.push(poly),
                _ => {}
            }
        }
        Ok(polys)
    }

    fn decode_points(_topology: &Self::Topology, tile: &mut TileSource<'_>, subdiv: u32) -> Result<Vec<Point>> {
        Ok(read_features(tile)?
            .into_iter()
            .filter(|f| f.subdiv == subdiv && f.class == 2)
            .map(|f| Point {
                kind: f.kind,
                label: None,
                coordinates: f.at,
                poi: false,
            })
            .collect())
    }

    fn clear(topology: &mut Self::Topology) {
        topology.clears += 1;
    }
}

fn push_rect(out: &mut Vec<u8>, r: &RectC) {
    for v in [r.left, r.bottom, r.right, r.top] {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Builds a test topology payload: tile bounds plus `(bounds, bits)` subdivisions.
pub fn test_tre(bounds: RectC, subdivs: &[(RectC, u8)]) -> Vec<u8> {
    let mut out = b"TTRE".to_vec();
    push_rect(&mut out, &bounds);
    out.extend_from_slice(&(subdivs.len() as u32).to_le_bytes());
    for (rect, bits) in subdivs {
        push_rect(&mut out, rect);
        out.push(*bits);
    }
    out
}

/// A feature for [`test_rgn`]: subdivision, class (0 polygon, 1 line, 2 point), type, lon, lat.
pub type TestFeature = (u32, u8, u32, f64, f64);

pub fn test_rgn(features: &[TestFeature]) -> Vec<u8> {
    let mut out = (features.len() as u32).to_le_bytes().to_vec();
    for (subdiv, class, kind, lon, lat) in features {
        out.extend_from_slice(&subdiv.to_le_bytes());
        out.push(*class);
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&lon.to_le_bytes());
        out.extend_from_slice(&lat.to_le_bytes());
    }
    out
}

pub fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> RectC {
    RectC::from_min_max([min_lon, min_lat], [max_lon, max_lat])
}
