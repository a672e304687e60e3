//! Topology (TRE) header parsing and the built-in bounds-only tile format.
//!
//! # Header Structure
//! ```text
//! 0x00  u16      header length
//! 0x02  [u8;10]  "GARMIN TRE"
//! 0x15  i24      north boundary (map units)
//! 0x18  i24      east boundary
//! 0x1B  i24      south boundary
//! 0x1E  i24      west boundary
//! ```

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::trace;

use crate::img::subfile::{SubFileStream, TileSource};
use crate::img::types::error::{ImgError, Result};
use crate::img::types::filetypes::{SubFileType, TileFormat};
use crate::img::types::models::{Coordinates, Point, Polys, RectC};
use crate::img::utils;

const TRE_TAG: &[u8; 10] = b"GARMIN TRE";
const BOUNDS_OFFSET: u64 = 0x15;
const MIN_HEADER_LEN: u16 = 0x21;

/// The fixed part of a topology sub-file header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreHeader {
    pub header_len: u16,
    pub bounds: RectC,
}

impl TreHeader {
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let header_len = reader.read_u16::<LittleEndian>()?;
        let mut tag = [0u8; 10];
        reader.read_exact(&mut tag)?;
        if &tag != TRE_TAG {
            return Err(ImgError::InvalidSubFile {
                kind: SubFileType::Tre,
                reason: format!("bad header tag {:?}", String::from_utf8_lossy(&tag)),
            });
        }
        if header_len < MIN_HEADER_LEN {
            return Err(ImgError::InvalidSubFile {
                kind: SubFileType::Tre,
                reason: format!("header too short ({} bytes)", header_len),
            });
        }

        reader.seek(SeekFrom::Start(BOUNDS_OFFSET))?;
        let north = reader.read_i24::<LittleEndian>()?;
        let east = reader.read_i24::<LittleEndian>()?;
        let south = reader.read_i24::<LittleEndian>()?;
        let west = reader.read_i24::<LittleEndian>()?;
        trace!("TRE bounds (map units): N={} E={} S={} W={}", north, east, south, west);

        let bounds = RectC::new(
            Coordinates::new(utils::map_units_to_degrees(west), utils::map_units_to_degrees(north)),
            Coordinates::new(utils::map_units_to_degrees(east), utils::map_units_to_degrees(south)),
        );

        Ok(TreHeader { header_len, bounds })
    }
}

/// Tile format that reads the topology header and nothing else.
///
/// Tiles opened with it are fully indexed and can be enumerated and
/// extracted, but report no subdivisions, so range queries return no
/// features. Plug a complete decoder in through [`TileFormat`] to get
/// geometry.
#[derive(Debug)]
pub struct BoundsOnly;

impl TileFormat for BoundsOnly {
    const DEBUG_NAME: &'static str = "bounds-only";
    type Topology = TreHeader;

    fn parse_topology(tre: &mut SubFileStream<'_>) -> Result<Self::Topology> {
        TreHeader::parse(tre)
    }

    fn bounds(topology: &Self::Topology) -> RectC {
        topology.bounds
    }

    fn subdivs(
        _topology: &mut Self::Topology,
        _tile: &mut TileSource<'_>,
        _rect: &RectC,
        _bits: u8,
    ) -> Result<Vec<u32>> {
        Ok(Vec::new())
    }

    fn decode_polys(_topology: &Self::Topology, _tile: &mut TileSource<'_>, _subdiv: u32) -> Result<Polys> {
        Ok(Polys::default())
    }

    fn decode_points(_topology: &Self::Topology, _tile: &mut TileSource<'_>, _subdiv: u32) -> Result<Vec<Point>> {
        Ok(Vec::new())
    }
}
