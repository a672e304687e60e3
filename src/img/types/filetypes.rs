//! Sub-file kinds and the decoder seam for tile payloads.

use std::fmt;

use super::error::Result;
use super::models::{Point, Polys, RectC};
use crate::img::subfile::{SubFileStream, TileSource};

/// The kind of a sub-file, as named by the 3-letter type code of its directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubFileType {
    /// Topology and subdivision index. Mandatory for every tile.
    Tre,
    /// Geometry (regions, lines, points).
    Rgn,
    /// Labels.
    Lbl,
    /// Routing network.
    Net,
    /// Combined container holding the other tile sub-files.
    Gmp,
    /// Styling. One per container.
    Typ,
    Unknown,
}

impl SubFileType {
    /// Classifies a directory record type code. Total: unknown codes map to `Unknown`.
    pub fn from_code(code: &[u8; 3]) -> Self {
        match code {
            b"TRE" => Self::Tre,
            b"RGN" => Self::Rgn,
            b"LBL" => Self::Lbl,
            b"NET" => Self::Net,
            b"GMP" => Self::Gmp,
            b"TYP" => Self::Typ,
            _ => Self::Unknown,
        }
    }

    /// Whether records of this kind belong to a tile (rather than to the container).
    pub fn is_tile_file(self) -> bool {
        matches!(self, Self::Tre | Self::Rgn | Self::Lbl | Self::Net | Self::Gmp)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Tre => "TRE",
            Self::Rgn => "RGN",
            Self::Lbl => "LBL",
            Self::Net => "NET",
            Self::Gmp => "GMP",
            Self::Typ => "TYP",
            Self::Unknown => "???",
        }
    }
}

impl fmt::Display for SubFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for SubFileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let code: [u8; 3] = upper
            .as_bytes()
            .try_into()
            .map_err(|_| format!("sub-file type must be 3 letters, got '{}'", s))?;
        match Self::from_code(&code) {
            Self::Unknown => Err(format!("unknown sub-file type '{}'", s)),
            kind => Ok(kind),
        }
    }
}

/// A trait that defines how the payload of a tile is decoded.
///
/// The container only walks the directory, reassembles block chains and
/// indexes tiles; everything inside the sub-files is interpreted by an
/// implementation of this trait. Subdivision ids returned by [`subdivs`]
/// must be stable for the lifetime of the tile, since decoded batches are
/// cached under them.
///
/// [`subdivs`]: TileFormat::subdivs
pub trait TileFormat {
    /// A short name used for debugging and logging.
    const DEBUG_NAME: &'static str;

    /// Decoded topology state of one tile.
    type Topology;

    /// Parses the tile's mandatory topology sub-file. An error drops the tile.
    fn parse_topology(tre: &mut SubFileStream<'_>) -> Result<Self::Topology>;

    /// Bounding rectangle of the tile.
    fn bounds(topology: &Self::Topology) -> RectC;

    /// Ids of the subdivisions at detail level `bits` that intersect `rect`.
    fn subdivs(
        topology: &mut Self::Topology,
        tile: &mut TileSource<'_>,
        rect: &RectC,
        bits: u8,
    ) -> Result<Vec<u32>>;

    /// Decodes the polygons and lines of one subdivision.
    fn decode_polys(topology: &Self::Topology, tile: &mut TileSource<'_>, subdiv: u32) -> Result<Polys>;

    /// Decodes the points of one subdivision.
    fn decode_points(topology: &Self::Topology, tile: &mut TileSource<'_>, subdiv: u32) -> Result<Vec<Point>>;

    /// Releases decoded state kept by the topology. The tile stays usable.
    fn clear(_topology: &mut Self::Topology) {}
}
