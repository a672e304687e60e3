//! Data structures representing IMG container components and decoded features

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A geographic rectangle in degrees, north-up.
///
/// `left`/`right` are longitudes, `top`/`bottom` latitudes, with
/// `top >= bottom` for a valid rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectC {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectC {
    pub fn new(top_left: Coordinates, bottom_right: Coordinates) -> Self {
        Self {
            left: top_left.lon,
            top: top_left.lat,
            right: bottom_right.lon,
            bottom: bottom_right.lat,
        }
    }

    /// Builds a rectangle from its two corners in `(lon, lat)` min/max form.
    pub fn from_min_max(min: [f64; 2], max: [f64; 2]) -> Self {
        Self {
            left: min[0],
            top: max[1],
            right: max[0],
            bottom: min[1],
        }
    }

    pub fn top_left(&self) -> Coordinates {
        Coordinates::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Coordinates {
        Coordinates::new(self.right, self.bottom)
    }

    /// `[lon, lat]` of the south-west corner.
    pub fn min(&self) -> [f64; 2] {
        [self.left, self.bottom]
    }

    /// `[lon, lat]` of the north-east corner.
    pub fn max(&self) -> [f64; 2] {
        [self.right, self.top]
    }

    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom].iter().all(|v| v.is_finite())
            && self.left <= self.right
            && self.bottom <= self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Smallest rectangle containing both. Invalid operands are ignored.
    pub fn united(&self, other: &RectC) -> RectC {
        if !other.is_valid() {
            return *self;
        }
        if !self.is_valid() {
            return *other;
        }
        RectC {
            left: self.left.min(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// Closed-interval intersection test; touching edges intersect.
    pub fn intersects(&self, other: &RectC) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.bottom <= other.top
            && other.bottom <= self.top
    }

    pub fn contains(&self, c: Coordinates) -> bool {
        c.lon >= self.left && c.lon <= self.right && c.lat >= self.bottom && c.lat <= self.top
    }
}

impl BitOr for RectC {
    type Output = RectC;

    fn bitor(self, rhs: RectC) -> RectC {
        self.united(&rhs)
    }
}

impl BitOrAssign for RectC {
    fn bitor_assign(&mut self, rhs: RectC) {
        *self = self.united(&rhs);
    }
}

impl fmt::Display for RectC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({:.6}, {:.6}), ({:.6}, {:.6})]",
            self.left, self.bottom, self.right, self.top
        )
    }
}

/// A decoded polygon or polyline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Poly {
    /// Feature type code, as defined by the map's styling.
    pub kind: u32,
    pub label: Option<String>,
    pub points: Vec<Coordinates>,
}

/// A decoded point feature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub kind: u32,
    pub label: Option<String>,
    pub coordinates: Coordinates,
    /// Whether the point comes from the POI section rather than the plain point list.
    pub poi: bool,
}

/// The polygon and line features of one subdivision, in decode order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polys {
    pub polygons: Vec<Poly>,
    pub lines: Vec<Poly>,
}

impl Polys {
    pub fn len(&self) -> usize {
        self.polygons.len() + self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parsed container header.
#[derive(Debug, Clone)]
pub struct ImgHeader {
    /// Single-byte XOR key applied to everything after offset 0. Zero means none.
    pub key: u8,
    /// Size of one addressable block, always a power of two.
    pub block_size: u32,
    /// Display name built from the two description fields.
    pub name: String,
}

/// Counters describing the work done by one range query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Tiles whose bounds intersected the query rectangle.
    pub tiles: usize,
    /// Subdivisions reported by those tiles for the detail level.
    pub subdivs: usize,
    /// Subdivisions served from the query cache.
    pub cache_hits: usize,
    /// Subdivisions decoded from the sub-files.
    pub decoded: usize,
    /// Subdivision lookups or decodes that failed and were skipped.
    pub failed: usize,
}

impl QueryStats {
    /// Whether the query touched any tile payload at all.
    pub fn did_decode(&self) -> bool {
        self.decoded > 0 || self.failed > 0
    }
}
