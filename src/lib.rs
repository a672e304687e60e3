//! # img-reader
//!
//! A reader for Garmin IMG map containers.
//!
//! Opens a container, rebuilds the block chains of its sub-files from the
//! directory, validates and indexes its tiles, and answers rectangle
//! queries for polygons, lines and points through a pluggable
//! [`TileFormat`] decoder with a cost-bounded cache of decoded subdivisions.
//!
//! ```no_run
//! use img_reader::{BoundsOnly, ImgReader, RectC};
//!
//! let reader = ImgReader::<BoundsOnly>::open("map.img").unwrap();
//! println!("{}: {}", reader.name(), reader.bounds());
//! reader.visit_tiles(&RectC::from_min_max([14.0, 50.0], [15.0, 51.0]), |tile| {
//!     println!("  {} {}", tile.name(), tile.bounds());
//!     true
//! });
//! ```
pub mod img;

// Re-export the main types for convenience
pub use img::{
    BoundsOnly,
    ImgError,
    ImgOptions,
    ImgReader,
    Result,
    TreHeader,
    cache::{CostCache, QueryCaches, SubDivKey},
    source::ByteSource,
    style::{Style, StyleSource},
    subfile::{SubFile, SubFileStream, TileSource},
    tile::{TileFiles, VectorTile},
    types::filetypes::{SubFileType, TileFormat},
    types::models::{Coordinates, ImgHeader, Point, Poly, Polys, QueryStats, RectC},
};
