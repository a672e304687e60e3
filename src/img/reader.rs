use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, info, warn};

use super::cache::QueryCaches;
use super::format;
use super::format::tre::BoundsOnly;
use super::options::ImgOptions;
use super::source::ByteSource;
use super::style::Style;
use super::subfile::SubFile;
use super::tile::VectorTile;
use super::tree::TileTree;
use super::types::error::{ImgError, Result};
use super::types::filetypes::{SubFileType, TileFormat};
use super::types::models::*;
use super::utils;

/// The main reader for Garmin IMG map containers.
///
/// Opening parses the header and the whole directory, validates every tile
/// and indexes the survivors by their bounds. Range queries then fan out to
/// the intersecting tiles and decode their subdivisions through `F`,
/// caching decoded batches across queries.
///
/// The reader is single-threaded: queries take `&mut self` because they
/// move the file position and update the caches.
pub struct ImgReader<F: TileFormat = BoundsOnly> {
    source: ByteSource,
    label: String,
    header: ImgHeader,
    options: ImgOptions,

    tiles: Vec<VectorTile<F>>,
    tree: TileTree,
    caches: QueryCaches,
    bounds: RectC,
    dropped_tiles: usize,

    typ: Option<(String, SubFile)>,
    style: Option<Style>,
}

impl<F: TileFormat> ImgReader<F> {
    /// Opens an IMG file with default options.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened or is truncated
    /// - The disk-image signature or vendor identifier does not match
    /// - The directory is invalid
    /// - No tile passes validation
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ImgOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: ImgOptions) -> Result<Self> {
        let path = path.as_ref();
        let source = ByteSource::open(path)?;
        Self::from_source(source, path.display().to_string(), options)
    }

    /// Opens a container from any seekable reader. `label` names it in logs.
    pub fn from_reader<R: Read + Seek + 'static>(
        reader: R,
        label: impl Into<String>,
        options: ImgOptions,
    ) -> Result<Self> {
        Self::from_source(ByteSource::new(reader), label.into(), options)
    }

    fn from_source(mut source: ByteSource, label: String, options: ImgOptions) -> Result<Self> {
        info!("Opening IMG file: {} ({} tiles)", label, F::DEBUG_NAME);

        let header = format::header::parse(&mut source)?;
        source.set_block_size(header.block_size as u64);

        let caches = QueryCaches::new(options.cache_capacity.max(1));
        let directory = format::directory::parse(&mut source)?;

        let mut tiles = Vec::with_capacity(directory.tiles.len());
        let mut tree = TileTree::new();
        let mut bounds: Option<RectC> = None;
        let mut dropped_tiles = 0;

        for (name, files) in directory.tiles {
            let name = utils::entry_name(&name);
            match VectorTile::<F>::init(name.clone(), files, &mut source) {
                Ok(tile) => {
                    let tile_bounds = tile.bounds();
                    debug!("Tile {}: bounds {}", name, tile_bounds);
                    tree.insert(tiles.len(), &tile_bounds);
                    bounds = Some(match bounds {
                        Some(acc) => acc | tile_bounds,
                        None => tile_bounds,
                    });
                    tiles.push(tile);
                }
                Err(e) => {
                    warn!("{}: {}: Invalid map tile: {}", label, name, e);
                    dropped_tiles += 1;
                }
            }
        }

        if tiles.is_empty() {
            return Err(ImgError::NoUsableTile);
        }

        info!(
            "IMG file opened: '{}', {} tiles ({} dropped), bounds {}",
            header.name,
            tiles.len(),
            dropped_tiles,
            bounds.unwrap_or_default()
        );

        Ok(Self {
            source,
            label,
            header,
            options,
            tiles,
            tree,
            caches,
            bounds: bounds.unwrap_or_default(),
            dropped_tiles,
            typ: directory.style.map(|(name, typ)| (utils::entry_name(&name), typ)),
            style: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// The path or label the container was opened from.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn header(&self) -> &ImgHeader {
        &self.header
    }

    pub fn block_size(&self) -> u32 {
        self.header.block_size
    }

    /// Union of the bounds of all usable tiles.
    pub fn bounds(&self) -> RectC {
        self.bounds
    }

    pub fn tiles(&self) -> &[VectorTile<F>] {
        &self.tiles
    }

    pub fn tile(&self, name: &str) -> Option<&VectorTile<F>> {
        self.tiles.iter().find(|tile| tile.name() == name)
    }

    /// Number of tiles discarded during validation.
    pub fn dropped_tiles(&self) -> usize {
        self.dropped_tiles
    }

    /// Name of the embedded styling sub-file, if the container has one.
    pub fn style_file(&self) -> Option<&str> {
        self.typ.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn caches(&self) -> &QueryCaches {
        &self.caches
    }

    /// Calls `visitor` for every tile whose bounds intersect `rect`.
    ///
    /// The order is unspecified. Returning `false` stops the walk.
    pub fn visit_tiles<V>(&self, rect: &RectC, mut visitor: V)
    where
        V: FnMut(&VectorTile<F>) -> bool,
    {
        self.tree.search(rect, |idx| visitor(&self.tiles[idx]));
    }

    /// Collects the polygons and lines intersecting `rect` at detail level `bits`.
    ///
    /// Results of all tiles are appended to `polygons` and `lines`; the order
    /// across tiles is unspecified, the order within a subdivision is the
    /// decode order.
    pub fn polys(
        &mut self,
        rect: &RectC,
        bits: u8,
        polygons: &mut Vec<Poly>,
        lines: &mut Vec<Poly>,
    ) -> QueryStats {
        let mut stats = QueryStats::default();
        let candidates = self.tree.candidates(rect);
        stats.tiles = candidates.len();

        for idx in candidates {
            self.tiles[idx].polys(
                idx,
                &mut self.source,
                &mut self.caches,
                rect,
                bits,
                polygons,
                lines,
                &mut stats,
            );
        }

        debug!("Poly query {} @ {}: {:?}", rect, bits, stats);
        stats
    }

    /// Collects the points intersecting `rect` at detail level `bits`.
    pub fn points(&mut self, rect: &RectC, bits: u8, points: &mut Vec<Point>) -> QueryStats {
        let mut stats = QueryStats::default();
        let candidates = self.tree.candidates(rect);
        stats.tiles = candidates.len();

        for idx in candidates {
            self.tiles[idx].points(
                idx,
                &mut self.source,
                &mut self.caches,
                rect,
                bits,
                points,
                &mut stats,
            );
        }

        debug!("Point query {} @ {}: {:?}", rect, bits, stats);
        stats
    }

    /// Loads the styling data, once.
    ///
    /// Priority (highest → lowest):
    /// 1. The styling sub-file embedded in the container
    /// 2. `ImgOptions::style_fallback`, if it can be read
    /// 3. The empty built-in style
    pub fn load_style(&mut self) -> Result<&Style> {
        let style = match self.style.take() {
            Some(style) => style,
            None => self.build_style()?,
        };
        let style: &Style = self.style.insert(style);
        Ok(style)
    }

    /// The loaded style, if [`load_style`](Self::load_style) has run since the last clear.
    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    fn build_style(&mut self) -> Result<Style> {
        if let Some((name, typ)) = &self.typ {
            return Style::from_subfile(name.clone(), typ, &mut self.source);
        }
        if let Some(path) = &self.options.style_fallback {
            match Style::from_file(path) {
                Ok(style) => return Ok(style),
                Err(e) => warn!("{}: style fallback {}: {}", self.label, path.display(), e),
            }
        }
        Ok(Style::builtin())
    }

    /// Drops decoded data: per-tile topology state, the style and both query caches.
    ///
    /// The directory and the tile index stay intact, so the reader remains
    /// fully usable; the next queries decode again.
    pub fn clear(&mut self) {
        for tile in &mut self.tiles {
            tile.clear();
        }
        self.style = None;
        self.caches.clear();
    }

    /// Reads the de-obfuscated bytes of one sub-file of a tile.
    ///
    /// `SubFileType::Typ` reads the container's styling sub-file and ignores `tile`.
    pub fn read_subfile(&mut self, tile: &str, kind: SubFileType) -> Result<Vec<u8>> {
        if kind == SubFileType::Typ {
            let (_, typ) = self.typ.as_ref().ok_or(ImgError::MissingSubFile(kind))?;
            return typ.read_to_end(&mut self.source, 0);
        }

        let tile = self
            .tiles
            .iter()
            .find(|t| t.name() == tile)
            .ok_or_else(|| ImgError::UnknownTile(tile.to_string()))?;
        let (file, base) = tile
            .files()
            .locate(kind)
            .ok_or(ImgError::MissingSubFile(kind))?;
        file.read_to_end(&mut self.source, base)
    }
}
