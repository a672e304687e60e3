//! Tiles: named bundles of sub-files covering one area.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{trace, warn};

use super::cache::{QueryCaches, SubDivKey};
use super::format::gmp::GmpLayout;
use super::source::ByteSource;
use super::subfile::{SubFile, TileSource};
use super::types::error::{ImgError, Result};
use super::types::filetypes::{SubFileType, TileFormat};
use super::types::models::{Point, Poly, QueryStats, RectC};

/// The sub-files of one tile, as collected from the directory.
#[derive(Debug, Clone, Default)]
pub struct TileFiles {
    files: BTreeMap<SubFileType, SubFile>,
    gmp: Option<GmpLayout>,
}

impl TileFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sub-file of `kind`, creating an empty one if absent.
    pub fn add_file(&mut self, kind: SubFileType) -> &mut SubFile {
        self.files.entry(kind).or_insert_with(|| SubFile::new(kind))
    }

    pub fn file(&self, kind: SubFileType) -> Option<&SubFile> {
        self.files.get(&kind)
    }

    pub fn file_mut(&mut self, kind: SubFileType) -> Option<&mut SubFile> {
        self.files.get_mut(&kind)
    }

    /// Kinds of the stand-alone sub-files present.
    pub fn kinds(&self) -> impl Iterator<Item = SubFileType> + '_ {
        self.files.keys().copied()
    }

    /// Section layout of the combined sub-file, once the tile has been validated.
    pub fn gmp_layout(&self) -> Option<&GmpLayout> {
        self.gmp.as_ref()
    }

    /// Finds where the data of `kind` lives: a stand-alone sub-file at offset
    /// zero, or a section of the combined sub-file.
    pub fn locate(&self, kind: SubFileType) -> Option<(&SubFile, u64)> {
        if let Some(file) = self.files.get(&kind) {
            return Some((file, 0));
        }
        let offset = self.gmp.as_ref()?.offset(kind)?;
        let gmp = self.files.get(&SubFileType::Gmp)?;
        Some((gmp, offset))
    }
}

/// A validated tile: its sub-files plus the decoded topology.
pub struct VectorTile<F: TileFormat> {
    name: String,
    files: TileFiles,
    topology: F::Topology,
    bounds: RectC,
}

impl<F: TileFormat> VectorTile<F> {
    /// Validates a tile by parsing its topology sub-file.
    ///
    /// Fails if the combined sub-file header is unreadable, if no topology
    /// or geometry data is present, or if the topology does not parse.
    pub fn init(name: String, mut files: TileFiles, source: &mut ByteSource) -> Result<Self> {
        let layout = match files.file(SubFileType::Gmp) {
            Some(gmp) => {
                let mut stream = gmp.stream(source, 0);
                let layout = GmpLayout::parse(&mut stream)?;
                let len = stream.len();
                for kind in [SubFileType::Tre, SubFileType::Rgn, SubFileType::Lbl, SubFileType::Net] {
                    match layout.offset(kind) {
                        Some(offset) if offset >= len => {
                            return Err(ImgError::OutOfBounds {
                                context: "combined sub-file",
                                offset,
                                len,
                            });
                        }
                        _ => {}
                    }
                }
                Some(layout)
            }
            None => None,
        };
        files.gmp = layout;

        let (tre, base) = files
            .locate(SubFileType::Tre)
            .ok_or(ImgError::MissingSubFile(SubFileType::Tre))?;
        let topology = F::parse_topology(&mut tre.stream(source, base))?;

        if files.locate(SubFileType::Rgn).is_none() {
            return Err(ImgError::MissingSubFile(SubFileType::Rgn));
        }

        let bounds = F::bounds(&topology);
        if !bounds.is_valid() {
            return Err(ImgError::InvalidSubFile {
                kind: SubFileType::Tre,
                reason: format!("invalid bounds {}", bounds),
            });
        }

        Ok(Self {
            name,
            files,
            topology,
            bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> RectC {
        self.bounds
    }

    pub fn files(&self) -> &TileFiles {
        &self.files
    }

    pub fn file(&self, kind: SubFileType) -> Option<&SubFile> {
        self.files.file(kind)
    }

    pub fn topology(&self) -> &F::Topology {
        &self.topology
    }

    /// Releases decoded state held by the topology.
    pub fn clear(&mut self) {
        F::clear(&mut self.topology);
    }

    /// Appends the polygons and lines of every matching subdivision.
    ///
    /// Batches are taken from the cache when present; otherwise decoded and
    /// inserted. A subdivision that fails to decode is skipped.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn polys(
        &mut self,
        id: usize,
        source: &mut ByteSource,
        caches: &mut QueryCaches,
        rect: &RectC,
        bits: u8,
        polygons: &mut Vec<Poly>,
        lines: &mut Vec<Poly>,
        stats: &mut QueryStats,
    ) {
        let mut tile = TileSource::new(&self.files, source);
        let subdivs = match F::subdivs(&mut self.topology, &mut tile, rect, bits) {
            Ok(subdivs) => subdivs,
            Err(e) => {
                warn!("{}: subdivision lookup failed: {}", self.name, e);
                stats.failed += 1;
                return;
            }
        };
        stats.subdivs += subdivs.len();

        for subdiv in subdivs {
            let key = SubDivKey { tile: id, subdiv };
            let batch = match caches.polys.get(&key) {
                Some(batch) => {
                    stats.cache_hits += 1;
                    batch
                }
                None => match F::decode_polys(&self.topology, &mut tile, subdiv) {
                    Ok(decoded) => {
                        trace!("{}: decoded {} polys in subdivision {}", self.name, decoded.len(), subdiv);
                        stats.decoded += 1;
                        let cost = decoded.len();
                        let batch = Arc::new(decoded);
                        caches.polys.insert(key, Arc::clone(&batch), cost);
                        batch
                    }
                    Err(e) => {
                        warn!("{}: subdivision {}: polygon decode failed: {}", self.name, subdiv, e);
                        stats.failed += 1;
                        continue;
                    }
                },
            };
            polygons.extend(batch.polygons.iter().cloned());
            lines.extend(batch.lines.iter().cloned());
        }
    }

    /// Appends the points of every matching subdivision. See [`polys`](Self::polys).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn points(
        &mut self,
        id: usize,
        source: &mut ByteSource,
        caches: &mut QueryCaches,
        rect: &RectC,
        bits: u8,
        points: &mut Vec<Point>,
        stats: &mut QueryStats,
    ) {
        let mut tile = TileSource::new(&self.files, source);
        let subdivs = match F::subdivs(&mut self.topology, &mut tile, rect, bits) {
            Ok(subdivs) => subdivs,
            Err(e) => {
                warn!("{}: subdivision lookup failed: {}", self.name, e);
                stats.failed += 1;
                return;
            }
        };
        stats.subdivs += subdivs.len();

        for subdiv in subdivs {
            let key = SubDivKey { tile: id, subdiv };
            let batch = match caches.points.get(&key) {
                Some(batch) => {
                    stats.cache_hits += 1;
                    batch
                }
                None => match F::decode_points(&self.topology, &mut tile, subdiv) {
                    Ok(decoded) => {
                        stats.decoded += 1;
                        let cost = decoded.len();
                        let batch = Arc::new(decoded);
                        caches.points.insert(key, Arc::clone(&batch), cost);
                        batch
                    }
                    Err(e) => {
                        warn!("{}: subdivision {}: point decode failed: {}", self.name, subdiv, e);
                        stats.failed += 1;
                        continue;
                    }
                },
            };
            points.extend(batch.iter().cloned());
        }
    }
}

impl<F: TileFormat> fmt::Debug for VectorTile<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorTile")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("files", &self.files.kinds().collect::<Vec<_>>())
            .finish()
    }
}
