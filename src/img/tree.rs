//! R-tree over tile bounding rectangles.

use std::fmt;

use rstar::{RTree, RTreeObject, AABB};

use super::types::models::RectC;

/// Index entry: a tile's envelope and its position in the tile arena.
#[derive(Debug, Clone)]
struct TileBox {
    idx: usize,
    env: AABB<[f64; 2]>,
}

impl RTreeObject for TileBox {
    type Envelope = AABB<[f64; 2]>;

    #[inline]
    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

#[inline]
fn make_env(rect: &RectC) -> AABB<[f64; 2]> {
    AABB::from_corners(rect.min(), rect.max())
}

/// Spatial index mapping rectangles to tile indices.
///
/// The index does not own tiles; it stores positions into the container's
/// tile vector, which is never reordered once the index is built.
pub struct TileTree {
    tree: RTree<TileBox>,
}

impl TileTree {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn insert(&mut self, idx: usize, bounds: &RectC) {
        self.tree.insert(TileBox {
            idx,
            env: make_env(bounds),
        });
    }

    /// Calls `visitor` with the index of every tile whose bounds intersect
    /// `rect`, in no particular order. Stops early when `visitor` returns `false`.
    pub fn search<V>(&self, rect: &RectC, mut visitor: V)
    where
        V: FnMut(usize) -> bool,
    {
        for tile in self.tree.locate_in_envelope_intersecting(&make_env(rect)) {
            if !visitor(tile.idx) {
                break;
            }
        }
    }

    /// Indices of all tiles intersecting `rect`.
    pub fn candidates(&self, rect: &RectC) -> Vec<usize> {
        let mut found = Vec::new();
        self.search(rect, |idx| {
            found.push(idx);
            true
        });
        found
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileTree").field("size", &self.len()).finish()
    }
}
