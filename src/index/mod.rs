//! The pyramid driver: first-pass indexing plus lazy drill-down.
//!
//! Construction projects and wraps the input once, then slices the root
//! tile depth-first until the indexing policy says stop. Each produced tile
//! retains its pre-clip features as `source`; a later `get_tile` below the
//! indexed depth resumes subdivision from the deepest retained ancestor and
//! releases each `source` the moment its tile is split.

#[doc(hidden)]
pub mod error;


use std::time::Instant;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::clip::wrap::wrap;
use crate::clip::{clip, Axis};
use crate::geo::projected::ProjectedFeature;
use crate::geo::{convert, Feature};
use crate::index::error::IndexError;
use crate::tile::{id, Tile};

/// Slicing configuration. The defaults mirror common web-map practice:
/// 4096-unit tiles with a 64-unit overlap, pre-indexed five zooms deep.
#[derive(Debug, Clone)]
pub struct Options {
    /// Deepest zoom anyone may request.
    pub max_zoom: u8,
    /// Depth of the first-pass index.
    pub index_max_zoom: u8,
    /// Point-count threshold below which the first pass stops subdividing.
    pub index_max_points: u32,
    /// Simplification tolerance in extent units at `max_zoom`.
    pub tolerance: f64,
    /// Integer side length of a tile's coordinate space.
    pub extent: u16,
    /// Overlap around each tile, in extent units.
    pub buffer: u16,
    /// Keep subdividing solid clipped squares instead of pruning them.
    pub solid_children: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_zoom: 18,
            index_max_zoom: 5,
            index_max_points: 100_000,
            tolerance: 3.0,
            extent: 4096,
            buffer: 64,
            solid_children: false,
        }
    }
}

impl Options {
    pub fn with_max_zoom(self, max_zoom: u8) -> Self {
        Self { max_zoom, ..self }
    }

    pub fn with_index_max_zoom(self, index_max_zoom: u8) -> Self {
        Self {
            index_max_zoom,
            ..self
        }
    }

    pub fn with_index_max_points(self, index_max_points: u32) -> Self {
        Self {
            index_max_points,
            ..self
        }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn with_extent(self, extent: u16) -> Self {
        Self { extent, ..self }
    }

    pub fn with_buffer(self, buffer: u16) -> Self {
        Self { buffer, ..self }
    }

    pub fn with_solid_children(self, solid_children: bool) -> Self {
        Self {
            solid_children,
            ..self
        }
    }

    fn validate(&self) -> Result<(), IndexError> {
        if self.max_zoom > id::MAX_ZOOM {
            return Err(IndexError::ZoomRange(self.max_zoom));
        }

        if self.extent as i32 + self.buffer as i32 > i16::MAX as i32 {
            return Err(IndexError::ExtentOverflow {
                extent: self.extent,
                buffer: self.buffer,
            });
        }

        Ok(())
    }
}

struct Frame {
    features: Vec<ProjectedFeature>,
    z: u8,
    x: u32,
    y: u32,
}

/// The tile pyramid. Tiles are produced eagerly down to the indexed depth
/// and lazily below it; `get_tile` mutates the cache on a miss, so callers
/// sharing an index must serialize access externally.
pub struct TileIndex {
    options: Options,
    tiles: FxHashMap<u64, Tile>,
    stats: FxHashMap<u8, u32>,
    total: u64,
    empty: Tile,
}

impl TileIndex {
    /// Projects, wraps and slices `features` into the initial index.
    pub fn new(features: Vec<Feature>, options: Options) -> crate::Result<TileIndex> {
        options.validate()?;

        let start = Instant::now();
        let z2 = 1u32 << options.max_zoom;
        let projected = convert(
            features,
            options.tolerance / (z2 as f64 * options.extent as f64),
        )?;

        let mut index = TileIndex {
            tiles: FxHashMap::default(),
            stats: FxHashMap::default(),
            total: 0,
            empty: Tile::default(),
            options,
        };

        let buffer = index.options.buffer as f64 / index.options.extent as f64;
        let wrapped = wrap(projected, buffer);

        if !wrapped.is_empty() {
            index.split_tile(wrapped, 0, 0, 0, None);
        }

        if let Some(root) = index.tiles.get(&id::pack(0, 0, 0)) {
            debug!(
                "indexed {} features ({} points) into {} tiles in {:?}",
                root.num_features,
                root.num_points,
                index.total,
                start.elapsed()
            );
        }

        Ok(index)
    }

    /// Returns the tile at `(z, x, y)`, producing it from retained ancestor
    /// geometry if the initial pass stopped short. x wraps around the
    /// world; y outside the grid or z beyond `max_zoom` yields the shared
    /// empty tile.
    pub fn get_tile(&mut self, z: u8, x: u32, y: u32) -> &Tile {
        if z > id::MAX_ZOOM || z > self.options.max_zoom {
            return &self.empty;
        }

        let z2 = 1u32 << z;
        let x = x % z2;
        if y >= z2 {
            return &self.empty;
        }

        let extent = self.options.extent;
        let mut tile_id = id::pack(z, x, y);

        if !self.tiles.contains_key(&tile_id) {
            // a solid ancestor stands in for every tile beneath it
            if let Some(solid) = self.drill_down(z, x, y) {
                tile_id = solid;
            }
        }

        match self.tiles.get_mut(&tile_id) {
            Some(tile) => {
                tile.transform(extent);
                tile
            }
            None => &self.empty,
        }
    }

    /// All currently cached tiles, keyed by packed id.
    pub fn all_tiles(&self) -> &FxHashMap<u64, Tile> {
        &self.tiles
    }

    /// Number of tiles produced so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Tiles produced per zoom level.
    pub fn stats(&self) -> &FxHashMap<u8, u32> {
        &self.stats
    }

    /// Resumes subdivision from the deepest cached ancestor of `(z, x, y)`
    /// that still retains its source geometry. Returns the ancestor's id
    /// when it is a solid square that stands in for the requested tile.
    fn drill_down(&mut self, z: u8, x: u32, y: u32) -> Option<u64> {
        debug!("drilling down to z{z}-{x}-{y}");

        let (mut z0, mut x0, mut y0) = (z, x, y);
        let mut parent = None;

        while parent.is_none() && z0 > 0 {
            z0 -= 1;
            x0 /= 2;
            y0 /= 2;

            let pid = id::pack(z0, x0, y0);
            if self.tiles.contains_key(&pid) {
                parent = Some(pid);
            }
        }

        let pid = parent?;

        let (extent, buffer) = (self.options.extent, self.options.buffer);
        let source = match self.tiles.get_mut(&pid) {
            // a solid ancestor would subdivide into identical fills, so it
            // is served in place of everything beneath it
            Some(tile) if tile.is_solid_square(extent, buffer) => return Some(pid),
            Some(tile) => tile.source.take(),
            None => None,
        };

        if let Some(features) = source {
            let start = Instant::now();
            self.split_tile(features, z0, x0, y0, Some((z, x, y)));
            debug!("drill-down from z{z0}-{x0}-{y0} took {:?}", start.elapsed());
        }

        None
    }

    /// Depth-first subdivision. With no target this is the first-pass
    /// indexing; with a target it descends only along ancestors of the
    /// requested tile.
    fn split_tile(
        &mut self,
        features: Vec<ProjectedFeature>,
        z: u8,
        x: u32,
        y: u32,
        target: Option<(u8, u32, u32)>,
    ) {
        let mut stack = vec![Frame { features, z, x, y }];

        while let Some(Frame { features, z, x, y }) = stack.pop() {
            let z2 = 1u32 << z;
            let tile_id = id::pack(z, x, y);
            let tolerance = if z == self.options.max_zoom {
                0.0
            } else {
                self.options.tolerance / (z2 as f64 * self.options.extent as f64)
            };

            if !self.tiles.contains_key(&tile_id) {
                let tile = Tile::build(&features, z2, x, y, tolerance, z == self.options.max_zoom);
                trace!(
                    "tile z{z}-{x}-{y} (features: {}, points: {}, simplified: {})",
                    tile.num_features,
                    tile.num_points,
                    tile.num_simplified
                );

                self.tiles.insert(tile_id, tile);
                *self.stats.entry(z).or_default() += 1;
                self.total += 1;
            }

            let Some(tile) = self.tiles.get_mut(&tile_id) else {
                continue;
            };

            // retained so a later get_tile can continue from here
            tile.source = Some(features);

            if !self.options.solid_children
                && tile.is_solid_square(self.options.extent, self.options.buffer)
            {
                continue;
            }

            match target {
                // first pass: stop at the indexed depth or when the tile is
                // simple enough to finish on demand
                None => {
                    if z == self.options.index_max_zoom
                        || tile.num_points <= self.options.index_max_points
                    {
                        continue;
                    }
                }
                // drill-down: stop at the target (or bottom), and never
                // descend into subtrees that cannot contain it
                Some((cz, cx, cy)) => {
                    if z == self.options.max_zoom || z == cz {
                        continue;
                    }

                    let m = 1u32 << (cz - z);
                    if x != cx / m || y != cy / m {
                        continue;
                    }
                }
            }

            let Some(features) = tile.source.take() else {
                continue;
            };
            let (min, max) = (tile.min, tile.max);

            let scale = z2 as f64;
            let k1 = 0.5 * self.options.buffer as f64 / self.options.extent as f64;
            let k2 = 0.5 - k1;
            let k3 = 0.5 + k1;
            let k4 = 1.0 + k1;
            let (xf, yf) = (x as f64, y as f64);

            let left = clip(&features, scale, xf - k1, xf + k3, Axis::X, min.x, max.x);
            let right = clip(&features, scale, xf + k2, xf + k4, Axis::X, min.x, max.x);

            let mut push = |features: Vec<ProjectedFeature>, x: u32, y: u32| {
                if !features.is_empty() {
                    stack.push(Frame {
                        features,
                        z: z + 1,
                        x,
                        y,
                    });
                }
            };

            if !left.is_empty() {
                let tl = clip(&left, scale, yf - k1, yf + k3, Axis::Y, min.y, max.y);
                let bl = clip(&left, scale, yf + k2, yf + k4, Axis::Y, min.y, max.y);
                push(tl, x * 2, y * 2);
                push(bl, x * 2, y * 2 + 1);
            }

            if !right.is_empty() {
                let tr = clip(&right, scale, yf - k1, yf + k3, Axis::Y, min.y, max.y);
                let br = clip(&right, scale, yf + k2, yf + k4, Axis::Y, min.y, max.y);
                push(tr, x * 2 + 1, y * 2);
                push(br, x * 2 + 1, y * 2 + 1);
            }
        }
    }
}
