//! Tile construction and the tile-local integer coordinate space.
//!
//! A tile is built from the clipped features that survived its slab, with
//! per-vertex simplification applied by threshold against the metric the
//! projector stored. Integer coordinates are produced lazily the first time
//! a tile leaves the index.

pub mod id;

use geo::Coord;
use log::trace;
use strum::Display;

use crate::geo::projected::{ProjectedFeature, ProjectedGeometry, ProjectedPoint};
use crate::geo::Properties;

/// A point in tile-local integer coordinates, inside
/// `[-buffer, extent + buffer]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePoint {
    pub x: i16,
    pub y: i16,
}

/// Geometry classifier collapsed from the input variant: multi-points
/// become points, multi-lines lines, multi-polygons polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeatureKind {
    Point,
    LineString,
    Polygon,
}

impl From<&ProjectedGeometry> for FeatureKind {
    fn from(geometry: &ProjectedGeometry) -> Self {
        match geometry {
            ProjectedGeometry::Point(_) | ProjectedGeometry::MultiPoint(_) => FeatureKind::Point,
            ProjectedGeometry::Line(_) | ProjectedGeometry::MultiLine(_) => FeatureKind::LineString,
            ProjectedGeometry::Polygon(_) | ProjectedGeometry::MultiPolygon(_) => {
                FeatureKind::Polygon
            }
        }
    }
}

/// Post-simplification geometry in projected coordinates, collapsed to the
/// two shapes the integer transform distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Simplified {
    Points(Vec<ProjectedPoint>),
    Rings(Vec<Vec<ProjectedPoint>>),
}

/// Integer geometry produced by the tile transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileGeometry {
    Points(Vec<TilePoint>),
    Rings(Vec<Vec<TilePoint>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileFeature {
    /// Simplified source geometry, kept in projected space.
    pub geometry: Simplified,
    pub kind: FeatureKind,
    pub properties: Properties,
    /// Populated on the first `get_tile` for the owning tile.
    pub tile_geometry: Option<TileGeometry>,
}

/// One tile of the pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub features: Vec<TileFeature>,
    pub num_features: u32,
    /// Vertices seen before simplification filtering.
    pub num_points: u32,
    /// Vertices that survived the filter.
    pub num_simplified: u32,
    /// Pre-clip features retained for later drill-down; released the moment
    /// the tile is subdivided.
    pub source: Option<Vec<ProjectedFeature>>,
    pub(crate) transformed: bool,
    pub(crate) z2: u32,
    pub(crate) tx: u32,
    pub(crate) ty: u32,
    pub(crate) min: Coord<f64>,
    pub(crate) max: Coord<f64>,
}

impl Default for Tile {
    fn default() -> Self {
        Tile {
            features: Vec::new(),
            num_features: 0,
            num_points: 0,
            num_simplified: 0,
            source: None,
            transformed: false,
            z2: 0,
            tx: 0,
            ty: 0,
            min: Coord { x: 0.0, y: 0.0 },
            max: Coord { x: 0.0, y: 0.0 },
        }
    }
}

/// Converts a projected point into a tile's integer space.
pub(crate) fn transform_point(
    p: &ProjectedPoint,
    extent: u16,
    z2: u32,
    tx: u32,
    ty: u32,
) -> TilePoint {
    let x = (extent as f64 * (p.x * z2 as f64 - tx as f64)).round() as i16;
    let y = (extent as f64 * (p.y * z2 as f64 - ty as f64)).round() as i16;

    TilePoint { x, y }
}

impl Tile {
    /// Builds a tile from the features clipped into its slab. `tolerance`
    /// is the tile-local simplification threshold; `keep_all` disables
    /// filtering at max zoom.
    pub(crate) fn build(
        features: &[ProjectedFeature],
        z2: u32,
        tx: u32,
        ty: u32,
        tolerance: f64,
        keep_all: bool,
    ) -> Tile {
        let mut tile = Tile {
            z2,
            tx,
            ty,
            min: Coord {
                x: f64::INFINITY,
                y: f64::INFINITY,
            },
            max: Coord {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
            },
            ..Tile::default()
        };

        for feature in features {
            tile.num_features += 1;
            tile.add_feature(feature, tolerance, keep_all);

            tile.min.x = tile.min.x.min(feature.min.x);
            tile.min.y = tile.min.y.min(feature.min.y);
            tile.max.x = tile.max.x.max(feature.max.x);
            tile.max.y = tile.max.y.max(feature.max.y);
        }

        tile
    }

    fn add_feature(&mut self, feature: &ProjectedFeature, tolerance: f64, keep_all: bool) {
        let sq_tolerance = tolerance * tolerance;
        let kind = FeatureKind::from(&feature.geometry);

        let geometry = match &feature.geometry {
            ProjectedGeometry::Point(p) => {
                self.num_points += 1;
                self.num_simplified += 1;
                Some(Simplified::Points(vec![*p]))
            }
            ProjectedGeometry::MultiPoint(points) => {
                self.num_points += points.len() as u32;
                self.num_simplified += points.len() as u32;
                Some(Simplified::Points(points.clone()))
            }
            ProjectedGeometry::Line(line) => self.filter_runs(
                std::iter::once((&line.points, line.dist < tolerance)),
                sq_tolerance,
                keep_all,
            ),
            ProjectedGeometry::MultiLine(lines) => self.filter_runs(
                lines.iter().map(|line| (&line.points, line.dist < tolerance)),
                sq_tolerance,
                keep_all,
            ),
            ProjectedGeometry::Polygon(rings) => self.filter_runs(
                rings
                    .iter()
                    .map(|ring| (&ring.points, ring.area < sq_tolerance)),
                sq_tolerance,
                keep_all,
            ),
            ProjectedGeometry::MultiPolygon(polygons) => self.filter_runs(
                polygons.iter().flat_map(|rings| {
                    rings
                        .iter()
                        .map(|ring| (&ring.points, ring.area < sq_tolerance))
                }),
                sq_tolerance,
                keep_all,
            ),
        };

        match geometry {
            Some(geometry) => self.features.push(TileFeature {
                geometry,
                kind,
                properties: feature.properties.clone(),
                tile_geometry: None,
            }),
            None => trace!("dropped degenerate {kind} feature"),
        }
    }

    /// Filters the vertex runs of a line or polygon feature by the stored
    /// simplification metric, dropping whole runs below the size threshold.
    /// Counters track vertices before and after.
    fn filter_runs<'a>(
        &mut self,
        runs: impl Iterator<Item = (&'a Vec<ProjectedPoint>, bool)>,
        sq_tolerance: f64,
        keep_all: bool,
    ) -> Option<Simplified> {
        let mut rings: Vec<Vec<ProjectedPoint>> = Vec::new();

        for (points, too_small) in runs {
            self.num_points += points.len() as u32;

            if !keep_all && too_small {
                continue;
            }

            let kept: Vec<ProjectedPoint> = points
                .iter()
                .filter(|p| keep_all || p.z > sq_tolerance)
                .copied()
                .collect();

            self.num_simplified += kept.len() as u32;

            if !kept.is_empty() {
                rings.push(kept);
            }
        }

        (!rings.is_empty()).then_some(Simplified::Rings(rings))
    }

    /// Lazily populates integer tile geometry; repeated calls are no-ops.
    pub(crate) fn transform(&mut self, extent: u16) {
        if self.transformed {
            return;
        }

        let (z2, tx, ty) = (self.z2, self.tx, self.ty);

        for feature in &mut self.features {
            feature.tile_geometry = Some(match &feature.geometry {
                Simplified::Points(points) => TileGeometry::Points(
                    points
                        .iter()
                        .map(|p| transform_point(p, extent, z2, tx, ty))
                        .collect(),
                ),
                Simplified::Rings(rings) => TileGeometry::Rings(
                    rings
                        .iter()
                        .map(|ring| {
                            ring.iter()
                                .map(|p| transform_point(p, extent, z2, tx, ty))
                                .collect()
                        })
                        .collect(),
                ),
            });
        }

        self.transformed = true;
    }

    /// A tile wholly covered by a single clipped polygon: one five-vertex
    /// ring whose corners all sit on the buffered perimeter. Subdividing it
    /// would only reproduce the same fill, so the slicer treats it as a
    /// leaf.
    pub(crate) fn is_solid_square(&self, extent: u16, buffer: u16) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        let [feature] = source.as_slice() else {
            return false;
        };
        let ProjectedGeometry::Polygon(rings) = &feature.geometry else {
            return false;
        };
        let [ring] = rings.as_slice() else {
            return false;
        };
        if ring.points.len() != 5 {
            return false;
        }

        let lo = -(buffer as i32);
        let hi = extent as i32 + buffer as i32;

        ring.points.iter().all(|p| {
            let t = transform_point(p, extent, self.z2, self.tx, self.ty);
            (t.x as i32 == lo || t.x as i32 == hi) && (t.y as i32 == lo || t.y as i32 == hi)
        })
    }
}
