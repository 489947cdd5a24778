use geo::Coord;

use crate::geo::Properties;

/// A vertex in the projected unit square. The `z` slot is not an elevation;
/// it carries the vertex's simplification metric (squared perpendicular
/// distance, with `1.0` meaning "always keep").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ProjectedPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        ProjectedPoint { x, y, z }
    }
}

/// An open polyline. `dist` is the Manhattan length accumulated at
/// projection time; clipping carries it over unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedLine {
    pub points: Vec<ProjectedPoint>,
    pub dist: f64,
}

/// A closed polygon ring (first vertex repeated last). `area` is the
/// absolute shoelace area from projection time, carried over by clipping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedRing {
    pub points: Vec<ProjectedPoint>,
    pub area: f64,
}

/// Projected geometry. Lines and rings are distinct: clipping splits lines
/// at slab boundaries but reseals rings.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedGeometry {
    Point(ProjectedPoint),
    MultiPoint(Vec<ProjectedPoint>),
    Line(ProjectedLine),
    MultiLine(Vec<ProjectedLine>),
    Polygon(Vec<ProjectedRing>),
    MultiPolygon(Vec<Vec<ProjectedRing>>),
}

impl ProjectedGeometry {
    /// Visits every vertex of the geometry in storage order.
    pub fn each_point(&self, mut visit: impl FnMut(&ProjectedPoint)) {
        match self {
            ProjectedGeometry::Point(p) => visit(p),
            ProjectedGeometry::MultiPoint(points) => points.iter().for_each(&mut visit),
            ProjectedGeometry::Line(line) => line.points.iter().for_each(&mut visit),
            ProjectedGeometry::MultiLine(lines) => lines
                .iter()
                .for_each(|line| line.points.iter().for_each(&mut visit)),
            ProjectedGeometry::Polygon(rings) => rings
                .iter()
                .for_each(|ring| ring.points.iter().for_each(&mut visit)),
            ProjectedGeometry::MultiPolygon(polygons) => polygons.iter().for_each(|rings| {
                rings
                    .iter()
                    .for_each(|ring| ring.points.iter().for_each(&mut visit))
            }),
        }
    }

    /// Mutable counterpart of [`each_point`](Self::each_point), used by the
    /// antimeridian wrapper to shift whole world copies.
    pub fn each_point_mut(&mut self, mut visit: impl FnMut(&mut ProjectedPoint)) {
        match self {
            ProjectedGeometry::Point(p) => visit(p),
            ProjectedGeometry::MultiPoint(points) => points.iter_mut().for_each(&mut visit),
            ProjectedGeometry::Line(line) => line.points.iter_mut().for_each(&mut visit),
            ProjectedGeometry::MultiLine(lines) => lines
                .iter_mut()
                .for_each(|line| line.points.iter_mut().for_each(&mut visit)),
            ProjectedGeometry::Polygon(rings) => rings
                .iter_mut()
                .for_each(|ring| ring.points.iter_mut().for_each(&mut visit)),
            ProjectedGeometry::MultiPolygon(polygons) => polygons.iter_mut().for_each(|rings| {
                rings
                    .iter_mut()
                    .for_each(|ring| ring.points.iter_mut().for_each(&mut visit))
            }),
        }
    }
}

/// A projected feature with its cached bounding box. The box is computed
/// once at projection time; the clipper updates only the axis it cut along.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFeature {
    pub geometry: ProjectedGeometry,
    pub properties: Properties,
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl ProjectedFeature {
    /// Builds a feature, deriving the bounding box from the geometry.
    pub fn new(geometry: ProjectedGeometry, properties: Properties) -> Self {
        let mut min = Coord {
            x: f64::INFINITY,
            y: f64::INFINITY,
        };
        let mut max = Coord {
            x: f64::NEG_INFINITY,
            y: f64::NEG_INFINITY,
        };

        geometry.each_point(|p| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        });

        ProjectedFeature {
            geometry,
            properties,
            min,
            max,
        }
    }

    /// Builds a feature with a precomputed bounding box (clipper output).
    pub(crate) fn with_bounds(
        geometry: ProjectedGeometry,
        properties: Properties,
        min: Coord<f64>,
        max: Coord<f64>,
    ) -> Self {
        ProjectedFeature {
            geometry,
            properties,
            min,
            max,
        }
    }
}
