//! Forward spherical-Mercator projection into the unit square.
//!
//! Projection happens exactly once per dataset; every later stage (wrapping,
//! clipping, tile builds) works on the projected representation. Lines and
//! rings are annotated with their Manhattan length / shoelace area here, and
//! handed to the simplifier so each vertex carries a zoom-independent
//! importance metric.

use std::f64::consts::PI;

use geo::{Geometry, LineString, Polygon};
use itertools::Itertools;

use crate::geo::error::GeoError;
use crate::geo::projected::{
    ProjectedFeature, ProjectedGeometry, ProjectedLine, ProjectedPoint, ProjectedRing,
};
use crate::geo::simplify::simplify;
use crate::geo::Feature;

/// Projects a WGS84 position into the unit square. Latitude is clamped at
/// the poles by the y clamp; longitude beyond ±180° maps outside [0, 1] and
/// is handled by the antimeridian wrapper.
fn project_point(lng: f64, lat: f64) -> ProjectedPoint {
    let sine = (lat * PI / 180.0).sin();
    let x = lng / 360.0 + 0.5;
    let y = (0.5 - 0.25 * ((1.0 + sine) / (1.0 - sine)).ln() / PI).clamp(0.0, 1.0);

    ProjectedPoint::new(x, y, 0.0)
}

fn project_points(line: &LineString<f64>) -> Vec<ProjectedPoint> {
    line.coords().map(|c| project_point(c.x, c.y)).collect()
}

fn project_line(line: &LineString<f64>, tolerance: f64) -> ProjectedLine {
    let mut points = project_points(line);

    // Manhattan rather than Euclidean length; it only feeds a threshold
    let dist = points
        .iter()
        .tuple_windows()
        .map(|(a, b)| (b.x - a.x).abs() + (b.y - a.y).abs())
        .sum();

    simplify(&mut points, tolerance);

    ProjectedLine { points, dist }
}

fn project_ring(ring: &LineString<f64>, tolerance: f64) -> ProjectedRing {
    let mut points = project_points(ring);

    let area = points
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        .abs()
        / 2.0;

    simplify(&mut points, tolerance);

    ProjectedRing { points, area }
}

fn project_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Vec<ProjectedRing> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| project_ring(ring, tolerance))
        .collect()
}

fn project_geometry(
    geometry: &Geometry<f64>,
    tolerance: f64,
) -> Result<ProjectedGeometry, GeoError> {
    match geometry {
        Geometry::Point(p) => Ok(ProjectedGeometry::Point(project_point(p.x(), p.y()))),
        Geometry::MultiPoint(points) => Ok(ProjectedGeometry::MultiPoint(
            points
                .iter()
                .map(|p| project_point(p.x(), p.y()))
                .collect(),
        )),
        Geometry::LineString(line) => Ok(ProjectedGeometry::Line(project_line(line, tolerance))),
        Geometry::MultiLineString(lines) => Ok(ProjectedGeometry::MultiLine(
            lines
                .iter()
                .map(|line| project_line(line, tolerance))
                .collect(),
        )),
        Geometry::Polygon(polygon) => {
            Ok(ProjectedGeometry::Polygon(project_polygon(polygon, tolerance)))
        }
        Geometry::MultiPolygon(polygons) => Ok(ProjectedGeometry::MultiPolygon(
            polygons
                .iter()
                .map(|polygon| project_polygon(polygon, tolerance))
                .collect(),
        )),
        Geometry::Line(_) => Err(GeoError::UnsupportedGeometry("Line")),
        Geometry::Rect(_) => Err(GeoError::UnsupportedGeometry("Rect")),
        Geometry::Triangle(_) => Err(GeoError::UnsupportedGeometry("Triangle")),
        Geometry::GeometryCollection(_) => {
            Err(GeoError::UnsupportedGeometry("GeometryCollection"))
        }
    }
}

/// Projects a feature collection into unit-square space. `tolerance` is the
/// projection-time simplification tolerance, `options.tolerance / (2^maxZoom
/// · extent)` for index construction. Fails on the first unsupported
/// geometry variant; no partial output is produced.
pub fn convert(
    features: Vec<Feature>,
    tolerance: f64,
) -> Result<Vec<ProjectedFeature>, GeoError> {
    features
        .into_iter()
        .map(|feature| {
            let geometry = project_geometry(&feature.geometry, tolerance)?;
            Ok(ProjectedFeature::new(geometry, feature.properties))
        })
        .collect()
}
