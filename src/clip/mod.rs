//! Axis-aligned slab clipping over projected feature lists.
//!
//! One call clips against a single `[k1, k2]` range along one axis; the
//! slicer composes two calls per child tile. Lines split into multiple
//! slices where they leave the slab; rings are resealed so polygon fill
//! survives. Bounding-box fast paths accept or reject most features
//! without touching their vertices.

pub mod wrap;

use geo::Coord;

use crate::geo::projected::{
    ProjectedFeature, ProjectedGeometry, ProjectedLine, ProjectedPoint, ProjectedRing,
};

/// The coordinate axis a slab constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn get(self, p: &ProjectedPoint) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    /// Linear intersection with the boundary at `v`. The metric slot is set
    /// to the "always keep" sentinel so simplification never drops a
    /// boundary vertex.
    fn intersect(self, a: &ProjectedPoint, b: &ProjectedPoint, v: f64) -> ProjectedPoint {
        match self {
            Axis::X => ProjectedPoint::new(v, (v - a.x) * (b.y - a.y) / (b.x - a.x) + a.y, 1.0),
            Axis::Y => ProjectedPoint::new((v - a.y) * (b.x - a.x) / (b.y - a.y) + a.x, v, 1.0),
        }
    }
}

/// Clips every feature against the slab `[k1 / scale, k2 / scale]` along
/// `axis`. `min_all` / `max_all` are the bounds of the whole list along that
/// axis (the parent tile's bbox), enabling wholesale accept/reject before
/// any per-feature work.
pub fn clip(
    features: &[ProjectedFeature],
    scale: f64,
    k1: f64,
    k2: f64,
    axis: Axis,
    min_all: f64,
    max_all: f64,
) -> Vec<ProjectedFeature> {
    let k1 = k1 / scale;
    let k2 = k2 / scale;

    if min_all >= k1 && max_all <= k2 {
        return features.to_vec();
    } else if min_all > k2 || max_all < k1 {
        return Vec::new();
    }

    let mut clipped = Vec::with_capacity(features.len());

    for feature in features {
        let (min, max) = match axis {
            Axis::X => (feature.min.x, feature.max.x),
            Axis::Y => (feature.min.y, feature.max.y),
        };

        if min >= k1 && max <= k2 {
            clipped.push(feature.clone());
            continue;
        } else if min > k2 || max < k1 {
            continue;
        }

        if let Some(geometry) = clip_geometry(&feature.geometry, k1, k2, axis) {
            let (min, max) = clipped_bounds(feature, &geometry, axis);
            clipped.push(ProjectedFeature::with_bounds(
                geometry,
                feature.properties.clone(),
                min,
                max,
            ));
        }
    }

    clipped
}

/// Recomputes the bbox along the clipping axis from the emitted vertices;
/// the orthogonal axis keeps the input feature's bounds.
fn clipped_bounds(
    feature: &ProjectedFeature,
    geometry: &ProjectedGeometry,
    axis: Axis,
) -> (Coord<f64>, Coord<f64>) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    geometry.each_point(|p| {
        let v = axis.get(p);
        lo = lo.min(v);
        hi = hi.max(v);
    });

    let (mut min, mut max) = (feature.min, feature.max);
    match axis {
        Axis::X => {
            min.x = lo;
            max.x = hi;
        }
        Axis::Y => {
            min.y = lo;
            max.y = hi;
        }
    }

    (min, max)
}

fn clip_geometry(
    geometry: &ProjectedGeometry,
    k1: f64,
    k2: f64,
    axis: Axis,
) -> Option<ProjectedGeometry> {
    match geometry {
        ProjectedGeometry::Point(p) => {
            let v = axis.get(p);
            (v >= k1 && v <= k2).then(|| ProjectedGeometry::Point(*p))
        }
        ProjectedGeometry::MultiPoint(points) => {
            let kept: Vec<ProjectedPoint> = points
                .iter()
                .copied()
                .filter(|p| {
                    let v = axis.get(p);
                    v >= k1 && v <= k2
                })
                .collect();

            (!kept.is_empty()).then_some(ProjectedGeometry::MultiPoint(kept))
        }
        ProjectedGeometry::Line(line) => {
            let mut slices = clip_line(line, k1, k2, axis);
            match slices.len() {
                0 => None,
                1 => Some(ProjectedGeometry::Line(slices.remove(0))),
                _ => Some(ProjectedGeometry::MultiLine(slices)),
            }
        }
        ProjectedGeometry::MultiLine(lines) => {
            let slices: Vec<ProjectedLine> = lines
                .iter()
                .flat_map(|line| clip_line(line, k1, k2, axis))
                .collect();

            (!slices.is_empty()).then_some(ProjectedGeometry::MultiLine(slices))
        }
        ProjectedGeometry::Polygon(rings) => {
            let kept = clip_rings(rings, k1, k2, axis);
            (!kept.is_empty()).then_some(ProjectedGeometry::Polygon(kept))
        }
        ProjectedGeometry::MultiPolygon(polygons) => {
            let kept: Vec<Vec<ProjectedRing>> = polygons
                .iter()
                .map(|rings| clip_rings(rings, k1, k2, axis))
                .filter(|rings| !rings.is_empty())
                .collect();

            (!kept.is_empty()).then_some(ProjectedGeometry::MultiPolygon(kept))
        }
    }
}

fn clip_rings(rings: &[ProjectedRing], k1: f64, k2: f64, axis: Axis) -> Vec<ProjectedRing> {
    rings
        .iter()
        .filter_map(|ring| clip_ring(ring, k1, k2, axis))
        .collect()
}

/// Clips an open polyline; every exit from the slab starts a new slice.
/// Slices inherit the parent line's `dist`.
fn clip_line(line: &ProjectedLine, k1: f64, k2: f64, axis: Axis) -> Vec<ProjectedLine> {
    let mut slices = Vec::new();

    scan(&line.points, k1, k2, axis, false, |points| {
        slices.push(ProjectedLine {
            points,
            dist: line.dist,
        });
    });

    slices
}

/// Clips a closed ring, resealing it afterwards. Rings reduced below four
/// vertices are degenerate and dropped. The clipped ring inherits the
/// parent's `area`.
fn clip_ring(ring: &ProjectedRing, k1: f64, k2: f64, axis: Axis) -> Option<ProjectedRing> {
    let mut kept = None;

    scan(&ring.points, k1, k2, axis, true, |points| {
        kept = Some(points);
    });

    let mut points = kept?;

    if let (Some(first), Some(last)) = (points.first().copied(), points.last()) {
        if first.x != last.x || first.y != last.y {
            points.push(first);
        }
    }

    if points.len() < 4 {
        return None;
    }

    Some(ProjectedRing {
        points,
        area: ring.area,
    })
}

/// Walks the vertex sequence against the slab, emitting completed runs of
/// interior vertices and boundary intersections through `emit`. In closed
/// mode the run never splits; the caller reseals it.
fn scan(
    points: &[ProjectedPoint],
    k1: f64,
    k2: f64,
    axis: Axis,
    closed: bool,
    mut emit: impl FnMut(Vec<ProjectedPoint>),
) {
    let len = points.len();
    if len == 0 {
        return;
    }

    let mut slice: Vec<ProjectedPoint> = Vec::new();

    for i in 0..len - 1 {
        let a = &points[i];
        let b = &points[i + 1];
        let ak = axis.get(a);
        let bk = axis.get(b);

        if ak < k1 {
            if bk > k2 {
                // ---|-->|  crosses the whole slab
                slice.push(axis.intersect(a, b, k1));
                slice.push(axis.intersect(a, b, k2));
                if !closed {
                    emit(std::mem::take(&mut slice));
                }
            } else if bk >= k1 {
                // ---|-->   enters from below
                slice.push(axis.intersect(a, b, k1));
            }
        } else if ak > k2 {
            if bk < k1 {
                // |<--|---  crosses the whole slab
                slice.push(axis.intersect(a, b, k2));
                slice.push(axis.intersect(a, b, k1));
                if !closed {
                    emit(std::mem::take(&mut slice));
                }
            } else if bk <= k2 {
                // <--|---   enters from above
                slice.push(axis.intersect(a, b, k2));
            }
        } else {
            slice.push(*a);

            if bk < k1 {
                // -->|---   exits below
                slice.push(axis.intersect(a, b, k1));
                if !closed {
                    emit(std::mem::take(&mut slice));
                }
            } else if bk > k2 {
                // ---|-->   exits above
                slice.push(axis.intersect(a, b, k2));
                if !closed {
                    emit(std::mem::take(&mut slice));
                }
            }
        }
    }

    let last = &points[len - 1];
    let k = axis.get(last);
    if k >= k1 && k <= k2 {
        slice.push(*last);
    }

    if !slice.is_empty() {
        emit(slice);
    }
}

#[cfg(test)]
mod test {
    use serde_json::Map;

    use super::*;
    use crate::geo::projected::ProjectedFeature;

    fn point_at(x: f64, y: f64) -> ProjectedPoint {
        ProjectedPoint::new(x, y, 0.0)
    }

    fn line_feature(coords: &[(f64, f64)]) -> ProjectedFeature {
        let points = coords.iter().map(|&(x, y)| point_at(x, y)).collect();
        ProjectedFeature::new(
            ProjectedGeometry::Line(ProjectedLine { points, dist: 1.0 }),
            Map::new(),
        )
    }

    fn ring_feature(coords: &[(f64, f64)]) -> ProjectedFeature {
        let points = coords.iter().map(|&(x, y)| point_at(x, y)).collect();
        ProjectedFeature::new(
            ProjectedGeometry::Polygon(vec![ProjectedRing { points, area: 1.0 }]),
            Map::new(),
        )
    }

    #[test]
    fn full_slab_clip_is_the_identity() {
        let features = vec![line_feature(&[(0.1, 0.1), (0.9, 0.9)])];
        let clipped = clip(&features, 1.0, 0.0, 1.0, Axis::X, 0.1, 0.9);

        assert_eq!(clipped, features);
    }

    #[test]
    fn disjoint_slab_rejects_everything() {
        let features = vec![line_feature(&[(0.1, 0.1), (0.2, 0.2)])];

        assert!(clip(&features, 1.0, 0.5, 1.0, Axis::X, 0.1, 0.2).is_empty());
    }

    #[test]
    fn crossing_line_gains_boundary_vertices() {
        let features = vec![line_feature(&[(0.0, 0.5), (1.0, 0.5)])];
        let clipped = clip(&features, 1.0, 0.25, 0.75, Axis::X, 0.0, 1.0);

        assert_eq!(clipped.len(), 1);
        let ProjectedGeometry::Line(line) = &clipped[0].geometry else {
            panic!("expected a line");
        };

        assert_eq!(line.points.len(), 2);
        assert_eq!(line.points[0].x, 0.25);
        assert_eq!(line.points[1].x, 0.75);
        // boundary vertices are immune to simplification
        assert_eq!(line.points[0].z, 1.0);
        assert_eq!(line.points[1].z, 1.0);
        // dist survives from the parent line
        assert_eq!(line.dist, 1.0);
        // bbox was re-tracked along the clipping axis
        assert_eq!(clipped[0].min.x, 0.25);
        assert_eq!(clipped[0].max.x, 0.75);
    }

    #[test]
    fn reentrant_line_splits_into_slices() {
        // in, out, back in: two slices
        let features = vec![line_feature(&[
            (0.1, 0.0),
            (0.4, 0.0),
            (0.9, 0.0),
            (0.4, 0.1),
            (0.1, 0.1),
        ])];
        let clipped = clip(&features, 1.0, 0.0, 0.5, Axis::X, 0.1, 0.9);

        assert_eq!(clipped.len(), 1);
        let ProjectedGeometry::MultiLine(slices) = &clipped[0].geometry else {
            panic!("expected a multi-line");
        };
        assert_eq!(slices.len(), 2);
    }

    #[test]
    fn clipped_ring_stays_closed() {
        let features = vec![ring_feature(&[
            (0.2, 0.2),
            (0.8, 0.2),
            (0.8, 0.8),
            (0.2, 0.8),
            (0.2, 0.2),
        ])];
        let clipped = clip(&features, 1.0, 0.0, 0.5, Axis::X, 0.2, 0.8);

        assert_eq!(clipped.len(), 1);
        let ProjectedGeometry::Polygon(rings) = &clipped[0].geometry else {
            panic!("expected a polygon");
        };

        let points = &rings[0].points;
        assert!(points.len() >= 4);
        let (first, last) = (points[0], points[points.len() - 1]);
        assert_eq!((first.x, first.y), (last.x, last.y));
        for p in points {
            assert!(p.x <= 0.5);
        }
        // area survives from the parent ring
        assert_eq!(rings[0].area, 1.0);
    }

    #[test]
    fn point_membership_is_inclusive() {
        let inside = ProjectedFeature::new(
            ProjectedGeometry::Point(point_at(0.5, 0.5)),
            Map::new(),
        );
        let clipped = clip(&[inside], 1.0, 0.5, 1.0, Axis::X, 0.0, 1.0);

        assert_eq!(clipped.len(), 1);
    }

    #[test]
    fn multi_point_drops_strays() {
        let feature = ProjectedFeature::new(
            ProjectedGeometry::MultiPoint(vec![point_at(0.1, 0.5), point_at(0.9, 0.5)]),
            Map::new(),
        );
        let clipped = clip(&[feature], 1.0, 0.0, 0.5, Axis::X, 0.1, 0.9);

        assert_eq!(clipped.len(), 1);
        let ProjectedGeometry::MultiPoint(points) = &clipped[0].geometry else {
            panic!("expected a multi-point");
        };
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 0.1);
    }
}
