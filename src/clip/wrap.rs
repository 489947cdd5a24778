//! Antimeridian handling.
//!
//! Features crossing longitude ±180° project outside the unit square. Three
//! world copies are clipped out of the input and the outer two shifted back
//! by a whole world, so both edges of the tile grid see the crossing
//! features without any special casing in the slicer.

use crate::clip::{clip, Axis};
use crate::geo::projected::ProjectedFeature;

/// Wraps a projected feature list. `buffer` is the tile overlap expressed
/// as a fraction of the world (`options.buffer / options.extent`).
pub fn wrap(features: Vec<ProjectedFeature>, buffer: f64) -> Vec<ProjectedFeature> {
    let left = clip(&features, 1.0, -1.0 - buffer, buffer, Axis::X, -1.0, 2.0);
    let right = clip(&features, 1.0, 1.0 - buffer, 2.0 + buffer, Axis::X, -1.0, 2.0);

    if left.is_empty() && right.is_empty() {
        return features;
    }

    let mut center = clip(&features, 1.0, -buffer, 1.0 + buffer, Axis::X, -1.0, 2.0);

    let mut merged = Vec::with_capacity(left.len() + center.len() + right.len());
    merged.extend(left.into_iter().map(|f| shift(f, 1.0)));
    merged.append(&mut center);
    merged.extend(right.into_iter().map(|f| shift(f, -1.0)));
    merged
}

/// Translates a feature by a whole world along x.
fn shift(mut feature: ProjectedFeature, offset: f64) -> ProjectedFeature {
    feature.geometry.each_point_mut(|p| p.x += offset);
    feature.min.x += offset;
    feature.max.x += offset;
    feature
}

#[cfg(test)]
mod test {
    use geo::{line_string, Geometry};

    use super::*;
    use crate::geo::{convert, Feature};

    fn projected(geometry: Geometry<f64>) -> Vec<ProjectedFeature> {
        convert(vec![Feature::from(geometry)], 0.0).unwrap()
    }

    #[test]
    fn interior_features_pass_through_untouched() {
        let features = projected(Geometry::LineString(line_string![
            (x: -10.0, y: 0.0),
            (x: 10.0, y: 0.0),
        ]));

        let wrapped = wrap(features.clone(), 64.0 / 4096.0);

        assert_eq!(wrapped, features);
    }

    #[test]
    fn crossing_line_appears_in_both_worlds() {
        let features = projected(Geometry::LineString(line_string![
            (x: 170.0, y: 0.0),
            (x: 190.0, y: 0.0),
        ]));

        let wrapped = wrap(features, 64.0 / 4096.0);

        // center copy near the east edge plus a shifted copy at the west
        assert_eq!(wrapped.len(), 2);
        assert!(wrapped.iter().any(|f| f.min.x < 0.5 && f.max.x < 0.5));
        assert!(wrapped.iter().any(|f| f.min.x > 0.5));
    }

    #[test]
    fn west_edge_features_get_an_east_copy() {
        let features = projected(Geometry::LineString(line_string![
            (x: -180.0, y: 0.0),
            (x: -179.0, y: 0.0),
        ]));

        let wrapped = wrap(features, 64.0 / 4096.0);

        // the left-world clip catches geometry inside the west buffer and
        // replays it shifted past x = 1
        assert_eq!(wrapped.len(), 2);
        assert!(wrapped.iter().any(|f| f.min.x >= 1.0 - 64.0 / 4096.0));
    }
}
