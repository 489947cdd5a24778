use geo::Geometry;
use serde_json::{Map, Value};

/// Opaque feature properties, carried through the pipeline verbatim.
/// The slicer never inspects them.
pub type Properties = Map<String, Value>;

/// An input feature: geometry in WGS84 degrees plus its properties.
///
/// ```rust
/// use geo::{point, Geometry};
/// use tilecut::Feature;
///
/// let feature = Feature::from(Geometry::Point(point! { x: 13.4, y: 52.5 }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>, properties: Properties) -> Self {
        Feature {
            geometry,
            properties,
        }
    }
}

impl From<Geometry<f64>> for Feature {
    fn from(geometry: Geometry<f64>) -> Self {
        Feature::new(geometry, Properties::new())
    }
}
