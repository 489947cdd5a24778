//! Geometry model shared by the projector, clipper, simplifier and slicer.
//!
//! Input features carry [`geo::Geometry`] in WGS84 degrees; everything past
//! [`convert`] works on the projected unit-square representation, where each
//! vertex also carries its simplification metric.

#[doc(hidden)]
pub mod error;
pub mod feature;
pub mod project;
pub mod projected;
#[doc(hidden)]
pub mod simplify;

#[doc(inline)]
pub use feature::{Feature, Properties};
#[doc(inline)]
pub use project::convert;
#[doc(inline)]
pub use projected::{
    ProjectedFeature, ProjectedGeometry, ProjectedLine, ProjectedPoint, ProjectedRing,
};
