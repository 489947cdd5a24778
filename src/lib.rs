//! Slices GeoJSON-style features into a pyramid of vector tiles.
//!
//! Input features are projected into spherical-Mercator unit-square space
//! once, wrapped across the antimeridian, and recursively clipped into a
//! quadtree of tiles. The initial pass indexes to a configurable depth;
//! deeper tiles are produced lazily from geometry retained on their
//! ancestors, so `get_tile` works at arbitrary zoom without reprocessing
//! the whole dataset.

pub mod clip;
pub mod geo;
pub mod index;
pub mod tile;
pub mod util;

#[doc(inline)]
pub use crate::geo::{Feature, Properties};
#[doc(inline)]
pub use crate::index::{Options, TileIndex};
#[doc(inline)]
pub use crate::tile::{FeatureKind, Tile, TileFeature};

use crate::geo::error::GeoError;
use crate::index::error::IndexError;

#[derive(Debug)]
pub enum Error {
    Geo(GeoError),
    Index(IndexError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Geo(err) => write!(f, "{err}"),
            Error::Index(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
