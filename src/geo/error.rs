use crate::impl_err;

#[derive(Debug)]
pub enum GeoError {
    /// The input geometry variant cannot be represented in a vector tile.
    UnsupportedGeometry(&'static str),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::UnsupportedGeometry(kind) => {
                write!(f, "unsupported geometry variant: {kind}")
            }
        }
    }
}

impl std::error::Error for GeoError {}

impl_err!(GeoError, Geo);
