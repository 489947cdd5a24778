use crate::impl_err;

#[derive(Debug)]
pub enum IndexError {
    /// `extent + buffer` no longer fits the signed 16-bit tile coordinate
    /// space.
    ExtentOverflow { extent: u16, buffer: u16 },
    /// `max_zoom` beyond what the packed tile id can address.
    ZoomRange(u8),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::ExtentOverflow { extent, buffer } => write!(
                f,
                "extent {extent} + buffer {buffer} overflows 16-bit tile coordinates"
            ),
            IndexError::ZoomRange(zoom) => {
                write!(f, "max_zoom {zoom} exceeds the addressable zoom range")
            }
        }
    }
}

impl std::error::Error for IndexError {}

impl_err!(IndexError, Index);
