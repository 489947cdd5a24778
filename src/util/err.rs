/// Lifts a submodule error into a variant of the crate-level
/// [`Error`](crate::Error), or an external error into a submodule error.
///
/// ```rust,ignore
/// use tilecut::geo::error::GeoError;
/// tilecut::impl_err!(GeoError, Geo);
/// ```
pub mod err_macro {
    #[macro_export]
    macro_rules! impl_err {
        ($from:ty, $to:ident, $variant:ident) => {
            impl From<$from> for $to {
                fn from(value: $from) -> Self {
                    $crate::$to::$variant(value)
                }
            }
        };
        ($from:ty, $variant:ident) => {
            impl From<$from> for $crate::Error {
                fn from(value: $from) -> Self {
                    $crate::Error::$variant(value)
                }
            }
        };
    }

    pub use impl_err;
}
