use core::fmt;

/// Failures when importing external data into the engine.
///
/// The simulation itself never fails; only point lists coming from
/// generators or files are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A point carried the wrong number of components
    DimensionMismatch {
        expected: usize,
        found: usize,
        index: usize,
    },
    /// A point contained NaN or an infinite component
    NonFinite { index: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch {
                expected,
                found,
                index,
            } => write!(
                f,
                "point {index} has {found} components, expected {expected}"
            ),
            Error::NonFinite { index } => write!(f, "point {index} has a non-finite component"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
