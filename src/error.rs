//! Error type shared by the driver and its hardware collaborators.

use core::fmt;

/// Errors returned by counter driver operations.
///
/// All errors are returned synchronously and none are retried internally.
/// A failed query never changes driver state: the quadrature counter keeps
/// accumulating edges regardless of what the caller saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Error {
    /// The requested port does not exist, or nothing is plugged into it.
    NoDevice,
    /// This counter only measures relative rotation.
    NotSupported,
    /// The analog subsystem could not produce a sample.
    ConversionFailed,
}

impl Error {
    /// Returns the error as a short snake_case string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::NoDevice => "no_device",
            Error::NotSupported => "not_supported",
            Error::ConversionFailed => "conversion_failed",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoDevice => f.write_str("no device attached"),
            Error::NotSupported => f.write_str("operation not supported"),
            Error::ConversionFailed => f.write_str("analog conversion failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
